//! Mouse and keyboard state owned by the report multiplexer.

use hidbridge_protocol::{
    CapturedMouseReport, KeyboardReport, MouseButton, MouseButtons, MouseReport,
};

/// Which real-device channels are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskFlags {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
    pub movement: bool,
}

impl MaskFlags {
    pub const NONE: MaskFlags = MaskFlags {
        left: false,
        right: false,
        middle: false,
        movement: false,
    };

    pub fn is_button_masked(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    /// Bits of the button byte that come from injection only.
    pub fn button_bits(&self) -> u8 {
        MouseButton::ALL
            .into_iter()
            .filter(|b| self.is_button_masked(*b))
            .fold(0, |bits, b| bits | b.mask())
    }

    pub fn any(&self) -> bool {
        *self != Self::NONE
    }
}

/// What the physical mouse has reported since the last tick.
///
/// Buttons are level state (the latest report wins); movement and wheel
/// are summed until the next tick consumes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapturedState {
    pub buttons: MouseButtons,
    pub dx: i64,
    pub dy: i64,
    pub wheel: i64,
}

impl CapturedState {
    pub fn merge(&mut self, report: &CapturedMouseReport) {
        self.buttons = report.buttons;
        self.dx = self.dx.saturating_add(i64::from(report.dx));
        self.dy = self.dy.saturating_add(i64::from(report.dy));
        self.wheel = self.wheel.saturating_add(i64::from(report.wheel));
    }

    /// Take the accumulated motion, leaving the button level in place.
    pub fn take_motion(&mut self) -> (i64, i64, i64) {
        let motion = (self.dx, self.dy, self.wheel);
        self.dx = 0;
        self.dy = 0;
        self.wheel = 0;
        motion
    }
}

/// Injected mouse state plus what has been emitted so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MouseState {
    /// Buttons held by injected commands.
    pub buttons: MouseButtons,
    /// Movement waiting to be emitted.
    pub pending_x: i64,
    pub pending_y: i64,
    pub pending_wheel: i64,
    /// Timed-motion output held back by the clamp. Dropped when the timed
    /// motion is replaced.
    pub timed_x: i64,
    pub timed_y: i64,
    pub masks: MaskFlags,
    /// Sum of all emitted x/y, relative to where the bridge started.
    pub position: (i64, i64),
    pub last_report: Option<MouseReport>,
}

impl MouseState {
    pub fn add_motion(&mut self, dx: i64, dy: i64) {
        self.pending_x = self.pending_x.saturating_add(dx);
        self.pending_y = self.pending_y.saturating_add(dy);
    }

    pub fn add_timed_motion(&mut self, dx: i64, dy: i64) {
        self.timed_x = self.timed_x.saturating_add(dx);
        self.timed_y = self.timed_y.saturating_add(dy);
    }

    /// Forget timed motion that has not been emitted yet.
    pub fn discard_timed_carry(&mut self) {
        self.timed_x = 0;
        self.timed_y = 0;
    }

    pub fn add_wheel(&mut self, delta: i64) {
        self.pending_wheel = self.pending_wheel.saturating_add(delta);
    }

    /// Cut one report out of the pending accumulators.
    ///
    /// Timed motion goes out first, instant and captured motion fill the
    /// rest. Values beyond the report's field range stay pending for the
    /// next tick, so no motion is dropped.
    pub fn drain_report(&mut self, buttons: MouseButtons) -> MouseReport {
        let (x, timed_x, instant_x) = split_axis(self.timed_x, self.pending_x);
        let (y, timed_y, instant_y) = split_axis(self.timed_y, self.pending_y);
        let wheel = clamp_i8(self.pending_wheel);

        self.timed_x -= timed_x;
        self.timed_y -= timed_y;
        self.pending_x -= instant_x;
        self.pending_y -= instant_y;
        self.pending_wheel -= i64::from(wheel);
        self.position = (
            self.position.0.saturating_add(i64::from(x)),
            self.position.1.saturating_add(i64::from(y)),
        );

        let report = MouseReport {
            buttons,
            x,
            y,
            wheel,
        };
        self.last_report = Some(report);
        report
    }

    pub fn has_pending_motion(&self) -> bool {
        self.pending_x != 0
            || self.pending_y != 0
            || self.pending_wheel != 0
            || self.timed_x != 0
            || self.timed_y != 0
    }
}

/// One axis of a report: `(emitted, taken from timed, taken from pending)`.
///
/// The emitted value always lies between the timed share and the sum, so
/// the pending share never overshoots.
fn split_axis(timed: i64, pending: i64) -> (i16, i64, i64) {
    let timed_share = i64::from(clamp_i16(timed));
    let emitted = clamp_i16(timed_share.saturating_add(pending));
    (emitted, timed_share, i64::from(emitted) - timed_share)
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_i16(value: i64) -> i16 {
    value.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_i8(value: i64) -> i8 {
    value.clamp(i64::from(i8::MIN), i64::from(i8::MAX)) as i8
}

/// Held keyboard state; emitted once after each change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    report: KeyboardReport,
    dirty: bool,
}

impl KeyboardState {
    pub fn set(&mut self, report: KeyboardReport) {
        if report != self.report {
            self.report = report;
            self.dirty = true;
        }
    }

    pub fn current(&self) -> KeyboardReport {
        self.report
    }

    /// The report to emit this tick, if the state changed since the last one.
    pub fn take_changed(&mut self) -> Option<KeyboardReport> {
        if self.dirty {
            self.dirty = false;
            Some(self.report)
        } else {
            None
        }
    }
}
