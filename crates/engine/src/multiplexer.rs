//! Report multiplexer: merges captured device input with injected commands
//! into exactly one outgoing report per tick.

use hidbridge_motion::MotionInterpolator;
use hidbridge_protocol::{CapturedMouseReport, KeyboardReport, MouseButtons, MouseReport};
use tracing::{debug, trace};

use crate::command::MotionCommand;
use crate::state::{CapturedState, KeyboardState, MaskFlags, MouseState};

/// Top-level state. Masking is orthogonal and lives in [`MaskFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplexerState {
    Idle,
    InjectedMotionActive,
}

/// Everything emitted for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutput {
    pub mouse: MouseReport,
    /// Present only on the tick after the keyboard state changed.
    pub keyboard: Option<KeyboardReport>,
}

/// Sole owner of [`MouseState`].
///
/// Commands go in through [`apply`](Self::apply), device input through
/// [`merge_captured`](Self::merge_captured), and reports come out of
/// [`tick`](Self::tick). Nothing else touches the state.
#[derive(Debug, Clone, Default)]
pub struct ReportMultiplexer {
    mouse: MouseState,
    keyboard: KeyboardState,
    captured: CapturedState,
    motion: Option<MotionInterpolator>,
}

impl ReportMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MultiplexerState {
        if self.motion.is_some() {
            MultiplexerState::InjectedMotionActive
        } else {
            MultiplexerState::Idle
        }
    }

    pub fn mouse_state(&self) -> &MouseState {
        &self.mouse
    }

    pub fn masks(&self) -> MaskFlags {
        self.mouse.masks
    }

    pub fn active_motion(&self) -> Option<&MotionInterpolator> {
        self.motion.as_ref()
    }

    pub fn keyboard(&self) -> KeyboardReport {
        self.keyboard.current()
    }

    /// Apply one accepted command.
    ///
    /// Instant commands change state right away and show up in the next
    /// report. Timed commands start a new interpolation, discarding any
    /// that is still running.
    pub fn apply(&mut self, command: MotionCommand) {
        match command {
            MotionCommand::AbsoluteMove { x, y } => {
                self.mouse.add_motion(i64::from(x), i64::from(y));
            }
            MotionCommand::BezierMove { .. } | MotionCommand::AutoMove { .. } => {
                if let Some(old) = &self.motion {
                    debug!(
                        progress = old.progress(),
                        "replacing unfinished timed motion"
                    );
                }
                self.mouse.discard_timed_carry();
                self.motion = command.interpolator();
            }
            MotionCommand::ButtonState { button, pressed } => {
                self.mouse.buttons.set(button, pressed);
            }
            MotionCommand::WheelDelta { value } => {
                self.mouse.add_wheel(i64::from(value));
            }
            MotionCommand::Keyboard(report) => {
                self.keyboard.set(report);
            }
            MotionCommand::MaskConfig(masks) => {
                debug!(?masks, "mask updated");
                self.mouse.masks = masks;
            }
            MotionCommand::UnmaskAll => {
                debug!("all masks cleared");
                self.mouse.masks = MaskFlags::NONE;
            }
        }
    }

    /// Fold one report from the physical device into the captured state.
    pub fn merge_captured(&mut self, report: &CapturedMouseReport) {
        self.captured.merge(report);
    }

    /// Produce this tick's report. `elapsed_ms` is the tick period, used to
    /// advance any active interpolation.
    pub fn tick(&mut self, elapsed_ms: u32) -> TickOutput {
        if let Some(motion) = &mut self.motion {
            if let Some(delta) = motion.advance(elapsed_ms) {
                self.mouse.add_timed_motion(delta.dx, delta.dy);
            }
            if motion.is_finished() {
                trace!("timed motion complete");
                self.motion = None;
            }
        }

        let (real_dx, real_dy, real_wheel) = self.captured.take_motion();
        if !self.mouse.masks.movement {
            self.mouse.add_motion(real_dx, real_dy);
        }
        self.mouse.add_wheel(real_wheel);

        let buttons = self.merged_buttons();
        let mouse = self.mouse.drain_report(buttons);
        TickOutput {
            mouse,
            keyboard: self.keyboard.take_changed(),
        }
    }

    /// Injected buttons OR real buttons, except masked channels which only
    /// carry the injected value.
    fn merged_buttons(&self) -> MouseButtons {
        let masked = self.mouse.masks.button_bits();
        let real = self.captured.buttons.bits() & !masked;
        MouseButtons::from_bits(self.mouse.buttons.bits() | real)
    }

    /// Back to a freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidbridge_protocol::MouseButton;

    fn real(buttons: u8, dx: i32, dy: i32) -> CapturedMouseReport {
        CapturedMouseReport {
            buttons: MouseButtons::from_bits(buttons),
            dx,
            dy,
            wheel: 0,
        }
    }

    #[test]
    fn test_idle_tick_emits_empty_report() {
        let mut mux = ReportMultiplexer::new();
        let out = mux.tick(10);
        assert_eq!(out.mouse, MouseReport::default());
        assert_eq!(out.keyboard, None);
        assert_eq!(mux.state(), MultiplexerState::Idle);
    }

    #[test]
    fn test_instant_move_emitted_once() {
        let mut mux = ReportMultiplexer::new();
        mux.apply(MotionCommand::AbsoluteMove { x: 10, y: -5 });
        let out = mux.tick(10);
        assert_eq!((out.mouse.x, out.mouse.y), (10, -5));
        assert_eq!(mux.tick(10).mouse, MouseReport::default());
    }

    #[test]
    fn test_buttons_are_held() {
        let mut mux = ReportMultiplexer::new();
        mux.apply(MotionCommand::ButtonState {
            button: MouseButton::Right,
            pressed: true,
        });
        assert!(mux.tick(10).mouse.buttons.is_pressed(MouseButton::Right));
        assert!(mux.tick(10).mouse.buttons.is_pressed(MouseButton::Right));

        mux.apply(MotionCommand::ButtonState {
            button: MouseButton::Right,
            pressed: false,
        });
        assert!(!mux.tick(10).mouse.buttons.is_pressed(MouseButton::Right));
    }

    #[test]
    fn test_real_and_injected_motion_add() {
        let mut mux = ReportMultiplexer::new();
        mux.merge_captured(&real(0, 3, 4));
        mux.merge_captured(&real(0, 1, 1));
        mux.apply(MotionCommand::AbsoluteMove { x: 10, y: 0 });
        let out = mux.tick(10);
        assert_eq!((out.mouse.x, out.mouse.y), (14, 5));
    }

    #[test]
    fn test_movement_mask_discards_real_motion() {
        let mut mux = ReportMultiplexer::new();
        mux.apply(MotionCommand::MaskConfig(MaskFlags {
            movement: true,
            ..MaskFlags::default()
        }));
        mux.merge_captured(&real(MouseButtons::LEFT, 50, 50));
        mux.apply(MotionCommand::AbsoluteMove { x: 1, y: 2 });

        let out = mux.tick(10);
        assert_eq!((out.mouse.x, out.mouse.y), (1, 2));
        assert!(out.mouse.buttons.is_pressed(MouseButton::Left));

        mux.apply(MotionCommand::UnmaskAll);
        mux.merge_captured(&real(0, 5, 0));
        assert_eq!(mux.tick(10).mouse.x, 5);
    }

    #[test]
    fn test_wheel_is_never_masked() {
        let mut mux = ReportMultiplexer::new();
        mux.apply(MotionCommand::MaskConfig(MaskFlags {
            left: true,
            right: true,
            middle: true,
            movement: true,
        }));
        mux.merge_captured(&CapturedMouseReport {
            wheel: -2,
            ..CapturedMouseReport::default()
        });
        mux.apply(MotionCommand::WheelDelta { value: 1 });
        assert_eq!(mux.tick(10).mouse.wheel, -1);
    }

    #[test]
    fn test_timed_motion_state_transitions() {
        let mut mux = ReportMultiplexer::new();
        mux.apply(MotionCommand::AutoMove {
            x: 30,
            y: 0,
            duration_ms: 30,
        });
        assert_eq!(mux.state(), MultiplexerState::InjectedMotionActive);

        let xs: Vec<i16> = (0..3).map(|_| mux.tick(10).mouse.x).collect();
        assert_eq!(xs, vec![10, 10, 10]);
        assert_eq!(mux.state(), MultiplexerState::Idle);
        assert_eq!(mux.mouse_state().position, (30, 0));
    }

    #[test]
    fn test_keyboard_report_on_change_only() {
        let mut mux = ReportMultiplexer::new();
        let mut report = KeyboardReport {
            modifiers: 0x02,
            ..KeyboardReport::default()
        };
        report.keys[0] = 0x04;
        mux.apply(MotionCommand::Keyboard(report));

        assert_eq!(mux.tick(10).keyboard, Some(report));
        assert_eq!(mux.tick(10).keyboard, None);
        assert_eq!(mux.keyboard(), report);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut mux = ReportMultiplexer::new();
        mux.apply(MotionCommand::ButtonState {
            button: MouseButton::Left,
            pressed: true,
        });
        mux.apply(MotionCommand::MaskConfig(MaskFlags {
            left: true,
            ..MaskFlags::default()
        }));
        mux.apply(MotionCommand::AutoMove {
            x: 100,
            y: 100,
            duration_ms: 1000,
        });
        mux.reset();

        assert_eq!(mux.state(), MultiplexerState::Idle);
        assert_eq!(mux.masks(), MaskFlags::NONE);
        assert_eq!(mux.tick(10).mouse, MouseReport::default());
    }
}
