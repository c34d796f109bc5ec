//! Internal events produced by the dispatcher.
//!
//! Wire payloads are translated into these once; the multiplexer and the
//! bridge loop never see [`Command`] directly.

use std::net::Ipv4Addr;

use hidbridge_motion::{MotionInterpolator, MotionPath, Point};
use hidbridge_protocol::{
    AutoMove, BezierMove, Command, CommandFrame, KeyboardPayload, KeyboardReport, MaskConfig,
    MouseButton,
};

use crate::error::RejectReason;
use crate::state::MaskFlags;

/// Mouse and keyboard actions applied by the report multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCommand {
    /// Immediate pointer delta, emitted on the next tick.
    AbsoluteMove { x: i32, y: i32 },
    /// Cubic Bezier path relative to the pointer at acceptance.
    BezierMove {
        target: (i32, i32),
        control1: (i32, i32),
        control2: (i32, i32),
        duration_ms: u32,
    },
    /// Straight-line move spread over `duration_ms`.
    AutoMove { x: i32, y: i32, duration_ms: u32 },
    ButtonState { button: MouseButton, pressed: bool },
    WheelDelta { value: i32 },
    /// Replace the held keyboard state.
    Keyboard(KeyboardReport),
    MaskConfig(MaskFlags),
    UnmaskAll,
}

impl MotionCommand {
    /// Timed variants are handed to an interpolator; the rest apply at once.
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            MotionCommand::BezierMove { .. } | MotionCommand::AutoMove { .. }
        )
    }

    /// Build the interpolator for a timed command, `None` for instant ones.
    pub fn interpolator(&self) -> Option<MotionInterpolator> {
        match *self {
            MotionCommand::BezierMove {
                target,
                control1,
                control2,
                duration_ms,
            } => Some(MotionInterpolator::new(
                MotionPath::cubic_bezier(
                    Point::from_counts(control1.0, control1.1),
                    Point::from_counts(control2.0, control2.1),
                    Point::from_counts(target.0, target.1),
                ),
                duration_ms,
            )),
            MotionCommand::AutoMove { x, y, duration_ms } => Some(MotionInterpolator::new(
                MotionPath::linear(Point::from_counts(x, y)),
                duration_ms,
            )),
            _ => None,
        }
    }
}

impl From<BezierMove> for MotionCommand {
    fn from(b: BezierMove) -> Self {
        MotionCommand::BezierMove {
            target: (b.target_x, b.target_y),
            control1: (b.ctrl_x1, b.ctrl_y1),
            control2: (b.ctrl_x2, b.ctrl_y2),
            duration_ms: b.duration_ms,
        }
    }
}

impl From<AutoMove> for MotionCommand {
    fn from(m: AutoMove) -> Self {
        MotionCommand::AutoMove {
            x: m.x,
            y: m.y,
            duration_ms: m.duration_ms,
        }
    }
}

impl From<KeyboardPayload> for MotionCommand {
    fn from(k: KeyboardPayload) -> Self {
        MotionCommand::Keyboard(KeyboardReport {
            modifiers: k.ctrl,
            reserved: k.reserved,
            keys: k.keys,
        })
    }
}

impl From<MaskConfig> for MotionCommand {
    fn from(m: MaskConfig) -> Self {
        MotionCommand::MaskConfig(MaskFlags {
            left: m.left(),
            right: m.right(),
            middle: m.middle(),
            movement: m.movement(),
        })
    }
}

/// Changes to the bridge itself rather than to the emitted reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMutation {
    /// A session was (re)established.
    Connect { mac: u32, rand: u32 },
    /// Move the command listener to `port`.
    Monitor { port: u16 },
    /// Toggle verbose per-tick report logging.
    Debug { port: u16, enabled: bool },
    /// New network settings for the bridge.
    SetConfig { ip: Ipv4Addr, port: u16 },
    /// Reset all mouse and keyboard state.
    Reboot,
    /// Picture upload; no display is attached so only its size is kept.
    ShowPicture { pixels: usize },
}

/// Outcome of dispatching one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Motion(MotionCommand),
    Config(ConfigMutation),
    Rejected { reason: RejectReason },
}

impl Dispatch {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Dispatch::Rejected { .. })
    }

    pub fn rejected(reason: impl Into<RejectReason>) -> Self {
        Dispatch::Rejected {
            reason: reason.into(),
        }
    }
}

impl From<&CommandFrame> for Dispatch {
    fn from(frame: &CommandFrame) -> Self {
        match &frame.command {
            Command::Connect => Dispatch::Config(ConfigMutation::Connect {
                mac: frame.mac,
                rand: frame.rand,
            }),
            Command::MouseMove(m) => {
                Dispatch::Motion(MotionCommand::AbsoluteMove { x: m.x, y: m.y })
            }
            Command::MouseButton { button, state } => {
                Dispatch::Motion(MotionCommand::ButtonState {
                    button: *button,
                    pressed: *state != 0,
                })
            }
            Command::MouseWheel { value } => {
                Dispatch::Motion(MotionCommand::WheelDelta { value: *value })
            }
            Command::AutoMove(m) => Dispatch::Motion((*m).into()),
            Command::Keyboard(k) => Dispatch::Motion((*k).into()),
            Command::Reboot => Dispatch::Config(ConfigMutation::Reboot),
            Command::BezierMove(b) => Dispatch::Motion((*b).into()),
            Command::Monitor(m) => Dispatch::Config(ConfigMutation::Monitor { port: m.port }),
            Command::Debug(d) => Dispatch::Config(ConfigMutation::Debug {
                port: d.port,
                enabled: d.enable != 0,
            }),
            Command::MaskMouse(m) => Dispatch::Motion((*m).into()),
            Command::UnmaskAll => Dispatch::Motion(MotionCommand::UnmaskAll),
            Command::SetConfig(n) => Dispatch::Config(ConfigMutation::SetConfig {
                ip: Ipv4Addr::from(n.ip),
                port: n.port,
            }),
            Command::ShowPicture(p) => Dispatch::Config(ConfigMutation::ShowPicture {
                pixels: p.pixels.len(),
            }),
        }
    }
}
