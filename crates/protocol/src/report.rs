//! HID report shapes: the mouse/keyboard reports the bridge emits downstream
//! and the mouse reports it captures from the physical device.

use serde::{Deserialize, Serialize};

use crate::codec::ReportBuilder;
use crate::opcode::KEYBOARD_KEYS;
use crate::{ReportError, ReportResult};

pub const MOUSE_REPORT_SIZE: usize = 6;
pub const KEYBOARD_REPORT_SIZE: usize = 2 + KEYBOARD_KEYS;

/// Boot-protocol mouse reports are at least buttons + x + y.
pub const BOOT_MOUSE_MIN_SIZE: usize = 3;
/// Report id + buttons + i16 x + i16 y + i8 wheel.
pub const EXTENDED_MOUSE_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    pub const fn mask(self) -> u8 {
        match self {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
        }
    }
}

/// Button bitmask in HID bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MouseButtons(u8);

impl MouseButtons {
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_pressed(self, button: MouseButton) -> bool {
        self.0 & button.mask() != 0
    }

    pub fn set(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.0 |= button.mask();
        } else {
            self.0 &= !button.mask();
        }
    }

    pub fn with(mut self, button: MouseButton, pressed: bool) -> Self {
        self.set(button, pressed);
        self
    }
}

/// Outgoing mouse report: buttons, x i16, y i16, wheel i8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseReport {
    pub buttons: MouseButtons,
    pub x: i16,
    pub y: i16,
    pub wheel: i8,
}

impl MouseReport {
    pub fn to_bytes(&self) -> [u8; MOUSE_REPORT_SIZE] {
        let mut out = [0u8; MOUSE_REPORT_SIZE];
        let mut builder = ReportBuilder::with_capacity(MOUSE_REPORT_SIZE);
        builder
            .write_u8(self.buttons.bits())
            .write_i16_le(self.x)
            .write_i16_le(self.y)
            .write_i8(self.wheel);
        out.copy_from_slice(builder.as_slice());
        out
    }

    pub fn from_bytes(data: &[u8]) -> ReportResult<Self> {
        let Some(&[buttons, x0, x1, y0, y1, wheel]) = data.first_chunk::<MOUSE_REPORT_SIZE>()
        else {
            return Err(ReportError::InvalidReportSize {
                expected: MOUSE_REPORT_SIZE,
                actual: data.len(),
            });
        };
        Ok(Self {
            buttons: MouseButtons::from_bits(buttons),
            x: i16::from_le_bytes([x0, x1]),
            y: i16::from_le_bytes([y0, y1]),
            wheel: i8::from_le_bytes([wheel]),
        })
    }

    pub fn is_idle(&self) -> bool {
        self.x == 0 && self.y == 0 && self.wheel == 0
    }
}

/// Outgoing keyboard report: modifier byte, reserved byte, ten key usages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; KEYBOARD_KEYS],
}

impl KeyboardReport {
    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut out = [0u8; KEYBOARD_REPORT_SIZE];
        out[0] = self.modifiers;
        out[1] = self.reserved;
        out[2..].copy_from_slice(&self.keys);
        out
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys.iter().copied().filter(|k| *k != 0)
    }
}

/// Wire shape of reports captured from the physical mouse.
///
/// Serialized as a map tagged by `kind`, e.g. `{kind: extended, report_id: 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureFormat {
    /// buttons, i8 x, i8 y, optional i8 wheel; trailing vendor bytes ignored.
    #[default]
    Boot,
    /// report id, buttons, i16 x, i16 y, i8 wheel.
    Extended { report_id: u8 },
}

/// One report read from the physical device, widened for accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapturedMouseReport {
    pub buttons: MouseButtons,
    pub dx: i32,
    pub dy: i32,
    pub wheel: i32,
}

impl CapturedMouseReport {
    pub fn parse(data: &[u8], format: CaptureFormat) -> ReportResult<Self> {
        match format {
            CaptureFormat::Boot => Self::parse_boot(data),
            CaptureFormat::Extended { report_id } => Self::parse_extended(data, report_id),
        }
    }

    pub fn parse_boot(data: &[u8]) -> ReportResult<Self> {
        let (&buttons, rest) = data.split_first().ok_or(ReportError::InvalidReportSize {
            expected: BOOT_MOUSE_MIN_SIZE,
            actual: 0,
        })?;
        match rest {
            [x, y, tail @ ..] => Ok(Self {
                buttons: MouseButtons::from_bits(buttons),
                dx: i32::from(i8::from_le_bytes([*x])),
                dy: i32::from(i8::from_le_bytes([*y])),
                wheel: tail
                    .first()
                    .map_or(0, |w| i32::from(i8::from_le_bytes([*w]))),
            }),
            _ => Err(ReportError::InvalidReportSize {
                expected: BOOT_MOUSE_MIN_SIZE,
                actual: data.len(),
            }),
        }
    }

    pub fn parse_extended(data: &[u8], report_id: u8) -> ReportResult<Self> {
        let Some(&[id, buttons, x0, x1, y0, y1, wheel]) =
            data.first_chunk::<EXTENDED_MOUSE_SIZE>()
        else {
            return Err(ReportError::InvalidReportSize {
                expected: EXTENDED_MOUSE_SIZE,
                actual: data.len(),
            });
        };
        if id != report_id {
            return Err(ReportError::UnexpectedReportId {
                expected: report_id,
                actual: id,
            });
        }
        Ok(Self {
            buttons: MouseButtons::from_bits(buttons),
            dx: i32::from(i16::from_le_bytes([x0, x1])),
            dy: i32::from(i16::from_le_bytes([y0, y1])),
            wheel: i32::from(i8::from_le_bytes([wheel])),
        })
    }
}
