//! Opcode table for the command frame.
//!
//! The 32-bit `cmd` field is the only thing that decides how the payload
//! union is read. The set is closed: anything else is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::FrameError;

/// Size of the largest payload variant; the frame union is sized to this.
pub const MAX_PAYLOAD_SIZE: usize = 1024;

/// Number of RGB565 pixels carried by a `show_pic` payload.
pub const PICTURE_PIXELS: usize = MAX_PAYLOAD_SIZE / 2;

/// Number of key usage slots in a `keyboard_all` payload.
pub const KEYBOARD_KEYS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum Opcode {
    Connect = 0xAF3C_2828,
    MouseMove = 0xAEDE_7345,
    MouseLeft = 0x9823_AE8D,
    MouseMiddle = 0x97A3_AE8D,
    MouseRight = 0x238D_8212,
    MouseWheel = 0xFFEE_AD38,
    #[serde(rename = "mouse_automove")]
    MouseAutoMove = 0xAEDE_7346,
    KeyboardAll = 0x123C_2C2F,
    Reboot = 0xAA88_55AA,
    BezierMove = 0xA238_455A,
    Monitor = 0x2738_8020,
    Debug = 0x2738_2021,
    MaskMouse = 0x2323_4343,
    UnmaskAll = 0x2334_4343,
    SetConfig = 0x1D3D_3323,
    #[serde(rename = "show_pic")]
    ShowPicture = 0x1233_4883,
}

impl Opcode {
    pub const ALL: [Opcode; 16] = [
        Opcode::Connect,
        Opcode::MouseMove,
        Opcode::MouseLeft,
        Opcode::MouseMiddle,
        Opcode::MouseRight,
        Opcode::MouseWheel,
        Opcode::MouseAutoMove,
        Opcode::KeyboardAll,
        Opcode::Reboot,
        Opcode::BezierMove,
        Opcode::Monitor,
        Opcode::Debug,
        Opcode::MaskMouse,
        Opcode::UnmaskAll,
        Opcode::SetConfig,
        Opcode::ShowPicture,
    ];

    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Exact packed payload size in bytes for this opcode.
    pub const fn payload_size(self) -> usize {
        match self {
            Opcode::Connect | Opcode::Reboot | Opcode::UnmaskAll => 0,
            Opcode::MouseLeft | Opcode::MouseMiddle | Opcode::MouseRight => 1,
            Opcode::MouseWheel | Opcode::Monitor | Opcode::Debug => 4,
            Opcode::MouseMove | Opcode::SetConfig => 8,
            Opcode::MouseAutoMove => 12,
            Opcode::KeyboardAll => 2 + KEYBOARD_KEYS,
            Opcode::MaskMouse => 16,
            Opcode::BezierMove => 28,
            Opcode::ShowPicture => MAX_PAYLOAD_SIZE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Opcode::Connect => "connect",
            Opcode::MouseMove => "mouse_move",
            Opcode::MouseLeft => "mouse_left",
            Opcode::MouseMiddle => "mouse_middle",
            Opcode::MouseRight => "mouse_right",
            Opcode::MouseWheel => "mouse_wheel",
            Opcode::MouseAutoMove => "mouse_automove",
            Opcode::KeyboardAll => "keyboard_all",
            Opcode::Reboot => "reboot",
            Opcode::BezierMove => "bezier_move",
            Opcode::Monitor => "monitor",
            Opcode::Debug => "debug",
            Opcode::MaskMouse => "mask_mouse",
            Opcode::UnmaskAll => "unmask_all",
            Opcode::SetConfig => "set_config",
            Opcode::ShowPicture => "show_pic",
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = FrameError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.value() == value)
            .ok_or(FrameError::UnknownOpcode(value))
    }
}

impl From<Opcode> for u32 {
    fn from(op: Opcode) -> u32 {
        op.value()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
