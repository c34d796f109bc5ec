//! Wire protocol for the HID bridge
//!
//! This crate owns every byte layout the bridge deals with:
//!
//! - the 16-byte command header plus opcode-selected payload sent by the
//!   controlling host over UDP ([`frame`])
//! - the closed opcode table and per-opcode payload sizes ([`opcode`])
//! - the mouse and keyboard reports emitted downstream, and the mouse
//!   reports captured from the physical device ([`report`])
//!
//! All multi-byte fields are little-endian except the port fields of the
//! `monitor`, `debug` and `set_config` payloads, which are network order.
//!
//! # Example
//!
//! ```
//! use hidbridge_protocol::{Command, CommandFrame, MouseMove, decode, encode};
//!
//! let frame = CommandFrame::new(0x1234_5678, 0, 1, Command::MouseMove(MouseMove { x: 10, y: -5 }));
//! let bytes = encode(&frame);
//! assert_eq!(bytes.len(), 24);
//! assert_eq!(decode(&bytes), Ok(frame));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod codec;
pub mod error;
pub mod frame;
pub mod opcode;
pub mod report;

pub use codec::{ReportBuilder, ReportParser};
pub use error::{FrameError, FrameResult, ReportError, ReportResult};
pub use frame::{
    AutoMove, BezierMove, Command, CommandFrame, DebugConfig, FULL_FRAME_SIZE, FrameCodec,
    FrameHeader, FrameLayout, HEADER_SIZE, KeyboardPayload, MaskConfig, MonitorConfig, MouseMove,
    NetworkConfig, Picture, decode, encode,
};
pub use opcode::{KEYBOARD_KEYS, MAX_PAYLOAD_SIZE, Opcode, PICTURE_PIXELS};
pub use report::{
    BOOT_MOUSE_MIN_SIZE, CaptureFormat, CapturedMouseReport, EXTENDED_MOUSE_SIZE,
    KEYBOARD_REPORT_SIZE, KeyboardReport, MOUSE_REPORT_SIZE, MouseButton, MouseButtons,
    MouseReport,
};
