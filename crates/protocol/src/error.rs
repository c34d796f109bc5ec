//! Error types for frame and report decoding.

use thiserror::Error;

/// Frame-level decoding failures.
///
/// All of these are detected before any bridge state is touched; a frame that
/// fails to decode is dropped as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than the fixed header (or a field read ran past the end).
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// The `cmd` field matches none of the known opcode constants.
    #[error("Unknown opcode: {0:#010x}")]
    UnknownOpcode(u32),

    /// The frame length does not match the opcode's payload size.
    #[error("Payload size mismatch for {opcode}: expected frame of {expected} bytes, got {actual}")]
    PayloadSizeMismatch {
        opcode: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type FrameResult<T> = Result<T, FrameError>;

/// Failures parsing raw HID reports captured from the physical device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid report size: expected {expected}, got {actual}")]
    InvalidReportSize { expected: usize, actual: usize },

    #[error("Unexpected report id: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedReportId { expected: u8, actual: u8 },
}

pub type ReportResult<T> = Result<T, ReportError>;
