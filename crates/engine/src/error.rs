//! Error types for dispatch and authentication.

use hidbridge_protocol::FrameError;
use thiserror::Error;

/// Authentication failures. The frame is dropped; nothing else happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("MAC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    MacMismatch { expected: u32, actual: u32 },

    #[error("No session established; send connect first")]
    SessionNotEstablished,

    #[error("Rejected by authenticator: {0}")]
    Rejected(String),
}

pub type AuthResult<T = ()> = Result<T, AuthError>;

/// Why the dispatcher refused a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Malformed frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Stale sequence number {indexpts} (last accepted {last})")]
    StaleSequence { indexpts: u32, last: u32 },
}

impl RejectReason {
    /// Short label for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            RejectReason::Frame(FrameError::TooShort { .. }) => "too_short",
            RejectReason::Frame(FrameError::UnknownOpcode(_)) => "unknown_opcode",
            RejectReason::Frame(FrameError::PayloadSizeMismatch { .. }) => "size_mismatch",
            RejectReason::Auth(_) => "auth",
            RejectReason::StaleSequence { .. } => "stale",
        }
    }
}
