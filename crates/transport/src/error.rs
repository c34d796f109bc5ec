//! Transport error types

use std::io;
use thiserror::Error;

/// Failures at the I/O boundary.
///
/// None of these touch bridge state. The loop logs them and carries on.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transfer did not complete within {timeout_ms}ms")]
    TransferTimeout { timeout_ms: u64 },

    #[error("Transport channel closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Hardware failure: {0}")]
    Hardware(String),
}

impl TransportError {
    /// Whether the next attempt on the same channel may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransportError::TransferTimeout { .. } | TransportError::Io(_)
        )
    }

    pub fn timeout(timeout: std::time::Duration) -> Self {
        TransportError::TransferTimeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
