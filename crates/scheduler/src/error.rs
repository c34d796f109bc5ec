//! Error types for the scheduler crate.

use thiserror::Error;

/// Lowest and highest accepted output rates.
pub const MIN_TICK_HZ: u32 = 1;
pub const MAX_TICK_HZ: u32 = 1000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Tick rate {0} Hz is outside 1..=1000")]
    InvalidRate(u32),

    #[error("Tick period must be non-zero")]
    ZeroPeriod,
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
