//! Fixed-rate tick clock for the HID bridge loop
//!
//! The bridge emits exactly one report per tick. This crate supplies the
//! tick: a [`TickClock`] that sleeps to absolute deadlines on the tokio
//! timer and records wake-up jitter in [`JitterMetrics`].
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), hidbridge_scheduler::SchedulerError> {
//! use hidbridge_scheduler::TickClock;
//!
//! let mut clock = TickClock::new(100)?;
//! let tick = clock.tick().await;
//! assert_eq!(tick.index, 0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod error;
pub mod jitter;

pub use clock::{Tick, TickClock};
pub use error::{MAX_TICK_HZ, MIN_TICK_HZ, SchedulerError, SchedulerResult};
pub use jitter::JitterMetrics;
