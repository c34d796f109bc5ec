//! Pointer motion interpolation for the HID bridge
//!
//! Timed move commands (cubic Bezier and linear auto-move) are turned into a
//! finite sequence of integer pointer deltas, one per output tick.
//!
//! # Overview
//!
//! - [`MotionPath`] is the geometric path, always starting at the origin.
//!   Coordinates are offsets from the pointer position at the moment the
//!   command was accepted.
//! - [`MotionInterpolator`] walks a path over a duration. It holds no timer:
//!   the caller advances it by the tick period, and it reports the delta
//!   from the last emitted position to the new sample.
//!
//! The final delta always lands exactly on the target, so the sum of all
//! deltas equals the target regardless of rounding along the way.
//!
//! # Example
//!
//! ```
//! use hidbridge_motion::{Delta, MotionInterpolator, MotionPath, Point};
//!
//! let path = MotionPath::linear(Point::new(100.0, -40.0));
//! let total: Delta = MotionInterpolator::new(path, 500).ticks(100).sum();
//! assert_eq!(total, Delta::new(100, -40));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod interpolator;
pub mod path;

pub use interpolator::{Delta, MotionInterpolator, Ticks};
pub use path::{MotionPath, Point};
