//! Tick-driven traversal of a [`MotionPath`].

use std::iter::{FusedIterator, Sum};
use std::ops::{Add, AddAssign};

use crate::path::{MotionPath, Point};

/// Integer pointer delta emitted for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Delta {
    pub dx: i64,
    pub dy: i64,
}

impl Delta {
    pub const ZERO: Delta = Delta { dx: 0, dy: 0 };

    pub const fn new(dx: i64, dy: i64) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

impl Add for Delta {
    type Output = Delta;

    fn add(self, rhs: Delta) -> Delta {
        Delta::new(
            self.dx.saturating_add(rhs.dx),
            self.dy.saturating_add(rhs.dy),
        )
    }
}

impl AddAssign for Delta {
    fn add_assign(&mut self, rhs: Delta) {
        *self = *self + rhs;
    }
}

impl Sum for Delta {
    fn sum<I: Iterator<Item = Delta>>(iter: I) -> Delta {
        iter.fold(Delta::ZERO, Add::add)
    }
}

/// Round a path coordinate to whole counts.
///
/// Path samples stay inside the convex hull of i32 control points, so the
/// clamp only matters for non-finite input.
#[allow(clippy::cast_possible_truncation)]
fn to_counts(value: f64) -> i64 {
    if value.is_finite() {
        value.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64
    } else {
        0
    }
}

/// Walks one [`MotionPath`] over `duration_ms`.
///
/// Each call to [`advance`](Self::advance) moves the clock forward by the
/// elapsed tick time, samples the path at `t = elapsed / duration`, and
/// returns the difference between the rounded sample and the last emitted
/// position. Once `t` reaches 1 the final delta snaps to the exact target and
/// the interpolator is exhausted for good.
#[derive(Debug, Clone)]
pub struct MotionInterpolator {
    path: MotionPath,
    duration_ms: u32,
    elapsed_ms: u64,
    emitted_x: i64,
    emitted_y: i64,
    target_x: i64,
    target_y: i64,
    finished: bool,
}

impl MotionInterpolator {
    pub fn new(path: MotionPath, duration_ms: u32) -> Self {
        let target = path.target();
        Self {
            path,
            duration_ms,
            elapsed_ms: 0,
            emitted_x: 0,
            emitted_y: 0,
            target_x: to_counts(target.x),
            target_y: to_counts(target.y),
            finished: false,
        }
    }

    pub fn path(&self) -> &MotionPath {
        &self.path
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current path parameter in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.finished {
            1.0
        } else if self.duration_ms == 0 {
            0.0
        } else {
            (self.elapsed_ms as f64 / f64::from(self.duration_ms)).min(1.0)
        }
    }

    /// Sum of all deltas emitted so far.
    pub fn emitted(&self) -> Delta {
        Delta::new(self.emitted_x, self.emitted_y)
    }

    /// What is still owed to reach the target.
    pub fn remaining(&self) -> Delta {
        Delta::new(
            self.target_x.saturating_sub(self.emitted_x),
            self.target_y.saturating_sub(self.emitted_y),
        )
    }

    /// Advance by one tick of `elapsed_ms` and return the delta to emit.
    ///
    /// Returns `None` once the path has been fully traversed. A zero
    /// `duration_ms` completes on the first call with the whole delta.
    pub fn advance(&mut self, elapsed_ms: u32) -> Option<Delta> {
        if self.finished {
            return None;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(u64::from(elapsed_ms));

        let (x, y) = if self.duration_ms == 0 || self.elapsed_ms >= u64::from(self.duration_ms) {
            self.finished = true;
            (self.target_x, self.target_y)
        } else {
            let t = self.elapsed_ms as f64 / f64::from(self.duration_ms);
            let Point { x, y } = self.path.evaluate(t);
            (to_counts(x), to_counts(y))
        };

        let delta = Delta::new(x.saturating_sub(self.emitted_x), y.saturating_sub(self.emitted_y));
        self.emitted_x = x;
        self.emitted_y = y;
        Some(delta)
    }

    /// Consume the interpolator as a lazy per-tick delta sequence.
    pub fn ticks(self, period_ms: u32) -> Ticks {
        Ticks {
            interpolator: self,
            period_ms: period_ms.max(1),
        }
    }
}

/// Iterator returned by [`MotionInterpolator::ticks`].
#[derive(Debug, Clone)]
pub struct Ticks {
    interpolator: MotionInterpolator,
    period_ms: u32,
}

impl Iterator for Ticks {
    type Item = Delta;

    fn next(&mut self) -> Option<Delta> {
        self.interpolator.advance(self.period_ms)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.interpolator.is_finished() {
            return (0, Some(0));
        }
        let left = u64::from(self.interpolator.duration_ms)
            .saturating_sub(self.interpolator.elapsed_ms)
            .div_ceil(u64::from(self.period_ms))
            .max(1);
        let left = usize::try_from(left).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl FusedIterator for Ticks {}
