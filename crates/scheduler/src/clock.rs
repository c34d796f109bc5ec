//! Absolute-deadline tick clock for the bridge loop.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::error::{MAX_TICK_HZ, MIN_TICK_HZ, SchedulerError, SchedulerResult};
use crate::jitter::JitterMetrics;

/// One completed wait on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Zero-based tick counter.
    pub index: u64,
    /// Time this tick was allotted; feed this to the motion interpolator.
    pub period: Duration,
    /// How far past its deadline the tick actually woke.
    pub late_by: Duration,
    pub missed_deadline: bool,
}

/// Fixed-rate clock with absolute deadlines.
///
/// Deadlines advance by exactly one period from the previous deadline, not
/// from the wake time, so sleep overshoot never accumulates into drift. If a
/// tick wakes a whole period or more late the schedule is re-anchored to
/// now instead of bursting through the backlog.
#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    next_deadline: Instant,
    tick_count: u64,
    metrics: JitterMetrics,
}

impl TickClock {
    /// Clock ticking at `tick_hz`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidRate`] outside `1..=1000` Hz.
    pub fn new(tick_hz: u32) -> SchedulerResult<Self> {
        if !(MIN_TICK_HZ..=MAX_TICK_HZ).contains(&tick_hz) {
            return Err(SchedulerError::InvalidRate(tick_hz));
        }
        Self::with_period(Duration::from_secs(1) / tick_hz)
    }

    /// Clock with an explicit period.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::ZeroPeriod`] for a zero duration.
    pub fn with_period(period: Duration) -> SchedulerResult<Self> {
        if period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }
        Ok(Self {
            period,
            next_deadline: Instant::now() + period,
            tick_count: 0,
            metrics: JitterMetrics::new(),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Period in whole milliseconds, at least 1.
    pub fn period_ms(&self) -> u32 {
        u32::try_from(self.period.as_millis()).unwrap_or(u32::MAX).max(1)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &JitterMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut JitterMetrics {
        &mut self.metrics
    }

    /// Sleep until the next deadline and account for it.
    pub async fn tick(&mut self) -> Tick {
        sleep_until(self.next_deadline).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(self.next_deadline);
        let missed_deadline = late_by >= self.period;
        let jitter_ns = u64::try_from(late_by.as_nanos()).unwrap_or(u64::MAX);
        self.metrics.record_tick(jitter_ns, missed_deadline);

        let tick = Tick {
            index: self.tick_count,
            period: self.period,
            late_by,
            missed_deadline,
        };
        self.tick_count = self.tick_count.saturating_add(1);

        if missed_deadline {
            debug!(
                tick = tick.index,
                late_ms = late_by.as_millis(),
                "tick missed its deadline, re-anchoring schedule"
            );
            self.next_deadline = now + self.period;
        } else {
            self.next_deadline += self.period;
        }
        tick
    }

    /// Restart the schedule one period from now, keeping the counters.
    pub fn reset_schedule(&mut self) {
        self.next_deadline = Instant::now() + self.period;
    }
}
