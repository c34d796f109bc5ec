//! Tick timing statistics.

/// How late each tick woke up relative to its deadline.
///
/// Keeps running totals plus a bounded ring of recent samples so that
/// percentiles can be computed without unbounded growth.
#[derive(Debug, Clone)]
pub struct JitterMetrics {
    pub total_ticks: u64,
    /// Ticks that woke a full period or more after their deadline.
    pub missed_ticks: u64,
    pub max_jitter_ns: u64,
    pub last_jitter_ns: u64,
    samples: Vec<u64>,
    capacity: usize,
    next_slot: usize,
    scratch: Vec<u64>,
}

impl Default for JitterMetrics {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl JitterMetrics {
    pub const DEFAULT_CAPACITY: usize = 4096;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            total_ticks: 0,
            missed_ticks: 0,
            max_jitter_ns: 0,
            last_jitter_ns: 0,
            samples: Vec::with_capacity(capacity),
            capacity,
            next_slot: 0,
            scratch: Vec::with_capacity(capacity),
        }
    }

    pub fn record_tick(&mut self, jitter_ns: u64, missed_deadline: bool) {
        self.total_ticks = self.total_ticks.saturating_add(1);
        if missed_deadline {
            self.missed_ticks = self.missed_ticks.saturating_add(1);
        }
        self.max_jitter_ns = self.max_jitter_ns.max(jitter_ns);
        self.last_jitter_ns = jitter_ns;

        if self.capacity == 0 {
            return;
        }
        if self.samples.len() < self.capacity {
            self.samples.push(jitter_ns);
        } else if let Some(slot) = self.samples.get_mut(self.next_slot) {
            *slot = jitter_ns;
            self.next_slot = (self.next_slot + 1) % self.capacity;
        }
    }

    /// Percentile over the retained samples, `percentile` in `[0, 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentile_jitter_ns(&mut self, percentile: f64) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let percentile = percentile.clamp(0.0, 1.0);

        self.scratch.clear();
        self.scratch.extend_from_slice(&self.samples);

        let len = self.scratch.len();
        let index = ((len as f64 * percentile) as usize).min(len - 1);
        let (_, value, _) = self.scratch.select_nth_unstable(index);
        *value
    }

    pub fn p99_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.99)
    }

    pub fn p50_jitter_ns(&mut self) -> u64 {
        self.percentile_jitter_ns(0.50)
    }

    pub fn missed_tick_rate(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.missed_ticks as f64 / self.total_ticks as f64
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn reset(&mut self) {
        self.total_ticks = 0;
        self.missed_ticks = 0;
        self.max_jitter_ns = 0;
        self.last_jitter_ns = 0;
        self.samples.clear();
        self.next_slot = 0;
        self.scratch.clear();
    }
}
