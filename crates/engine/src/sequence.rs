//! `indexpts` tracking.
//!
//! Sequence numbers let the bridge notice loss, duplicates and reordering.
//! By default it only counts them; dropping stale frames is opt-in.

use tracing::{debug, warn};

/// Classification of one sequence number against the last accepted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceVerdict {
    /// No previous frame in this session.
    First,
    /// Exactly the next number.
    InOrder,
    /// Newer, with `missing` numbers skipped.
    Gap { missing: u32 },
    /// Same number as the last accepted frame.
    Duplicate,
    /// Older than the last accepted frame.
    Reordered,
}

impl SequenceVerdict {
    pub fn is_stale(self) -> bool {
        matches!(self, SequenceVerdict::Duplicate | SequenceVerdict::Reordered)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceStats {
    pub observed: u64,
    pub lost: u64,
    pub duplicates: u64,
    pub reordered: u64,
    pub dropped: u64,
}

/// Per-connection sequence tracker.
///
/// Comparison is done in wrapping `u32` space, so a counter rolling over
/// from `u32::MAX` to `0` is in order.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    last: Option<u32>,
    drop_stale: bool,
    stats: SequenceStats,
}

impl SequenceTracker {
    pub fn new(drop_stale: bool) -> Self {
        Self {
            last: None,
            drop_stale,
            stats: SequenceStats::default(),
        }
    }

    pub fn drop_stale(&self) -> bool {
        self.drop_stale
    }

    pub fn last(&self) -> Option<u32> {
        self.last
    }

    pub fn stats(&self) -> SequenceStats {
        self.stats
    }

    pub fn classify(&self, indexpts: u32) -> SequenceVerdict {
        let Some(last) = self.last else {
            return SequenceVerdict::First;
        };
        let step = indexpts.wrapping_sub(last);
        match step {
            0 => SequenceVerdict::Duplicate,
            1 => SequenceVerdict::InOrder,
            s if s <= u32::MAX / 2 => SequenceVerdict::Gap { missing: s - 1 },
            _ => SequenceVerdict::Reordered,
        }
    }

    /// Record `indexpts`; returns `false` if the frame should be dropped.
    pub fn observe(&mut self, indexpts: u32) -> bool {
        let verdict = self.classify(indexpts);
        self.stats.observed = self.stats.observed.saturating_add(1);

        match verdict {
            SequenceVerdict::Gap { missing } => {
                self.stats.lost = self.stats.lost.saturating_add(u64::from(missing));
                debug!(indexpts, missing, "sequence gap");
            }
            SequenceVerdict::Duplicate => {
                self.stats.duplicates = self.stats.duplicates.saturating_add(1);
                debug!(indexpts, "duplicate sequence number");
            }
            SequenceVerdict::Reordered => {
                self.stats.reordered = self.stats.reordered.saturating_add(1);
                debug!(indexpts, last = ?self.last, "out-of-order sequence number");
            }
            SequenceVerdict::First | SequenceVerdict::InOrder => {}
        }

        if verdict.is_stale() && self.drop_stale {
            self.stats.dropped = self.stats.dropped.saturating_add(1);
            warn!(indexpts, "dropping stale frame");
            return false;
        }
        if !verdict.is_stale() {
            self.last = Some(indexpts);
        }
        true
    }

    /// Forget the last number; the next frame starts a new run.
    pub fn restart(&mut self) {
        self.last = None;
    }
}
