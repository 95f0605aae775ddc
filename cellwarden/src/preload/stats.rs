//! Scheduler statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters of a preload scheduler.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Tasks accepted.
    pub tasks_started: AtomicU64,
    /// Tasks that ran to their finalization step.
    pub tasks_completed: AtomicU64,
    /// Tasks cancelled before finishing.
    pub tasks_cancelled: AtomicU64,
    /// Cells loaded and recorded.
    pub cells_loaded: AtomicU64,
    /// Cells whose load failed or panicked.
    pub cells_failed: AtomicU64,
    /// Cells skipped at the liveness check.
    pub cells_skipped: AtomicU64,
}

impl SchedulerStats {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> SchedulerStatsSnapshot {
        SchedulerStatsSnapshot {
            tasks_started: self.tasks_started.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_cancelled: self.tasks_cancelled.load(Ordering::Relaxed),
            cells_loaded: self.cells_loaded.load(Ordering::Relaxed),
            cells_failed: self.cells_failed.load(Ordering::Relaxed),
            cells_skipped: self.cells_skipped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of scheduler statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStatsSnapshot {
    pub tasks_started: u64,
    pub tasks_completed: u64,
    pub tasks_cancelled: u64,
    pub cells_loaded: u64,
    pub cells_failed: u64,
    pub cells_skipped: u64,
}

impl SchedulerStatsSnapshot {
    /// Tasks started but not yet finalized.
    pub fn tasks_in_flight(&self) -> u64 {
        self.tasks_started
            .saturating_sub(self.tasks_completed + self.tasks_cancelled)
    }
}
