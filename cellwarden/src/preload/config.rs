//! Rate policy for preload tasks.

use std::time::Duration;

use super::error::PreloadError;

/// Default number of cells dispatched per step.
pub const DEFAULT_CELLS_PER_STEP: usize = 4;

/// Default step length, one host tick.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(50);

/// Default number of extra steps to wait after the last batch before
/// finalizing a task.
pub const DEFAULT_SETTLE_STEPS: u32 = 5;

/// How fast a preload task injects loads into the host.
///
/// Cells are dispatched in batches of `cells_per_step`; batch `i` is
/// dispatched `i` steps after the task starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateConfig {
    /// Cells dispatched per step.
    /// Default: 4
    pub cells_per_step: usize,
    /// Length of one step.
    /// Default: 50ms
    pub step_interval: Duration,
    /// Steps to wait after the last batch before finalizing.
    /// Default: 5
    pub settle_steps: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            cells_per_step: DEFAULT_CELLS_PER_STEP,
            step_interval: DEFAULT_STEP_INTERVAL,
            settle_steps: DEFAULT_SETTLE_STEPS,
        }
    }
}

impl RateConfig {
    /// Checks the policy can schedule at least one cell per step.
    pub fn validate(&self) -> Result<(), PreloadError> {
        if self.cells_per_step == 0 {
            return Err(PreloadError::InvalidRate(
                "cells_per_step must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of batches needed for `total` cells.
    pub fn batch_count(&self, total: u64) -> u64 {
        total.div_ceil(self.cells_per_step.max(1) as u64)
    }

    /// Step at which a task of `total` cells is finalized.
    pub fn finalize_step(&self, total: u64) -> u64 {
        self.batch_count(total) + self.settle_steps as u64
    }

    /// Offset from task start of the given step.
    pub fn step_offset(&self, step: u64) -> Duration {
        let steps = u32::try_from(step).unwrap_or(u32::MAX);
        self.step_interval.saturating_mul(steps)
    }
}
