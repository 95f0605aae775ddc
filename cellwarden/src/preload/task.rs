//! Preload task identity, requests, status and handles.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::config::RateConfig;
use super::error::PreloadError;
use crate::cell::{CellKey, Region};

/// Identifier of a preload task.
///
/// Minted by the scheduler from a counter starting at 1; never reused for
/// the lifetime of that scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Progress callback, invoked with `(loaded, total)` once per batch.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Completion callback, invoked exactly once when the task finishes.
pub type CompletionCallback = Box<dyn FnOnce(PreloadOutcome) + Send>;

/// A request to preload a region.
pub struct PreloadRequest {
    pub(crate) region: Region,
    pub(crate) rate: RateConfig,
    pub(crate) on_progress: Option<ProgressCallback>,
    pub(crate) on_complete: Option<CompletionCallback>,
}

impl PreloadRequest {
    /// Preloads `region` with the default rate policy.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            rate: RateConfig::default(),
            on_progress: None,
            on_complete: None,
        }
    }

    /// Preloads the square of the given radius around `center`.
    pub fn around(center: CellKey, radius: i32) -> Result<Self, PreloadError> {
        Ok(Self::new(Region::around(center, radius)?))
    }

    pub fn with_rate(mut self, rate: RateConfig) -> Self {
        self.rate = rate;
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(PreloadOutcome) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn rate(&self) -> &RateConfig {
        &self.rate
    }
}

impl fmt::Debug for PreloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadRequest")
            .field("region", &self.region)
            .field("rate", &self.rate)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Live status of a preload task.
///
/// Updated by the task's batches as cells load. A snapshot is available
/// through [`PreloadHandle::status`].
#[derive(Debug, Clone)]
pub struct PreloadStatus {
    pub task_id: TaskId,
    pub center: CellKey,
    pub radius: u32,
    /// Cells in the region.
    pub total: u64,
    /// Cells loaded and recorded.
    pub loaded: u64,
    /// Cells whose load failed.
    pub failed: u64,
    /// Dispatched cells skipped because the task was no longer active.
    pub skipped: u64,
    /// Whether the task has been finalized.
    pub is_complete: bool,
    /// Whether the task was cancelled before finishing.
    pub was_cancelled: bool,
}

impl PreloadStatus {
    pub(crate) fn new(task_id: TaskId, region: &Region) -> Self {
        Self {
            task_id,
            center: region.center().clone(),
            radius: region.radius(),
            total: region.cell_count(),
            loaded: 0,
            failed: 0,
            skipped: 0,
            is_complete: false,
            was_cancelled: false,
        }
    }

    /// Cells that reached a final state.
    pub fn processed(&self) -> u64 {
        self.loaded + self.failed + self.skipped
    }

    /// Cells never processed.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.processed())
    }

    /// Loaded fraction from 0.0 to 1.0.
    pub fn progress_fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.loaded as f64 / self.total as f64
    }
}

/// Final result of a preload task, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadOutcome {
    pub task_id: TaskId,
    pub total: u64,
    pub loaded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl PreloadOutcome {
    pub(crate) fn from_status(status: &PreloadStatus, elapsed: Duration) -> Self {
        Self {
            task_id: status.task_id,
            total: status.total,
            loaded: status.loaded,
            failed: status.failed,
            skipped: status.skipped,
            cancelled: status.was_cancelled,
            elapsed,
        }
    }

    /// Cells that were never loaded, failed or skipped.
    pub fn not_dispatched(&self) -> u64 {
        self.total
            .saturating_sub(self.loaded + self.failed + self.skipped)
    }
}

/// Handle to a started preload task.
///
/// Cancellation goes through the scheduler so the task leaves the active
/// index before its token fires.
pub struct PreloadHandle {
    id: TaskId,
    status: Arc<Mutex<PreloadStatus>>,
    done: oneshot::Receiver<PreloadOutcome>,
}

impl PreloadHandle {
    pub(crate) fn new(
        id: TaskId,
        status: Arc<Mutex<PreloadStatus>>,
        done: oneshot::Receiver<PreloadOutcome>,
    ) -> Self {
        Self { id, status, done }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current status (snapshot).
    pub fn status(&self) -> PreloadStatus {
        self.status.lock().clone()
    }

    pub fn is_complete(&self) -> bool {
        self.status.lock().is_complete
    }

    /// Waits for the task to finish.
    ///
    /// Returns [`PreloadError::Abandoned`] if the task's driver was dropped
    /// without finalizing, for example because the runtime shut down.
    pub async fn wait(self) -> Result<PreloadOutcome, PreloadError> {
        let id = self.id;
        self.done.await.map_err(|_| PreloadError::Abandoned(id))
    }
}

impl fmt::Debug for PreloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreloadHandle")
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(total_radius: i32) -> PreloadStatus {
        let region = Region::around(CellKey::new("w", 0, 0), total_radius).unwrap();
        PreloadStatus::new(TaskId::new(1), &region)
    }

    #[test]
    fn test_task_id_display_and_parse() {
        let id = TaskId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(" 42 ".parse::<TaskId>().unwrap(), id);
        assert!("abc".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_status_new() {
        let status = status(1);
        assert_eq!(status.total, 9);
        assert_eq!(status.radius, 1);
        assert_eq!(status.processed(), 0);
        assert_eq!(status.remaining(), 9);
        assert!(!status.is_complete);
        assert!(!status.was_cancelled);
    }

    #[test]
    fn test_status_progress() {
        let mut status = status(1);
        status.loaded = 3;
        status.failed = 1;
        status.skipped = 2;
        assert_eq!(status.processed(), 6);
        assert_eq!(status.remaining(), 3);
        assert!((status.progress_fraction() - 3.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_outcome_from_status() {
        let mut status = status(2);
        status.loaded = 10;
        status.was_cancelled = true;
        let outcome = PreloadOutcome::from_status(&status, Duration::from_millis(5));
        assert_eq!(outcome.total, 25);
        assert_eq!(outcome.not_dispatched(), 15);
        assert!(outcome.cancelled);
    }

    #[test]
    fn test_request_around_rejects_negative_radius() {
        let result = PreloadRequest::around(CellKey::new("w", 0, 0), -2);
        assert!(matches!(result, Err(PreloadError::InvalidRegion(_))));
    }

    #[tokio::test]
    async fn test_handle_reports_abandoned() {
        let (tx, rx) = oneshot::channel();
        let handle = PreloadHandle::new(TaskId::new(7), Arc::new(Mutex::new(status(0))), rx);
        drop(tx);
        assert!(matches!(
            handle.wait().await,
            Err(PreloadError::Abandoned(id)) if id == TaskId::new(7)
        ));
    }
}
