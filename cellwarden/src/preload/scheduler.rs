//! Rate-limited preload scheduler.
//!
//! Each accepted task gets a self-driving driver on the runtime. The driver
//! walks the region in row-major order, cutting it into batches of
//! `cells_per_step` cells, and dispatches batch `i` at `start + i × step`.
//! Every batch runs as its own spawned unit and pushes its loads onto the
//! blocking pool, so neither the driver nor the caller ever waits on a load.
//!
//! Once all batches have had their turn and the settle margin has passed,
//! the driver waits for the dispatched batches to finish, removes the task
//! from the active index and fires completion exactly once.
//!
//! # Cancellation
//!
//! `cancel` removes the task from the active index first and only then
//! fires its token. Every load re-checks the index right before it runs, so
//! no load passes its liveness check after `cancel` has returned. A load
//! that passed its check just before the cancel still runs, as do loads
//! already running.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::RateConfig;
use super::error::PreloadError;
use super::stats::{SchedulerStats, SchedulerStatsSnapshot};
use super::task::{
    CompletionCallback, PreloadHandle, PreloadOutcome, PreloadRequest, PreloadStatus,
    ProgressCallback, TaskId,
};
use crate::cell::{CellKey, Region};
use crate::host::CellHost;
use crate::registry::CellRegistry;

/// State shared by the scheduler and all of its task drivers.
struct SchedulerInner {
    registry: Arc<CellRegistry>,
    host: Arc<dyn CellHost>,
    runtime: Handle,
    /// Active tasks. An entry exists exactly while the task is running.
    tasks: DashMap<TaskId, CancellationToken>,
    next_id: AtomicU64,
    stats: SchedulerStats,
}

/// Schedules rate-limited preloads of cell regions.
///
/// Cheap to clone; clones share the same active index and id counter.
#[derive(Clone)]
pub struct PreloadScheduler {
    inner: Arc<SchedulerInner>,
}

impl PreloadScheduler {
    /// Creates a scheduler that loads through `host`, records into
    /// `registry`, and spawns its work on `runtime`.
    pub fn new(registry: Arc<CellRegistry>, host: Arc<dyn CellHost>, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                registry,
                host,
                runtime,
                tasks: DashMap::new(),
                next_id: AtomicU64::new(1),
                stats: SchedulerStats::default(),
            }),
        }
    }

    /// Starts a preload task and returns immediately.
    ///
    /// The task is in the active index before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`PreloadError::InvalidRate`] if the rate policy cannot
    /// schedule any cells. No task is created in that case.
    pub fn start_preload(&self, request: PreloadRequest) -> Result<PreloadHandle, PreloadError> {
        request.rate.validate()?;

        let PreloadRequest {
            region,
            rate,
            on_progress,
            on_complete,
        } = request;

        let id = TaskId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let status = Arc::new(Mutex::new(PreloadStatus::new(id, &region)));
        let cancellation = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();

        self.inner.tasks.insert(id, cancellation.clone());
        SchedulerStats::incr(&self.inner.stats.tasks_started);

        info!(
            task_id = %id,
            center = %region.center(),
            radius = region.radius(),
            total = region.cell_count(),
            cells_per_step = rate.cells_per_step,
            "Starting preload task"
        );

        let driver = TaskDriver {
            shared: Arc::new(TaskShared {
                id,
                inner: Arc::clone(&self.inner),
                status: Arc::clone(&status),
                on_progress,
                progress_lock: Mutex::new(()),
            }),
            region,
            rate,
            cancellation,
            on_complete,
            done_tx,
        };
        self.inner.runtime.spawn(driver.run());

        Ok(PreloadHandle::new(id, status, done_rx))
    }

    /// Cancels an active task.
    ///
    /// Returns true if the task was active. Unknown, finished and already
    /// cancelled ids return false.
    pub fn cancel(&self, id: TaskId) -> bool {
        match self.inner.tasks.remove(&id) {
            Some((_, cancellation)) => {
                cancellation.cancel();
                info!(task_id = %id, "Preload task cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancels every active task. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<TaskId> = self.inner.tasks.iter().map(|e| *e.key()).collect();
        let count = ids.into_iter().filter(|id| self.cancel(*id)).count();
        if count > 0 {
            info!(count, "All preload tasks cancelled");
        }
        count
    }

    /// Ids of the running tasks.
    pub fn active_task_ids(&self) -> BTreeSet<TaskId> {
        self.inner.tasks.iter().map(|e| *e.key()).collect()
    }

    pub fn is_active(&self, id: TaskId) -> bool {
        self.inner.tasks.contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.inner.tasks.len()
    }

    pub fn stats(&self) -> SchedulerStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

/// Per-task state shared between the driver and its batches.
struct TaskShared {
    id: TaskId,
    inner: Arc<SchedulerInner>,
    status: Arc<Mutex<PreloadStatus>>,
    on_progress: Option<ProgressCallback>,
    /// Serializes progress callbacks of this task.
    progress_lock: Mutex<()>,
}

impl TaskShared {
    #[inline]
    fn is_active(&self) -> bool {
        self.inner.tasks.contains_key(&self.id)
    }

    /// Loads one cell on the blocking pool.
    fn load_cell(&self, key: &CellKey) {
        if !self.is_active() {
            trace!(task_id = %self.id, cell = %key, "Task inactive, skipping load");
            self.status.lock().skipped += 1;
            SchedulerStats::incr(&self.inner.stats.cells_skipped);
            return;
        }

        let started = std::time::Instant::now();
        match self.inner.host.load_cell(key) {
            Ok(()) => {
                self.inner.registry.record_load(key, started.elapsed());
                self.status.lock().loaded += 1;
                SchedulerStats::incr(&self.inner.stats.cells_loaded);
            }
            Err(e) => {
                warn!(task_id = %self.id, cell = %key, error = %e, "Cell preload failed");
                self.record_failure();
            }
        }
    }

    fn record_failure(&self) {
        self.status.lock().failed += 1;
        SchedulerStats::incr(&self.inner.stats.cells_failed);
    }

    fn report_progress(&self) {
        let Some(callback) = &self.on_progress else {
            return;
        };
        let _serial = self.progress_lock.lock();
        let (loaded, total) = {
            let s = self.status.lock();
            (s.loaded, s.total)
        };
        callback(loaded, total);
    }
}

/// Runs one batch: all of its loads concurrently, then one progress report.
async fn run_batch(shared: Arc<TaskShared>, batch: Vec<CellKey>) {
    let runtime = shared.inner.runtime.clone();
    let mut loads = FuturesUnordered::new();

    for key in batch {
        let worker = Arc::clone(&shared);
        let cell = key.clone();
        let load = runtime.spawn_blocking(move || worker.load_cell(&cell));
        loads.push(async move { (key, load.await) });
    }

    while let Some((key, joined)) = loads.next().await {
        if let Err(e) = joined {
            warn!(task_id = %shared.id, cell = %key, error = %e, "Cell preload panicked");
            shared.record_failure();
        }
    }

    shared.report_progress();
}

/// Self-driving task that dispatches batches and finalizes the task.
struct TaskDriver {
    shared: Arc<TaskShared>,
    region: Region,
    rate: RateConfig,
    cancellation: CancellationToken,
    on_complete: Option<CompletionCallback>,
    done_tx: oneshot::Sender<PreloadOutcome>,
}

impl TaskDriver {
    async fn run(self) {
        // The completion callback is not `Sync`: nothing borrowed from the
        // driver may be held across an await.
        let TaskDriver {
            shared,
            region,
            rate,
            cancellation,
            on_complete,
            done_tx,
        } = self;

        let started = Instant::now();
        let id = shared.id;
        let total = region.cell_count();
        let runtime = shared.inner.runtime.clone();

        let mut cells = region.cells();
        let mut batches = FuturesUnordered::new();
        let mut step: u64 = 0;
        let mut interrupted = false;

        loop {
            let batch: Vec<CellKey> = cells.by_ref().take(rate.cells_per_step).collect();
            if batch.is_empty() {
                break;
            }

            if step > 0 && !wait_for_step(&cancellation, &rate, started, step).await {
                interrupted = true;
                break;
            }
            if !shared.is_active() {
                interrupted = true;
                break;
            }

            debug!(task_id = %id, step, cells = batch.len(), "Dispatching preload batch");
            batches.push(runtime.spawn(run_batch(Arc::clone(&shared), batch)));
            step += 1;
        }

        if !interrupted {
            // Cancellation during the settle margin only finalizes early.
            wait_for_step(&cancellation, &rate, started, rate.finalize_step(total)).await;
        }

        while let Some(joined) = batches.next().await {
            if let Err(e) = joined {
                warn!(task_id = %id, error = %e, "Preload batch aborted");
            }
        }

        finalize(&shared, on_complete, done_tx, started);
    }
}

/// Sleeps until `step`. Returns false if the task was cancelled first.
async fn wait_for_step(
    cancellation: &CancellationToken,
    rate: &RateConfig,
    started: Instant,
    step: u64,
) -> bool {
    let due = started
        .checked_add(rate.step_offset(step))
        .unwrap_or_else(Instant::now);

    tokio::select! {
        biased;

        _ = cancellation.cancelled() => false,
        _ = tokio::time::sleep_until(due) => true,
    }
}

fn finalize(
    shared: &TaskShared,
    on_complete: Option<CompletionCallback>,
    done_tx: oneshot::Sender<PreloadOutcome>,
    started: Instant,
) {
    let id = shared.id;

    // Whoever removes the entry decides the final state: a cancel that
    // got there first already reported success to its caller.
    let cancelled = shared.inner.tasks.remove(&id).is_none();

    let outcome = {
        let mut s = shared.status.lock();
        s.is_complete = true;
        s.was_cancelled = cancelled;
        PreloadOutcome::from_status(&s, started.elapsed())
    };

    let stats = &shared.inner.stats;
    if cancelled {
        SchedulerStats::incr(&stats.tasks_cancelled);
    } else {
        SchedulerStats::incr(&stats.tasks_completed);
    }

    info!(
        task_id = %id,
        loaded = outcome.loaded,
        failed = outcome.failed,
        skipped = outcome.skipped,
        total = outcome.total,
        cancelled,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "Preload task finished"
    );

    if let Some(callback) = on_complete {
        callback(outcome.clone());
    }
    // Receiver may have been dropped; the callback already ran.
    let _ = done_tx.send(outcome);
}
