//! Batch preloading of cell regions.
//!
//! A preload task loads every cell of a square region at a bounded rate so
//! that the host is never flooded with work. Tasks can be cancelled at any
//! time and always report completion exactly once.
//!
//! # Architecture
//!
//! - [`PreloadScheduler`] - owns the active-task index and mints task ids
//! - [`PreloadRequest`] - region, rate policy and optional callbacks
//! - [`PreloadHandle`] - status snapshots and an awaitable outcome
//!
//! # Example
//!
//! ```ignore
//! let request = PreloadRequest::around(CellKey::new("overworld", 0, 0), 10)?
//!     .on_progress(|loaded, total| println!("{loaded}/{total}"));
//! let handle = scheduler.start_preload(request)?;
//!
//! // Later, from anywhere
//! scheduler.cancel(handle.id());
//! let outcome = handle.wait().await?;
//! ```

mod config;
mod error;
mod scheduler;
mod stats;
mod task;

pub use config::{
    RateConfig, DEFAULT_CELLS_PER_STEP, DEFAULT_SETTLE_STEPS, DEFAULT_STEP_INTERVAL,
};
pub use error::PreloadError;
pub use scheduler::PreloadScheduler;
pub use stats::{SchedulerStats, SchedulerStatsSnapshot};
pub use task::{
    CompletionCallback, PreloadHandle, PreloadOutcome, PreloadRequest, PreloadStatus,
    ProgressCallback, TaskId,
};
