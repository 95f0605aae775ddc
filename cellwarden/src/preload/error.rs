//! Error types for the preload module.

use thiserror::Error;

use super::task::TaskId;
use crate::cell::CellError;

/// Errors raised when starting or awaiting a preload task.
///
/// Failures of individual cell loads are not errors at this level; they are
/// logged and counted in the task's outcome.
#[derive(Debug, Error)]
pub enum PreloadError {
    /// Region could not be built from the request.
    #[error("Invalid preload region: {0}")]
    InvalidRegion(#[from] CellError),

    /// Rate policy cannot schedule any work.
    #[error("Invalid preload rate: {0}")]
    InvalidRate(String),

    /// The task's driver went away without reporting completion.
    #[error("Preload task {0} ended without reporting completion")]
    Abandoned(TaskId),
}
