//! Cell health monitoring.
//!
//! The monitor samples every loaded cell on a fixed period and classifies
//! it against a small rule set. Problematic cells are marked in the shared
//! registry, accumulate an error counter, and raise alerts throttled to one
//! per cell per cooldown window. A cell found healthy again has its counter
//! cleared.
//!
//! Sampling only reads the host's resident cell state, never persisted
//! content, so a pass does not wait on I/O.

mod config;
mod health;
mod notify;
mod rules;
mod state;
mod summary;

pub use config::{
    MonitorConfig, DEFAULT_ENTITY_LIMIT, DEFAULT_NOTIFY_COOLDOWN, DEFAULT_PASS_INTERVAL,
    DEFAULT_TICKING_LIMIT, DEFAULT_TILE_ENTITY_LIMIT,
};
pub use health::HealthMonitor;
pub use notify::{NotificationSink, ProblemAlert, TracingSink, MONITOR_PERMISSION};
pub use rules::{classify, ticking_blocks, ProblemKind};
pub use summary::{PassReport, ProblemSummary};
