//! Service configuration.

use std::time::Duration;

use crate::monitor::MonitorConfig;
use crate::preload::RateConfig;
use crate::registry::DEFAULT_SLOW_LOAD_THRESHOLD;

/// Radius used when a preload request does not name one.
pub const DEFAULT_PRELOAD_RADIUS: i32 = 10;

/// Settings for wiring a [`CellService`](super::CellService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Preload radius when none is given.
    pub default_radius: i32,
    /// Rate policy for every preload the service starts.
    pub rate: RateConfig,
    /// Loads slower than this mark the cell as a problem.
    pub slow_load_threshold: Duration,
    /// Whether `start` launches the health monitor.
    pub monitor_enabled: bool,
    pub monitor: MonitorConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_radius: DEFAULT_PRELOAD_RADIUS,
            rate: RateConfig::default(),
            slow_load_threshold: DEFAULT_SLOW_LOAD_THRESHOLD,
            monitor_enabled: true,
            monitor: MonitorConfig::default(),
        }
    }
}
