//! Default values for all configuration settings.
//!
//! Most defaults come from the component that owns the setting so the
//! INI file and the library agree.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::monitor::{
    DEFAULT_ENTITY_LIMIT, DEFAULT_NOTIFY_COOLDOWN, DEFAULT_PASS_INTERVAL,
    DEFAULT_TICKING_LIMIT, DEFAULT_TILE_ENTITY_LIMIT,
};
use crate::preload::{DEFAULT_CELLS_PER_STEP, DEFAULT_SETTLE_STEPS, DEFAULT_STEP_INTERVAL};
use crate::registry::DEFAULT_SLOW_LOAD_THRESHOLD;
use crate::service::DEFAULT_PRELOAD_RADIUS;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "cellwarden.log";

/// Default log file path (~/.cellwarden/cellwarden.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            preload: PreloadSettings {
                default_radius: DEFAULT_PRELOAD_RADIUS,
                cells_per_step: DEFAULT_CELLS_PER_STEP,
                step_interval_ms: DEFAULT_STEP_INTERVAL.as_millis() as u64,
                settle_steps: DEFAULT_SETTLE_STEPS,
            },
            registry: RegistrySettings {
                slow_load_threshold_ms: DEFAULT_SLOW_LOAD_THRESHOLD.as_millis() as u64,
            },
            monitor: MonitorSettings {
                enabled: true,
                interval_secs: DEFAULT_PASS_INTERVAL.as_secs(),
                entity_limit: DEFAULT_ENTITY_LIMIT,
                tile_entity_limit: DEFAULT_TILE_ENTITY_LIMIT,
                ticking_limit: DEFAULT_TICKING_LIMIT,
                notify_cooldown_secs: DEFAULT_NOTIFY_COOLDOWN.as_secs(),
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
