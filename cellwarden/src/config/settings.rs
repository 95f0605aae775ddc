//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub preload: PreloadSettings,
    pub registry: RegistrySettings,
    pub monitor: MonitorSettings,
    pub logging: LoggingSettings,
}

/// Preload pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadSettings {
    /// Radius used when a preload command names none.
    pub default_radius: i32,
    /// Cells dispatched per step.
    pub cells_per_step: usize,
    /// Spacing between steps, in milliseconds.
    pub step_interval_ms: u64,
    /// Extra steps to wait after the last batch before completing.
    pub settle_steps: u32,
}

/// Load-time bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Loads slower than this mark the cell as a problem.
    pub slow_load_threshold_ms: u64,
}

/// Health monitor sampling and thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub enabled: bool,
    pub interval_secs: u64,
    pub entity_limit: u32,
    pub tile_entity_limit: u32,
    pub ticking_limit: u32,
    /// Minimum time between two alerts for the same cell.
    pub notify_cooldown_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
