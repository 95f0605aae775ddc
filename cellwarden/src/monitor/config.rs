//! Health monitor configuration.

use std::time::Duration;

/// Default interval between sampling passes (10 seconds).
pub const DEFAULT_PASS_INTERVAL: Duration = Duration::from_secs(10);

/// Cells with more entities than this are problematic.
pub const DEFAULT_ENTITY_LIMIT: u32 = 500;

/// Cells with more tile entities than this are problematic.
pub const DEFAULT_TILE_ENTITY_LIMIT: u32 = 200;

/// Cells with more ticking blocks than this are problematic.
pub const DEFAULT_TICKING_LIMIT: u32 = 150;

/// Minimum time between two notifications for the same cell (5 minutes).
pub const DEFAULT_NOTIFY_COOLDOWN: Duration = Duration::from_secs(300);

/// Health monitor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Time between sampling passes.
    pub interval: Duration,
    /// Entity count above which a cell is problematic.
    pub entity_limit: u32,
    /// Tile-entity count above which a cell is problematic.
    pub tile_entity_limit: u32,
    /// Ticking-block count above which a cell is problematic.
    pub ticking_limit: u32,
    /// Per-cell notification window.
    pub notify_cooldown: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PASS_INTERVAL,
            entity_limit: DEFAULT_ENTITY_LIMIT,
            tile_entity_limit: DEFAULT_TILE_ENTITY_LIMIT,
            ticking_limit: DEFAULT_TICKING_LIMIT,
            notify_cooldown: DEFAULT_NOTIFY_COOLDOWN,
        }
    }
}
