//! Problem classification rules.

use std::fmt;

use super::config::MonitorConfig;
use crate::host::CellStats;

/// Reason a cell was judged problematic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// Too many mobile entities
    HighEntityCount,
    /// Too many tile entities
    HighTileEntityCount,
    /// Too many ticking blocks
    TooManyTickingBlocks,
    /// The cell could not be inspected
    InspectionFailed,
}

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighEntityCount => "high_entity_count",
            Self::HighTileEntityCount => "high_tile_entity_count",
            Self::TooManyTickingBlocks => "too_many_ticking_blocks",
            Self::InspectionFailed => "inspection_failed",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticking blocks of a cell.
///
/// Hosts do not report ticking blocks separately, so the tile-entity count
/// stands in for them. The ticking check therefore always fires together
/// with or before the tile-entity check.
#[inline]
pub fn ticking_blocks(stats: &CellStats) -> u32 {
    stats.tile_entities
}

/// Returns every rule the cell violates, in a fixed order. Empty means
/// healthy.
pub fn classify(stats: &CellStats, config: &MonitorConfig) -> Vec<ProblemKind> {
    let mut problems = Vec::new();
    if stats.entities > config.entity_limit {
        problems.push(ProblemKind::HighEntityCount);
    }
    if stats.tile_entities > config.tile_entity_limit {
        problems.push(ProblemKind::HighTileEntityCount);
    }
    if ticking_blocks(stats) > config.ticking_limit {
        problems.push(ProblemKind::TooManyTickingBlocks);
    }
    problems
}
