//! Host simulation primitives.
//!
//! The host owns the actual cell contents. This crate only ever asks it to
//! load, unload, or describe a cell, treating each call as an opaque
//! operation that may fail with a recoverable [`HostError`].
//!
//! [`InMemoryHost`] is a self-contained simulated host used by the tests and
//! the command-line front end.

mod memory;

pub use memory::InMemoryHost;

use crate::cell::CellKey;
use std::io;
use thiserror::Error;

/// Resident statistics of a loaded cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStats {
    /// Mobile entities in the cell
    pub entities: u32,
    /// Stationary (tile) entities in the cell
    pub tile_entities: u32,
}

impl CellStats {
    pub fn new(entities: u32, tile_entities: u32) -> Self {
        Self {
            entities,
            tile_entities,
        }
    }
}

/// Failures raised by host primitives.
#[derive(Debug, Error)]
pub enum HostError {
    /// The cell is not currently resident.
    #[error("Cell {0} is not loaded")]
    NotLoaded(CellKey),

    /// Reading or writing persisted cell content failed.
    #[error("Cell storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The host refused the operation.
    #[error("Host rejected operation on cell {key}: {reason}")]
    Rejected { key: CellKey, reason: String },
}

/// Primitive operations the host simulation exposes for its cells.
///
/// `load_cell` and `unload_cell` may block for as long as the host needs to
/// read or write persisted content; callers run them off the tick loop.
/// `cell_stats` and the enumeration methods only read resident state.
pub trait CellHost: Send + Sync {
    /// Loads (or generates) the cell and makes it resident.
    ///
    /// Loading an already-resident cell succeeds without doing any work.
    fn load_cell(&self, key: &CellKey) -> Result<(), HostError>;

    /// Evicts a resident cell, persisting its content first if `save` is set.
    fn unload_cell(&self, key: &CellKey, save: bool) -> Result<(), HostError>;

    /// Returns true if the cell is currently resident.
    fn is_loaded(&self, key: &CellKey) -> bool;

    /// All resident cells across all worlds.
    fn loaded_cells(&self) -> Vec<CellKey>;

    /// Resident statistics of a loaded cell.
    fn cell_stats(&self, key: &CellKey) -> Result<CellStats, HostError>;

    /// Names of the active worlds.
    fn worlds(&self) -> Vec<String>;
}
