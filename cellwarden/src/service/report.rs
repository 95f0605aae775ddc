//! Operator-facing reports.

use std::fmt;

use crate::cell::CellKey;

/// Result of a cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// A single task was named; whether it was active.
    Task(bool),
    /// No task was named; how many active tasks were cancelled.
    All(usize),
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(true) => write!(f, "Preload task cancelled"),
            Self::Task(false) => write!(f, "Preload task not found"),
            Self::All(0) => write!(f, "No preloads running"),
            Self::All(count) => write!(f, "All preloads cancelled ({} tasks)", count),
        }
    }
}

/// Overall state of the cell subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    /// Resident cells across all worlds.
    pub loaded_cells: usize,
    /// Cells the monitor is tracking as problematic.
    pub problem_cells: usize,
    pub active_worlds: usize,
    /// Running preload tasks.
    pub active_tasks: usize,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem cells: {}", self.problem_cells)?;
        writeln!(f, "Loaded cells:  {}", self.loaded_cells)?;
        writeln!(f, "Active worlds: {}", self.active_worlds)?;
        write!(f, "Preload tasks: {}", self.active_tasks)
    }
}

/// Details of one resident cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    pub key: CellKey,
    pub entities: u32,
    pub tile_entities: u32,
    /// Whether the cell is in the registry's problem set.
    pub is_problem: bool,
    /// Duration of the last recorded load, if any.
    pub load_time_ms: Option<u64>,
}

impl fmt::Display for CellInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coordinates:   {}, {}", self.key.x(), self.key.z())?;
        writeln!(f, "World:         {}", self.key.world())?;
        writeln!(f, "Entities:      {}", self.entities)?;
        writeln!(f, "Tile entities: {}", self.tile_entities)?;
        write!(
            f,
            "Problematic:   {}",
            if self.is_problem { "YES" } else { "NO" }
        )?;
        if let Some(ms) = self.load_time_ms {
            write!(f, "\nLoad time:     {}ms", ms)?;
        }
        Ok(())
    }
}
