//! Monitor reports.

use std::fmt;

use crate::cell::CellKey;

/// Cells currently carrying error counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemSummary {
    NoProblems,
    /// Cells and their error counts, ordered by key. Never empty.
    Problems(Vec<(CellKey, u32)>),
}

impl ProblemSummary {
    pub(crate) fn from_entries(entries: Vec<(CellKey, u32)>) -> Self {
        if entries.is_empty() {
            Self::NoProblems
        } else {
            Self::Problems(entries)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoProblems)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::NoProblems => 0,
            Self::Problems(entries) => entries.len(),
        }
    }
}

impl fmt::Display for ProblemSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProblems => write!(f, "No problems detected"),
            Self::Problems(entries) => {
                write!(f, "Problem cells detected: {}", entries.len())?;
                for (key, count) in entries {
                    write!(f, "\n  - {}: {} errors", key, count)?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of one sampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Loaded cells examined.
    pub inspected: usize,
    /// Cells judged problematic, including failed inspections.
    pub problematic: usize,
    /// Cells whose error counter was cleared.
    pub recovered: usize,
    /// Alerts delivered to the sink.
    pub notified: usize,
    /// Cells whose inspection failed.
    pub failures: usize,
}
