//! Outbound problem notifications.
//!
//! The monitor only decides when and for which cell an alert is due.
//! Rendering and delivery belong to a [`NotificationSink`], typically one
//! that forwards alerts to operators holding [`MONITOR_PERMISSION`].

use std::fmt;

use tracing::warn;

use super::rules::ProblemKind;
use crate::cell::CellKey;
use crate::host::CellStats;

/// Permission an operator needs to receive problem alerts.
pub const MONITOR_PERMISSION: &str = "cellwarden.monitor";

/// A problem alert for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemAlert {
    pub key: CellKey,
    /// Rules the cell violated in the pass that raised the alert.
    pub problems: Vec<ProblemKind>,
    /// Resident statistics, if the cell could be inspected.
    pub stats: Option<CellStats>,
    /// Error count including the pass that raised the alert.
    pub error_count: u32,
    pub raised_at_epoch_ms: u64,
}

impl ProblemAlert {
    /// Operator command listing the remediation actions for this cell.
    pub fn actions_command(&self) -> String {
        format!(
            "actions {} {} {}",
            self.key.world(),
            self.key.x(),
            self.key.z()
        )
    }
}

impl fmt::Display for ProblemAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Problem detected in cell {}, {} ({})",
            self.key.x(),
            self.key.z(),
            self.key.world()
        )?;
        if let Some(stats) = &self.stats {
            write!(
                f,
                " [entities: {}, tile entities: {}]",
                stats.entities, stats.tile_entities
            )?;
        }
        write!(f, " [errors reported: {}]", self.error_count)
    }
}

/// Receives alerts raised by the health monitor.
///
/// Called from the monitor's pass, outside any monitor lock. Implementations
/// should hand slow delivery off rather than block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, alert: &ProblemAlert);
}

impl<F> NotificationSink for F
where
    F: Fn(&ProblemAlert) + Send + Sync,
{
    fn notify(&self, alert: &ProblemAlert) {
        self(alert)
    }
}

/// Sink that writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, alert: &ProblemAlert) {
        let problems: Vec<&str> = alert.problems.iter().map(|p| p.as_str()).collect();
        warn!(
            cell = %alert.key,
            error_count = alert.error_count,
            problems = ?problems,
            actions = %alert.actions_command(),
            "{}",
            alert
        );
    }
}
