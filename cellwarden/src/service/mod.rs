//! Operator-facing service layer.
//!
//! [`CellService`] is what a command layer calls into. It owns the wiring
//! between registry, scheduler, monitor and host, and turns host failures
//! during remediation into plain success flags.

mod config;
mod facade;
mod remediation;
mod report;

pub use config::{ServiceConfig, DEFAULT_PRELOAD_RADIUS};
pub use facade::CellService;
pub use remediation::{
    permitted_actions, ActionItem, AllGranted, Grants, Permission, RemediationAction,
};
pub use report::{CancelOutcome, CellInfo, StatusReport};
