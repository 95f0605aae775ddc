//! Cell service facade.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{info, warn};

use super::config::ServiceConfig;
use super::remediation::{permitted_actions, ActionItem, Grants, RemediationAction};
use super::report::{CancelOutcome, CellInfo, StatusReport};
use crate::cell::CellKey;
use crate::host::{CellHost, HostError};
use crate::monitor::{HealthMonitor, NotificationSink, ProblemSummary};
use crate::preload::{PreloadError, PreloadHandle, PreloadRequest, PreloadScheduler, TaskId};
use crate::registry::CellRegistry;

/// Entry point for every operator-facing operation.
///
/// Wires one registry, one preload scheduler and one health monitor around
/// a host. All collaborators are injected; nothing is global.
///
/// # Example
///
/// ```ignore
/// let service = CellService::new(
///     ServiceConfig::default(),
///     host,
///     Arc::new(TracingSink),
///     Handle::current(),
/// );
/// service.start();
///
/// let handle = service.start_preload(CellKey::new("overworld", 0, 0), None)?;
/// println!("{}", service.status());
/// ```
pub struct CellService {
    config: ServiceConfig,
    host: Arc<dyn CellHost>,
    registry: Arc<CellRegistry>,
    scheduler: PreloadScheduler,
    monitor: HealthMonitor,
    runtime: Handle,
}

impl CellService {
    pub fn new(
        config: ServiceConfig,
        host: Arc<dyn CellHost>,
        sink: Arc<dyn NotificationSink>,
        runtime: Handle,
    ) -> Self {
        let registry = Arc::new(CellRegistry::with_threshold(config.slow_load_threshold));
        let scheduler =
            PreloadScheduler::new(Arc::clone(&registry), Arc::clone(&host), runtime.clone());
        let monitor = HealthMonitor::new(
            Arc::clone(&registry),
            Arc::clone(&host),
            sink,
            config.monitor.clone(),
        );

        Self {
            config,
            host,
            registry,
            scheduler,
            monitor,
            runtime,
        }
    }

    /// Starts background work: the health monitor, if enabled.
    pub fn start(&self) {
        if self.config.monitor_enabled {
            self.monitor.start(&self.runtime);
        } else {
            info!("Cell health monitor disabled by configuration");
        }
    }

    /// Stops the monitor and cancels every running preload.
    pub fn shutdown(&self) {
        self.monitor.stop();
        let cancelled = self.scheduler.cancel_all();
        info!(cancelled, "Cell service shut down");
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CellRegistry> {
        &self.registry
    }

    pub fn scheduler(&self) -> &PreloadScheduler {
        &self.scheduler
    }

    pub fn monitor(&self) -> &HealthMonitor {
        &self.monitor
    }

    /// Builds a preload request using the service's rate policy, for
    /// callers that want to attach callbacks.
    ///
    /// `radius` defaults to the configured preload radius.
    pub fn preload_request(
        &self,
        center: CellKey,
        radius: Option<i32>,
    ) -> Result<PreloadRequest, PreloadError> {
        let radius = radius.unwrap_or(self.config.default_radius);
        Ok(PreloadRequest::around(center, radius)?.with_rate(self.config.rate.clone()))
    }

    /// Preloads the square around `center` without callbacks.
    pub fn start_preload(
        &self,
        center: CellKey,
        radius: Option<i32>,
    ) -> Result<PreloadHandle, PreloadError> {
        let request = self.preload_request(center, radius)?;
        self.scheduler.start_preload(request)
    }

    pub fn submit_preload(&self, request: PreloadRequest) -> Result<PreloadHandle, PreloadError> {
        self.scheduler.start_preload(request)
    }

    /// Cancels one task, or every task when `task` is `None`.
    pub fn cancel_preload(&self, task: Option<TaskId>) -> CancelOutcome {
        match task {
            Some(id) => CancelOutcome::Task(self.scheduler.cancel(id)),
            None => CancelOutcome::All(self.scheduler.cancel_all()),
        }
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            loaded_cells: self.host.loaded_cells().len(),
            problem_cells: self.monitor.problem_count(),
            active_worlds: self.host.worlds().len(),
            active_tasks: self.scheduler.active_count(),
        }
    }

    /// Unloads the cell without saving and drops its registry state.
    pub fn delete_cell(&self, key: &CellKey) -> bool {
        self.remediate(key, RemediationAction::Delete, || {
            self.host.unload_cell(key, false)?;
            self.registry.remove(key);
            Ok(())
        })
    }

    /// Unloads the cell discarding resident changes, loads it again and
    /// drops its registry state.
    pub fn reset_cell(&self, key: &CellKey) -> bool {
        self.remediate(key, RemediationAction::Reset, || {
            self.host.unload_cell(key, false)?;
            self.host.load_cell(key)?;
            self.registry.remove(key);
            Ok(())
        })
    }

    /// Saves and unloads the cell and drops its registry state.
    pub fn unload_cell(&self, key: &CellKey) -> bool {
        self.remediate(key, RemediationAction::Unload, || {
            self.host.unload_cell(key, true)?;
            self.registry.remove(key);
            Ok(())
        })
    }

    /// Saves and unloads the cell, loads it again and records the measured
    /// load time.
    pub fn reload_cell(&self, key: &CellKey) -> bool {
        self.remediate(key, RemediationAction::Reload, || {
            self.host.unload_cell(key, true)?;
            let started = Instant::now();
            self.host.load_cell(key)?;
            self.registry.record_load(key, started.elapsed());
            Ok(())
        })
    }

    fn remediate<F>(&self, key: &CellKey, action: RemediationAction, op: F) -> bool
    where
        F: FnOnce() -> Result<(), HostError>,
    {
        match op() {
            Ok(()) => {
                info!(cell = %key, action = %action, "Cell remediated");
                true
            }
            Err(e) => {
                warn!(cell = %key, action = %action, error = %e, "Cell remediation failed");
                false
            }
        }
    }

    /// Details of a resident cell.
    pub fn cell_info(&self, key: &CellKey) -> Result<CellInfo, HostError> {
        let stats = self.host.cell_stats(key)?;
        Ok(CellInfo {
            key: key.clone(),
            entities: stats.entities,
            tile_entities: stats.tile_entities,
            is_problem: self.registry.is_problem(key),
            load_time_ms: self.registry.get(key).map(|d| d.load_duration_ms),
        })
    }

    pub fn problems(&self) -> ProblemSummary {
        self.monitor.summary()
    }

    /// Remediation actions on `key` that `grants` allows, in offer order.
    pub fn permitted_actions<G: Grants + ?Sized>(
        &self,
        key: &CellKey,
        grants: &G,
    ) -> Vec<ActionItem> {
        permitted_actions(key, grants)
    }

    /// Records a load the host performed on its own.
    pub fn on_cell_loaded(&self, key: &CellKey, duration: Duration) {
        self.registry.record_load(key, duration);
    }

    /// Drops registry and monitor state for a cell the host evicted on its
    /// own.
    pub fn on_cell_unloaded(&self, key: &CellKey) {
        self.registry.remove(key);
        self.monitor.forget_cell(key);
    }
}
