//! Health monitor state machine and sampling pass.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::MonitorConfig;
use super::notify::{NotificationSink, ProblemAlert};
use super::rules::{classify, ProblemKind};
use super::state::MonitorState;
use super::summary::{PassReport, ProblemSummary};
use crate::cell::CellKey;
use crate::host::{CellHost, CellStats};
use crate::registry::CellRegistry;
use crate::time::epoch_millis;

/// Shortest period the loop will run at.
const MIN_PASS_INTERVAL: Duration = Duration::from_millis(1);

struct MonitorInner {
    registry: Arc<CellRegistry>,
    host: Arc<dyn CellHost>,
    sink: Arc<dyn NotificationSink>,
    config: MonitorConfig,
    state: Mutex<MonitorState>,
    /// Serializes passes from the loop and from direct callers.
    pass_lock: Mutex<()>,
}

/// Periodically samples every loaded cell and flags the problematic ones.
///
/// The monitor is either stopped or running. While running, a background
/// loop performs one sampling pass per interval, the first one immediately.
/// Passes can also be driven directly with [`HealthMonitor::run_pass_at`]
/// by a host that keeps its own clock.
pub struct HealthMonitor {
    inner: Arc<MonitorInner>,
    running: Mutex<Option<CancellationToken>>,
}

impl HealthMonitor {
    pub fn new(
        registry: Arc<CellRegistry>,
        host: Arc<dyn CellHost>,
        sink: Arc<dyn NotificationSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                registry,
                host,
                sink,
                config,
                state: Mutex::new(MonitorState::default()),
                pass_lock: Mutex::new(()),
            }),
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Starts the sampling loop on `runtime`.
    ///
    /// Returns false, doing nothing, if the monitor is already running.
    pub fn start(&self, runtime: &Handle) -> bool {
        let mut running = self.running.lock();
        if running.is_some() {
            return false;
        }

        let shutdown = CancellationToken::new();
        runtime.spawn(run_loop(Arc::clone(&self.inner), shutdown.clone()));
        *running = Some(shutdown);

        info!(
            interval_ms = self.inner.config.interval.as_millis() as u64,
            "Cell health monitor started"
        );
        true
    }

    /// Stops the sampling loop.
    ///
    /// Returns false if the monitor was not running. A pass already in
    /// progress finishes.
    pub fn stop(&self) -> bool {
        match self.running.lock().take() {
            Some(shutdown) => {
                shutdown.cancel();
                info!("Cell health monitor stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Runs one sampling pass now.
    pub fn run_pass(&self) -> PassReport {
        self.inner.run_pass_at(epoch_millis())
    }

    /// Runs one sampling pass with `now_epoch_ms` as the current time for
    /// notification throttling.
    pub fn run_pass_at(&self, now_epoch_ms: u64) -> PassReport {
        self.inner.run_pass_at(now_epoch_ms)
    }

    /// Number of cells with an error counter.
    pub fn problem_count(&self) -> usize {
        self.inner.state.lock().problem_count()
    }

    pub fn error_count(&self, key: &CellKey) -> Option<u32> {
        self.inner.state.lock().error_count(key)
    }

    pub fn last_notified(&self, key: &CellKey) -> Option<u64> {
        self.inner.state.lock().last_notified(key)
    }

    pub fn summary(&self) -> ProblemSummary {
        ProblemSummary::from_entries(self.inner.state.lock().entries())
    }

    /// Clears all error counters and notification times. The registry's
    /// problem set is left alone.
    pub fn reset_statistics(&self) {
        self.inner.state.lock().reset();
        info!("Cell health monitor statistics reset");
    }

    /// Drops all monitor state for a cell the host unloaded.
    pub fn forget_cell(&self, key: &CellKey) {
        self.inner.state.lock().forget(key);
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(shutdown) = self.running.get_mut().take() {
            shutdown.cancel();
        }
    }
}

impl MonitorInner {
    fn run_pass_at(&self, now_ms: u64) -> PassReport {
        let _pass = self.pass_lock.lock();
        let mut report = PassReport::default();
        let mut alerts = Vec::new();

        let resident = self.host.loaded_cells();
        for key in resident.iter().cloned() {
            report.inspected += 1;

            let (problems, stats) = self.inspect(&key, &mut report);

            if problems.is_empty() {
                let recovered = self.state.lock().clear_errors(&key);
                if recovered {
                    self.registry.clear_problem(&key);
                    report.recovered += 1;
                    debug!(cell = %key, "Cell recovered");
                }
                continue;
            }

            report.problematic += 1;
            self.registry.mark_problem(&key);

            let mut state = self.state.lock();
            let error_count = state.record_error(&key);
            if state.should_notify(&key, now_ms, self.config.notify_cooldown) {
                state.mark_notified(&key, now_ms);
                alerts.push(ProblemAlert {
                    key,
                    problems,
                    stats,
                    error_count,
                    raised_at_epoch_ms: now_ms,
                });
            }
        }

        let resident: HashSet<CellKey> = resident.into_iter().collect();
        let pruned = self
            .state
            .lock()
            .prune_notified(&resident, now_ms, self.config.notify_cooldown);
        if pruned > 0 {
            debug!(pruned, "Dropped notification times of unloaded cells");
        }

        for alert in &alerts {
            self.sink.notify(alert);
        }
        report.notified = alerts.len();

        debug!(
            inspected = report.inspected,
            problematic = report.problematic,
            recovered = report.recovered,
            notified = report.notified,
            failures = report.failures,
            "Health pass complete"
        );
        report
    }

    /// Samples and classifies one cell. A host error or a panic while
    /// sampling counts as a failed inspection.
    fn inspect(
        &self,
        key: &CellKey,
        report: &mut PassReport,
    ) -> (Vec<ProblemKind>, Option<CellStats>) {
        let sampled = panic::catch_unwind(AssertUnwindSafe(|| {
            self.host
                .cell_stats(key)
                .map(|stats| (classify(&stats, &self.config), stats))
        }));

        match sampled {
            Ok(Ok((problems, stats))) => (problems, Some(stats)),
            Ok(Err(e)) => {
                warn!(cell = %key, error = %e, "Cell inspection failed");
                report.failures += 1;
                (vec![ProblemKind::InspectionFailed], None)
            }
            Err(_) => {
                warn!(cell = %key, "Cell inspection panicked");
                report.failures += 1;
                (vec![ProblemKind::InspectionFailed], None)
            }
        }
    }
}

/// Runs passes until shutdown is signalled.
async fn run_loop(inner: Arc<MonitorInner>, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(inner.config.interval.max(MIN_PASS_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("Health monitor loop shutting down");
                break;
            }

            _ = interval.tick() => {
                let pass_inner = Arc::clone(&inner);
                let pass = tokio::task::spawn_blocking(move || {
                    pass_inner.run_pass_at(epoch_millis())
                });
                if let Err(e) = pass.await {
                    warn!(error = %e, "Health pass aborted");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostError, InMemoryHost};

    struct Fixture {
        monitor: HealthMonitor,
        registry: Arc<CellRegistry>,
        host: Arc<InMemoryHost>,
        alerts: Arc<Mutex<Vec<ProblemAlert>>>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(CellRegistry::new());
        let host = Arc::new(InMemoryHost::new());
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink_alerts = Arc::clone(&alerts);
        let monitor = HealthMonitor::new(
            Arc::clone(&registry),
            Arc::clone(&host) as Arc<dyn CellHost>,
            Arc::new(move |a: &ProblemAlert| sink_alerts.lock().push(a.clone())),
            MonitorConfig::default(),
        );
        Fixture {
            monitor,
            registry,
            host,
            alerts,
        }
    }

    fn crowded() -> CellStats {
        CellStats::new(600, 0)
    }

    #[test]
    fn test_error_count_grows_then_clears() {
        let f = fixture();
        let key = CellKey::new("w", 0, 0);
        f.host.place(&key, crowded());

        f.monitor.run_pass_at(1_000);
        f.monitor.run_pass_at(2_000);
        assert_eq!(f.monitor.error_count(&key), Some(2));
        assert!(f.registry.is_problem(&key));

        f.host.update(&key, CellStats::default());
        let report = f.monitor.run_pass_at(3_000);
        assert_eq!(report.recovered, 1);
        assert_eq!(f.monitor.error_count(&key), None);
        assert!(!f.registry.is_problem(&key));
        assert_eq!(f.monitor.last_notified(&key), Some(1_000));
    }

    #[test]
    fn test_notifications_throttled_per_key() {
        let f = fixture();
        let a = CellKey::new("w", 0, 0);
        let b = CellKey::new("w", 1, 0);
        f.host.place(&a, crowded());

        assert_eq!(f.monitor.run_pass_at(1_000).notified, 1);
        f.host.place(&b, crowded());
        let report = f.monitor.run_pass_at(2_000);
        assert_eq!(report.notified, 1);

        let keys: Vec<_> = f.alerts.lock().iter().map(|a| a.key.clone()).collect();
        assert_eq!(keys, vec![a.clone(), b]);

        // a is still within its window, b is too.
        assert_eq!(f.monitor.run_pass_at(301_000).notified, 0);
        assert_eq!(f.monitor.run_pass_at(301_001).notified, 1);
        assert_eq!(f.alerts.lock().last().map(|x| x.key.clone()), Some(a));
    }

    #[test]
    fn test_alert_carries_current_count() {
        let f = fixture();
        let key = CellKey::new("w", 0, 0);
        f.host.place(&key, CellStats::new(0, 250));

        f.monitor.run_pass_at(1_000);
        let alerts = f.alerts.lock();
        assert_eq!(alerts[0].error_count, 1);
        assert_eq!(
            alerts[0].problems,
            vec![
                ProblemKind::HighTileEntityCount,
                ProblemKind::TooManyTickingBlocks
            ]
        );
        assert_eq!(alerts[0].stats, Some(CellStats::new(0, 250)));
    }

    #[test]
    fn test_inspection_failure_counts_as_problem() {
        let f = fixture();
        let broken = CellKey::new("w", 0, 0);
        let fine = CellKey::new("w", 1, 0);
        f.host.place(&broken, CellStats::default());
        f.host.place(&fine, CellStats::default());
        f.host.fail_inspections(&broken);

        let report = f.monitor.run_pass_at(1_000);
        assert_eq!(report.inspected, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(report.problematic, 1);
        assert_eq!(f.monitor.error_count(&broken), Some(1));
        assert_eq!(f.alerts.lock()[0].problems, vec![ProblemKind::InspectionFailed]);
    }

    /// Delegates to an in-memory host but panics sampling one cell.
    struct PanickingStatsHost {
        inner: Arc<InMemoryHost>,
        poisoned: CellKey,
    }

    impl CellHost for PanickingStatsHost {
        fn load_cell(&self, key: &CellKey) -> Result<(), HostError> {
            self.inner.load_cell(key)
        }

        fn unload_cell(&self, key: &CellKey, save: bool) -> Result<(), HostError> {
            self.inner.unload_cell(key, save)
        }

        fn is_loaded(&self, key: &CellKey) -> bool {
            self.inner.is_loaded(key)
        }

        fn loaded_cells(&self) -> Vec<CellKey> {
            self.inner.loaded_cells()
        }

        fn cell_stats(&self, key: &CellKey) -> Result<CellStats, HostError> {
            if *key == self.poisoned {
                panic!("stats unavailable for {key}");
            }
            self.inner.cell_stats(key)
        }

        fn worlds(&self) -> Vec<String> {
            self.inner.worlds()
        }
    }

    #[test]
    fn test_panicking_inspection_does_not_abort_pass() {
        let registry = Arc::new(CellRegistry::new());
        let inner = Arc::new(InMemoryHost::new());
        let poisoned = CellKey::new("w", 0, 0);
        let busy = CellKey::new("w", 1, 0);
        inner.place(&poisoned, CellStats::default());
        inner.place(&busy, crowded());

        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink_alerts = Arc::clone(&alerts);
        let monitor = HealthMonitor::new(
            Arc::clone(&registry),
            Arc::new(PanickingStatsHost {
                inner,
                poisoned: poisoned.clone(),
            }),
            Arc::new(move |a: &ProblemAlert| sink_alerts.lock().push(a.clone())),
            MonitorConfig::default(),
        );

        let report = monitor.run_pass_at(1_000);
        assert_eq!(report.inspected, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(report.problematic, 2);
        assert_eq!(monitor.error_count(&poisoned), Some(1));
        assert_eq!(monitor.error_count(&busy), Some(1));
        assert!(registry.is_problem(&poisoned));
        assert!(registry.is_problem(&busy));

        let alerts = alerts.lock();
        let failed = alerts.iter().find(|a| a.key == poisoned).unwrap();
        assert_eq!(failed.problems, vec![ProblemKind::InspectionFailed]);
        assert_eq!(failed.stats, None);

        // The monitor stays usable after the panic.
        drop(alerts);
        assert_eq!(monitor.run_pass_at(2_000).failures, 1);
        assert_eq!(monitor.error_count(&poisoned), Some(2));
    }

    #[test]
    fn test_unloaded_cells_lose_notification_time_after_cooldown() {
        let f = fixture();
        let gone = CellKey::new("w", 0, 0);
        let stays = CellKey::new("w", 1, 0);
        f.host.place(&gone, crowded());
        f.host.place(&stays, crowded());
        f.monitor.run_pass_at(1_000);

        f.host.unload_cell(&gone, false).unwrap();
        f.host.update(&stays, CellStats::default());

        // Still inside the cooldown: kept so a quick reload stays throttled.
        f.monitor.run_pass_at(2_000);
        assert_eq!(f.monitor.last_notified(&gone), Some(1_000));

        f.monitor.run_pass_at(301_001);
        assert_eq!(f.monitor.last_notified(&gone), None);
        assert_eq!(f.monitor.last_notified(&stays), Some(1_000));
    }

    #[test]
    fn test_forget_cell_drops_all_state() {
        let f = fixture();
        let key = CellKey::new("w", 0, 0);
        f.host.place(&key, crowded());
        f.monitor.run_pass_at(1_000);

        f.monitor.forget_cell(&key);
        assert_eq!(f.monitor.error_count(&key), None);
        assert_eq!(f.monitor.last_notified(&key), None);
        assert_eq!(f.monitor.problem_count(), 0);
    }

    #[test]
    fn test_recovery_keeps_foreign_marks() {
        let f = fixture();
        let key = CellKey::new("w", 0, 0);
        f.host.place(&key, CellStats::default());
        f.registry.mark_problem(&key);

        let report = f.monitor.run_pass_at(1_000);
        assert_eq!(report.recovered, 0);
        assert!(f.registry.is_problem(&key));
    }

    #[test]
    fn test_summary_and_reset() {
        let f = fixture();
        assert_eq!(f.monitor.summary(), ProblemSummary::NoProblems);

        let key = CellKey::new("w", 5, 5);
        f.host.place(&key, crowded());
        f.monitor.run_pass_at(1_000);
        assert_eq!(
            f.monitor.summary(),
            ProblemSummary::Problems(vec![(key.clone(), 1)])
        );
        assert_eq!(f.monitor.problem_count(), 1);

        f.monitor.reset_statistics();
        assert_eq!(f.monitor.problem_count(), 0);
        assert_eq!(f.monitor.last_notified(&key), None);
        assert!(f.registry.is_problem(&key));
    }

    #[tokio::test]
    async fn test_start_stop_are_idempotent() {
        let f = fixture();
        let runtime = Handle::current();

        assert!(!f.monitor.is_running());
        assert!(f.monitor.start(&runtime));
        assert!(!f.monitor.start(&runtime));
        assert!(f.monitor.is_running());

        assert!(f.monitor.stop());
        assert!(!f.monitor.stop());
        assert!(!f.monitor.is_running());
    }
}
