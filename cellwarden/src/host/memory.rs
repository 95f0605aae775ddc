//! In-memory simulated host.

use super::{CellHost, CellStats, HostError};
use crate::cell::CellKey;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Simulated host keeping all cell contents in memory.
///
/// Cell content comes from three layers, checked in order on load:
/// persisted content written by a saving unload, generator content seeded
/// with [`InMemoryHost::seed`], and finally an empty cell.
///
/// Loads sleep for the configured latency to stand in for disk reads, and
/// individual cells can be made to fail loads or inspections.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    resident: DashMap<CellKey, CellStats>,
    persisted: DashMap<CellKey, CellStats>,
    generated: DashMap<CellKey, CellStats>,
    worlds: DashSet<String>,
    failing_loads: DashSet<CellKey>,
    failing_inspections: DashSet<CellKey>,
    slow_cells: DashMap<CellKey, Duration>,
    load_latency: Duration,
    loads: AtomicU64,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time every load blocks for.
    pub fn with_load_latency(mut self, latency: Duration) -> Self {
        self.load_latency = latency;
        self
    }

    /// Registers an active world with no resident cells.
    pub fn add_world(&self, world: impl Into<String>) {
        self.worlds.insert(world.into());
    }

    /// Sets the content the generator produces for `key`.
    pub fn seed(&self, key: &CellKey, stats: CellStats) {
        self.generated.insert(key.clone(), stats);
    }

    /// Makes `key` resident immediately with the given content, bypassing
    /// load latency and failure injection.
    pub fn place(&self, key: &CellKey, stats: CellStats) {
        self.worlds.insert(key.world().to_string());
        self.resident.insert(key.clone(), stats);
    }

    /// Replaces the content of a resident cell. Returns false if the cell is
    /// not resident.
    pub fn update(&self, key: &CellKey, stats: CellStats) -> bool {
        match self.resident.get_mut(key) {
            Some(mut entry) => {
                *entry = stats;
                true
            }
            None => false,
        }
    }

    /// Makes every load of `key` fail.
    pub fn fail_loads(&self, key: &CellKey) {
        self.failing_loads.insert(key.clone());
    }

    /// Makes every inspection of `key` fail.
    pub fn fail_inspections(&self, key: &CellKey) {
        self.failing_inspections.insert(key.clone());
    }

    /// Adds extra latency to loads of one cell.
    pub fn slow_down(&self, key: &CellKey, extra: Duration) {
        self.slow_cells.insert(key.clone(), extra);
    }

    /// Number of loads that actually did work.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Content persisted for `key` by a saving unload.
    pub fn persisted(&self, key: &CellKey) -> Option<CellStats> {
        self.persisted.get(key).map(|r| *r.value())
    }
}

impl CellHost for InMemoryHost {
    fn load_cell(&self, key: &CellKey) -> Result<(), HostError> {
        if self.failing_loads.contains(key) {
            return Err(HostError::Rejected {
                key: key.clone(),
                reason: "simulated load failure".to_string(),
            });
        }
        if self.resident.contains_key(key) {
            return Ok(());
        }

        let extra = self
            .slow_cells
            .get(key)
            .map(|r| *r.value())
            .unwrap_or_default();
        let latency = self.load_latency + extra;
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }

        let stats = self
            .persisted
            .get(key)
            .map(|r| *r.value())
            .or_else(|| self.generated.get(key).map(|r| *r.value()))
            .unwrap_or_default();

        self.worlds.insert(key.world().to_string());
        self.resident.insert(key.clone(), stats);
        self.loads.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(cell = %key, ?latency, "Simulated cell load");
        Ok(())
    }

    fn unload_cell(&self, key: &CellKey, save: bool) -> Result<(), HostError> {
        let (_, stats) = self
            .resident
            .remove(key)
            .ok_or_else(|| HostError::NotLoaded(key.clone()))?;

        if save {
            self.persisted.insert(key.clone(), stats);
        }

        tracing::trace!(cell = %key, save, "Simulated cell unload");
        Ok(())
    }

    fn is_loaded(&self, key: &CellKey) -> bool {
        self.resident.contains_key(key)
    }

    fn loaded_cells(&self) -> Vec<CellKey> {
        let mut keys: Vec<CellKey> = self.resident.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    fn cell_stats(&self, key: &CellKey) -> Result<CellStats, HostError> {
        if self.failing_inspections.contains(key) {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated inspection failure",
            )));
        }
        self.resident
            .get(key)
            .map(|r| *r.value())
            .ok_or_else(|| HostError::NotLoaded(key.clone()))
    }

    fn worlds(&self) -> Vec<String> {
        let mut worlds: Vec<String> = self.worlds.iter().map(|w| w.key().clone()).collect();
        worlds.sort();
        worlds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: i32, z: i32) -> CellKey {
        CellKey::new("w", x, z)
    }

    #[test]
    fn load_uses_generated_content() {
        let host = InMemoryHost::new();
        host.seed(&key(1, 1), CellStats::new(40, 2));

        host.load_cell(&key(1, 1)).unwrap();
        assert!(host.is_loaded(&key(1, 1)));
        assert_eq!(host.cell_stats(&key(1, 1)).unwrap(), CellStats::new(40, 2));
        assert_eq!(host.worlds(), vec!["w".to_string()]);
    }

    #[test]
    fn load_of_resident_cell_is_noop() {
        let host = InMemoryHost::new();
        host.load_cell(&key(0, 0)).unwrap();
        host.load_cell(&key(0, 0)).unwrap();
        assert_eq!(host.load_count(), 1);
    }

    #[test]
    fn saving_unload_persists_content() {
        let host = InMemoryHost::new();
        host.place(&key(0, 0), CellStats::new(7, 7));

        host.unload_cell(&key(0, 0), true).unwrap();
        assert!(!host.is_loaded(&key(0, 0)));
        assert_eq!(host.persisted(&key(0, 0)), Some(CellStats::new(7, 7)));

        host.load_cell(&key(0, 0)).unwrap();
        assert_eq!(host.cell_stats(&key(0, 0)).unwrap(), CellStats::new(7, 7));
    }

    #[test]
    fn discarding_unload_reverts_to_generated() {
        let host = InMemoryHost::new();
        host.seed(&key(0, 0), CellStats::new(1, 1));
        host.load_cell(&key(0, 0)).unwrap();
        host.update(&key(0, 0), CellStats::new(900, 0));

        host.unload_cell(&key(0, 0), false).unwrap();
        host.load_cell(&key(0, 0)).unwrap();
        assert_eq!(host.cell_stats(&key(0, 0)).unwrap(), CellStats::new(1, 1));
    }

    #[test]
    fn unload_of_absent_cell_fails() {
        let host = InMemoryHost::new();
        let result = host.unload_cell(&key(5, 5), true);
        assert!(matches!(result, Err(HostError::NotLoaded(_))));
    }

    #[test]
    fn injected_failures() {
        let host = InMemoryHost::new();
        host.fail_loads(&key(0, 0));
        assert!(matches!(
            host.load_cell(&key(0, 0)),
            Err(HostError::Rejected { .. })
        ));

        host.place(&key(1, 0), CellStats::default());
        host.fail_inspections(&key(1, 0));
        assert!(matches!(host.cell_stats(&key(1, 0)), Err(HostError::Io(_))));
    }

    #[test]
    fn loaded_cells_sorted() {
        let host = InMemoryHost::new();
        host.place(&CellKey::new("b", 0, 0), CellStats::default());
        host.place(&CellKey::new("a", 3, 0), CellStats::default());
        host.place(&CellKey::new("a", -1, 0), CellStats::default());

        assert_eq!(
            host.loaded_cells(),
            vec![
                CellKey::new("a", -1, 0),
                CellKey::new("a", 3, 0),
                CellKey::new("b", 0, 0),
            ]
        );
        assert_eq!(host.worlds(), vec!["a".to_string(), "b".to_string()]);
    }
}
