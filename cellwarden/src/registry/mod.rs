//! Shared cell-data registry.
//!
//! The registry is the only structure shared between the preload scheduler
//! and the health monitor. It holds two independent collections:
//!
//! - the load-time cache, `CellKey -> CellData`, replaced on every recorded
//!   load and dropped when a cell is unloaded, deleted or reset
//! - the problem set, the keys currently judged problematic
//!
//! A key may be in either collection without being in the other. All
//! operations are key-scoped on sharded maps, so no registry-wide lock is
//! ever held.

use crate::cell::CellKey;
use crate::time::{duration_to_millis, epoch_millis};
use dashmap::{DashMap, DashSet};
use std::collections::BTreeMap;
use std::time::Duration;

/// Loads taking longer than this are flagged as problems.
pub const DEFAULT_SLOW_LOAD_THRESHOLD: Duration = Duration::from_millis(100);

/// Cached data for a loaded cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellData {
    /// Time taken by the most recent load
    pub load_duration_ms: u64,
    /// When the most recent load was recorded
    pub loaded_at_epoch_ms: u64,
}

/// Concurrent registry of cell load times and problem marks.
#[derive(Debug)]
pub struct CellRegistry {
    cells: DashMap<CellKey, CellData>,
    problems: DashSet<CellKey>,
    slow_load_threshold: Duration,
}

impl CellRegistry {
    /// Creates an empty registry with the default slow-load threshold.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SLOW_LOAD_THRESHOLD)
    }

    /// Creates an empty registry that flags loads slower than `threshold`.
    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            cells: DashMap::new(),
            problems: DashSet::new(),
            slow_load_threshold: threshold,
        }
    }

    pub fn slow_load_threshold(&self) -> Duration {
        self.slow_load_threshold
    }

    /// Records a completed load, replacing any previous data for `key`.
    ///
    /// A load strictly slower than the threshold marks the cell as a problem.
    /// A fast load never clears an existing mark.
    pub fn record_load(&self, key: &CellKey, duration: Duration) {
        let load_duration_ms = duration_to_millis(duration);
        self.cells.insert(
            key.clone(),
            CellData {
                load_duration_ms,
                loaded_at_epoch_ms: epoch_millis(),
            },
        );

        if load_duration_ms > duration_to_millis(self.slow_load_threshold) {
            tracing::debug!(
                cell = %key,
                load_ms = load_duration_ms,
                "Slow cell load, marking as problem"
            );
            self.problems.insert(key.clone());
        }
    }

    pub fn get(&self, key: &CellKey) -> Option<CellData> {
        self.cells.get(key).map(|r| *r.value())
    }

    /// Drops all state for `key`: cached data and problem mark.
    pub fn remove(&self, key: &CellKey) {
        self.cells.remove(key);
        self.problems.remove(key);
    }

    pub fn mark_problem(&self, key: &CellKey) {
        self.problems.insert(key.clone());
    }

    /// Clears the problem mark. Returns true if the key was marked.
    pub fn clear_problem(&self, key: &CellKey) -> bool {
        self.problems.remove(key).is_some()
    }

    pub fn is_problem(&self, key: &CellKey) -> bool {
        self.problems.contains(key)
    }

    /// Cells whose last load strictly exceeded `threshold`, ordered by key.
    pub fn slow_entries(&self, threshold: Duration) -> BTreeMap<CellKey, u64> {
        let threshold_ms = duration_to_millis(threshold);
        self.cells
            .iter()
            .filter(|entry| entry.value().load_duration_ms > threshold_ms)
            .map(|entry| (entry.key().clone(), entry.value().load_duration_ms))
            .collect()
    }

    /// Number of cells with cached load data.
    pub fn loaded_count(&self) -> usize {
        self.cells.len()
    }

    pub fn problem_count(&self) -> usize {
        self.problems.len()
    }

    /// Problem keys in sorted order.
    pub fn problem_keys(&self) -> Vec<CellKey> {
        let mut keys: Vec<CellKey> = self.problems.iter().map(|k| k.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl Default for CellRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(x: i32, z: i32) -> CellKey {
        CellKey::new("w", x, z)
    }

    #[test]
    fn test_record_and_get() {
        let registry = CellRegistry::new();
        registry.record_load(&key(1, 2), Duration::from_millis(30));

        let data = registry.get(&key(1, 2)).unwrap();
        assert_eq!(data.load_duration_ms, 30);
        assert!(data.loaded_at_epoch_ms > 0);
        assert_eq!(registry.loaded_count(), 1);
    }

    #[test]
    fn test_record_replaces_previous() {
        let registry = CellRegistry::new();
        registry.record_load(&key(0, 0), Duration::from_millis(10));
        registry.record_load(&key(0, 0), Duration::from_millis(20));

        assert_eq!(registry.get(&key(0, 0)).unwrap().load_duration_ms, 20);
        assert_eq!(registry.loaded_count(), 1);
    }

    #[test]
    fn test_slow_load_marks_problem() {
        let registry = CellRegistry::new();
        registry.record_load(&key(0, 0), Duration::from_millis(150));

        assert!(registry.is_problem(&key(0, 0)));
        let slow = registry.slow_entries(Duration::from_millis(100));
        assert_eq!(slow.get(&key(0, 0)), Some(&150));
    }

    #[test]
    fn test_threshold_is_strict() {
        let registry = CellRegistry::new();
        registry.record_load(&key(0, 0), Duration::from_millis(100));

        assert!(!registry.is_problem(&key(0, 0)));
        assert!(registry.slow_entries(Duration::from_millis(100)).is_empty());
    }

    #[test]
    fn test_fast_load_keeps_existing_mark() {
        let registry = CellRegistry::new();
        registry.mark_problem(&key(3, 3));
        registry.record_load(&key(3, 3), Duration::from_millis(5));

        assert!(registry.is_problem(&key(3, 3)));
    }

    #[test]
    fn test_problem_independent_of_data() {
        let registry = CellRegistry::new();
        registry.mark_problem(&key(9, 9));

        assert!(registry.is_problem(&key(9, 9)));
        assert!(registry.get(&key(9, 9)).is_none());
    }

    #[test]
    fn test_remove_drops_data_and_mark() {
        let registry = CellRegistry::new();
        registry.record_load(&key(0, 0), Duration::from_millis(500));
        registry.remove(&key(0, 0));

        assert!(registry.get(&key(0, 0)).is_none());
        assert!(!registry.is_problem(&key(0, 0)));
    }

    #[test]
    fn test_clear_problem_reports_presence() {
        let registry = CellRegistry::new();
        registry.mark_problem(&key(0, 0));

        assert!(registry.clear_problem(&key(0, 0)));
        assert!(!registry.clear_problem(&key(0, 0)));
    }

    #[test]
    fn test_custom_threshold() {
        let registry = CellRegistry::with_threshold(Duration::from_millis(10));
        registry.record_load(&key(0, 0), Duration::from_millis(11));

        assert!(registry.is_problem(&key(0, 0)));
        assert_eq!(registry.slow_load_threshold(), Duration::from_millis(10));
    }

    #[test]
    fn test_problem_keys_sorted() {
        let registry = CellRegistry::new();
        registry.mark_problem(&key(2, 0));
        registry.mark_problem(&key(-1, 4));
        registry.mark_problem(&key(2, -3));

        assert_eq!(
            registry.problem_keys(),
            vec![key(-1, 4), key(2, -3), key(2, 0)]
        );
        assert_eq!(registry.problem_count(), 3);
    }

    #[test]
    fn test_concurrent_records() {
        let registry = Arc::new(CellRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        registry.record_load(&key(t, i), Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.loaded_count(), 800);
        assert_eq!(registry.problem_count(), 0);
    }
}
