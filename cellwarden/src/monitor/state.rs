//! Per-cell monitor bookkeeping.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use crate::cell::CellKey;
use crate::time::duration_to_millis;

/// Error counters and notification timestamps, private to the monitor.
#[derive(Debug, Default)]
pub(crate) struct MonitorState {
    /// Consecutive problematic passes per cell. Absent means healthy.
    error_counts: BTreeMap<CellKey, u32>,
    /// When each cell was last notified about.
    last_notified: HashMap<CellKey, u64>,
}

impl MonitorState {
    /// Increments the cell's error counter and returns the new count.
    pub fn record_error(&mut self, key: &CellKey) -> u32 {
        let count = self.error_counts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Drops the cell's error counter. Returns true if it had one.
    ///
    /// The notification timestamp is kept.
    pub fn clear_errors(&mut self, key: &CellKey) -> bool {
        self.error_counts.remove(key).is_some()
    }

    pub fn error_count(&self, key: &CellKey) -> Option<u32> {
        self.error_counts.get(key).copied()
    }

    /// Whether the cell may be notified about at `now_ms`.
    ///
    /// A cell never notified about may always be; otherwise strictly more
    /// than `cooldown` must have passed since its last notification.
    pub fn should_notify(&self, key: &CellKey, now_ms: u64, cooldown: Duration) -> bool {
        match self.last_notified.get(key) {
            None => true,
            Some(&last) => now_ms.saturating_sub(last) > duration_to_millis(cooldown),
        }
    }

    pub fn mark_notified(&mut self, key: &CellKey, now_ms: u64) {
        self.last_notified.insert(key.clone(), now_ms);
    }

    pub fn last_notified(&self, key: &CellKey) -> Option<u64> {
        self.last_notified.get(key).copied()
    }

    /// Number of cells with an error counter.
    pub fn problem_count(&self) -> usize {
        self.error_counts.len()
    }

    /// Cells with their error counts, ordered by key.
    pub fn entries(&self) -> Vec<(CellKey, u32)> {
        self.error_counts
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect()
    }

    /// Drops notification times of cells no longer resident whose cooldown
    /// has run out. Returns how many were dropped.
    pub fn prune_notified(
        &mut self,
        resident: &HashSet<CellKey>,
        now_ms: u64,
        cooldown: Duration,
    ) -> usize {
        let cooldown_ms = duration_to_millis(cooldown);
        let before = self.last_notified.len();
        self.last_notified.retain(|key, last| {
            resident.contains(key) || now_ms.saturating_sub(*last) <= cooldown_ms
        });
        before - self.last_notified.len()
    }

    pub fn forget(&mut self, key: &CellKey) {
        self.error_counts.remove(key);
        self.last_notified.remove(key);
    }

    pub fn reset(&mut self) {
        self.error_counts.clear();
        self.last_notified.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(300);

    fn key() -> CellKey {
        CellKey::new("w", 1, 1)
    }

    #[test]
    fn test_error_count_increments() {
        let mut state = MonitorState::default();
        assert_eq!(state.record_error(&key()), 1);
        assert_eq!(state.record_error(&key()), 2);
        assert_eq!(state.error_count(&key()), Some(2));
        assert_eq!(state.problem_count(), 1);
    }

    #[test]
    fn test_clear_keeps_notification_time() {
        let mut state = MonitorState::default();
        state.record_error(&key());
        state.mark_notified(&key(), 1_000);

        assert!(state.clear_errors(&key()));
        assert!(!state.clear_errors(&key()));
        assert_eq!(state.error_count(&key()), None);
        assert_eq!(state.last_notified(&key()), Some(1_000));
    }

    #[test]
    fn test_throttle_window() {
        let mut state = MonitorState::default();
        assert!(state.should_notify(&key(), 0, COOLDOWN));

        state.mark_notified(&key(), 10_000);
        assert!(!state.should_notify(&key(), 10_000, COOLDOWN));
        assert!(!state.should_notify(&key(), 310_000, COOLDOWN));
        assert!(state.should_notify(&key(), 310_001, COOLDOWN));
    }

    #[test]
    fn test_throttle_is_per_key() {
        let mut state = MonitorState::default();
        state.mark_notified(&key(), 10_000);
        assert!(state.should_notify(&CellKey::new("w", 2, 2), 10_001, COOLDOWN));
    }

    #[test]
    fn test_prune_keeps_resident_and_cooling_keys() {
        let mut state = MonitorState::default();
        let resident_key = CellKey::new("w", 0, 0);
        let cooling = CellKey::new("w", 1, 0);
        let expired = CellKey::new("w", 2, 0);
        state.mark_notified(&resident_key, 0);
        state.mark_notified(&cooling, 100_000);
        state.mark_notified(&expired, 0);

        let resident: HashSet<CellKey> = [resident_key.clone()].into_iter().collect();
        assert_eq!(state.prune_notified(&resident, 300_001, COOLDOWN), 1);
        assert_eq!(state.last_notified(&resident_key), Some(0));
        assert_eq!(state.last_notified(&cooling), Some(100_000));
        assert_eq!(state.last_notified(&expired), None);
        assert_eq!(state.prune_notified(&resident, 300_001, COOLDOWN), 0);
    }

    #[test]
    fn test_forget_drops_counter_and_time() {
        let mut state = MonitorState::default();
        state.record_error(&key());
        state.mark_notified(&key(), 5);
        state.forget(&key());

        assert_eq!(state.error_count(&key()), None);
        assert_eq!(state.last_notified(&key()), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = MonitorState::default();
        state.record_error(&key());
        state.mark_notified(&key(), 5);
        state.reset();

        assert_eq!(state.problem_count(), 0);
        assert_eq!(state.last_notified(&key()), None);
    }
}
