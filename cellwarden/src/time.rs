//! Time-related utility functions.
//!
//! Registry timestamps and notification throttling work in milliseconds
//! since the Unix epoch so that a host can drive them off its own clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock is set before the epoch.
pub fn epoch_millis() -> u64 {
    system_time_to_epoch_millis(SystemTime::now())
}

/// Convert a `SystemTime` to milliseconds since the Unix epoch.
///
/// Times before the epoch clamp to 0; times too far in the future saturate.
pub fn system_time_to_epoch_millis(time: SystemTime) -> u64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => duration_to_millis(elapsed),
        Err(_) => 0,
    }
}

/// Whole milliseconds in a duration, saturating at `u64::MAX`.
#[inline]
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
