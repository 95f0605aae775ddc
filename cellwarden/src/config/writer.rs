//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[preload]
; Radius used when a preload command does not give one.
; A radius of r covers (2r+1) x (2r+1) cells.
default_radius = {}
; Cells handed to the host per step (minimum 1)
cells_per_step = {}
; Milliseconds between steps
step_interval_ms = {}
; Steps to wait after the last batch before a task completes
settle_steps = {}

[registry]
; Loads slower than this many milliseconds mark the cell as a problem
slow_load_threshold_ms = {}

[monitor]
; Run the periodic health monitor
enabled = {}
; Seconds between sampling passes (minimum 1)
interval_secs = {}
; A cell is problematic when a count goes above its limit
entity_limit = {}
tile_entity_limit = {}
ticking_limit = {}
; Seconds before the same cell raises another alert
notify_cooldown_secs = {}

[logging]
; Log file path
file = {}
"#,
        config.preload.default_radius,
        config.preload.cells_per_step,
        config.preload.step_interval_ms,
        config.preload.settle_steps,
        config.registry.slow_load_threshold_ms,
        config.monitor.enabled,
        config.monitor.interval_secs,
        config.monitor.entity_limit,
        config.monitor.tile_entity_limit,
        config.monitor.ticking_limit,
        config.monitor.notify_cooldown_secs,
        path_to_string(&config.logging.file),
    )
}

/// Convert a path to string, replacing home directory with ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.preload.default_radius = 6;
        config.monitor.enabled = false;
        config.monitor.notify_cooldown_secs = 15;
        config.logging.file = temp_dir.path().join("out.log");

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_written_file_is_commented() {
        let content = super::to_config_string(&ConfigFile::default());
        assert!(content.contains("[preload]"));
        assert!(content.contains("[monitor]"));
        assert!(content.contains("; Seconds between sampling passes"));
        assert!(content.contains("entity_limit = 500"));
    }
}
