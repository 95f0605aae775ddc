//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [preload] section
    if let Some(section) = ini.section(Some("preload")) {
        if let Some(v) = number::<i32>(section, "preload", "default_radius")? {
            if v < 0 {
                return Err(invalid("preload", "default_radius", v, "must not be negative"));
            }
            config.preload.default_radius = v;
        }
        if let Some(v) = number::<usize>(section, "preload", "cells_per_step")? {
            if v == 0 {
                return Err(invalid("preload", "cells_per_step", v, "must be at least 1"));
            }
            config.preload.cells_per_step = v;
        }
        if let Some(v) = number(section, "preload", "step_interval_ms")? {
            config.preload.step_interval_ms = v;
        }
        if let Some(v) = number(section, "preload", "settle_steps")? {
            config.preload.settle_steps = v;
        }
    }

    // [registry] section
    if let Some(section) = ini.section(Some("registry")) {
        if let Some(v) = number(section, "registry", "slow_load_threshold_ms")? {
            config.registry.slow_load_threshold_ms = v;
        }
    }

    // [monitor] section
    if let Some(section) = ini.section(Some("monitor")) {
        if let Some(v) = section.get("enabled") {
            config.monitor.enabled = parse_bool(v);
        }
        if let Some(v) = number::<u64>(section, "monitor", "interval_secs")? {
            if v == 0 {
                return Err(invalid("monitor", "interval_secs", v, "must be at least 1"));
            }
            config.monitor.interval_secs = v;
        }
        if let Some(v) = number(section, "monitor", "entity_limit")? {
            config.monitor.entity_limit = v;
        }
        if let Some(v) = number(section, "monitor", "tile_entity_limit")? {
            config.monitor.tile_entity_limit = v;
        }
        if let Some(v) = number(section, "monitor", "ticking_limit")? {
            config.monitor.ticking_limit = v;
        }
        if let Some(v) = number(section, "monitor", "notify_cooldown_secs")? {
            config.monitor.notify_cooldown_secs = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Reads an optional numeric key, rejecting values that do not parse.
fn number<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
) -> Result<Option<T>, ConfigFileError> {
    let Some(raw) = section.get(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| invalid(section_name, key, raw, "must be a non-negative integer"))
}

fn invalid(section: &str, key: &str, value: impl ToString, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a boolean value from string.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
