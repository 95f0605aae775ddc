//! User configuration stored in `~/.cellwarden/config.ini`.
//!
//! Settings structs live in `settings`, defaults in `defaults`, parsing
//! in `parser` and serialization in `writer`. [`ConfigFile`] converts into
//! the typed configs the components take.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{default_log_file, DEFAULT_LOG_FILE};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, LoggingSettings, MonitorSettings, PreloadSettings, RegistrySettings,
};
