//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use cellwarden::config::ConfigFileError;
use cellwarden::preload::PreloadError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Preload rejected or abandoned
    Preload(PreloadError),
    /// Failed to install the Ctrl-C handler
    SignalHandler(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) = self {
            eprintln!();
            eprintln!("Fix the value in the config file, or regenerate it with:");
            eprintln!("  cellwarden config init --force");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
            CliError::Preload(e) => write!(f, "Preload failed: {}", e),
            CliError::SignalHandler(msg) => write!(f, "Failed to set signal handler: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Preload(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<PreloadError> for CliError {
    fn from(e: PreloadError) -> Self {
        CliError::Preload(e)
    }
}
