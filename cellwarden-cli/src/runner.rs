//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime creation and
//! service wiring so command handlers stay short.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use cellwarden::config::{ConfigFile, DEFAULT_LOG_FILE};
use cellwarden::host::CellHost;
use cellwarden::logging::{init_logging, LoggingGuard};
use cellwarden::monitor::NotificationSink;
use cellwarden::service::CellService;
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Loads config, initializes logging and starts the runtime.
    ///
    /// Log lines go to stdout only when stdout is not a terminal, so they
    /// never interleave with progress output.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        let stdout_enabled = !std::io::stdout().is_terminal();

        let logging_guard = init_logging(log_dir, &log_file, stdout_enabled)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = Runtime::new().map_err(CliError::Runtime)?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Cellwarden v{}", cellwarden::VERSION);
        info!("Cellwarden CLI: {} command", command);
    }

    /// Wires a service around `host` using the loaded configuration.
    pub fn create_service(
        &self,
        host: Arc<dyn CellHost>,
        sink: Arc<dyn NotificationSink>,
    ) -> CellService {
        let service = CellService::new(
            self.config.service_config(),
            host,
            sink,
            self.runtime.handle().clone(),
        );
        info!("Service created successfully");
        service
    }
}
