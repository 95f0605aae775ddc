//! CLI command implementations.
//!
//! - [`preload`] - Preload a square of cells with a progress bar
//! - [`watch`] - Run health passes over a simulated world
//! - [`config`] - Configuration management (path, show, init)

pub mod config;
pub mod preload;
pub mod watch;
