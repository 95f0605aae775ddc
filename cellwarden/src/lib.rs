//! Cellwarden - preload scheduling and health monitoring for grid worlds
//!
//! A world is partitioned into square cells addressed by world name and
//! integer coordinates. This library keeps those cells healthy:
//!
//! - [`preload`] loads a square region around a center at a paced rate
//! - [`monitor`] periodically samples resident cells and raises throttled
//!   alerts for overcrowded ones
//! - [`registry`] is the shared record of load times and problem cells
//! - [`service`] wires all three around a [`host::CellHost`]
//!
//! # High-Level API
//!
//! ```ignore
//! use cellwarden::cell::CellKey;
//! use cellwarden::host::InMemoryHost;
//! use cellwarden::monitor::TracingSink;
//! use cellwarden::service::{CellService, ServiceConfig};
//!
//! let service = CellService::new(
//!     ServiceConfig::default(),
//!     Arc::new(InMemoryHost::new()),
//!     Arc::new(TracingSink),
//!     tokio::runtime::Handle::current(),
//! );
//! service.start();
//!
//! let handle = service.start_preload(CellKey::new("overworld", 0, 0), Some(2))?;
//! let outcome = handle.wait().await?;
//! ```

pub mod cell;
pub mod config;
pub mod host;
pub mod logging;
pub mod monitor;
pub mod preload;
pub mod registry;
pub mod service;
pub mod time;

/// Version of the cellwarden library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cell::{CellError, CellKey, Region};
pub use host::{CellHost, CellStats, HostError};
pub use registry::CellRegistry;
pub use service::CellService;
