//! Cellwarden CLI - Command-line interface
//!
//! Drives the cellwarden library against an in-memory simulated host.

mod commands;
mod error;
mod progress;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::preload::PreloadArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "cellwarden")]
#[command(version = cellwarden::VERSION)]
#[command(about = "Preload and monitor world cells", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preload a square of cells around a center cell
    Preload {
        /// World name
        #[arg(long)]
        world: String,

        /// Center cell x coordinate
        #[arg(long, allow_hyphen_values = true)]
        x: i32,

        /// Center cell z coordinate
        #[arg(long, allow_hyphen_values = true)]
        z: i32,

        /// Square radius in cells (default: from config)
        #[arg(long)]
        radius: Option<i32>,

        /// Simulated time each load takes, in milliseconds
        #[arg(long, default_value = "5")]
        load_latency_ms: u64,
    },

    /// Run health passes over a simulated world
    Watch {
        /// Number of sampling passes
        #[arg(long, default_value = "3")]
        passes: u32,

        /// Number of overcrowded cells to simulate
        #[arg(long, default_value = "2")]
        crowded: u32,

        /// Pause between passes, in milliseconds
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Preload {
            world,
            x,
            z,
            radius,
            load_latency_ms,
        } => commands::preload::run(PreloadArgs {
            world,
            x,
            z,
            radius,
            load_latency_ms,
        }),
        Commands::Watch {
            passes,
            crowded,
            interval_ms,
        } => commands::watch::run(WatchArgs {
            passes,
            crowded,
            interval_ms,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
