//! Preload command - load a square of cells around a center.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use cellwarden::cell::CellKey;
use cellwarden::host::{CellHost, InMemoryHost};
use cellwarden::monitor::TracingSink;
use tracing::info;

use crate::error::CliError;
use crate::progress;
use crate::runner::CliRunner;

/// Arguments for the preload command.
pub struct PreloadArgs {
    pub world: String,
    pub x: i32,
    pub z: i32,
    pub radius: Option<i32>,
    pub load_latency_ms: u64,
}

/// Run the preload command.
pub fn run(args: PreloadArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("preload");

    let host = Arc::new(
        InMemoryHost::new().with_load_latency(Duration::from_millis(args.load_latency_ms)),
    );
    host.add_world(args.world.clone());
    let service = runner.create_service(
        Arc::clone(&host) as Arc<dyn CellHost>,
        Arc::new(TracingSink),
    );

    let center = CellKey::new(args.world, args.x, args.z);
    let request = service
        .preload_request(center.clone(), args.radius)?
        .on_progress(|loaded, total| {
            print!("\r{}", progress::render(loaded, total));
            let _ = std::io::stdout().flush();
        });
    let rate = request.rate().clone();
    let total = request.region().cell_count();

    println!(
        "Preloading {} cells around {} ({} per {}ms step)",
        total,
        center,
        rate.cells_per_step,
        rate.step_interval.as_millis()
    );
    println!("Press Ctrl-C to cancel");

    let handle = service.submit_preload(request)?;
    let task_id = handle.id();

    let scheduler = service.scheduler().clone();
    ctrlc::set_handler(move || {
        scheduler.cancel(task_id);
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    let outcome = runner.runtime().block_on(handle.wait())?;
    println!();

    if outcome.cancelled {
        println!("Preload task {} cancelled", outcome.task_id);
    } else {
        println!("Preload task {} complete", outcome.task_id);
    }
    println!("  Loaded:  {}", outcome.loaded);
    println!("  Failed:  {}", outcome.failed);
    if outcome.skipped + outcome.not_dispatched() > 0 {
        println!("  Skipped: {}", outcome.skipped + outcome.not_dispatched());
    }
    println!("  Elapsed: {:.2}s", outcome.elapsed.as_secs_f64());

    let slow = service
        .registry()
        .slow_entries(service.config().slow_load_threshold);
    if !slow.is_empty() {
        println!();
        println!("Slow loads:");
        for (key, ms) in &slow {
            println!("  - {}: {}ms", key, ms);
        }
    }

    println!();
    println!("{}", service.status());

    info!(
        task_id = %outcome.task_id,
        loaded = outcome.loaded,
        cancelled = outcome.cancelled,
        "Preload command finished"
    );
    service.shutdown();
    Ok(())
}
