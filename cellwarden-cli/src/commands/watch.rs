//! Watch command - run health passes over a simulated world.
//!
//! Builds a 5×5 world with a few overcrowded cells and samples it with the
//! configured limits, printing alerts as they are raised.

use std::sync::Arc;
use std::time::Duration;

use cellwarden::cell::CellKey;
use cellwarden::host::{CellHost, CellStats, InMemoryHost};
use cellwarden::monitor::{ProblemAlert, ProblemSummary};
use cellwarden::service::AllGranted;

use crate::error::CliError;
use crate::runner::CliRunner;

const WORLD: &str = "overworld";
const WORLD_RADIUS: i32 = 2;

/// Arguments for the watch command.
pub struct WatchArgs {
    pub passes: u32,
    pub crowded: u32,
    pub interval_ms: u64,
}

/// Run the watch command.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("watch");

    let limits = runner.config().monitor_config();
    let host = Arc::new(InMemoryHost::new());
    let crowded = populate(&host, args.crowded, limits.entity_limit, limits.tile_entity_limit);

    let sink = |alert: &ProblemAlert| {
        println!("! {}", alert);
        println!("  run: {}", alert.actions_command());
    };
    let service =
        runner.create_service(Arc::clone(&host) as Arc<dyn CellHost>, Arc::new(sink));

    println!(
        "Watching {} cells ({} overcrowded), {} passes",
        host.loaded_cells().len(),
        crowded.len(),
        args.passes
    );

    for pass in 1..=args.passes {
        if pass > 1 {
            std::thread::sleep(Duration::from_millis(args.interval_ms));
        }
        let report = service.monitor().run_pass();
        println!(
            "Pass {}: inspected {}, problematic {}, recovered {}, alerts {}",
            pass, report.inspected, report.problematic, report.recovered, report.notified
        );
    }

    println!();
    let summary = service.problems();
    println!("{}", summary);

    if let ProblemSummary::Problems(entries) = &summary {
        println!();
        println!("Available actions:");
        for (key, _) in entries {
            for item in service.permitted_actions(key, &AllGranted) {
                println!("  {}", item);
            }
        }
    }

    service.shutdown();
    Ok(())
}

/// Places a healthy square world and overcrowds the first `crowded` cells,
/// alternating between too many entities and too many tile entities.
fn populate(
    host: &InMemoryHost,
    crowded: u32,
    entity_limit: u32,
    tile_entity_limit: u32,
) -> Vec<CellKey> {
    let mut overcrowded = Vec::new();
    let mut index = 0u32;
    for x in -WORLD_RADIUS..=WORLD_RADIUS {
        for z in -WORLD_RADIUS..=WORLD_RADIUS {
            let key = CellKey::new(WORLD, x, z);
            let stats = if index < crowded {
                overcrowded.push(key.clone());
                if index % 2 == 0 {
                    CellStats::new(entity_limit.saturating_add(1), 0)
                } else {
                    CellStats::new(0, tile_entity_limit.saturating_add(1))
                }
            } else {
                CellStats::new(4, 1)
            };
            host.place(&key, stats);
            index += 1;
        }
    }
    overcrowded
}
