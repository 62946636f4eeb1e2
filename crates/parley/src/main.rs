//! Parley console harness.
//!
//! Runs the NPC chat extension against a terminal "engine": spawns,
//! despawns and speech print to stdout, and player events are typed in.

use clap::Parser;
use parley::{EventBus, NpcChatService, ServiceOptions, StartOutcome, init_telemetry};
use std::sync::Arc;
use tracing::info;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, ConsoleEngine, run_repl};

    let cli = Cli::parse();

    let directives = if cli.verbose { "debug" } else { "info,parley=debug" };
    init_telemetry(directives)?;

    let engine = Arc::new(ConsoleEngine::new(cli.mod_config.as_deref()));
    let bus = Arc::new(EventBus::new());

    let mut options = ServiceOptions {
        mod_id: cli.mod_id,
        ..ServiceOptions::default()
    }
    .with_event_bus(bus.clone());
    if let Some(path) = cli.config {
        options = options.with_override_path(path);
    }

    let service = NpcChatService::new(engine.clone(), options);
    match service.start()? {
        StartOutcome::Started { provider } => info!(?provider, "Ready"),
        other => info!(outcome = ?other, "Extension not running; type start to retry"),
    }

    let stdin = std::io::stdin();
    run_repl(&service, &bus, &engine, stdin.lock())?;

    let report = service.stop();
    info!(despawned = report.despawned, "Goodbye");
    Ok(())
}
