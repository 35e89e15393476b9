//! `mc` entry point.

use clap::Parser;
use mission_cli::{execute, logging, Cli, CliError, MissionConfig};
use mission_coord::Coordinator;
use mission_core::SystemClock;
use mission_schedule::ScheduleZone;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    logging::init(cli.log_json)?;
    let config = MissionConfig::load(cli.config.as_deref())?;
    tracing::debug!(store = ?config.store, "Configuration loaded");

    let store = config.open_store()?;
    let coord = Coordinator::new(store, SystemClock).with_schedule_zone(ScheduleZone::Local);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &coord, &mut out).await
}
