/// Airport watch: polls aircraft near monitored airports and infers gaps
mod clients;
mod config;
mod domain;
mod errors;
mod geo;
mod repo;
mod rules;
mod services;
mod utils;

use crate::clients::OpenSkyClient;
use crate::config::{AppConfig, Watchlist};
use crate::repo::{AircraftRepo, BlobStore, DetectionRepo, SummaryRepo};
use crate::services::{GapService, MonitorService};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "airport_watch", about = "Aircraft activity monitor for a fixed set of airports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one polling cycle and exit
    Poll,
    /// Poll continuously every POLL_EVERY_SECONDS
    Watch,
    /// Scan recent detections for landing/takeoff gaps and write the daily summary
    Gaps,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded, data dir {}", config.data_dir.display());

    let store = BlobStore::new(config.data_dir.clone());
    let detection_repo = DetectionRepo::new(store.clone());

    match cli.command.unwrap_or(Command::Poll) {
        Command::Poll => {
            let service = monitor_service(&config, detection_repo, &store)?;
            info!("Airport watch poll at {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
            service.run_cycle(Utc::now()).await?;
        }
        Command::Watch => {
            let service = monitor_service(&config, detection_repo, &store)?;
            let interval = config.poll_every_seconds;
            info!("Starting airport watch loop (interval: {}s)", interval);
            loop {
                if let Err(e) = service.run_cycle(Utc::now()).await {
                    error!("Polling cycle error: {:?}", e);
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        }
        Command::Gaps => {
            let service = GapService::new(
                detection_repo,
                SummaryRepo::new(store.clone()),
                config.gaps.clone(),
            );
            service.run(Utc::now()).await?;
        }
    }

    Ok(())
}

fn monitor_service(
    config: &AppConfig,
    detection_repo: DetectionRepo,
    store: &BlobStore,
) -> anyhow::Result<MonitorService> {
    let client = OpenSkyClient::new(config.opensky_url.clone(), config.http_timeout_seconds)?;
    Ok(MonitorService::new(
        Arc::new(client),
        Watchlist::builtin(),
        config.monitor.clone(),
        detection_repo,
        AircraftRepo::new(store.clone()),
    ))
}
