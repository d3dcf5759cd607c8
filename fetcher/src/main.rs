use clap::Parser;
use fetcher::{shutdown, App};
use fetcher_core::{telemetry, Config};
use std::process;
use tracing::{error, info};

/// Reads every page of the configured collection and prints one name per line.
///
/// Settings come from `config.toml` and `FETCHER__*` environment variables.
#[derive(Parser)]
#[clap(name = "fetcher")]
#[clap(about = "Paginated API fetcher with batched output", version)]
struct Cli {}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Fatal error");
        eprintln!("fetcher: {e:#}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    telemetry::init(&config.telemetry)?;

    let handle = App::new(&config)?.start();

    tokio::select! {
        _ = shutdown::wait_for_signal() => {
            info!("Shutdown requested");
        }
        _ = handle.finished() => {
            info!("All pages fetched");
        }
    }

    handle.stop().await;
    info!("Pipeline stopped");

    Ok(())
}
