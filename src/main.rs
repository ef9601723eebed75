//! County Case Dashboard server
//!
//! Run with: cargo run --bin covid-dashboard -- [--config path]
//!
//! Loads every source once, builds the dataset and serves the dashboard
//! API until Ctrl+C / SIGTERM. Any source failure aborts startup.
//!
//! # Configuration
//!
//! Without `--config` the default locations are searched (see
//! `Config::load_default`). Environment variables override file values:
//! - `COVID_DASHBOARD_CASE_URL`, `COVID_DASHBOARD_STATE`
//! - `COVID_DASHBOARD_HOST`, `COVID_DASHBOARD_PORT`
//! - `COVID_DASHBOARD_LOG_LEVEL`, `COVID_DASHBOARD_LOG_FORMAT`
//! - `RUST_LOG`: full filter directive, wins over the log level

use anyhow::Context;
use clap::Parser;
use covid_dashboard::config::{Config, LoggingConfig};
use covid_dashboard::dashboard::{serve, AppState};
use covid_dashboard::pipeline::load_dataset;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "covid-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve the county case dashboard")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_default(),
    };

    init_logging(&config.logging);

    tracing::info!("Starting county case dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        state = %config.data.target_state,
        feed = %config.data.case_feed_url,
        "Loading data"
    );

    let dataset = load_dataset(&config)
        .await
        .context("building dataset")?;

    let summary = dataset.summary();
    tracing::info!(
        records = summary.enriched_records,
        counties = summary.counties,
        dates = summary.dates,
        dropped = summary.join.dropped,
        "Dataset ready"
    );

    let state = AppState::new(dataset, config.map.clone());
    serve(state, &config.server).await?;

    tracing::info!("County case dashboard stopped");
    Ok(())
}

/// Install the tracing subscriber described by the logging config
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("covid_dashboard={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
