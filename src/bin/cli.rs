//! County Case Dashboard CLI
//!
//! Offline tooling around the pipeline:
//! - Run the full load and print a summary
//! - Print one county's series
//! - Print a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use covid_dashboard::config::{generate_default_config, Config};
use covid_dashboard::pipeline::{load_dataset, Dataset};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "covid-dashboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect the county case dataset without starting the server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load every source and report what the dashboard would serve
    Check,

    /// Print the cumulative series and rolling average of one county
    Series {
        /// County name as written in the feed, or the statewide label
        county: String,
        /// Only print the last N rows
        #[arg(short, long)]
        last: Option<usize>,
    },

    /// Print a default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covid_dashboard=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::InitConfig => {
            print!("{}", generate_default_config());
            Ok(())
        }
        Commands::Check => {
            let dataset = load(&cli).await?;
            print_summary(&dataset, &cli.format)
        }
        Commands::Series { county, last } => {
            let dataset = load(&cli).await?;
            print_series(&dataset, county, *last, &cli.format)
        }
    }
}

async fn load(cli: &Cli) -> anyhow::Result<Dataset> {
    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_default(),
    };

    load_dataset(&config).await.context("building dataset")
}

fn print_summary(dataset: &Dataset, format: &str) -> anyhow::Result<()> {
    let summary = dataset.summary();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let date_or_dash =
        |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());

    println!("Case rows:          {}", summary.case_rows);
    println!("Enriched records:   {}", summary.enriched_records);
    println!("Counties:           {}", summary.counties);
    println!(
        "Dates:              {} ({} .. {})",
        summary.dates,
        date_or_dash(summary.first_date),
        date_or_dash(summary.last_date)
    );
    println!("Statewide label:    {}", summary.aggregate_label);
    println!("Joined rows:        {}", summary.join.matched);
    println!("Dropped rows:       {}", summary.join.dropped);

    if !summary.join.dropped_counties.is_empty() {
        println!("Dropped counties:   {}", summary.join.dropped_counties.join(", "));
    }
    if !summary.join.missing_population.is_empty() {
        println!(
            "Missing population: {}",
            summary.join.missing_population.join(", ")
        );
    }

    Ok(())
}

fn print_series(
    dataset: &Dataset,
    county: &str,
    last: Option<usize>,
    format: &str,
) -> anyhow::Result<()> {
    let series = dataset.series_for(county);
    if series.is_empty() {
        anyhow::bail!("no series for {:?}", county);
    }

    let start = last.map_or(0, |n| series.len().saturating_sub(n));
    let rows = &series[start..];

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!("{:<12} {:>10} {:>12}", "date", "cases", "7d avg");
    for point in rows {
        let avg = point
            .rolling_average
            .map(|v| format!("{:.1}", v))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<12} {:>10} {:>12}", point.date.to_string(), point.cases, avg);
    }

    Ok(())
}
