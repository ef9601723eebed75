//! # County Case Dashboard
//!
//! Loads a state's daily COVID-19 county case/death series, joins it with
//! population and geographic reference data, and serves chart and map
//! figures for a county dropdown and a date slider.
//!
//! ## Modules
//!
//! - [`data`]: source loaders (case feed, reference tables, boundaries)
//! - [`pipeline`]: join, derived metrics, date index, the immutable dataset
//! - [`dashboard`]: views, input bindings and the HTTP server
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covid_dashboard::config::Config;
//! use covid_dashboard::dashboard::time_series_view;
//! use covid_dashboard::pipeline::load_dataset;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let dataset = load_dataset(&config).await?;
//!
//!     let figure = time_series_view(&dataset, "Harris");
//!     println!("{}", figure.layout.title);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod data;
pub mod pipeline;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, DataConfig, LoggingConfig, MapConfig, ServerConfig};

pub use data::{
    CaseFeed, CaseRecord, CountyBoundaries, CountyReference, DataError, DataResult,
    EnrichedRecord, Fips, ReferenceData, TimeSeriesPoint,
};

pub use pipeline::{
    build_dataset, load_dataset, Dataset, DatasetSummary, DateIndex, JoinReport, PipelineOptions,
    UnmatchedPolicy,
};

pub use dashboard::{build_router, serve, ApiError, AppState, CallbackMap, Figure};
