//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::pipeline::{PipelineOptions, UnmatchedPolicy, DEFAULT_ROLLING_WINDOW};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// URL or local path of the national case CSV
    #[serde(default = "default_case_feed_url")]
    pub case_feed_url: String,

    /// Value of the feed's `state` column to keep
    #[serde(default = "default_target_state")]
    pub target_state: String,

    #[serde(default = "default_population_path")]
    pub population_path: PathBuf,

    /// Column holding "<Name> County"
    #[serde(default = "default_population_name_column")]
    pub population_name_column: String,

    /// Year-labelled population column
    #[serde(default = "default_population_column")]
    pub population_column: String,

    #[serde(default = "default_boundaries_path")]
    pub boundaries_path: PathBuf,

    /// Feature property holding the county id
    #[serde(default = "default_feature_id_key")]
    pub feature_id_key: String,

    #[serde(default = "default_points_path")]
    pub points_path: PathBuf,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_case_feed_url() -> String {
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv".to_string()
}

fn default_target_state() -> String {
    "Texas".to_string()
}

fn default_population_path() -> PathBuf {
    PathBuf::from("TxPop_Indexed.csv")
}

fn default_population_name_column() -> String {
    "CTYNAME".to_string()
}

fn default_population_column() -> String {
    "2019".to_string()
}

fn default_boundaries_path() -> PathBuf {
    PathBuf::from("simp_tx_county.geojson")
}

fn default_feature_id_key() -> String {
    "GEOID".to_string()
}

fn default_points_path() -> PathBuf {
    PathBuf::from("points.csv")
}

fn default_fetch_timeout() -> u64 {
    60
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            case_feed_url: default_case_feed_url(),
            target_state: default_target_state(),
            population_path: default_population_path(),
            population_name_column: default_population_name_column(),
            population_column: default_population_column(),
            boundaries_path: default_boundaries_path(),
            feature_id_key: default_feature_id_key(),
            points_path: default_points_path(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// Transform settings
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// `drop` or `fail`
    #[serde(default)]
    pub on_unmatched: UnmatchedPolicy,

    /// Dropdown label of the statewide series; defaults to the target state
    #[serde(default)]
    pub aggregate_label: Option<String>,
}

fn default_rolling_window() -> usize {
    DEFAULT_ROLLING_WINDOW
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rolling_window: default_rolling_window(),
            on_unmatched: UnmatchedPolicy::default(),
            aggregate_label: None,
        }
    }
}

impl PipelineConfig {
    /// Pipeline options with the aggregate label resolved
    pub fn options_for(&self, target_state: &str) -> PipelineOptions {
        PipelineOptions {
            rolling_window: self.rolling_window,
            unmatched_policy: self.on_unmatched,
            aggregate_label: self
                .aggregate_label
                .clone()
                .unwrap_or_else(|| target_state.to_string()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Map view settings
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lon")]
    pub center_lon: f64,

    #[serde(default = "default_zoom")]
    pub zoom: f64,

    #[serde(default = "default_map_style")]
    pub style: String,
}

fn default_center_lat() -> f64 {
    31.19282
}

fn default_center_lon() -> f64 {
    -99.51260
}

fn default_zoom() -> f64 {
    5.0
}

fn default_map_style() -> String {
    "carto-positron".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
            style: default_map_style(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("covid-dashboard").join("config.toml")),
            Some(PathBuf::from("/etc/covid-dashboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Pipeline options for this config
    pub fn pipeline_options(&self) -> PipelineOptions {
        self.pipeline.options_for(&self.data.target_state)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("COVID_DASHBOARD_CASE_URL") {
            self.data.case_feed_url = url;
        }
        if let Ok(state) = std::env::var("COVID_DASHBOARD_STATE") {
            self.data.target_state = state;
        }

        if let Ok(host) = std::env::var("COVID_DASHBOARD_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("COVID_DASHBOARD_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(level) = std::env::var("COVID_DASHBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COVID_DASHBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# County Case Dashboard Configuration
#
# Environment variables override these settings:
# - COVID_DASHBOARD_CASE_URL
# - COVID_DASHBOARD_STATE
# - COVID_DASHBOARD_HOST
# - COVID_DASHBOARD_PORT
# - COVID_DASHBOARD_LOG_LEVEL
# - COVID_DASHBOARD_LOG_FORMAT

[data]
# National county case feed (URL or local path)
case_feed_url = "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv"

# Rows of this state are kept
target_state = "Texas"

# Population table and the columns to read from it
population_path = "TxPop_Indexed.csv"
population_name_column = "CTYNAME"
population_column = "2019"

# County boundaries (GeoJSON) and the feature property holding the county id
boundaries_path = "simp_tx_county.geojson"
feature_id_key = "GEOID"

# County centroids (GEOID, lat, lon)
points_path = "points.csv"

# Timeout for fetching the case feed (seconds)
fetch_timeout_secs = 60

[pipeline]
# Rolling average window (records)
rolling_window = 7

# Case rows without reference data: "drop" or "fail"
on_unmatched = "drop"

# Label of the statewide series (defaults to target_state)
# aggregate_label = "Texas"

[server]
host = "0.0.0.0"
port = 8050

[map]
center_lat = 31.19282
center_lon = -99.51260
zoom = 5.0
style = "carto-positron"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
