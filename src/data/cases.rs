//! Case Data Loader
//!
//! Fetches the national county-level case feed and keeps the rows for the
//! target state. The feed is read once at startup: there is no cache and
//! no retry.

use super::error::{DataError, DataResult};
use super::require_column;
use super::types::{CaseRecord, Fips};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

const MAX_REPORTED_ERRORS: usize = 100;

/// A source of the raw case CSV
#[async_trait]
pub trait CaseFeed: Send + Sync {
    /// Human-readable location, used in logs and errors
    fn location(&self) -> &str;

    /// Fetch the full CSV body
    async fn fetch(&self) -> DataResult<String>;
}

/// Case feed served over HTTP(S)
pub struct HttpCaseFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpCaseFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> DataResult<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::unavailable(&url, e))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl CaseFeed for HttpCaseFeed {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> DataResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DataError::unavailable(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::unavailable(
                &self.url,
                format!("HTTP status {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| DataError::unavailable(&self.url, e))
    }
}

/// Case feed read from a local CSV file
pub struct FileCaseFeed {
    path: PathBuf,
    display: String,
}

impl FileCaseFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl CaseFeed for FileCaseFeed {
    fn location(&self) -> &str {
        &self.display
    }

    async fn fetch(&self) -> DataResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DataError::unavailable(&self.display, e))
    }
}

/// Pick a feed implementation for a configured location.
///
/// `http://` and `https://` locations are fetched over the network; anything
/// else is treated as a file path.
pub fn feed_for_location(location: &str, timeout: Duration) -> DataResult<Box<dyn CaseFeed>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpCaseFeed::new(location, timeout)?))
    } else {
        Ok(Box::new(FileCaseFeed::new(location)))
    }
}

/// Result of parsing the case feed
#[derive(Debug, Default)]
pub struct CaseLoad {
    /// Target-state rows in feed order
    pub records: Vec<CaseRecord>,
    /// Rows of the whole feed
    pub rows_total: usize,
    /// Target-state rows that could not be parsed
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Fetch the feed and keep the target state's rows
pub async fn load_cases(feed: &dyn CaseFeed, target_state: &str) -> DataResult<CaseLoad> {
    tracing::info!(source = %feed.location(), state = %target_state, "Fetching case feed");

    let body = feed.fetch().await?;
    let load = parse_case_csv(&body, target_state, feed.location())?;

    if load.rows_failed > 0 {
        tracing::warn!(
            rows_failed = load.rows_failed,
            first_error = load.errors.first().map(String::as_str).unwrap_or(""),
            "Skipped unparsable case rows"
        );
    }

    tracing::info!(
        rows_total = load.rows_total,
        rows_kept = load.records.len(),
        "Case feed loaded"
    );

    Ok(load)
}

/// Parse the case CSV, keeping rows whose `state` equals `target_state`
pub fn parse_case_csv(body: &str, target_state: &str, source_name: &str) -> DataResult<CaseLoad> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::unavailable(source_name, e))?
        .clone();

    let date_idx = require_column(&headers, "date", source_name)?;
    let county_idx = require_column(&headers, "county", source_name)?;
    let state_idx = require_column(&headers, "state", source_name)?;
    let fips_idx = require_column(&headers, "fips", source_name)?;
    let cases_idx = require_column(&headers, "cases", source_name)?;
    let deaths_idx = require_column(&headers, "deaths", source_name)?;

    let mut load = CaseLoad::default();

    for (line_num, result) in reader.records().enumerate() {
        let line = line_num + 2;
        load.rows_total += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => return Err(DataError::unavailable(source_name, e)),
        };
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        if field(state_idx) != target_state {
            continue;
        }

        match parse_row(
            field(date_idx),
            field(county_idx),
            field(fips_idx),
            field(cases_idx),
            field(deaths_idx),
        ) {
            Ok(case) => load.records.push(case),
            Err(e) => {
                load.rows_failed += 1;
                if load.errors.len() < MAX_REPORTED_ERRORS {
                    load.errors.push(format!("Line {}: {}", line, e));
                }
            }
        }
    }

    Ok(load)
}

fn parse_row(
    date: &str,
    county: &str,
    fips: &str,
    cases: &str,
    deaths: &str,
) -> Result<CaseRecord, String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("invalid date {:?}", date))?;

    let fips = if fips.is_empty() {
        None
    } else {
        Some(fips.parse::<Fips>()?)
    };

    let cases = parse_count(cases).ok_or_else(|| format!("invalid cases {:?}", cases))?;

    let deaths = if deaths.is_empty() {
        None
    } else {
        Some(parse_count(deaths).ok_or_else(|| format!("invalid deaths {:?}", deaths))?)
    };

    Ok(CaseRecord {
        date,
        county: county.to_string(),
        fips,
        cases,
        deaths,
    })
}

/// Counts are integral but some exports write them as `12.0`
fn parse_count(raw: &str) -> Option<u64> {
    raw.strip_suffix(".0").unwrap_or(raw).parse().ok()
}
