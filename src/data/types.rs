//! Core record types for the dashboard pipeline
//!
//! - `Fips`: five-digit county identifier
//! - `CaseRecord`: one row of the case feed for the target state
//! - `CountyPoint` / `CountyReference`: static per-county reference data
//! - `EnrichedRecord`: a case row joined with its reference data
//! - `TimeSeriesPoint`: one point of a county (or statewide) series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Five-digit county identifier (FIPS / GEOID)
///
/// The case feed writes it as `48201`, some exports as `48201.0`; boundary
/// files use the zero-padded string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fips(u32);

impl Fips {
    pub fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl FromStr for Fips {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid county identifier: {:?}", s));
        }

        digits
            .parse()
            .map(Fips)
            .map_err(|_| format!("invalid county identifier: {:?}", s))
    }
}

impl From<Fips> for String {
    fn from(fips: Fips) -> Self {
        fips.to_string()
    }
}

impl TryFrom<String> for Fips {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One row of the case feed, already filtered to the target state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRecord {
    pub date: NaiveDate,
    /// County name as written by the feed ("Harris", "Unknown")
    pub county: String,
    /// Empty in the feed for unassigned cases
    pub fips: Option<Fips>,
    /// Cumulative case count
    pub cases: u64,
    /// Cumulative death count; some feed rows leave it blank
    pub deaths: Option<u64>,
}

/// County centroid from the point table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountyPoint {
    pub fips: Fips,
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolved reference data for one county
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountyReference {
    pub fips: Fips,
    pub latitude: f64,
    pub longitude: f64,
    pub population: Option<f64>,
}

/// Case row joined with reference data plus derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub date: NaiveDate,
    /// Dense rank of `date` among all dates in the dataset
    pub date_index: usize,
    /// Normalized "<Name> County" form
    pub county: String,
    pub fips: Fips,
    pub cases: u64,
    pub deaths: Option<u64>,
    pub population: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub case_per_10k: Option<f64>,
}

/// One point of a cumulative case series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    /// County name, or the statewide aggregate label
    pub county: String,
    pub cases: u64,
    /// Trailing mean of `cases`; `None` until the window is full
    pub rolling_average: Option<f64>,
}

/// Normalize a feed county name to the "<Name> County" convention used by
/// the population table.
pub fn normalize_county_name(name: &str) -> String {
    let name = name.trim();
    if name.ends_with(" County") {
        name.to_string()
    } else {
        format!("{} County", name)
    }
}
