//! Source Data
//!
//! Loading of everything the dashboard is built from:
//!
//! - **types**: record types shared by the whole pipeline
//! - **reference**: population table, county centroids, boundary polygons
//! - **cases**: the remote daily case/death feed
//! - **error**: error types
//!
//! Every loader fails with `DataError::Unavailable` when its source is
//! missing or malformed. Startup aborts on the first such error.

pub mod cases;
pub mod error;
pub mod reference;
pub mod types;

pub use cases::{
    feed_for_location, load_cases, parse_case_csv, CaseFeed, CaseLoad, FileCaseFeed, HttpCaseFeed,
};
pub use error::{DataError, DataResult};
pub use reference::{CountyBoundaries, PopulationTable, ReferenceData};
pub use types::{
    normalize_county_name, CaseRecord, CountyPoint, CountyReference, EnrichedRecord, Fips,
    TimeSeriesPoint,
};

/// Position of a required header column
pub(crate) fn require_column(
    headers: &csv::StringRecord,
    name: &str,
    source_name: &str,
) -> DataResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DataError::unavailable(source_name, format!("missing column: {}", name)))
}
