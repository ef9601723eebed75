//! Dataset
//!
//! The immutable value every dashboard view reads from. It is produced
//! once by [`build_dataset`], a pure function of the loaded sources, and
//! never changes afterwards.

use super::dates::DateIndex;
use super::join::{join, JoinReport, UnmatchedPolicy};
use super::metrics::{case_per_10k, county_series, statewide_series, DEFAULT_ROLLING_WINDOW};
use crate::config::Config;
use crate::data::{
    feed_for_location, load_cases, CaseRecord, CountyBoundaries, DataError, DataResult,
    EnrichedRecord, ReferenceData, TimeSeriesPoint,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Knobs for the transform stage
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Rolling average window, in records
    pub rolling_window: usize,
    pub unmatched_policy: UnmatchedPolicy,
    /// Name of the statewide series, e.g. "Texas"
    pub aggregate_label: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            unmatched_policy: UnmatchedPolicy::Drop,
            aggregate_label: "Texas".to_string(),
        }
    }
}

/// Everything the dashboard serves
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<EnrichedRecord>,
    series: BTreeMap<String, Vec<TimeSeriesPoint>>,
    county_options: Vec<String>,
    dates: DateIndex,
    boundaries: CountyBoundaries,
    join_report: JoinReport,
    aggregate_label: String,
    case_rows: usize,
    counties: usize,
}

/// Counts and ranges for status output
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub case_rows: usize,
    pub enriched_records: usize,
    pub counties: usize,
    pub dates: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub aggregate_label: String,
    pub join: JoinReport,
}

impl Dataset {
    /// Joined and indexed records, in case-feed order
    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    /// All records for one date index
    pub fn records_on(&self, date_index: usize) -> impl Iterator<Item = &EnrichedRecord> {
        self.records
            .iter()
            .filter(move |r| r.date_index == date_index)
    }

    /// Series for a county name or the aggregate label; empty when unknown
    pub fn series_for(&self, county: &str) -> &[TimeSeriesPoint] {
        self.series.get(county).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sorted dropdown values: every county name plus the aggregate label
    pub fn county_options(&self) -> &[String] {
        &self.county_options
    }

    pub fn dates(&self) -> &DateIndex {
        &self.dates
    }

    pub fn boundaries(&self) -> &CountyBoundaries {
        &self.boundaries
    }

    pub fn join_report(&self) -> &JoinReport {
        &self.join_report
    }

    pub fn aggregate_label(&self) -> &str {
        &self.aggregate_label
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            case_rows: self.case_rows,
            enriched_records: self.records.len(),
            counties: self.counties,
            dates: self.dates.len(),
            first_date: self.dates.first(),
            last_date: self.dates.last(),
            aggregate_label: self.aggregate_label.clone(),
            join: self.join_report.clone(),
        }
    }
}

/// Join, derive and index the loaded sources
pub fn build_dataset(
    cases: &[CaseRecord],
    reference: ReferenceData,
    options: &PipelineOptions,
) -> DataResult<Dataset> {
    if options.rolling_window == 0 {
        return Err(DataError::InvalidOption(
            "rolling window must be at least 1".to_string(),
        ));
    }

    let (joined, join_report) = join(cases, &reference, options.unmatched_policy)?;

    let dates = DateIndex::from_dates(joined.iter().map(|row| row.case.date));

    let mut records = Vec::with_capacity(joined.len());
    for row in joined {
        let date_index = dates.index_of(row.case.date).ok_or_else(|| {
            DataError::InvalidOption(format!("date {} missing from index", row.case.date))
        })?;

        records.push(EnrichedRecord {
            date: row.case.date,
            date_index,
            county: row.county,
            fips: row.reference.fips,
            cases: row.case.cases,
            deaths: row.case.deaths,
            population: row.reference.population,
            latitude: row.reference.latitude,
            longitude: row.reference.longitude,
            case_per_10k: case_per_10k(row.case.cases, row.reference.population),
        });
    }

    let mut series = county_series(cases, options.rolling_window);
    let counties = series.len();
    if series.contains_key(&options.aggregate_label) {
        tracing::warn!(
            label = %options.aggregate_label,
            "Aggregate label shadows a county of the same name"
        );
    }
    series.insert(
        options.aggregate_label.clone(),
        statewide_series(cases, &options.aggregate_label, options.rolling_window),
    );

    // BTreeMap keys are already sorted and distinct
    let county_options: Vec<String> = series.keys().cloned().collect();

    tracing::info!(
        records = records.len(),
        series = series.len(),
        dates = dates.len(),
        "Dataset built"
    );

    Ok(Dataset {
        records,
        series,
        county_options,
        dates,
        boundaries: reference.boundaries,
        join_report,
        aggregate_label: options.aggregate_label.clone(),
        case_rows: cases.len(),
        counties,
    })
}

/// Load every source named in the config and build the dataset
pub async fn load_dataset(config: &Config) -> DataResult<Dataset> {
    let reference = ReferenceData::load(&config.data)?;

    let feed = feed_for_location(
        &config.data.case_feed_url,
        Duration::from_secs(config.data.fetch_timeout_secs),
    )?;
    let load = load_cases(feed.as_ref(), &config.data.target_state).await?;

    build_dataset(&load.records, reference, &config.pipeline_options())
}
