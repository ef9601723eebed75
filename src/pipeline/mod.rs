//! Transform Pipeline
//!
//! ```text
//!   CaseRecord[] ──┐
//!                  ├─ join ─> metrics ─> dates ─> Dataset
//!   ReferenceData ─┘
//! ```
//!
//! - **join**: inner join of case rows with reference data
//! - **metrics**: case rate per 10k, rolling averages, statewide series
//! - **dates**: dense date index for the slider
//! - **dataset**: the immutable result and the pure `build_dataset` function

pub mod dataset;
pub mod dates;
pub mod join;
pub mod metrics;

pub use dataset::{build_dataset, load_dataset, Dataset, DatasetSummary, PipelineOptions};
pub use dates::{DateIndex, SliderMark};
pub use join::{join, JoinReport, JoinedRow, UnmatchedPolicy};
pub use metrics::{case_per_10k, county_series, rolling_mean, statewide_series, DEFAULT_ROLLING_WINDOW};
