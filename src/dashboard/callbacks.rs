//! Input Bindings
//!
//! Explicit map from each user input to the views it drives. A change to
//! one input re-renders exactly the outputs bound to it; views never feed
//! each other.

use super::figure::Figure;
use super::views::{death_marker_view, rate_choropleth_view, time_series_view};
use crate::config::MapConfig;
use crate::pipeline::Dataset;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// User-settable inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputId {
    /// County dropdown
    County,
    /// Date slider
    DateIndex,
}

impl FromStr for InputId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "county" => Ok(InputId::County),
            "date_index" => Ok(InputId::DateIndex),
            other => Err(format!("unknown input: {}", other)),
        }
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputId::County => write!(f, "county"),
            InputId::DateIndex => write!(f, "date_index"),
        }
    }
}

/// Rendered views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputId {
    TimeSeries,
    RateChoropleth,
    DeathMarkers,
}

/// Current value of every input
#[derive(Debug, Clone, PartialEq)]
pub struct InputValues {
    pub county: String,
    /// Raw slider value; views clamp it
    pub date_index: i64,
}

impl InputValues {
    /// Aggregate series and the most recent date
    pub fn defaults(dataset: &Dataset) -> Self {
        let date_index = dataset
            .dates()
            .max_index()
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(0);

        Self {
            county: dataset.aggregate_label().to_string(),
            date_index,
        }
    }
}

/// A rendered output
#[derive(Debug, Clone, Serialize)]
pub struct RenderedOutput {
    pub id: OutputId,
    pub figure: Figure,
}

/// Input id → bound outputs
#[derive(Debug, Clone)]
pub struct CallbackMap {
    bindings: HashMap<InputId, Vec<OutputId>>,
}

impl Default for CallbackMap {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackMap {
    /// The dashboard's bindings: the dropdown drives the chart, the slider
    /// drives both maps
    pub fn new() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(InputId::County, vec![OutputId::TimeSeries]);
        bindings.insert(
            InputId::DateIndex,
            vec![OutputId::RateChoropleth, OutputId::DeathMarkers],
        );
        Self { bindings }
    }

    pub fn outputs_for(&self, input: InputId) -> &[OutputId] {
        self.bindings.get(&input).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Render every output bound to `changed`
    pub fn dispatch(
        &self,
        changed: InputId,
        dataset: &Dataset,
        map: &MapConfig,
        inputs: &InputValues,
    ) -> Vec<RenderedOutput> {
        tracing::debug!(input = %changed, "Dispatching input change");

        self.outputs_for(changed)
            .iter()
            .map(|id| RenderedOutput {
                id: *id,
                figure: render(*id, dataset, map, inputs),
            })
            .collect()
    }
}

/// Render one output from the current inputs
pub fn render(output: OutputId, dataset: &Dataset, map: &MapConfig, inputs: &InputValues) -> Figure {
    match output {
        OutputId::TimeSeries => time_series_view(dataset, &inputs.county),
        OutputId::RateChoropleth => rate_choropleth_view(dataset, map, inputs.date_index),
        OutputId::DeathMarkers => death_marker_view(dataset, map, inputs.date_index),
    }
}
