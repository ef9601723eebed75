//! Figure Specifications
//!
//! Serializable chart documents handed to the browser-side renderer. Field
//! names follow the Plotly figure schema (`data` traces plus `layout`) so
//! the client can pass them straight to `Plotly.react`.

use crate::data::Fips;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A complete chart
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// One drawable trace
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(BarTrace),
    Scatter(ScatterTrace),
    Choroplethmapbox(ChoroplethTrace),
    Scattermapbox(MarkerMapTrace),
}

#[derive(Debug, Clone, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<u64>,
}

/// Line trace; gaps in `y` are serialized as `null`
#[derive(Debug, Clone, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub mode: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
}

/// Per-point hover payload: county, population, count
pub type HoverData = (String, Option<f64>, Option<u64>);

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethTrace {
    pub geojson: Arc<Value>,
    pub featureidkey: String,
    pub locations: Vec<Fips>,
    pub z: Vec<Option<f64>>,
    pub zmin: f64,
    pub zmax: f64,
    pub colorscale: String,
    pub marker: ChoroplethMarker,
    pub customdata: Vec<HoverData>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethMarker {
    pub opacity: f64,
    pub line: MarkerLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLine {
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerMapTrace {
    pub mode: String,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub marker: PointMarker,
    pub customdata: Vec<HoverData>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointMarker {
    pub size: Vec<f64>,
    pub sizemin: f64,
    pub color: Vec<u64>,
    pub cmin: f64,
    pub cmax: f64,
    pub colorscale: String,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: String,
    pub height: u32,
    pub paper_bgcolor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapbox: Option<Mapbox>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            l: 25,
            r: 25,
            t: 45,
            b: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Mapbox {
    pub style: String,
    pub zoom: f64,
    pub center: MapCenter,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}
