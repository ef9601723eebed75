//! Dashboard Views
//!
//! Pure functions of the dataset and the current input values. Each call
//! recomputes its figure from the full dataset; nothing is cached.

use super::figure::{
    BarTrace, ChoroplethMarker, ChoroplethTrace, ColorBar, Figure, HoverData, Layout, MapCenter,
    Mapbox, Margin, MarkerLine, MarkerMapTrace, PointMarker, ScatterTrace, Trace,
};
use crate::config::MapConfig;
use crate::pipeline::{Dataset, SliderMark};
use chrono::NaiveDate;
use serde::Serialize;

const COLORSCALE: &str = "Sunsetdark";
const PAPER_BACKGROUND: &str = "antiquewhite";

/// Color domain of the rate map, cases per 10k
pub const RATE_RANGE: (f64, f64) = (0.0, 50.0);

/// Color domain of the death markers
pub const DEATH_RANGE: (f64, f64) = (0.0, 100.0);

/// Marker size is the death count divided by this
pub const DEATH_SIZE_DIVISOR: f64 = 7.0;

const MARKER_SIZE_MIN: f64 = 3.5;

/// Dropdown and slider definitions
#[derive(Debug, Clone, Serialize)]
pub struct Controls {
    pub county: Dropdown,
    pub date_index: Slider,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dropdown {
    pub options: Vec<String>,
    pub value: String,
}

/// Slider over the dense date index; absent fields mean "no dates"
#[derive(Debug, Clone, Serialize)]
pub struct Slider {
    pub min: usize,
    pub max: Option<usize>,
    pub value: Option<usize>,
    pub step: usize,
    pub marks: Vec<SliderMark>,
}

/// Control definitions with their default values
pub fn controls(dataset: &Dataset) -> Controls {
    let max = dataset.dates().max_index();

    Controls {
        county: Dropdown {
            options: dataset.county_options().to_vec(),
            value: dataset.aggregate_label().to_string(),
        },
        date_index: Slider {
            min: 0,
            max,
            value: max,
            step: 1,
            marks: dataset.dates().month_marks(),
        },
    }
}

/// Cumulative case bars plus the rolling average line for one selection.
///
/// An unknown selection produces a figure with empty traces.
pub fn time_series_view(dataset: &Dataset, county: &str) -> Figure {
    let series = dataset.series_for(county);

    let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();

    let title = match series.last() {
        Some(latest) => format!("{} - Current Number of Cases: {}", county, latest.cases),
        None => format!("{} - No case data", county),
    };

    Figure {
        data: vec![
            Trace::Bar(BarTrace {
                name: "Cases".to_string(),
                x: dates.clone(),
                y: series.iter().map(|p| p.cases).collect(),
            }),
            Trace::Scatter(ScatterTrace {
                name: "7 day Moving Average".to_string(),
                mode: "lines".to_string(),
                x: dates,
                y: series.iter().map(|p| p.rolling_average).collect(),
            }),
        ],
        layout: Layout {
            title,
            height: 550,
            paper_bgcolor: PAPER_BACKGROUND.to_string(),
            plot_bgcolor: Some("lightgrey".to_string()),
            hovermode: Some("x unified".to_string()),
            margin: Margin::default(),
            mapbox: None,
        },
    }
}

/// Choropleth of cases per 10k for one date.
///
/// Out-of-range indices clamp to the nearest valid date.
pub fn rate_choropleth_view(dataset: &Dataset, map: &MapConfig, date_index: i64) -> Figure {
    let (index, date) = resolve_date(dataset, date_index);
    let records: Vec<_> = index
        .map(|i| dataset.records_on(i).collect())
        .unwrap_or_default();

    let boundaries = dataset.boundaries();

    Figure {
        data: vec![Trace::Choroplethmapbox(ChoroplethTrace {
            geojson: boundaries.collection().clone(),
            featureidkey: format!("properties.{}", boundaries.feature_id_key()),
            locations: records.iter().map(|r| r.fips).collect(),
            z: records.iter().map(|r| r.case_per_10k).collect(),
            zmin: RATE_RANGE.0,
            zmax: RATE_RANGE.1,
            colorscale: COLORSCALE.to_string(),
            marker: ChoroplethMarker {
                opacity: 0.8,
                line: MarkerLine { width: 0.6 },
            },
            customdata: records
                .iter()
                .map(|r| -> HoverData { (r.county.clone(), r.population, Some(r.cases)) })
                .collect(),
            hovertemplate: "<b>County: %{customdata[0]}</b><br>Cases per 10,000: %{z}<br>2019 Population: %{customdata[1]:,}<br># of Cases: %{customdata[2]:,}".to_string(),
        })],
        layout: map_layout(map, dated_title("Number of Cases per 10,000 by County", date)),
    }
}

/// Death count markers at county centroids for one date.
///
/// Out-of-range indices clamp to the nearest valid date. Rows without a
/// reported death count are drawn as zero.
pub fn death_marker_view(dataset: &Dataset, map: &MapConfig, date_index: i64) -> Figure {
    let (index, date) = resolve_date(dataset, date_index);
    let records: Vec<_> = index
        .map(|i| dataset.records_on(i).collect())
        .unwrap_or_default();

    let deaths: Vec<u64> = records.iter().map(|r| r.deaths.unwrap_or(0)).collect();

    Figure {
        data: vec![Trace::Scattermapbox(MarkerMapTrace {
            mode: "markers".to_string(),
            lat: records.iter().map(|r| r.latitude).collect(),
            lon: records.iter().map(|r| r.longitude).collect(),
            marker: PointMarker {
                size: deaths.iter().map(|d| *d as f64 / DEATH_SIZE_DIVISOR).collect(),
                sizemin: MARKER_SIZE_MIN,
                color: deaths,
                cmin: DEATH_RANGE.0,
                cmax: DEATH_RANGE.1,
                colorscale: COLORSCALE.to_string(),
                colorbar: ColorBar {
                    title: "Deaths".to_string(),
                },
            },
            customdata: records
                .iter()
                .map(|r| -> HoverData { (r.county.clone(), r.population, r.deaths) })
                .collect(),
            hovertemplate: "<b>County: %{customdata[0]}</b><br>2019 Population: %{customdata[1]:,}<br># of Deaths: %{customdata[2]:,}".to_string(),
        })],
        layout: map_layout(map, dated_title("Number of Deaths by County", date)),
    }
}

fn resolve_date(dataset: &Dataset, requested: i64) -> (Option<usize>, Option<NaiveDate>) {
    let index = dataset.dates().clamp(requested);
    let date = index.and_then(|i| dataset.dates().date_at(i));
    (index, date)
}

fn dated_title(prefix: &str, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("{} on {}", prefix, date.format("%Y-%m-%d")),
        None => prefix.to_string(),
    }
}

fn map_layout(map: &MapConfig, title: String) -> Layout {
    Layout {
        title,
        height: 650,
        paper_bgcolor: PAPER_BACKGROUND.to_string(),
        plot_bgcolor: None,
        hovermode: None,
        margin: Margin::default(),
        mapbox: Some(Mapbox {
            style: map.style.clone(),
            zoom: map.zoom,
            center: MapCenter {
                lat: map.center_lat,
                lon: map.center_lon,
            },
        }),
    }
}
