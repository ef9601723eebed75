//! View Routes
//!
//! One endpoint per output, each a pure function of the query string.
//!
//! - GET /api/v1/views/time-series?county= - Case bars and rolling average
//! - GET /api/v1/views/rate-map?date_index= - Cases per 10k choropleth
//! - GET /api/v1/views/death-map?date_index= - Death markers

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::dashboard::callbacks::InputValues;
use crate::dashboard::dto::{CountyParams, DateParams};
use crate::dashboard::error::{ApiError, ApiResult};
use crate::dashboard::figure::Figure;
use crate::dashboard::state::AppState;
use crate::dashboard::views::{death_marker_view, rate_choropleth_view, time_series_view};

/// GET /api/v1/views/time-series
pub async fn time_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountyParams>,
) -> Json<Figure> {
    let county = params
        .county
        .unwrap_or_else(|| state.dataset.aggregate_label().to_string());

    Json(time_series_view(&state.dataset, &county))
}

/// GET /api/v1/views/rate-map
pub async fn rate_map(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateParams>,
) -> ApiResult<Json<Figure>> {
    let date_index = resolve_date_index(&state, &params)?;
    Ok(Json(rate_choropleth_view(&state.dataset, &state.map, date_index)))
}

/// GET /api/v1/views/death-map
pub async fn death_map(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateParams>,
) -> ApiResult<Json<Figure>> {
    let date_index = resolve_date_index(&state, &params)?;
    Ok(Json(death_marker_view(&state.dataset, &state.map, date_index)))
}

fn resolve_date_index(state: &AppState, params: &DateParams) -> ApiResult<i64> {
    match params.date_index.as_deref() {
        Some(raw) => slider_from_query(raw),
        None => Ok(InputValues::defaults(&state.dataset).date_index),
    }
}

/// Integers pass through; other finite numbers round and saturate into
/// `i64`, leaving the range check to the views
fn slider_from_query(raw: &str) -> ApiResult<i64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.round() as i64),
        _ => Err(ApiError::Validation(format!(
            "date_index must be a number, got {:?}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_from_query() {
        assert_eq!(slider_from_query("2").unwrap(), 2);
        assert_eq!(slider_from_query(" -1 ").unwrap(), -1);
        assert_eq!(slider_from_query("1.4").unwrap(), 1);
        assert_eq!(slider_from_query("2.0").unwrap(), 2);
        assert_eq!(slider_from_query("99999999999999999999").unwrap(), i64::MAX);
        assert_eq!(slider_from_query("-99999999999999999999").unwrap(), i64::MIN);
        assert!(slider_from_query("abc").is_err());
        assert!(slider_from_query("NaN").is_err());
        assert!(slider_from_query("inf").is_err());
    }
}
