//! Data Routes
//!
//! Static data the client needs besides the figures.
//!
//! - GET /api/v1/controls - Dropdown options and slider range/marks
//! - GET /api/v1/boundaries - County boundary GeoJSON
//! - GET /api/v1/summary - Dataset counts and join report

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::dashboard::state::AppState;
use crate::dashboard::views::{controls as build_controls, Controls};
use crate::pipeline::DatasetSummary;

/// GET /api/v1/controls
pub async fn controls(State(state): State<Arc<AppState>>) -> Json<Controls> {
    Json(build_controls(&state.dataset))
}

/// GET /api/v1/boundaries
pub async fn boundaries(State(state): State<Arc<AppState>>) -> Json<Arc<Value>> {
    Json(Arc::clone(state.dataset.boundaries().collection()))
}

/// GET /api/v1/summary
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<DatasetSummary> {
    Json(state.dataset.summary())
}
