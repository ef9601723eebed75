//! Callback Route
//!
//! - POST /api/v1/callback - Apply one input change and return every
//!   output bound to that input

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::dashboard::callbacks::{InputId, InputValues};
use crate::dashboard::dto::{CallbackRequest, CallbackResponse};
use crate::dashboard::error::{ApiError, ApiResult};
use crate::dashboard::state::AppState;

/// POST /api/v1/callback
///
/// Inputs other than the changed one keep their default value.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CallbackRequest>,
) -> ApiResult<Json<CallbackResponse>> {
    let input: InputId = request.input.parse().map_err(ApiError::Validation)?;

    let mut inputs = InputValues::defaults(&state.dataset);
    match input {
        InputId::County => {
            inputs.county = request
                .value
                .as_str()
                .ok_or_else(|| ApiError::Validation("county must be a string".to_string()))?
                .to_string();
        }
        InputId::DateIndex => {
            inputs.date_index = slider_value(&request.value)?;
        }
    }

    let outputs = state
        .callbacks
        .dispatch(input, &state.dataset, &state.map, &inputs);

    Ok(Json(CallbackResponse { input, outputs }))
}

/// Slider values arrive as JSON numbers; fractional ones round to the
/// nearest step
fn slider_value(value: &Value) -> ApiResult<i64> {
    if let Some(v) = value.as_i64() {
        return Ok(v);
    }

    match value.as_f64() {
        Some(v) if v.is_finite() => Ok(v.round() as i64),
        _ => Err(ApiError::Validation(
            "date_index must be a number".to_string(),
        )),
    }
}
