//! Data Transfer Objects
//!
//! Request and response types for the dashboard endpoints.

use super::callbacks::{InputId, RenderedOutput};
use serde::{Deserialize, Serialize};

// ============================================
// VIEW DTOs
// ============================================

/// Time-series query parameters
#[derive(Debug, Deserialize)]
pub struct CountyParams {
    /// County name or the aggregate label (default: aggregate)
    #[serde(default)]
    pub county: Option<String>,
}

/// Map query parameters
#[derive(Debug, Deserialize)]
pub struct DateParams {
    /// Raw slider position, coerced by the route (default: most recent date)
    #[serde(default)]
    pub date_index: Option<String>,
}

// ============================================
// CALLBACK DTOs
// ============================================

/// A single input change
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    /// Input id: "county" or "date_index"
    pub input: String,
    /// New value; a string for the dropdown, an integer for the slider
    pub value: serde_json::Value,
}

/// Outputs re-rendered for an input change
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub input: InputId,
    pub outputs: Vec<RenderedOutput>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// Number of enriched records
    pub records: usize,
    /// Number of indexed dates
    pub dates: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
