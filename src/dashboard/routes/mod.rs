//! Dashboard Routes
//!
//! Route handlers organized by functionality.

pub mod callback;
pub mod data;
pub mod health;
pub mod views;

use axum::http::Uri;

use crate::dashboard::error::ApiError;

/// Fallback for paths no route matches
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
