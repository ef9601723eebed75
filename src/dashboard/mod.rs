//! Dashboard Server
//!
//! HTTP layer for the dashboard, built with Axum. Every endpoint reads the
//! immutable dataset; nothing is written after startup.
//!
//! # Endpoints
//!
//! ## Controls and data
//! - `GET /api/v1/controls` - Dropdown options, slider range and marks
//! - `GET /api/v1/boundaries` - County boundary GeoJSON
//! - `GET /api/v1/summary` - Dataset counts and join report
//!
//! ## Views
//! - `GET /api/v1/views/time-series?county=` - Case bars and rolling average
//! - `GET /api/v1/views/rate-map?date_index=` - Cases per 10k choropleth
//! - `GET /api/v1/views/death-map?date_index=` - Death markers
//!
//! ## Callbacks
//! - `POST /api/v1/callback` - Input change → bound outputs
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! Unknown paths answer 404 with the JSON error body.
//!
//! # Example
//!
//! ```rust,ignore
//! use covid_dashboard::config::Config;
//! use covid_dashboard::dashboard::{serve, AppState};
//! use covid_dashboard::pipeline::load_dataset;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let dataset = load_dataset(&config).await?;
//!
//!     let state = AppState::new(dataset, config.map.clone());
//!     serve(state, &config.server).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod callbacks;
pub mod dto;
pub mod error;
pub mod figure;
pub mod routes;
pub mod state;
pub mod views;

pub use callbacks::{CallbackMap, InputId, InputValues, OutputId, RenderedOutput};
pub use error::{ApiError, ApiResult};
pub use figure::{Figure, Trace};
pub use state::AppState;
pub use views::{controls, death_marker_view, rate_choropleth_view, time_series_view, Controls};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/controls", get(routes::data::controls))
        .route("/boundaries", get(routes::data::boundaries))
        .route("/summary", get(routes::data::summary))
        .route("/views/time-series", get(routes::views::time_series))
        .route("/views/rate-map", get(routes::views::rate_map))
        .route("/views/death-map", get(routes::views::death_map))
        .route("/callback", post(routes::callback::dispatch));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the dashboard server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::pipeline::dataset::tests::dataset;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        build_router(AppState::new(dataset(), MapConfig::default()))
    }

    async fn get_uri(uri: &str) -> Response {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_callback(body: &str) -> Response {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/callback")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = get_uri("/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let response = get_uri("/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let response = get_uri("/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["records"], 5);
    }

    #[tokio::test]
    async fn test_controls() {
        let body = json_body(get_uri("/api/v1/controls").await).await;

        assert_eq!(body["county"]["value"], "Texas");
        assert_eq!(body["date_index"]["max"], 2);
        assert_eq!(body["date_index"]["marks"][0]["label"], "2020-03-30");
    }

    #[tokio::test]
    async fn test_time_series_default_is_aggregate() {
        let body = json_body(get_uri("/api/v1/views/time-series").await).await;

        assert_eq!(body["layout"]["title"], "Texas - Current Number of Cases: 150");
        assert_eq!(body["data"][0]["type"], "bar");
        assert_eq!(body["data"][1]["type"], "scatter");
        assert!(body["data"][1]["y"][0].is_null());
    }

    #[tokio::test]
    async fn test_time_series_unknown_county() {
        let response = get_uri("/api/v1/views/time-series?county=Atlantis").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["data"][0]["x"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_rate_map_out_of_range_clamps() {
        let response = get_uri("/api/v1/views/rate-map?date_index=999").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["data"][0]["type"], "choroplethmapbox");
        assert_eq!(body["data"][0]["locations"][0], "48201");
        assert_eq!(
            body["layout"]["title"],
            "Number of Cases per 10,000 by County on 2020-04-03"
        );
    }

    #[tokio::test]
    async fn test_map_slider_values_clamp_and_round() {
        let cases = [
            ("99999999999999999999", "2020-04-03"),
            ("-99999999999999999999", "2020-03-30"),
            ("1.4", "2020-04-01"),
            ("2.0", "2020-04-03"),
        ];

        for (raw, date) in cases {
            for view in ["rate-map", "death-map"] {
                let response = get_uri(&format!("/api/v1/views/{}?date_index={}", view, raw)).await;
                assert_eq!(response.status(), StatusCode::OK, "{} {}", view, raw);

                let body = json_body(response).await;
                let title = body["layout"]["title"].as_str().unwrap().to_string();
                assert!(title.ends_with(date), "{} {}: {}", view, raw, title);
            }
        }
    }

    #[tokio::test]
    async fn test_map_slider_rejects_non_numeric() {
        let response = get_uri("/api/v1/views/rate-map?date_index=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_not_found() {
        let response = get_uri("/api/v1/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_death_map_default_date() {
        let body = json_body(get_uri("/api/v1/views/death-map").await).await;

        assert_eq!(body["data"][0]["type"], "scattermapbox");
        assert_eq!(body["data"][0]["marker"]["color"][0], 700);
    }

    #[tokio::test]
    async fn test_boundaries() {
        let body = json_body(get_uri("/api/v1/boundaries").await).await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_summary() {
        let body = json_body(get_uri("/api/v1/summary").await).await;
        assert_eq!(body["join"]["dropped"], 1);
        assert_eq!(body["join"]["dropped_counties"][0], "Unknown");
    }

    #[tokio::test]
    async fn test_callback_slider() {
        let response = post_callback(r#"{"input": "date_index", "value": 0}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["input"], "date_index");
        assert_eq!(body["outputs"][0]["id"], "rate_choropleth");
        assert_eq!(body["outputs"][1]["id"], "death_markers");
    }

    #[tokio::test]
    async fn test_callback_county() {
        let body = json_body(post_callback(r#"{"input": "county", "value": "Dallas"}"#).await).await;

        assert_eq!(body["outputs"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["outputs"][0]["figure"]["layout"]["title"],
            "Dallas - Current Number of Cases: 30"
        );
    }

    #[tokio::test]
    async fn test_callback_unknown_input() {
        let response = post_callback(r#"{"input": "dd", "value": "Dallas"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_callback_wrong_value_type() {
        let response = post_callback(r#"{"input": "county", "value": 3}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_invalid_json() {
        let response = post_callback("not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
