//! Application State
//!
//! Shared state accessible by all handlers. The dataset is built before
//! the server starts and is only ever read afterwards.

use super::callbacks::CallbackMap;
use crate::config::MapConfig;
use crate::pipeline::Dataset;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The immutable dataset
    pub dataset: Arc<Dataset>,
    /// Map view settings
    pub map: Arc<MapConfig>,
    /// Input → output bindings
    pub callbacks: Arc<CallbackMap>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(dataset: Dataset, map: MapConfig) -> Self {
        Self {
            dataset: Arc::new(dataset),
            map: Arc::new(map),
            callbacks: Arc::new(CallbackMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
