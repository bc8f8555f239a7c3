//! Application state shared across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::store::Store;

/// Application state shared across handlers.
///
/// Holds no per-request data; the store is injected once at construction.
#[derive(Clone)]
pub struct AppState {
    /// Account store (PostgreSQL in production, in-memory in tests)
    pub store: Arc<dyn Store>,
    /// Application configuration
    pub config: Config,
    /// Prometheus render handle, absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
