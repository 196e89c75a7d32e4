//! Gate pass service: library crate shared by the binary and integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod store;
pub mod workflow;

use metrics::PassMetrics;
use store::RequestStore;

/// Shared application state passed to handlers.
pub struct AppState {
    pub store: RequestStore,
    pub metrics: PassMetrics,
}

impl AppState {
    pub fn new(store: RequestStore) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            metrics: PassMetrics::new()?,
        })
    }
}
