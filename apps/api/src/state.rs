use std::sync::Arc;

use crate::config::Config;
use crate::store::TrackerStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in deployment, in-memory for local runs and tests.
    pub store: Arc<dyn TrackerStore>,
    pub config: Config,
}
