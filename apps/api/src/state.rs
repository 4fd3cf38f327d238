use std::sync::Arc;

use crate::config::Config;
use crate::export::DocumentExporter;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or in-memory, picked by `STORE_BACKEND`.
    pub store: Arc<dyn RecordStore>,
    pub exporter: Arc<dyn DocumentExporter>,
    pub config: Config,
}
