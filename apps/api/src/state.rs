use std::sync::Arc;

use crate::config::Config;
use crate::queue::JobQueue;
use crate::store::AnalysisStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// AnalysisRecords written by scoring jobs; Postgres or in-memory.
    pub store: Arc<dyn AnalysisStore>,
    pub queue: JobQueue,
}
