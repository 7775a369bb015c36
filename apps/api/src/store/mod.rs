//! Persistence Store: AnalysisRecords keyed by task id.
//!
//! Records are written once by the scoring job that produced them and never
//! mutated afterwards. A second write for the same task id is rejected with
//! `StoreError::Duplicate` rather than overwriting the first.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::analysis::{AnalysisRecord, NewAnalysis};

pub mod memory;
pub mod postgres;

pub use memory::MemoryAnalysisStore;
pub use postgres::PgAnalysisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored analysis is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("an analysis record for task {0} already exists")]
    Duplicate(String),
}

/// Keyed storage of analysis results. Carried in `AppState` as `Arc<dyn AnalysisStore>`.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, StoreError>;

    /// Returns `Ok(None)` when no record exists for `task_id`.
    async fn get(&self, task_id: &str) -> Result<Option<AnalysisRecord>, StoreError>;
}
