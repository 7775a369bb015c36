use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::analysis::{AnalysisRecord, NewAnalysis};
use crate::store::{AnalysisStore, StoreError};

/// Process-local store for single-process deployments and tests.
#[derive(Default)]
pub struct MemoryAnalysisStore {
    records: RwLock<HashMap<String, AnalysisRecord>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&analysis.task_id) {
            return Err(StoreError::Duplicate(analysis.task_id));
        }
        let record = AnalysisRecord {
            id: analysis.task_id.clone(),
            resume_text: analysis.resume_text,
            job_description: analysis.job_description,
            analysis_results: analysis.analysis_results,
            created_at: Utc::now(),
        };
        records.insert(analysis.task_id, record.clone());
        Ok(record)
    }

    async fn get(&self, task_id: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        Ok(self.records.read().await.get(task_id).cloned())
    }
}
