use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::models::analysis::{AnalysisRecord, AnalysisRow, NewAnalysis};
use crate::store::{AnalysisStore, StoreError};

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let serialized = analysis
            .analysis_results
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        // Insert-only: an existing row for the same task id is left untouched.
        let row: Option<AnalysisRow> = sqlx::query_as(
            r#"
            INSERT INTO resume_analyses (id, resume_text, job_description, analysis_results)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, resume_text, job_description, analysis_results, created_at
            "#,
        )
        .bind(&analysis.task_id)
        .bind(&analysis.resume_text)
        .bind(&analysis.job_description)
        .bind(serialized)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| StoreError::Duplicate(analysis.task_id.clone()))?;
        debug!("Stored analysis record {}", row.id);
        Ok(AnalysisRecord::try_from(row)?)
    }

    async fn get(&self, task_id: &str) -> Result<Option<AnalysisRecord>, StoreError> {
        let row: Option<AnalysisRow> = sqlx::query_as(
            "SELECT id, resume_text, job_description, analysis_results, created_at \
             FROM resume_analyses WHERE id = $1",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AnalysisRecord::try_from).transpose()?)
    }
}
