use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::analysis::models::KeywordAnalysis;

/// Row as stored in `resume_analyses`. `analysis_results` is serialized JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: String,
    pub resume_text: String,
    pub job_description: String,
    pub analysis_results: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persisted result of a scoring job, keyed by the job's task id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub resume_text: String,
    pub job_description: String,
    pub analysis_results: Option<KeywordAnalysis>,
    pub created_at: DateTime<Utc>,
}

/// Values written when a scoring job succeeds.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub task_id: String,
    pub resume_text: String,
    pub job_description: String,
    pub analysis_results: Option<KeywordAnalysis>,
}

impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = serde_json::Error;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        let analysis_results = row
            .analysis_results
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(AnalysisRecord {
            id: row.id,
            resume_text: row.resume_text,
            job_description: row.job_description,
            analysis_results,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(analysis: Option<&str>) -> AnalysisRow {
        AnalysisRow {
            id: "task-1".into(),
            resume_text: "Python, Docker".into(),
            job_description: "Python, Docker, Kubernetes".into(),
            analysis_results: analysis.map(String::from),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_with_analysis_parses() {
        let record = AnalysisRecord::try_from(row(Some(
            r#"{"current_score":66,"expected_score":90,"missing_keywords":["kubernetes"]}"#,
        )))
        .unwrap();
        let analysis = record.analysis_results.unwrap();
        assert_eq!(analysis.current_score, 66);
        assert_eq!(analysis.missing_keywords, vec!["kubernetes"]);
    }

    #[test]
    fn test_row_without_analysis() {
        let record = AnalysisRecord::try_from(row(None)).unwrap();
        assert!(record.analysis_results.is_none());
    }

    #[test]
    fn test_corrupt_analysis_is_an_error() {
        assert!(AnalysisRecord::try_from(row(Some("not json"))).is_err());
    }
}
