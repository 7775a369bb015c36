use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::status::{ErrorKind, JobRecord, JobState};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl From<JobRecord> for TaskStatusResponse {
    fn from(record: JobRecord) -> Self {
        // Results are only exposed once the job has succeeded.
        let result = match record.status {
            JobState::Success => record.result,
            _ => None,
        };
        let (error, error_kind) = match (record.status, record.error) {
            (JobState::Failure, Some(err)) => (Some(err.message), Some(err.kind)),
            _ => (None, None),
        };
        TaskStatusResponse {
            task_id: record.task_id,
            status: record.status,
            result,
            error,
            error_kind,
        }
    }
}

/// GET /task-status/:task_id
pub async fn handle_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, AppError> {
    let record = state
        .queue
        .status(&task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))?;

    Ok(Json(record.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::job::JobKind;
    use crate::queue::status::JobError;
    use serde_json::json;

    #[test]
    fn test_pending_response_has_no_payload() {
        let body = serde_json::to_value(TaskStatusResponse::from(JobRecord::pending(
            "t-1",
            JobKind::AnalyzeResume,
        )))
        .unwrap();
        assert_eq!(body, json!({"task_id": "t-1", "status": "PENDING"}));
    }

    #[test]
    fn test_failure_response_carries_message_and_kind() {
        let mut record = JobRecord::pending("t-1", JobKind::GenerateResume);
        record.start().unwrap();
        record
            .fail(JobError::new(ErrorKind::RenderError, "empty pdf"))
            .unwrap();

        let body = serde_json::to_value(TaskStatusResponse::from(record)).unwrap();
        assert_eq!(
            body,
            json!({
                "task_id": "t-1",
                "status": "FAILURE",
                "error": "empty pdf",
                "error_kind": "RenderError"
            })
        );
    }

    #[test]
    fn test_success_response_carries_result() {
        let mut record = JobRecord::pending("t-1", JobKind::AnalyzeResume);
        record.start().unwrap();
        record.succeed(json!({"analysis": {}})).unwrap();

        let response = TaskStatusResponse::from(record);
        assert_eq!(response.result, Some(json!({"analysis": {}})));
        assert!(response.error.is_none());
    }
}
