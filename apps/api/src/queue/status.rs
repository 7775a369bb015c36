use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::job::JobKind;
use super::QueueError;

/// Lifecycle of a submitted job: `PENDING → STARTED → SUCCESS | FAILURE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Pending,
    Started,
    Success,
    Failure,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Started => "STARTED",
            JobState::Success => "SUCCESS",
            JobState::Failure => "FAILURE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }

    pub fn can_transition_to(&self, next: JobState) -> bool {
        match self {
            JobState::Pending => next != JobState::Pending,
            JobState::Started => next.is_terminal(),
            JobState::Success | JobState::Failure => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure categories reported to clients polling a failed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    FileNotFound,
    UnsupportedFormat,
    ExtractionError,
    ExternalServiceError,
    RenderError,
    PersistenceError,
    NotFoundError,
    /// The job body panicked or otherwise broke outside its own error handling.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Structured failure recorded on a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JobError {
    pub kind: ErrorKind,
    pub message: String,
}

impl JobError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

/// Status record stored by the queue backend for each task id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub task_id: String,
    pub kind: JobKind,
    pub status: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn pending(task_id: impl Into<String>, kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            kind,
            status: JobState::Pending,
            result: None,
            error: None,
            enqueued_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn start(&mut self) -> Result<(), QueueError> {
        self.transition(JobState::Started)
    }

    pub fn succeed(&mut self, result: Value) -> Result<(), QueueError> {
        self.transition(JobState::Success)?;
        self.result = Some(result);
        Ok(())
    }

    pub fn fail(&mut self, error: JobError) -> Result<(), QueueError> {
        self.transition(JobState::Failure)?;
        self.error = Some(error);
        Ok(())
    }

    fn transition(&mut self, next: JobState) -> Result<(), QueueError> {
        if !self.status.can_transition_to(next) {
            return Err(QueueError::InvalidTransition {
                task_id: self.task_id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_wire_format_is_uppercase() {
        assert_eq!(serde_json::to_value(JobState::Pending).unwrap(), json!("PENDING"));
        assert_eq!(
            serde_json::from_value::<JobState>(json!("FAILURE")).unwrap(),
            JobState::Failure
        );
        assert_eq!(JobState::Started.to_string(), "STARTED");
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut record = JobRecord::pending("t-1", JobKind::AnalyzeResume);
        record.start().unwrap();
        record.succeed(json!({"ok": true})).unwrap();
        assert!(record.is_terminal());
        assert_eq!(record.result, Some(json!({"ok": true})));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_pending_may_fail_without_starting() {
        let mut record = JobRecord::pending("t-1", JobKind::GenerateResume);
        record
            .fail(JobError::new(ErrorKind::FileNotFound, "gone"))
            .unwrap();
        assert_eq!(record.status, JobState::Failure);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut record = JobRecord::pending("t-1", JobKind::AnalyzeResume);
        record.start().unwrap();
        record.fail(JobError::internal("boom")).unwrap();

        assert!(record.start().is_err());
        assert!(record.succeed(json!(null)).is_err());
        assert_eq!(record.status, JobState::Failure);
        assert!(record.result.is_none());
    }

    #[test]
    fn test_started_cannot_restart() {
        let mut record = JobRecord::pending("t-1", JobKind::AnalyzeResume);
        record.start().unwrap();
        let err = record.start().unwrap_err();
        assert!(matches!(
            err,
            QueueError::InvalidTransition {
                from: JobState::Started,
                to: JobState::Started,
                ..
            }
        ));
    }

    #[test]
    fn test_error_kind_display_matches_wire_name() {
        let err = JobError::new(ErrorKind::ExternalServiceError, "timeout");
        assert_eq!(err.to_string(), "ExternalServiceError: timeout");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"kind": "ExternalServiceError", "message": "timeout"})
        );
    }
}
