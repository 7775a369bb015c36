use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::backend::QueueBackend;
use super::job::{Job, JobEnvelope};
use super::status::{JobError, JobRecord};
use super::QueueError;
use crate::pipeline::UploadedFile;

/// Cloneable handle used by HTTP handlers to submit and poll jobs, and by
/// the worker pool to pull them.
#[derive(Clone)]
pub struct JobQueue {
    backend: Arc<dyn QueueBackend>,
    result_ttl: Duration,
}

impl JobQueue {
    pub fn new(backend: Arc<dyn QueueBackend>, result_ttl: Duration) -> Self {
        Self {
            backend,
            result_ttl,
        }
    }

    /// Records the job as `PENDING`, enqueues it and returns its task id
    /// without waiting for any worker.
    ///
    /// If the push fails the record is rewritten as a `FAILURE`, which then
    /// expires like any other result.
    pub async fn submit(&self, job: Job) -> Result<String, QueueError> {
        let task_id = Uuid::new_v4().to_string();
        let kind = job.kind();
        let payload = serde_json::to_string(&JobEnvelope {
            task_id: task_id.clone(),
            job,
        })?;

        let mut record = JobRecord::pending(&task_id, kind);
        self.backend.put_record(&record, None).await?;
        if let Err(e) = self.backend.push(&payload).await {
            error!("Failed to enqueue {} task {}: {e}", kind, task_id);
            if record
                .fail(JobError::internal(format!("failed to enqueue job: {e}")))
                .is_ok()
            {
                if let Err(save_err) = self.save(&record).await {
                    warn!("Failed to record FAILURE for task {}: {save_err}", task_id);
                }
            }
            return Err(e);
        }

        info!("Queued {} task {}", kind, task_id);
        Ok(task_id)
    }

    /// `Ok(None)` for unknown ids and for results past their retention window.
    pub async fn status(&self, task_id: &str) -> Result<Option<JobRecord>, QueueError> {
        self.backend.get_record(task_id).await
    }

    /// Pops the next envelope. Payloads that do not decode are logged,
    /// rejected and reported as `Ok(None)`.
    pub(crate) async fn next(&self, wait: Duration) -> Result<Option<JobEnvelope>, QueueError> {
        let Some(payload) = self.backend.pop(wait).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                error!("Dropping undecodable job payload {payload}: {e}");
                self.reject(&payload, &e).await;
                Ok(None)
            }
        }
    }

    /// Persists a status record; terminal records get the retention TTL.
    pub(crate) async fn save(&self, record: &JobRecord) -> Result<(), QueueError> {
        let ttl = record.is_terminal().then_some(self.result_ttl);
        debug!("Task {} is {}", record.task_id, record.status);
        self.backend.put_record(record, ttl).await
    }

    /// Salvages what it can from a payload that is JSON but not an envelope:
    /// deletes the named upload and fails the named task.
    async fn reject(&self, payload: &str, reason: &serde_json::Error) {
        let Ok(value) = serde_json::from_str::<Value>(payload) else {
            return;
        };
        if let Some(path) = value.pointer("/job/resume_path").and_then(Value::as_str) {
            drop(UploadedFile::new(path));
        }
        let Some(task_id) = value.get("task_id").and_then(Value::as_str) else {
            return;
        };

        let mut record = match self.status(task_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not load status record for task {}: {e}", task_id);
                return;
            }
        };
        let error = JobError::internal(format!("job payload could not be decoded: {reason}"));
        if record.fail(error).is_ok() {
            if let Err(e) = self.save(&record).await {
                warn!("Failed to record FAILURE for task {}: {e}", task_id);
            }
        }
    }
}
