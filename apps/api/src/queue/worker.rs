use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::client::JobQueue;
use super::job::{Job, JobEnvelope};
use super::status::{JobError, JobRecord};

const POLL_WAIT: Duration = Duration::from_secs(1);
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(2);
const SAVE_ATTEMPTS: u32 = 3;

/// Executes the body of a job. The returned value becomes the task's result payload.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn handle(&self, task_id: &str, job: Job) -> Result<Value, JobError>;
}

/// Fixed set of worker slots pulling from a [`JobQueue`].
pub struct WorkerPool {
    shutdown: watch::Sender<bool>,
    slots: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(queue: JobQueue, handler: Arc<dyn JobHandler>, concurrency: usize) -> Self {
        let (shutdown, signal) = watch::channel(false);
        let slots = (0..concurrency)
            .map(|slot| {
                tokio::spawn(run_slot(
                    slot,
                    queue.clone(),
                    handler.clone(),
                    signal.clone(),
                ))
            })
            .collect();

        info!("Worker pool started with {} slots", concurrency);
        Self { shutdown, slots }
    }

    /// Stops pulling new jobs and waits for in-flight ones to finish.
    pub async fn shutdown(self) {
        info!("Draining worker pool");
        let _ = self.shutdown.send(true);
        for slot in self.slots {
            if let Err(e) = slot.await {
                error!("Worker slot ended abnormally: {e}");
            }
        }
        info!("Worker pool stopped");
    }
}

async fn run_slot(
    slot: usize,
    queue: JobQueue,
    handler: Arc<dyn JobHandler>,
    shutdown: watch::Receiver<bool>,
) {
    debug!("Worker slot {} started", slot);
    while !*shutdown.borrow() {
        let envelope = match queue.next(POLL_WAIT).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => continue,
            Err(e) => {
                error!("Worker slot {} failed to poll queue: {e}", slot);
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        let span = info_span!(
            "job",
            task_id = %envelope.task_id,
            kind = %envelope.job.kind(),
        );
        run_job(&queue, &handler, envelope).instrument(span).await;
    }
    debug!("Worker slot {} stopped", slot);
}

async fn run_job(queue: &JobQueue, handler: &Arc<dyn JobHandler>, envelope: JobEnvelope) {
    let JobEnvelope { task_id, job } = envelope;

    let mut record = match queue.status(&task_id).await {
        Ok(Some(record)) => record,
        Ok(None) => JobRecord::pending(&task_id, job.kind()),
        Err(e) => {
            warn!("Could not load status record, starting fresh: {e}");
            JobRecord::pending(&task_id, job.kind())
        }
    };
    if record.is_terminal() {
        warn!("Task already finished as {}; skipping", record.status);
        job.discard_upload();
        return;
    }
    if let Err(e) = record.start() {
        error!("{e}; skipping");
        job.discard_upload();
        return;
    }
    if let Err(e) = queue.save(&record).await {
        warn!("Failed to record STARTED state: {e}");
    }

    // The body runs in its own task so a panic surfaces as a JoinError here.
    let body = {
        let handler = handler.clone();
        let task_id = task_id.clone();
        tokio::spawn(
            async move { handler.handle(&task_id, job).await }.in_current_span(),
        )
    };
    let outcome = match body.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(JobError::internal(format!(
            "job panicked: {}",
            panic_message(e.into_panic())
        ))),
        Err(e) => Err(JobError::internal(format!("job aborted: {e}"))),
    };

    let transition = match outcome {
        Ok(result) => {
            info!("Task succeeded");
            record.succeed(result)
        }
        Err(err) => {
            error!("Task failed: {err}");
            record.fail(err)
        }
    };
    if let Err(e) = transition {
        error!("{e}");
        return;
    }

    save_terminal(queue, &record).await;
}

async fn save_terminal(queue: &JobQueue, record: &JobRecord) {
    for attempt in 1..=SAVE_ATTEMPTS {
        match queue.save(record).await {
            Ok(()) => return,
            Err(e) if attempt < SAVE_ATTEMPTS => {
                warn!("Failed to store {} state (attempt {attempt}): {e}", record.status);
                tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
            }
            Err(e) => error!("Giving up storing {} state: {e}", record.status),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
