//! Job Queue / Worker Pool.
//!
//! Submission writes a `PENDING` status record and pushes a [`JobEnvelope`]
//! onto a broker. Workers pop envelopes, mark them `STARTED`, run the job body
//! in its own task and store the terminal record for `RESULT_TTL_SECS`.
//! Failures (including panics) become a [`JobError`] on the record and never
//! take the worker down.

use thiserror::Error;

pub mod backend;
pub mod client;
pub mod handlers;
pub mod job;
pub mod memory;
pub mod redis_queue;
pub mod status;
pub mod worker;

pub use backend::QueueBackend;
pub use client::JobQueue;
pub use job::{Job, JobEnvelope, JobKind};
pub use memory::MemoryQueue;
pub use redis_queue::RedisQueue;
pub use status::{ErrorKind, JobError, JobRecord, JobState};
pub use worker::{JobHandler, WorkerPool};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: JobState,
        to: JobState,
    },
}
