use std::time::Duration;

use async_trait::async_trait;

use super::status::JobRecord;
use super::QueueError;

/// Broker plus result store. Implementations must be safe to share between
/// the HTTP handlers and every worker slot.
///
/// Envelopes travel as raw JSON so that decoding, and the handling of
/// payloads that fail to decode, stays in [`super::JobQueue`].
#[async_trait]
pub trait QueueBackend: Send + Sync {
    async fn push(&self, payload: &str) -> Result<(), QueueError>;

    /// Waits up to `wait` for the next payload; `Ok(None)` when none arrived.
    async fn pop(&self, wait: Duration) -> Result<Option<String>, QueueError>;

    /// Stores `record`, replacing any previous one. With `ttl` the record
    /// disappears once the duration has elapsed.
    async fn put_record(&self, record: &JobRecord, ttl: Option<Duration>) -> Result<(), QueueError>;

    async fn get_record(&self, task_id: &str) -> Result<Option<JobRecord>, QueueError>;
}
