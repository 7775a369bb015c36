use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use super::backend::QueueBackend;
use super::status::JobRecord;
use super::QueueError;

struct StoredRecord {
    record: JobRecord,
    expires_at: Option<Instant>,
}

impl StoredRecord {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process broker for single-process mode and tests.
///
/// Expired records are dropped when looked up and swept on every write, so
/// results nobody polls do not accumulate.
#[derive(Default)]
pub struct MemoryQueue {
    jobs: Mutex<VecDeque<String>>,
    ready: Notify,
    records: Mutex<HashMap<String, StoredRecord>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueBackend for MemoryQueue {
    async fn push(&self, payload: &str) -> Result<(), QueueError> {
        self.jobs.lock().await.push_back(payload.to_owned());
        self.ready.notify_one();
        Ok(())
    }

    async fn pop(&self, wait: Duration) -> Result<Option<String>, QueueError> {
        let deadline = Instant::now() + wait;
        loop {
            let ready = self.ready.notified();
            if let Some(payload) = self.jobs.lock().await.pop_front() {
                return Ok(Some(payload));
            }
            if tokio::time::timeout_at(deadline, ready).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn put_record(&self, record: &JobRecord, ttl: Option<Duration>) -> Result<(), QueueError> {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        records.retain(|_, stored| !stored.is_expired(now));
        records.insert(
            record.task_id.clone(),
            StoredRecord {
                record: record.clone(),
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn get_record(&self, task_id: &str) -> Result<Option<JobRecord>, QueueError> {
        let mut records = self.records.lock().await;
        let expired = match records.get(task_id) {
            None => return Ok(None),
            Some(stored) => stored.is_expired(Instant::now()),
        };
        if expired {
            records.remove(task_id);
            return Ok(None);
        }
        Ok(records.get(task_id).map(|stored| stored.record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::job::JobKind;

    fn payload(task_id: &str) -> String {
        format!(r#"{{"task_id":"{task_id}"}}"#)
    }

    #[tokio::test]
    async fn test_pop_returns_jobs_in_push_order() {
        let queue = MemoryQueue::new();
        queue.push(&payload("a")).await.unwrap();
        queue.push(&payload("b")).await.unwrap();

        let wait = Duration::from_millis(10);
        assert_eq!(queue.pop(wait).await.unwrap(), Some(payload("a")));
        assert_eq!(queue.pop(wait).await.unwrap(), Some(payload("b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_times_out_when_empty() {
        let queue = MemoryQueue::new();
        assert!(queue.pop(Duration::from_secs(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pop_wakes_on_push() {
        let queue = std::sync::Arc::new(MemoryQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop(Duration::from_secs(30)).await })
        };
        tokio::task::yield_now().await;
        queue.push(&payload("late")).await.unwrap();

        let popped = waiter.await.unwrap().unwrap();
        assert_eq!(popped, Some(payload("late")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_record_expires_after_ttl() {
        let queue = MemoryQueue::new();
        let record = JobRecord::pending("t-1", JobKind::AnalyzeResume);
        queue
            .put_record(&record, Some(Duration::from_secs(300)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(queue.get_record("t-1").await.unwrap(), Some(record));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(queue.get_record("t-1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_without_ttl_does_not_expire() {
        let queue = MemoryQueue::new();
        queue
            .put_record(&JobRecord::pending("t-1", JobKind::GenerateResume), None)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(queue.get_record("t-1").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpolled_expired_records_are_swept_on_write() {
        let queue = MemoryQueue::new();
        let ttl = Some(Duration::from_secs(300));
        for i in 0..1000 {
            let record = JobRecord::pending(format!("done-{i}"), JobKind::AnalyzeResume);
            queue.put_record(&record, ttl).await.unwrap();
        }
        queue
            .put_record(&JobRecord::pending("waiting", JobKind::AnalyzeResume), None)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3600)).await;
        queue
            .put_record(&JobRecord::pending("fresh", JobKind::AnalyzeResume), ttl)
            .await
            .unwrap();

        let records = queue.records.lock().await;
        assert_eq!(records.len(), 2);
        assert!(records.contains_key("waiting"));
        assert!(records.contains_key("fresh"));
    }

    #[tokio::test]
    async fn test_unknown_task_has_no_record() {
        assert!(MemoryQueue::new().get_record("nope").await.unwrap().is_none());
    }
}
