use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::info;

use super::backend::QueueBackend;
use super::status::JobRecord;
use super::QueueError;

const JOBS_KEY: &str = "resumatch:jobs";
const TASK_KEY_PREFIX: &str = "resumatch:task:";

fn task_key(task_id: &str) -> String {
    format!("{TASK_KEY_PREFIX}{task_id}")
}

/// Redis broker: a list for envelope payloads (LPUSH / BRPOP) and one JSON string
/// per status record.
pub struct RedisQueue {
    client: redis::Client,
    conn: MultiplexedConnection,
    /// BRPOP holds its connection for the whole wait, so blocking pops use
    /// connections of their own, returned here between calls.
    idle_blocking: Mutex<Vec<MultiplexedConnection>>,
}

impl RedisQueue {
    pub async fn connect(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis queue connected");
        Ok(Self {
            client,
            conn,
            idle_blocking: Mutex::new(Vec::new()),
        })
    }

    async fn blocking_connection(&self) -> Result<MultiplexedConnection, QueueError> {
        if let Some(conn) = self.idle_blocking.lock().await.pop() {
            return Ok(conn);
        }
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl QueueBackend for RedisQueue {
    async fn push(&self, payload: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("LPUSH")
            .arg(JOBS_KEY)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn pop(&self, wait: Duration) -> Result<Option<String>, QueueError> {
        let mut conn = self.blocking_connection().await?;
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(JOBS_KEY)
            .arg(wait.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        self.idle_blocking.lock().await.push(conn);

        Ok(popped.map(|(_, payload)| payload))
    }

    async fn put_record(&self, record: &JobRecord, ttl: Option<Duration>) -> Result<(), QueueError> {
        let payload = serde_json::to_string(record)?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(task_key(&record.task_id)).arg(payload);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        let mut conn = self.conn.clone();
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn get_record(&self, task_id: &str) -> Result<Option<JobRecord>, QueueError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(task_key(task_id))
            .query_async(&mut conn)
            .await?;
        Ok(payload
            .map(|payload| serde_json::from_str(&payload))
            .transpose()?)
    }
}
