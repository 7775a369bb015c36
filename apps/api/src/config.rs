use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which halves of the service this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Api,
    Worker,
    All,
}

impl Role {
    pub fn serves_http(self) -> bool {
        matches!(self, Role::Api | Role::All)
    }

    pub fn runs_workers(self) -> bool {
        matches!(self, Role::Worker | Role::All)
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "api" => Ok(Role::Api),
            "worker" => Ok(Role::Worker),
            "all" => Ok(Role::All),
            other => bail!("APP_ROLE must be one of api, worker, all (got '{other}')"),
        }
    }
}

/// Where queued jobs and their status records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBackendKind {
    Redis,
    Memory,
}

impl FromStr for QueueBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(QueueBackendKind::Redis),
            "memory" => Ok(QueueBackendKind::Memory),
            other => bail!("QUEUE_BACKEND must be redis or memory (got '{other}')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` keeps AnalysisRecords in process memory (single-process mode only).
    pub database_url: Option<String>,
    pub redis_url: String,
    /// Only required by roles that run workers; the API never calls the model.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub upload_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub pdf_engine: String,
    pub queue_backend: QueueBackendKind,
    pub role: Role,
    pub worker_concurrency: usize,
    pub result_ttl: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let role: Role = env_or("APP_ROLE", "all").parse()?;
        let openai_api_key = if role.runs_workers() {
            Some(require_env("OPENAI_API_KEY")?)
        } else {
            std::env::var("OPENAI_API_KEY").ok()
        };

        let config = Config {
            database_url: std::env::var("DATABASE_URL").ok(),
            redis_url: env_or("REDIS_URL", "redis://localhost:6379/0"),
            openai_api_key,
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            pdf_dir: PathBuf::from(env_or("PDF_DIR", "generated_pdfs")),
            pdf_engine: env_or("PDF_ENGINE", "weasyprint"),
            queue_backend: env_or("QUEUE_BACKEND", "redis").parse()?,
            role,
            worker_concurrency: parse_env("WORKER_CONCURRENCY", 4usize)?,
            result_ttl: Duration::from_secs(parse_env("RESULT_TTL_SECS", 300u64)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: env_or("RUST_LOG", "info"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.queue_backend == QueueBackendKind::Memory && self.role != Role::All {
            bail!("QUEUE_BACKEND=memory requires APP_ROLE=all (API and workers share one process)");
        }
        if self.database_url.is_none() && self.role != Role::All {
            bail!("DATABASE_URL is required unless APP_ROLE=all");
        }
        if self.role.runs_workers() && self.openai_api_key.is_none() {
            bail!("OPENAI_API_KEY is required unless APP_ROLE=api");
        }
        if self.worker_concurrency == 0 {
            bail!("WORKER_CONCURRENCY must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// Single-process configuration with every directory rooted under `root`.
    pub fn for_tests(root: impl AsRef<std::path::Path>) -> Self {
        let root = root.as_ref();
        Config {
            database_url: None,
            redis_url: "redis://localhost:6379/0".into(),
            openai_api_key: Some("sk-test".into()),
            openai_model: "gpt-4o-mini".into(),
            openai_base_url: "http://127.0.0.1:9".into(),
            upload_dir: root.join("uploads"),
            pdf_dir: root.join("generated_pdfs"),
            pdf_engine: "weasyprint".into(),
            queue_backend: QueueBackendKind::Memory,
            role: Role::All,
            worker_concurrency: 2,
            result_ttl: Duration::from_secs(300),
            max_upload_bytes: 10 * 1024 * 1024,
            port: 0,
            rust_log: "info".into(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
