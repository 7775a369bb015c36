mod analysis;
mod config;
mod db;
mod errors;
mod extract;
mod llm_client;
mod models;
mod pipeline;
mod queue;
mod render;
mod routes;
mod state;
mod store;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::LlmResumeAnalyzer;
use crate::config::{Config, QueueBackendKind};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::pipeline::ResumePipeline;
use crate::queue::{JobQueue, MemoryQueue, QueueBackend, RedisQueue, WorkerPool};
use crate::render::{CommandPdfEngine, PdfRenderer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{AnalysisStore, MemoryAnalysisStore, PgAnalysisStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting resumatch v{} (role: {:?})",
        env!("CARGO_PKG_VERSION"),
        config.role
    );

    let shutdown = shutdown_signal().context("Failed to install signal handlers")?;

    for dir in [&config.upload_dir, &config.pdf_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    // Analysis records
    let store: Arc<dyn AnalysisStore> = match &config.database_url {
        Some(url) => Arc::new(PgAnalysisStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; analysis records are kept in memory");
            Arc::new(MemoryAnalysisStore::new())
        }
    };

    // Job queue
    let backend: Arc<dyn QueueBackend> = match config.queue_backend {
        QueueBackendKind::Redis => Arc::new(RedisQueue::connect(&config.redis_url).await?),
        QueueBackendKind::Memory => Arc::new(MemoryQueue::new()),
    };
    info!("Job queue backend: {:?}", config.queue_backend);
    let queue = JobQueue::new(backend, config.result_ttl);

    let workers = if config.role.runs_workers() {
        let api_key = config
            .openai_api_key
            .clone()
            .context("OPENAI_API_KEY is required for roles that run workers")?;
        let llm = LlmClient::new(
            api_key,
            config.openai_model.clone(),
            &config.openai_base_url,
        )?;
        info!("LLM client initialized (model: {})", llm.model());

        let renderer = PdfRenderer::new(
            config.pdf_dir.clone(),
            Arc::new(CommandPdfEngine::new(config.pdf_engine.clone())),
        );
        let pipeline = ResumePipeline::new(
            Arc::new(LlmResumeAnalyzer::new(llm)),
            store.clone(),
            renderer,
        );
        Some(WorkerPool::spawn(
            queue.clone(),
            Arc::new(pipeline),
            config.worker_concurrency,
        ))
    } else {
        None
    };

    if config.role.serves_http() {
        let state = AppState {
            config: config.clone(),
            store,
            queue,
        };

        let app = build_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
        info!("Listening on {addr}");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
    } else {
        shutdown.await;
    }

    if let Some(workers) = workers {
        workers.shutdown().await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM. The SIGTERM handler is
/// installed immediately so the default disposition never kills the process.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    #[cfg(unix)]
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl-C"),
                Err(e) => {
                    error!("Failed to listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await
                }
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
            info!("Received SIGTERM");
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {}
            () = terminate => {}
        }
        info!("Shutdown signal received");
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_resolves_shutdown_signal() {
        let shutdown = shutdown_signal().unwrap();

        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -TERM {}", std::process::id()))
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), shutdown)
            .await
            .expect("SIGTERM did not trigger shutdown");
    }
}
