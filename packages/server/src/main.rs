// Main entry point for the guide extraction API server

use std::sync::Arc;

use anyhow::{Context, Result};
use extraction::{
    Acquirer, AnthropicModel, ArticleStrategy, DownloadStrategy, GuideCache, HttpMediaDownloader,
    JobStore, MemoryStore, Pipeline, SqliteStore, TranscriptStrategy, WhisperTranscriber,
    WorkerPool, YoutubeTimedTextSource, YtDlpDownloader,
};
use server_core::{build_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting guide extraction API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let (jobs, cache): (Arc<dyn JobStore>, Arc<dyn GuideCache>) = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let store = Arc::new(
                SqliteStore::connect(url)
                    .await
                    .context("Failed to connect to database")?,
            );
            (store.clone(), store)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let acquirer = Acquirer::new(vec![
        Box::new(TranscriptStrategy::new(Arc::new(
            YoutubeTimedTextSource::default(),
        ))),
        Box::new(DownloadStrategy::new(
            vec![
                Box::new(YtDlpDownloader::default()),
                Box::new(HttpMediaDownloader::new()),
            ],
            Arc::new(WhisperTranscriber::new(&config.openai_api_key)),
        )),
        Box::new(ArticleStrategy::new()),
    ]);

    let pipeline = Pipeline::new(
        acquirer,
        Arc::new(AnthropicModel::new(&config.anthropic_api_key)),
        jobs.clone(),
        cache.clone(),
        config.work_dir.clone(),
    );

    let (queue, _pool) = WorkerPool::spawn(Arc::new(pipeline), config.worker_count);
    tracing::info!(workers = config.worker_count, "Worker pool ready");

    let state = AppState::new(
        jobs,
        cache,
        queue,
        config.upload_dir.clone(),
        config.max_upload_bytes,
    );
    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
