//! lectern-dp - Document Processing service
//!
//! Accepts uploaded study material (PDF, Word, PowerPoint, audio),
//! extracts text per file in a background pipeline, and serves memoized
//! AI-generated summaries and quizzes over HTTP.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lectern_common::events::EventBus;
use lectern_dp::config::ServiceConfig;
use lectern_dp::extractors::{ExtractorSet, Transcriber};
use lectern_dp::generation::{GenerationService, OpenAiGenerator, TextGenerator};
use lectern_dp::pipeline::ProcessingPipeline;
use lectern_dp::storage::FileStorage;
use lectern_dp::AppState;

#[derive(Debug, Parser)]
#[command(name = "lectern-dp", about = "Lectern document processing service")]
struct Args {
    /// Data directory (database + uploaded files)
    #[arg(long)]
    data_dir: Option<String>,

    /// HTTP bind address, e.g. 127.0.0.1:8000
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; absence is not an error
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting lectern-dp (Document Processing) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Resolve configuration (CLI → ENV → TOML → default)
    let config = ServiceConfig::resolve(args.data_dir.as_deref(), args.bind.as_deref());
    info!("Data directory: {}", config.data_dir.display());

    // Step 2: Create data and upload directories if missing
    lectern_common::config::ensure_directory_exists(&config.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to initialize data directory: {e}"))?;
    let storage = FileStorage::new(config.upload_dir());
    storage
        .init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize upload directory: {e}"))?;

    // Step 3: Open or create database
    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = lectern_dp::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    // Speech-to-text and generation share the provider credentials
    let transcriber = Arc::new(Transcriber::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));
    if transcriber.is_enabled() {
        info!("Speech-to-text provider configured");
    }

    let provider: Option<Arc<dyn TextGenerator>> = config
        .openai_api_key
        .clone()
        .map(|key| {
            Arc::new(OpenAiGenerator::new(key, config.openai_base_url.clone()))
                as Arc<dyn TextGenerator>
        });
    let generation = Arc::new(GenerationService::new(provider));

    let extractors = Arc::new(ExtractorSet::new(transcriber));
    let pipeline = ProcessingPipeline::new(db_pool.clone(), event_bus.clone(), extractors);

    // Create application state and router
    let state = AppState::new(db_pool, event_bus, storage, pipeline, generation);
    let app = lectern_dp::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
