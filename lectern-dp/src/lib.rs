//! lectern-dp - Document Processing service
//!
//! Accepts uploaded documents and audio, extracts text per file in a
//! background pipeline, and serves memoized AI-generated summaries and
//! quizzes over HTTP with persisted session state.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod generation;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use lectern_common::events::EventBus;

use crate::generation::GenerationService;
use crate::pipeline::ProcessingPipeline;
use crate::storage::FileStorage;

/// Maximum accepted upload body (all parts combined)
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Uploaded file storage
    pub storage: FileStorage,
    /// Background processing pipeline
    pub pipeline: ProcessingPipeline,
    /// Summary/quiz generation front-end
    pub generation: Arc<GenerationService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        storage: FileStorage,
        pipeline: ProcessingPipeline,
        generation: Arc<GenerationService>,
    ) -> Self {
        Self {
            db,
            event_bus,
            storage,
            pipeline,
            generation,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::upload_routes())
        .merge(api::status_routes())
        .merge(api::generation_routes())
        .merge(api::session_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
