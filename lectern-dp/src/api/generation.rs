//! Summary and quiz API handlers
//!
//! Both endpoints validate their parameter and the session's terminal
//! state before any generation work, then defer to the memoizing
//! generation layer. Failed files are excluded from aggregation, never a
//! reason to refuse.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    generation,
    models::{artifact, QuizQuestion, SummaryLength},
    AppState,
};

/// GET /summary/{session_id} query parameters
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub summary_type: Option<String>,
}

/// GET /summary/{session_id} response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub session_id: Uuid,
    pub summary_type: SummaryLength,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// GET /quiz/{session_id} query parameters
#[derive(Debug, Deserialize)]
pub struct QuizParams {
    pub question_count: Option<i64>,
}

/// GET /quiz/{session_id} response
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub session_id: Uuid,
    pub question_count: i64,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Reject generation until the session exists and every file is terminal
async fn ensure_session_ready(state: &AppState, session_id: Uuid) -> ApiResult<()> {
    let files = crate::db::files::load_session_files(&state.db, session_id).await?;

    if files.is_empty() {
        return Err(ApiError::NotFound(format!("Session not found: {session_id}")));
    }
    if files.iter().any(|f| !f.status.is_terminal()) {
        return Err(ApiError::StillProcessing(
            "Files still being processed".to_string(),
        ));
    }

    Ok(())
}

/// GET /summary/{session_id}?summary_type=short|medium|long
pub async fn get_summary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<SummaryResponse>> {
    let tier = params.summary_type.as_deref().unwrap_or("medium");
    let length: SummaryLength = tier
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid summary type: {tier}")))?;

    ensure_session_ready(&state, session_id).await?;

    let summary =
        generation::get_or_create_summary(&state.db, &state.generation, session_id, length)
            .await?;

    Ok(Json(SummaryResponse {
        session_id,
        summary_type: summary.summary_type,
        content: summary.content,
        created_at: summary.created_at,
    }))
}

/// GET /quiz/{session_id}?question_count=5..=50
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<QuizParams>,
) -> ApiResult<Json<QuizResponse>> {
    let question_count = params.question_count.unwrap_or(10);
    if !artifact::question_count_in_range(question_count) {
        return Err(ApiError::BadRequest(format!(
            "Question count must be between {} and {}",
            artifact::MIN_QUESTION_COUNT,
            artifact::MAX_QUESTION_COUNT
        )));
    }

    ensure_session_ready(&state, session_id).await?;

    let quiz =
        generation::get_or_create_quiz(&state.db, &state.generation, session_id, question_count)
            .await?;

    Ok(Json(QuizResponse {
        session_id,
        question_count: quiz.question_count,
        questions: quiz.questions,
        created_at: quiz.created_at,
    }))
}

/// Build generation routes
pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/summary/:session_id", get(get_summary))
        .route("/quiz/:session_id", get(get_quiz))
}
