//! Saved session API handlers
//!
//! POST /save-session/{id}, GET /saved-sessions, GET /session/{id}/files

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::sessions::SavedSession,
    error::{ApiError, ApiResult},
    models::{FileCategory, ProcessingStatus},
    AppState,
};

/// POST /save-session/{session_id} form body
#[derive(Debug, Deserialize)]
pub struct SaveSessionForm {
    pub session_name: String,
}

/// POST /save-session/{session_id} response
#[derive(Debug, Serialize)]
pub struct SaveSessionResponse {
    pub message: String,
    pub session_id: Uuid,
    pub session_name: String,
}

/// GET /session/{session_id}/files response entry
#[derive(Debug, Serialize)]
pub struct SessionFile {
    pub filename: String,
    pub file_type: FileCategory,
    pub processing_status: ProcessingStatus,
    pub upload_time: DateTime<Utc>,
    pub file_size: i64,
}

/// POST /save-session/{session_id}
///
/// Names a session for later retrieval. Saving again renames it.
pub async fn save_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Form(form): Form<SaveSessionForm>,
) -> ApiResult<Json<SaveSessionResponse>> {
    let files = crate::db::files::load_session_files(&state.db, session_id).await?;
    if files.is_empty() {
        return Err(ApiError::NotFound(format!("Session not found: {session_id}")));
    }

    crate::db::sessions::upsert_saved_session(&state.db, session_id, &form.session_name).await?;

    tracing::info!(
        session_id = %session_id,
        session_name = %form.session_name,
        "Session saved"
    );

    Ok(Json(SaveSessionResponse {
        message: "Session saved successfully".to_string(),
        session_id,
        session_name: form.session_name,
    }))
}

/// GET /saved-sessions
pub async fn get_saved_sessions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SavedSession>>> {
    let sessions = crate::db::sessions::list_saved_sessions(&state.db).await?;
    Ok(Json(sessions))
}

/// GET /session/{session_id}/files
pub async fn get_session_files(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SessionFile>>> {
    let files = crate::db::files::load_session_files(&state.db, session_id).await?;
    if files.is_empty() {
        return Err(ApiError::NotFound(format!("Session not found: {session_id}")));
    }

    let files = files
        .into_iter()
        .map(|f| SessionFile {
            filename: f.filename,
            file_type: f.category,
            processing_status: f.status,
            upload_time: f.upload_time,
            file_size: f.file_size,
        })
        .collect();

    Ok(Json(files))
}

/// Build saved session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/save-session/:session_id", post(save_session))
        .route("/saved-sessions", get(get_saved_sessions))
        .route("/session/:session_id/files", get(get_session_files))
}
