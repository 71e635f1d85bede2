//! Status API handler
//!
//! GET /status/{session_id}: overall session status plus per-file detail.
//! The session as a whole reads "completed" only once every file is in a
//! terminal state; failed files count as terminal.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{FileCategory, FileRecord, ProcessingStatus},
    AppState,
};

/// GET /status/{session_id} response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub session_id: Uuid,
    pub status: String,
    pub files: Vec<FileStatus>,
}

#[derive(Debug, Serialize)]
pub struct FileStatus {
    pub filename: String,
    pub file_type: FileCategory,
    pub status: ProcessingStatus,
    pub upload_time: DateTime<Utc>,
}

/// Overall session status: "completed" iff every file is terminal
pub fn overall_status(files: &[FileRecord]) -> &'static str {
    if files.iter().all(|f| f.status.is_terminal()) {
        "completed"
    } else {
        "processing"
    }
}

/// GET /status/{session_id}
pub async fn get_processing_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<StatusResponse>> {
    let files = crate::db::files::load_session_files(&state.db, session_id).await?;

    if files.is_empty() {
        return Err(ApiError::NotFound(format!("Session not found: {session_id}")));
    }

    tracing::debug!(session_id = %session_id, file_count = files.len(), "Status query");

    let response = StatusResponse {
        session_id,
        status: overall_status(&files).to_string(),
        files: files
            .into_iter()
            .map(|f| FileStatus {
                filename: f.filename,
                file_type: f.category,
                status: f.status,
                upload_time: f.upload_time,
            })
            .collect(),
    };

    Ok(Json(response))
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/status/:session_id", get(get_processing_status))
}
