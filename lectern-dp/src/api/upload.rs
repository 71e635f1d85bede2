//! Upload API handler
//!
//! POST /upload: accepts a multipart batch, classifies each part by
//! filename, stores the bytes, persists pending file records, and hands
//! the batch to the pipeline. The response returns as soon as files are
//! persisted; extraction happens in the background.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{FileCategory, FileRecord},
    AppState,
};

/// POST /upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub message: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub file_type: FileCategory,
}

/// POST /upload
///
/// The whole batch is validated before anything is stored: an unknown
/// file type rejects the upload with 400 naming the offending file.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    // Read and classify every part first
    let mut parts: Vec<(String, FileCategory, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            // Non-file form fields are ignored
            continue;
        };

        let category = FileCategory::from_filename(&filename);
        if category == FileCategory::Unknown {
            return Err(ApiError::BadRequest(format!(
                "Unsupported file type: {filename}"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload {filename}: {e}")))?;

        parts.push((filename, category, bytes.to_vec()));
    }

    if parts.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    let session_id = Uuid::new_v4();
    let mut records = Vec::with_capacity(parts.len());
    let mut response_files = Vec::with_capacity(parts.len());

    for (position, (filename, category, bytes)) in parts.into_iter().enumerate() {
        let (file_path, file_size) = state.storage.save(session_id, &filename, &bytes).await?;

        let record = FileRecord::new(
            session_id,
            filename.clone(),
            file_path,
            category,
            file_size,
            position as i64,
        );
        crate::db::files::insert_file(&state.db, &record).await?;

        response_files.push(UploadedFile {
            filename,
            file_type: category,
        });
        records.push(record);
    }

    tracing::info!(
        session_id = %session_id,
        file_count = records.len(),
        "Upload accepted; batch handed to pipeline"
    );

    // Fire-and-forget: extraction proceeds without blocking this request
    state.pipeline.submit(session_id, records);

    Ok(Json(UploadResponse {
        session_id,
        message: "Files uploaded successfully".to_string(),
        files: response_files,
    }))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_files))
}
