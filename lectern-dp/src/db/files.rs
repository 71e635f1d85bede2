//! File record database operations
//!
//! Status writes guard against leaving a terminal state in SQL: the
//! pipeline is the only writer, but `completed`/`failed` must be final
//! regardless of caller bugs.

use lectern_common::Result;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{FileCategory, FileRecord, ProcessingStatus};

/// Insert a freshly uploaded file record
pub async fn insert_file(pool: &SqlitePool, file: &FileRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO file_records (
            id, session_id, filename, file_path, file_type,
            file_size, position, upload_time, processing_status,
            extracted_text, processing_error
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(file.id.to_string())
    .bind(file.session_id.to_string())
    .bind(&file.filename)
    .bind(&file.file_path)
    .bind(file.category.as_str())
    .bind(file.file_size)
    .bind(file.position)
    .bind(file.upload_time.to_rfc3339())
    .bind(file.status.as_str())
    .bind(&file.extracted_text)
    .bind(&file.processing_error)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all file records for a session, in upload order
pub async fn load_session_files(pool: &SqlitePool, session_id: Uuid) -> Result<Vec<FileRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, filename, file_path, file_type,
               file_size, position, upload_time, processing_status,
               extracted_text, processing_error
        FROM file_records
        WHERE session_id = ?
        ORDER BY position
        "#,
    )
    .bind(session_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_file).collect()
}

/// Transition pending → processing
pub async fn mark_processing(pool: &SqlitePool, file_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE file_records
        SET processing_status = 'processing'
        WHERE id = ? AND processing_status NOT IN ('completed', 'failed')
        "#,
    )
    .bind(file_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Terminal transition: store extracted text and mark completed
pub async fn mark_completed(pool: &SqlitePool, file_id: Uuid, text: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE file_records
        SET processing_status = 'completed',
            extracted_text = ?,
            processing_error = NULL
        WHERE id = ? AND processing_status NOT IN ('completed', 'failed')
        "#,
    )
    .bind(text)
    .bind(file_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Terminal transition: record failure detail and mark failed
pub async fn mark_failed(pool: &SqlitePool, file_id: Uuid, error: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE file_records
        SET processing_status = 'failed',
            processing_error = ?
        WHERE id = ? AND processing_status NOT IN ('completed', 'failed')
        "#,
    )
    .bind(error)
    .bind(file_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn row_to_file(row: &SqliteRow) -> Result<FileRecord> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| lectern_common::Error::Internal(format!("Failed to parse file id: {e}")))?;

    let session_id: String = row.get("session_id");
    let session_id = Uuid::parse_str(&session_id).map_err(|e| {
        lectern_common::Error::Internal(format!("Failed to parse session_id: {e}"))
    })?;

    let upload_time: String = row.get("upload_time");
    let upload_time = chrono::DateTime::parse_from_rfc3339(&upload_time)
        .map_err(|e| lectern_common::Error::Internal(format!("Failed to parse upload_time: {e}")))?
        .with_timezone(&chrono::Utc);

    let category: String = row.get("file_type");
    let status: String = row.get("processing_status");

    Ok(FileRecord {
        id,
        session_id,
        filename: row.get("filename"),
        file_path: row.get("file_path"),
        category: FileCategory::parse(&category),
        file_size: row.get("file_size"),
        position: row.get("position"),
        upload_time,
        status: ProcessingStatus::parse(&status),
        extracted_text: row.get("extracted_text"),
        processing_error: row.get("processing_error"),
    })
}

/// Insert helper used by tests elsewhere in the crate
#[cfg(test)]
pub async fn insert_completed_file(
    pool: &SqlitePool,
    session_id: Uuid,
    filename: &str,
    position: i64,
    text: &str,
) -> Result<FileRecord> {
    let mut file = FileRecord::new(
        session_id,
        filename.to_string(),
        format!("/tmp/{filename}"),
        FileCategory::from_filename(filename),
        0,
        position,
    );
    file.status = ProcessingStatus::Completed;
    file.extracted_text = Some(text.to_string());
    insert_file(pool, &file).await?;
    Ok(file)
}
