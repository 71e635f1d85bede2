//! Uploaded file records and their processing state machine
//!
//! Each uploaded file moves through: pending → processing → completed | failed.
//! `completed` and `failed` are terminal; no transition leaves them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Processable format category of an uploaded file
///
/// Determined purely from the filename extension (case-insensitive);
/// content is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    /// Paginated documents (.pdf)
    Pdf,
    /// Flow documents (.docx, .doc)
    Docx,
    /// Slide decks (.pptx, .ppt)
    Pptx,
    /// Audio recordings (.mp3, .wav, .m4a, .flac, .ogg, .aac)
    Audio,
    /// Unrecognized extension; fails immediately in the pipeline
    Unknown,
}

impl FileCategory {
    /// Classify a filename by its extension
    ///
    /// Pure and deterministic: the same filename always yields the same
    /// category. Missing or unrecognized extensions map to `Unknown`.
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(&filename.to_lowercase())
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_owned);

        match ext.as_deref() {
            Some("pdf") => FileCategory::Pdf,
            Some("docx") | Some("doc") => FileCategory::Docx,
            Some("pptx") | Some("ppt") => FileCategory::Pptx,
            Some("mp3") | Some("wav") | Some("m4a") | Some("flac") | Some("ogg")
            | Some("aac") => FileCategory::Audio,
            _ => FileCategory::Unknown,
        }
    }

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Pdf => "pdf",
            FileCategory::Docx => "docx",
            FileCategory::Pptx => "pptx",
            FileCategory::Audio => "audio",
            FileCategory::Unknown => "unknown",
        }
    }

    /// Parse the database representation
    pub fn parse(s: &str) -> Self {
        match s {
            "pdf" => FileCategory::Pdf,
            "docx" => FileCategory::Docx,
            "pptx" => FileCategory::Pptx,
            "audio" => FileCategory::Audio,
            _ => FileCategory::Unknown,
        }
    }
}

/// Per-file processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Parse the database representation; unknown strings read as failed
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => ProcessingStatus::Pending,
            "processing" => ProcessingStatus::Processing,
            "completed" => ProcessingStatus::Completed,
            _ => ProcessingStatus::Failed,
        }
    }
}

/// One uploaded file and its processing outcome
///
/// Owned by the pipeline during processing; only the pipeline's transition
/// logic mutates status, extracted text, and error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file identifier
    pub id: Uuid,
    /// Upload batch this file belongs to
    pub session_id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// Storage location on disk
    pub file_path: String,
    /// Classified format category
    pub category: FileCategory,
    /// Size in bytes
    pub file_size: i64,
    /// Position within the upload batch (drives aggregation order)
    pub position: i64,
    /// Upload timestamp
    pub upload_time: DateTime<Utc>,
    /// Current processing status
    pub status: ProcessingStatus,
    /// Extracted plain text (completed files only)
    pub extracted_text: Option<String>,
    /// Failure detail (failed files only)
    pub processing_error: Option<String>,
}

impl FileRecord {
    /// Create a pending record for a freshly stored upload
    pub fn new(
        session_id: Uuid,
        filename: String,
        file_path: String,
        category: FileCategory,
        file_size: i64,
        position: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            filename,
            file_path,
            category,
            file_size,
            position,
            upload_time: Utc::now(),
            status: ProcessingStatus::Pending,
            extracted_text: None,
            processing_error: None,
        }
    }
}
