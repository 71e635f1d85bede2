//! Processing pipeline
//!
//! Orchestrates per-file status transitions for an upload batch. A batch
//! is handed off with `submit` and processed by a bounded worker pool in
//! the background; the submitting request never waits on extraction.
//!
//! Each file's outcome is independent: one corrupt upload fails that unit
//! and nothing else. All state lands in the database, so status and
//! generation queries observe progress without any shared in-memory state.

use futures::stream::{self, StreamExt};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use lectern_common::events::{EventBus, LecternEvent};

use crate::db;
use crate::extractors::ExtractorSet;
use crate::models::{FileCategory, FileRecord};

/// Concurrent extraction workers per batch
const WORKER_COUNT: usize = 4;

/// Outcome of one file's processing, for batch accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitOutcome {
    Completed,
    Failed,
}

/// Background processing pipeline for upload batches
#[derive(Clone)]
pub struct ProcessingPipeline {
    db: SqlitePool,
    event_bus: EventBus,
    extractors: Arc<ExtractorSet>,
}

impl ProcessingPipeline {
    pub fn new(db: SqlitePool, event_bus: EventBus, extractors: Arc<ExtractorSet>) -> Self {
        Self {
            db,
            event_bus,
            extractors,
        }
    }

    /// Hand off a batch for background processing; returns immediately
    pub fn submit(&self, session_id: Uuid, files: Vec<FileRecord>) {
        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.process_batch(session_id, files).await;
        });
    }

    /// Process every file in the batch through the worker pool
    pub async fn process_batch(&self, session_id: Uuid, files: Vec<FileRecord>) {
        let total = files.len();
        info!(
            session_id = %session_id,
            file_count = total,
            "Processing batch with {} workers",
            WORKER_COUNT
        );

        let outcomes: Vec<UnitOutcome> = stream::iter(files)
            .map(|file| {
                let pipeline = self.clone();
                async move { pipeline.process_file(file).await }
            })
            .buffer_unordered(WORKER_COUNT)
            .collect()
            .await;

        let completed = outcomes
            .iter()
            .filter(|o| **o == UnitOutcome::Completed)
            .count();
        let failed = total - completed;

        info!(
            session_id = %session_id,
            completed,
            failed,
            "Batch processing finished"
        );

        self.event_bus.emit(LecternEvent::SessionProcessingFinished {
            session_id,
            completed,
            failed,
        });
    }

    /// Process a single file: transition, extract, record the outcome
    ///
    /// Never propagates errors upward: any failure is recorded on the
    /// unit itself so sibling files keep processing.
    async fn process_file(&self, file: FileRecord) -> UnitOutcome {
        debug!(
            session_id = %file.session_id,
            file_id = %file.id,
            file = %file.filename,
            category = file.category.as_str(),
            "Worker starting file"
        );

        if let Err(e) = db::files::mark_processing(&self.db, file.id).await {
            error!(file_id = %file.id, error = %e, "Failed to persist processing transition");
            return self.fail_unit(&file, "internal error: status update failed").await;
        }

        self.event_bus.emit(LecternEvent::FileProcessingStarted {
            session_id: file.session_id,
            file_id: file.id,
            filename: file.filename.clone(),
        });

        // Unknown category: non-retryable classification failure, no
        // extractor lookup attempted
        let Some(extractor) = self.extractors.for_category(file.category) else {
            return self
                .fail_unit(
                    &file,
                    &format!("unsupported file type: {}", file.category.as_str()),
                )
                .await;
        };

        match extractor.extract(Path::new(&file.file_path)).await {
            Ok(text) => {
                if let Err(e) = db::files::mark_completed(&self.db, file.id, &text).await {
                    error!(file_id = %file.id, error = %e, "Failed to persist completion");
                    return self.fail_unit(&file, "internal error: result persistence failed").await;
                }

                info!(
                    session_id = %file.session_id,
                    file = %file.filename,
                    text_chars = text.len(),
                    "File extraction completed"
                );

                self.event_bus.emit(LecternEvent::FileProcessingCompleted {
                    session_id: file.session_id,
                    file_id: file.id,
                    filename: file.filename.clone(),
                    text_chars: text.len(),
                });

                UnitOutcome::Completed
            }
            Err(e) => {
                warn!(
                    session_id = %file.session_id,
                    file = %file.filename,
                    error = %e,
                    "File extraction failed"
                );
                self.fail_unit(&file, &e.to_string()).await
            }
        }
    }

    /// Record a failed unit; best-effort persistence
    async fn fail_unit(&self, file: &FileRecord, detail: &str) -> UnitOutcome {
        if let Err(e) = db::files::mark_failed(&self.db, file.id, detail).await {
            error!(file_id = %file.id, error = %e, "Failed to persist failure");
        }

        self.event_bus.emit(LecternEvent::FileProcessingFailed {
            session_id: file.session_id,
            file_id: file.id,
            filename: file.filename.clone(),
            error: detail.to_string(),
        });

        UnitOutcome::Failed
    }
}
