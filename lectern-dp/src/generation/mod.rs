//! Artifact generation and memoization
//!
//! `get_or_create_summary` / `get_or_create_quiz` aggregate the session's
//! extracted text, consult the memo table, and only then invoke the text
//! generation capability. Provider failures are masked by the
//! deterministic local generator, so a generation endpoint never fails just
//! because the provider is absent.

pub mod fallback;
pub mod openai;

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::models::{ProcessingStatus, Quiz, QuizQuestion, Summary, SummaryLength};

pub use openai::OpenAiGenerator;

/// Prefix of the aggregated text sent to the provider
///
/// Bounded to respect provider context limits; the aggregate itself is
/// stored unbounded.
const MAX_PROMPT_CHARS: usize = 4000;

/// Opaque text generation capability
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_summary(&self, content: &str, length: SummaryLength) -> Result<String>;

    /// Must return exactly `question_count` well-formed questions
    async fn generate_quiz(
        &self,
        content: &str,
        question_count: usize,
    ) -> Result<Vec<QuizQuestion>>;
}

/// Generation front-end: provider when configured, local fallback always
pub struct GenerationService {
    provider: Option<Arc<dyn TextGenerator>>,
}

impl GenerationService {
    pub fn new(provider: Option<Arc<dyn TextGenerator>>) -> Self {
        if provider.is_none() {
            warn!("No generation provider configured; using local deterministic generator");
        }
        Self { provider }
    }

    /// Produce a summary; never fails
    pub async fn summary(&self, content: &str, length: SummaryLength) -> String {
        if let Some(provider) = &self.provider {
            match provider.generate_summary(content, length).await {
                Ok(text) => return text,
                Err(e) => {
                    warn!(error = %e, "Summary generation failed; falling back to local generator");
                }
            }
        }
        fallback::fallback_summary(content, length)
    }

    /// Produce a quiz with exactly `question_count` questions; never fails
    pub async fn quiz(&self, content: &str, question_count: usize) -> Vec<QuizQuestion> {
        if let Some(provider) = &self.provider {
            match provider.generate_quiz(content, question_count).await {
                Ok(questions) => return questions,
                Err(e) => {
                    warn!(error = %e, "Quiz generation failed; falling back to local generator");
                }
            }
        }
        fallback::fallback_quiz(content, question_count)
    }
}

/// Concatenate extracted text of completed files, in upload order
///
/// Failed and still-pending units contribute nothing; callers gate on all
/// units being terminal before asking for generation.
pub async fn aggregate_session_text(
    pool: &SqlitePool,
    session_id: Uuid,
) -> lectern_common::Result<String> {
    let files = db::files::load_session_files(pool, session_id).await?;

    let parts: Vec<&str> = files
        .iter()
        .filter(|f| f.status == ProcessingStatus::Completed)
        .filter_map(|f| f.extracted_text.as_deref())
        .collect();

    Ok(parts.join("\n\n"))
}

/// Truncate to the prompt budget on a char boundary
fn prompt_prefix(content: &str) -> &str {
    if content.len() <= MAX_PROMPT_CHARS {
        return content;
    }
    let mut end = MAX_PROMPT_CHARS;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Return the memoized summary for (session, length), creating it on first
/// request
pub async fn get_or_create_summary(
    pool: &SqlitePool,
    service: &GenerationService,
    session_id: Uuid,
    length: SummaryLength,
) -> lectern_common::Result<Summary> {
    if let Some(existing) = db::artifacts::get_summary(pool, session_id, length).await? {
        return Ok(existing);
    }

    let aggregate = aggregate_session_text(pool, session_id).await?;
    let content = service.summary(prompt_prefix(&aggregate), length).await;

    info!(
        session_id = %session_id,
        summary_type = length.as_str(),
        "Generated summary"
    );

    let summary = Summary {
        session_id,
        summary_type: length,
        content,
        created_at: Utc::now(),
    };

    // Racing creators both reach here; the UNIQUE key keeps one row
    db::artifacts::insert_summary_if_absent(pool, &summary).await?;
    db::artifacts::get_summary(pool, session_id, length)
        .await?
        .ok_or_else(|| {
            lectern_common::Error::Internal("summary vanished after insert".to_string())
        })
}

/// Return the memoized quiz for (session, count), creating it on first
/// request
///
/// `question_count` must already be range-validated by the caller.
pub async fn get_or_create_quiz(
    pool: &SqlitePool,
    service: &GenerationService,
    session_id: Uuid,
    question_count: i64,
) -> lectern_common::Result<Quiz> {
    if let Some(existing) = db::artifacts::get_quiz(pool, session_id, question_count).await? {
        return Ok(existing);
    }

    let aggregate = aggregate_session_text(pool, session_id).await?;
    let questions = service
        .quiz(prompt_prefix(&aggregate), question_count as usize)
        .await;

    info!(
        session_id = %session_id,
        question_count,
        "Generated quiz"
    );

    let quiz = Quiz {
        session_id,
        question_count,
        questions,
        created_at: Utc::now(),
    };

    db::artifacts::insert_quiz_if_absent(pool, &quiz).await?;
    db::artifacts::get_quiz(pool, session_id, question_count)
        .await?
        .ok_or_else(|| lectern_common::Error::Internal("quiz vanished after insert".to_string()))
}
