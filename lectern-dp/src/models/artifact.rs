//! Generated artifacts: summaries and quizzes
//!
//! Artifacts are memoized per (session, kind, parameter): created lazily on
//! first request, immutable afterwards, never recomputed for the same key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

/// Requested summary length tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    /// Target sentence-count range communicated to the generator
    pub fn sentence_range(&self) -> &'static str {
        match self {
            SummaryLength::Short => "2-3 sentences",
            SummaryLength::Medium => "4-6 sentences",
            SummaryLength::Long => "8-10 sentences",
        }
    }

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

impl FromStr for SummaryLength {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            _ => Err(()),
        }
    }
}

/// A memoized summary for one session and length tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub session_id: Uuid,
    pub summary_type: SummaryLength,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One multiple-choice question
///
/// Options are keyed by label "A" through "D"; `correct_answer` names one
/// of those labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    /// Structural validity: exactly options A-D, correct label in range
    pub fn is_well_formed(&self) -> bool {
        let labels: Vec<&str> = self.options.keys().map(String::as_str).collect();
        labels == ["A", "B", "C", "D"] && self.options.contains_key(&self.correct_answer)
    }
}

/// A memoized quiz for one session and question count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub session_id: Uuid,
    pub question_count: i64,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

/// Valid question count range (inclusive)
pub const MIN_QUESTION_COUNT: i64 = 5;
pub const MAX_QUESTION_COUNT: i64 = 50;

/// Validate a requested question count before any work is attempted
pub fn question_count_in_range(count: i64) -> bool {
    (MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count)
}
