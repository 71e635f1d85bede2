//! Generated artifact database operations
//!
//! Artifacts are written with INSERT ... ON CONFLICT DO NOTHING against
//! their UNIQUE key, then re-read. Two racing creators therefore converge
//! on a single stored row; the loser's generated value is discarded.

use lectern_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Quiz, QuizQuestion, Summary, SummaryLength};

/// Load the memoized summary for (session, length), if any
pub async fn get_summary(
    pool: &SqlitePool,
    session_id: Uuid,
    summary_type: SummaryLength,
) -> Result<Option<Summary>> {
    let row = sqlx::query(
        r#"
        SELECT content, created_at
        FROM summaries
        WHERE session_id = ? AND summary_type = ?
        "#,
    )
    .bind(session_id.to_string())
    .bind(summary_type.as_str())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let created_at: String = row.get("created_at");
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| {
                    lectern_common::Error::Internal(format!("Failed to parse created_at: {e}"))
                })?
                .with_timezone(&chrono::Utc);

            Ok(Some(Summary {
                session_id,
                summary_type,
                content: row.get("content"),
                created_at,
            }))
        }
        None => Ok(None),
    }
}

/// Insert a summary unless one already exists for its key
pub async fn insert_summary_if_absent(pool: &SqlitePool, summary: &Summary) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO summaries (session_id, summary_type, content, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id, summary_type) DO NOTHING
        "#,
    )
    .bind(summary.session_id.to_string())
    .bind(summary.summary_type.as_str())
    .bind(&summary.content)
    .bind(summary.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the memoized quiz for (session, count), if any
pub async fn get_quiz(
    pool: &SqlitePool,
    session_id: Uuid,
    question_count: i64,
) -> Result<Option<Quiz>> {
    let row = sqlx::query(
        r#"
        SELECT questions, created_at
        FROM quizzes
        WHERE session_id = ? AND question_count = ?
        "#,
    )
    .bind(session_id.to_string())
    .bind(question_count)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let questions: String = row.get("questions");
            let questions: Vec<QuizQuestion> = serde_json::from_str(&questions).map_err(|e| {
                lectern_common::Error::Internal(format!("Failed to deserialize questions: {e}"))
            })?;

            let created_at: String = row.get("created_at");
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| {
                    lectern_common::Error::Internal(format!("Failed to parse created_at: {e}"))
                })?
                .with_timezone(&chrono::Utc);

            Ok(Some(Quiz {
                session_id,
                question_count,
                questions,
                created_at,
            }))
        }
        None => Ok(None),
    }
}

/// Insert a quiz unless one already exists for its key
pub async fn insert_quiz_if_absent(pool: &SqlitePool, quiz: &Quiz) -> Result<()> {
    let questions = serde_json::to_string(&quiz.questions).map_err(|e| {
        lectern_common::Error::Internal(format!("Failed to serialize questions: {e}"))
    })?;

    sqlx::query(
        r#"
        INSERT INTO quizzes (session_id, question_count, questions, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id, question_count) DO NOTHING
        "#,
    )
    .bind(quiz.session_id.to_string())
    .bind(quiz.question_count)
    .bind(questions)
    .bind(quiz.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn question(stem: &str) -> QuizQuestion {
        let mut options = BTreeMap::new();
        for (label, text) in [("A", "one"), ("B", "two"), ("C", "three"), ("D", "four")] {
            options.insert(label.to_string(), text.to_string());
        }
        QuizQuestion {
            question: stem.to_string(),
            options,
            correct_answer: "A".to_string(),
            explanation: "because".to_string(),
        }
    }

    #[tokio::test]
    async fn summary_insert_is_first_writer_wins() {
        let pool = init_memory_pool().await.unwrap();
        let session_id = Uuid::new_v4();

        let first = Summary {
            session_id,
            summary_type: SummaryLength::Medium,
            content: "first".into(),
            created_at: Utc::now(),
        };
        let second = Summary {
            content: "second".into(),
            ..first.clone()
        };

        insert_summary_if_absent(&pool, &first).await.unwrap();
        insert_summary_if_absent(&pool, &second).await.unwrap();

        let stored = get_summary(&pool, session_id, SummaryLength::Medium)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.content, "first");

        // A different tier is a different key
        assert!(get_summary(&pool, session_id, SummaryLength::Short)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn quiz_round_trips_questions_json() {
        let pool = init_memory_pool().await.unwrap();
        let session_id = Uuid::new_v4();

        let quiz = Quiz {
            session_id,
            question_count: 5,
            questions: (0..5).map(|i| question(&format!("q{i}"))).collect(),
            created_at: Utc::now(),
        };
        insert_quiz_if_absent(&pool, &quiz).await.unwrap();

        let stored = get_quiz(&pool, session_id, 5).await.unwrap().unwrap();
        assert_eq!(stored.questions, quiz.questions);
        assert!(get_quiz(&pool, session_id, 10).await.unwrap().is_none());
    }
}
