//! Saved session database operations
//!
//! A saved session gives a human name to an upload batch so it can be
//! found again later. Saving an already-saved session renames it and
//! bumps `updated_at`; `created_at` is preserved.

use chrono::{DateTime, Utc};
use lectern_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A named session
#[derive(Debug, Clone, Serialize)]
pub struct SavedSession {
    pub session_id: Uuid,
    pub session_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert or rename a saved session
pub async fn upsert_saved_session(
    pool: &SqlitePool,
    session_id: Uuid,
    session_name: &str,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO saved_sessions (session_id, session_name, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            session_name = excluded.session_name,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(session_id.to_string())
    .bind(session_name)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// List saved sessions, most recently updated first
pub async fn list_saved_sessions(pool: &SqlitePool) -> Result<Vec<SavedSession>> {
    let rows = sqlx::query(
        r#"
        SELECT session_id, session_name, created_at, updated_at
        FROM saved_sessions
        ORDER BY updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut sessions = Vec::with_capacity(rows.len());
    for row in rows {
        let session_id: String = row.get("session_id");
        let session_id = Uuid::parse_str(&session_id).map_err(|e| {
            lectern_common::Error::Internal(format!("Failed to parse session_id: {e}"))
        })?;

        let created_at: String = row.get("created_at");
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| {
                lectern_common::Error::Internal(format!("Failed to parse created_at: {e}"))
            })?
            .with_timezone(&Utc);

        let updated_at: String = row.get("updated_at");
        let updated_at = chrono::DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| {
                lectern_common::Error::Internal(format!("Failed to parse updated_at: {e}"))
            })?
            .with_timezone(&Utc);

        sessions.push(SavedSession {
            session_id,
            session_name: row.get("session_name"),
            created_at,
            updated_at,
        });
    }

    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    #[tokio::test]
    async fn upsert_renames_without_duplicating() {
        let pool = init_memory_pool().await.unwrap();
        let session_id = Uuid::new_v4();

        upsert_saved_session(&pool, session_id, "Biology week 1")
            .await
            .unwrap();
        upsert_saved_session(&pool, session_id, "Biology midterm prep")
            .await
            .unwrap();

        let sessions = list_saved_sessions(&pool).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_name, "Biology midterm prep");
        assert_eq!(sessions[0].session_id, session_id);
    }
}
