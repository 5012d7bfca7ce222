//! SQLite Narration Repository
//!
//! 结果整体以 JSON 存储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{NarrationRecord, NarrationRepositoryPort, RepositoryError};

/// SQLite Narration Repository
pub struct SqliteNarrationRepository {
    pool: DbPool,
}

impl SqliteNarrationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NarrationRow {
    story_id: i64,
    user_id: String,
    conversation_style: String,
    result: String,
    created_at: String,
}

impl TryFrom<NarrationRow> for NarrationRecord {
    type Error = RepositoryError;

    fn try_from(row: NarrationRow) -> Result<Self, Self::Error> {
        Ok(NarrationRecord {
            story_id: row.story_id,
            user_id: row.user_id,
            conversation_style: row.conversation_style,
            result: serde_json::from_str(&row.result)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl NarrationRepositoryPort for SqliteNarrationRepository {
    async fn save(&self, record: &NarrationRecord) -> Result<(), RepositoryError> {
        let result = serde_json::to_string(&record.result)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO narrations (story_id, user_id, conversation_style, result, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(story_id, user_id) DO UPDATE SET
                conversation_style = excluded.conversation_style,
                result = excluded.result,
                created_at = excluded.created_at
            "#,
        )
        .bind(record.story_id)
        .bind(&record.user_id)
        .bind(&record.conversation_style)
        .bind(result)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find(
        &self,
        story_id: i64,
        user_id: &str,
    ) -> Result<Option<NarrationRecord>, RepositoryError> {
        let row: Option<NarrationRow> = sqlx::query_as(
            "SELECT story_id, user_id, conversation_style, result, created_at \
             FROM narrations WHERE story_id = ? AND user_id = ?",
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(NarrationRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::narration::{NarrationResult, NO_AUDIO_GENERATED};
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    #[tokio::test]
    async fn test_save_overwrites_previous_run() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = SqliteNarrationRepository::new(pool);

        let mut record = NarrationRecord {
            story_id: 9,
            user_id: "u1".to_string(),
            conversation_style: "narrative".to_string(),
            result: NarrationResult::failed(2, NO_AUDIO_GENERATED),
            created_at: Utc::now(),
        };
        repo.save(&record).await.unwrap();

        record.conversation_style = "bedtime".to_string();
        record.result = NarrationResult::failed(4, "catalog offline");
        repo.save(&record).await.unwrap();

        let found = repo.find(9, "u1").await.unwrap().unwrap();
        assert_eq!(found.conversation_style, "bedtime");
        assert_eq!(found.result.total_segments, 4);
        assert_eq!(found.result.error.as_deref(), Some("catalog offline"));

        assert!(repo.find(9, "u2").await.unwrap().is_none());
    }
}
