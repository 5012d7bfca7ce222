//! SQLite Recording Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{NewRecording, RecordingCatalogPort, RepositoryError};
use crate::domain::recording::{RecordingCategory, VoiceRecording};

const SELECT_COLUMNS: &str = "SELECT id, user_id, category, name, cloned_voice_id, is_locked, \
     duration_seconds, audio_url, story_id, created_at FROM voice_recordings";

/// SQLite Recording Repository
pub struct SqliteRecordingRepository {
    pool: DbPool,
}

impl SqliteRecordingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RecordingRow {
    id: i64,
    user_id: String,
    category: String,
    name: String,
    cloned_voice_id: Option<String>,
    is_locked: bool,
    duration_seconds: f64,
    audio_url: String,
    story_id: Option<i64>,
    created_at: String,
}

impl TryFrom<RecordingRow> for VoiceRecording {
    type Error = RepositoryError;

    fn try_from(row: RecordingRow) -> Result<Self, Self::Error> {
        Ok(VoiceRecording {
            id: row.id,
            user_id: row.user_id,
            category: row
                .category
                .parse::<RecordingCategory>()
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            cloned_voice_id: row.cloned_voice_id,
            is_locked: row.is_locked,
            duration_seconds: row.duration_seconds,
            audio_url: row.audio_url,
            story_id: row.story_id,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

#[async_trait]
impl RecordingCatalogPort for SqliteRecordingRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<VoiceRecording>, RepositoryError> {
        let rows: Vec<RecordingRow> =
            sqlx::query_as(&format!("{} WHERE user_id = ? ORDER BY id ASC", SELECT_COLUMNS))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(VoiceRecording::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<VoiceRecording>, RepositoryError> {
        let row: Option<RecordingRow> =
            sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(VoiceRecording::try_from).transpose()
    }

    async fn save(&self, recording: NewRecording) -> Result<VoiceRecording, RepositoryError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO voice_recordings
                (user_id, category, name, cloned_voice_id, is_locked, duration_seconds,
                 audio_url, story_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recording.user_id)
        .bind(recording.category.as_str())
        .bind(&recording.name)
        .bind(&recording.cloned_voice_id)
        .bind(recording.is_locked)
        .bind(recording.duration_seconds)
        .bind(&recording.audio_url)
        .bind(recording.story_id)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(VoiceRecording {
            id: result.last_insert_rowid(),
            user_id: recording.user_id,
            category: recording.category,
            name: recording.name,
            cloned_voice_id: recording.cloned_voice_id,
            is_locked: recording.is_locked,
            duration_seconds: recording.duration_seconds,
            audio_url: recording.audio_url,
            story_id: recording.story_id,
            created_at,
        })
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM voice_recordings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn set_locked(&self, id: i64, locked: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE voice_recordings SET is_locked = ? WHERE id = ?")
            .bind(locked)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("recording {}", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteRecordingRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteRecordingRepository::new(pool)
    }

    fn new_recording(user_id: &str, name: &str, cloned: Option<&str>) -> NewRecording {
        NewRecording {
            user_id: user_id.to_string(),
            category: RecordingCategory::Emotion,
            name: name.to_string(),
            cloned_voice_id: cloned.map(str::to_string),
            is_locked: cloned.is_some(),
            duration_seconds: 2.5,
            audio_url: "http://localhost/audio/recordings/u1/a.wav".to_string(),
            story_id: Some(7),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_user_in_id_order() {
        let repo = repo().await;

        let first = repo.save(new_recording("u1", "joy", Some("v-1"))).await.unwrap();
        repo.save(new_recording("u2", "anger", None)).await.unwrap();
        let third = repo.save(new_recording("u1", "sorrow", None)).await.unwrap();

        let recordings = repo.find_by_user("u1").await.unwrap();
        assert_eq!(recordings.len(), 2);
        assert_eq!(recordings[0].id, first.id);
        assert_eq!(recordings[1].id, third.id);
        assert_eq!(recordings[0].cloned_voice_id.as_deref(), Some("v-1"));
        assert!(recordings[0].is_locked);
        assert_eq!(recordings[0].category, RecordingCategory::Emotion);
        assert_eq!(recordings[0].story_id, Some(7));
    }

    #[tokio::test]
    async fn test_set_locked_and_delete() {
        let repo = repo().await;
        let saved = repo.save(new_recording("u1", "joy", None)).await.unwrap();

        repo.set_locked(saved.id, true).await.unwrap();
        assert!(repo.find_by_id(saved.id).await.unwrap().unwrap().is_locked);

        repo.delete(saved.id).await.unwrap();
        assert!(repo.find_by_id(saved.id).await.unwrap().is_none());

        assert!(matches!(
            repo.set_locked(saved.id, false).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
