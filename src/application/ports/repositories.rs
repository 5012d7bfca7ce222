//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::narration::NarrationResult;
use crate::domain::recording::{RecordingCategory, VoiceRecording};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Recording Catalog
// ============================================================================

/// 新录音（ID 与创建时间由存储分配）
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub user_id: String,
    pub category: RecordingCategory,
    pub name: String,
    pub cloned_voice_id: Option<String>,
    pub is_locked: bool,
    pub duration_seconds: f64,
    pub audio_url: String,
    pub story_id: Option<i64>,
}

/// Recording Catalog Port
///
/// 一次旁白生成内只读
#[async_trait]
pub trait RecordingCatalogPort: Send + Sync {
    /// 获取用户的全部录音，按 ID 升序
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<VoiceRecording>, RepositoryError>;

    /// 根据 ID 查找录音
    async fn find_by_id(&self, id: i64) -> Result<Option<VoiceRecording>, RepositoryError>;

    /// 保存新录音
    async fn save(&self, recording: NewRecording) -> Result<VoiceRecording, RepositoryError>;

    /// 删除录音
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// 更新锁定状态
    async fn set_locked(&self, id: i64, locked: bool) -> Result<(), RepositoryError>;
}

// ============================================================================
// Narration Repository
// ============================================================================

/// 旁白记录（每个 story + user 保留最近一次结果）
#[derive(Debug, Clone)]
pub struct NarrationRecord {
    pub story_id: i64,
    pub user_id: String,
    pub conversation_style: String,
    pub result: NarrationResult,
    pub created_at: DateTime<Utc>,
}

/// Narration Repository Port
#[async_trait]
pub trait NarrationRepositoryPort: Send + Sync {
    /// 保存（覆盖同一 story + user 的旧记录）
    async fn save(&self, record: &NarrationRecord) -> Result<(), RepositoryError>;

    /// 查找最近一次旁白
    async fn find(
        &self,
        story_id: i64,
        user_id: &str,
    ) -> Result<Option<NarrationRecord>, RepositoryError>;
}
