//! Recording Context - VoiceRecording 实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordingCategory, RecordingError};

/// 用户的一条声音录音
///
/// 不变量:
/// - name 非空，最长 100 字符
/// - 锁定后除显式恢复操作外不可修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRecording {
    pub id: i64,
    pub user_id: String,
    pub category: RecordingCategory,
    /// 标签，例如 "joy"
    pub name: String,
    /// 声音克隆服务中的音色 ID
    pub cloned_voice_id: Option<String>,
    pub is_locked: bool,
    pub duration_seconds: f64,
    pub audio_url: String,
    pub story_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl VoiceRecording {
    /// 校验录音名称
    pub fn validate_name(name: &str) -> Result<(), RecordingError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RecordingError::InvalidName("名称不能为空".to_string()));
        }
        if trimmed.chars().count() > 100 {
            return Err(RecordingError::InvalidName(
                "名称长度不能超过100字符".to_string(),
            ));
        }
        Ok(())
    }

    /// 非空的克隆音色 ID
    pub fn cloned_voice(&self) -> Option<&str> {
        self.cloned_voice_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// 名称是否与标签匹配（忽略大小写）
    pub fn is_labelled(&self, label: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(label.trim())
    }
}
