//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::recording::VoiceRecording;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Narration DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateNarrationRequest {
    #[serde(alias = "storyId")]
    pub story_id: i64,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub content: String,
    pub segments: Vec<String>,
    #[serde(default, alias = "conversationStyle")]
    pub conversation_style: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetNarrationRequest {
    #[serde(alias = "storyId")]
    pub story_id: i64,
    #[serde(alias = "userId")]
    pub user_id: String,
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectVoiceRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default)]
    pub modulation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryVoiceResponse {
    pub category: String,
    pub voice_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmotionSampleRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(default, alias = "storyId")]
    pub story_id: Option<i64>,
    pub emotion: String,
    #[serde(default)]
    pub intensity: Option<u8>,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EmotionSampleResponseDto {
    pub audio_url: String,
    pub text: String,
    pub persona: String,
    pub rate: f32,
}

// ============================================================================
// Recording DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListRecordingsRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecordingRequest {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LockRecordingRequest {
    pub id: i64,
    pub locked: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    pub name: String,
    pub cloned_voice_id: Option<String>,
    pub is_locked: bool,
    pub duration_seconds: f64,
    pub audio_url: String,
    pub story_id: Option<i64>,
    pub created_at: String,
}

impl From<VoiceRecording> for RecordingResponse {
    fn from(r: VoiceRecording) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            category: r.category.as_str().to_string(),
            name: r.name,
            cloned_voice_id: r.cloned_voice_id,
            is_locked: r.is_locked,
            duration_seconds: r.duration_seconds,
            audio_url: r.audio_url,
            story_id: r.story_id,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}
