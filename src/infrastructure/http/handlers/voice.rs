//! Voice HTTP Handlers - 音色选择诊断与情绪样本

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::{GenerateEmotionSample, SelectVoice};
use crate::domain::narration::{SegmentContext, VoiceSelection};
use crate::infrastructure::http::dto::{
    ApiResponse, CategoryVoiceResponse, EmotionSampleRequest, EmotionSampleResponseDto,
    SelectVoiceRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize)]
pub struct SelectVoiceResponse {
    pub selection: VoiceSelection,
    pub total_recordings: usize,
    pub cloned_recordings: usize,
    pub category_voices: Vec<CategoryVoiceResponse>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 给定上下文，返回会被选中的音色
pub async fn select_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectVoiceRequest>,
) -> Result<Json<ApiResponse<SelectVoiceResponse>>, ApiError> {
    let context = SegmentContext {
        primary_emotion: non_blank(req.emotion),
        primary_sound: non_blank(req.sound),
        primary_modulation: non_blank(req.modulation),
        emotion_intensity: None,
    };

    let result = state
        .select_voice_handler
        .handle(SelectVoice {
            user_id: req.user_id,
            context,
        })
        .await?;

    Ok(Json(ApiResponse::success(SelectVoiceResponse {
        selection: result.selection,
        total_recordings: result.total_recordings,
        cloned_recordings: result.cloned_recordings,
        category_voices: result
            .category_voices
            .into_iter()
            .map(|(category, voice_id)| CategoryVoiceResponse {
                category: category.plural().to_string(),
                voice_id,
            })
            .collect(),
    })))
}

/// 用通用音色生成情绪样本
pub async fn generate_sample(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmotionSampleRequest>,
) -> Result<Json<ApiResponse<EmotionSampleResponseDto>>, ApiError> {
    let result = state
        .emotion_sample_handler
        .handle(GenerateEmotionSample {
            user_id: req.user_id,
            story_id: req.story_id,
            emotion: req.emotion,
            intensity: req.intensity,
            text: req.text,
        })
        .await?;

    Ok(Json(ApiResponse::success(EmotionSampleResponseDto {
        audio_url: result.audio_url,
        text: result.text,
        persona: result.persona,
        rate: result.rate,
    })))
}
