//! Narration HTTP Handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::{GenerateNarration, GetNarration};
use crate::domain::narration::NarrationResult;
use crate::infrastructure::http::dto::{ApiResponse, GenerateNarrationRequest, GetNarrationRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize)]
pub struct NarrationRecordResponse {
    pub story_id: i64,
    pub user_id: String,
    pub conversation_style: String,
    pub result: NarrationResult,
    pub created_at: String,
}

/// 生成旁白
///
/// 部分或全部段落失败时仍返回 errno=0，结果详情在 data 中
pub async fn generate_narration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateNarrationRequest>,
) -> Result<Json<ApiResponse<NarrationResult>>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }

    let command = GenerateNarration {
        story_id: req.story_id,
        user_id: req.user_id,
        content: req.content,
        segments: req.segments,
        conversation_style: req.conversation_style,
    };

    let result = state.generate_narration_handler.handle(command).await;

    Ok(Json(ApiResponse::success(result)))
}

/// 获取最近一次旁白结果
pub async fn get_narration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GetNarrationRequest>,
) -> Result<Json<ApiResponse<NarrationRecordResponse>>, ApiError> {
    let record = state
        .get_narration_handler
        .handle(GetNarration {
            story_id: req.story_id,
            user_id: req.user_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(NarrationRecordResponse {
        story_id: record.story_id,
        user_id: record.user_id,
        conversation_style: record.conversation_style,
        result: record.result,
        created_at: record.created_at.to_rfc3339(),
    })))
}
