//! Recording HTTP Handlers

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{DeleteRecording, ListRecordings, RegisterRecording, SetRecordingLock};
use crate::domain::narration::sanitize_component;
use crate::domain::recording::{AudioFormat, RecordingCategory, RecordingError};
use crate::infrastructure::http::dto::{
    ApiResponse, DeleteRecordingRequest, Empty, ListRecordingsRequest, LockRecordingRequest,
    RecordingResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

fn text_field_error(name: &'static str) -> impl FnOnce(MultipartError) -> ApiError {
    move |e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e))
}

/// 上传录音
///
/// multipart 字段: user_id, category, name, file, 可选 cloned_voice_id / duration_seconds / story_id
pub async fn upload_recording(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<RecordingResponse>>, ApiError> {
    let mut user_id: Option<String> = None;
    let mut category: Option<RecordingCategory> = None;
    let mut name: Option<String> = None;
    let mut cloned_voice_id: Option<String> = None;
    let mut duration_seconds = 0.0_f64;
    let mut story_id: Option<i64> = None;
    let mut audio_data: Option<Vec<u8>> = None;
    let mut audio_format: Option<AudioFormat> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "user_id" => user_id = Some(field.text().await.map_err(text_field_error("user_id"))?),
            "name" => name = Some(field.text().await.map_err(text_field_error("name"))?),
            "cloned_voice_id" => {
                cloned_voice_id = Some(field.text().await.map_err(text_field_error("cloned_voice_id"))?)
            }
            "category" => {
                let raw = field.text().await.map_err(text_field_error("category"))?;
                category = Some(
                    raw.parse()
                        .map_err(|e: RecordingError| ApiError::BadRequest(e.to_string()))?,
                );
            }
            "duration_seconds" => {
                let raw = field.text().await.map_err(text_field_error("duration_seconds"))?;
                duration_seconds = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid duration: {}", raw)))?;
            }
            "story_id" => {
                let raw = field.text().await.map_err(text_field_error("story_id"))?;
                if !raw.trim().is_empty() {
                    story_id = Some(
                        raw.trim()
                            .parse()
                            .map_err(|_| ApiError::BadRequest(format!("Invalid story_id: {}", raw)))?,
                    );
                }
            }
            "file" => {
                audio_format = field
                    .file_name()
                    .and_then(|f| PathBuf::from(f).extension().map(|e| e.to_string_lossy().to_string()))
                    .and_then(|ext| AudioFormat::from_extension(&ext));

                // 验证音频格式
                if audio_format.is_none() {
                    return Err(ApiError::BadRequest(
                        "Only WAV, MP3, FLAC, OGG audio files are allowed".to_string(),
                    ));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                if bytes.len() > state.max_upload_size {
                    return Err(ApiError::BadRequest(format!(
                        "Audio file exceeds {} bytes",
                        state.max_upload_size
                    )));
                }
                audio_data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let user_id = user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))?;
    let category = category.ok_or_else(|| ApiError::BadRequest("category is required".to_string()))?;
    let name = name.ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let audio_data =
        audio_data.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;
    let audio_format = audio_format.unwrap_or_default();

    // 保存音频文件
    let path = format!(
        "recordings/{}/{}.{}",
        sanitize_component(&user_id),
        Uuid::new_v4().simple(),
        audio_format.extension()
    );
    let stored = state.audio_storage.write(&path, &audio_data).await?;

    let command = RegisterRecording {
        user_id,
        category,
        name,
        cloned_voice_id,
        duration_seconds,
        audio_url: stored.url,
        story_id,
    };

    let recording = match state.register_recording_handler.handle(command).await {
        Ok(recording) => recording,
        Err(e) => {
            // 登记失败时清理已写入的文件
            if let Err(cleanup) = state.audio_storage.delete(&stored.path).await {
                tracing::warn!(path = %stored.path, error = %cleanup, "Failed to remove orphaned recording file");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        recording_id = recording.id,
        user_id = %recording.user_id,
        size = audio_data.len(),
        "Recording uploaded"
    );

    Ok(Json(ApiResponse::success(recording.into())))
}

/// 列出用户录音
pub async fn list_recordings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListRecordingsRequest>,
) -> Result<Json<ApiResponse<Vec<RecordingResponse>>>, ApiError> {
    let recordings = state
        .list_recordings_handler
        .handle(ListRecordings {
            user_id: req.user_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        recordings.into_iter().map(RecordingResponse::from).collect(),
    )))
}

/// 删除录音（锁定的录音不可删除）
pub async fn delete_recording(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteRecordingRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let recording = state
        .delete_recording_handler
        .handle(DeleteRecording {
            recording_id: req.id,
        })
        .await?;

    // 只清理本服务存储的文件
    let prefix = state.audio_storage.url_for("");
    if let Some(path) = recording.audio_url.strip_prefix(&prefix) {
        if let Err(e) = state.audio_storage.delete(path).await {
            tracing::warn!(recording_id = recording.id, error = %e, "Failed to delete recording file");
        }
    }

    Ok(Json(ApiResponse::ok()))
}

/// 锁定/解锁录音
pub async fn lock_recording(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LockRecordingRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .set_recording_lock_handler
        .handle(SetRecordingLock {
            recording_id: req.id,
            locked: req.locked,
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
