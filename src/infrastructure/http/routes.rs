//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                GET   健康检查
//! - /api/narration/generate  POST  生成旁白（逐段选音色并合成）
//! - /api/narration/get       POST  获取最近一次旁白结果
//! - /api/voice/select        POST  音色选择诊断
//! - /api/voice/sample        POST  生成情绪样本
//! - /api/recording/upload    POST  上传录音（multipart）
//! - /api/recording/list      POST  列出用户录音
//! - /api/recording/delete    POST  删除录音
//! - /api/recording/lock      POST  锁定/解锁录音
//! - /audio/*                 GET   音频静态文件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有 API 路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/narration", narration_routes())
        .nest("/voice", voice_routes())
        .nest("/recording", recording_routes())
}

/// Narration 路由
fn narration_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_narration))
        .route("/get", post(handlers::get_narration))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/select", post(handlers::select_voice))
        .route("/sample", post(handlers::generate_sample))
}

/// Recording 路由
fn recording_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload_recording))
        .route("/list", post(handlers::list_recordings))
        .route("/delete", post(handlers::delete_recording))
        .route("/lock", post(handlers::lock_recording))
}
