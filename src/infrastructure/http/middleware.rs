//! HTTP Middleware
//!
//! 请求结果日志：业务 errno、HTTP 错误状态、静态音频缺失

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use super::error::ApiErrno;

/// 静态音频挂载前缀
pub const AUDIO_PREFIX: &str = "/audio/";

/// 日志用的路由名：优先取匹配到的路由模板，避免把用户 ID 等路径参数写进字段
fn route_label(request: &Request) -> String {
    let path = request.uri().path();
    if path.starts_with(AUDIO_PREFIX) {
        return "/audio".to_string();
    }
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// 请求结果日志中间件
///
/// - 业务错误返回 HTTP 200 + errno，从响应扩展 `ApiErrno` 读取
/// - 4xx / 5xx 按级别记录
/// - 旁白结果里的音频 URL 指向 `/audio`，这里的 404 单独记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = route_label(&request);
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Some(ApiErrno(errno)) = response.extensions().get::<ApiErrno>() {
        tracing::warn!(
            method = %method,
            route = %route,
            errno,
            elapsed_ms,
            "API request returned error envelope"
        );
    } else if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if route == "/audio" && status.as_u16() == 404 {
        tracing::warn!(uri = %uri, "Narration audio file not found");
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            route = %route,
            status = %status.as_u16(),
            "HTTP client error"
        );
    } else {
        tracing::debug!(method = %method, route = %route, elapsed_ms, "Request completed");
    }

    response
}
