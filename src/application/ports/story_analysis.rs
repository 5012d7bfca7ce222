//! Story Analysis Port - 故事分析数据来源
//!
//! 情绪/音效/氛围的抽取由外部服务完成，这里只定义读取接口

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::narration::StoryAnalysis;

/// 分析获取错误
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

/// Story Analysis Port
#[async_trait]
pub trait StoryAnalysisPort: Send + Sync {
    /// 获取故事分析结果
    async fn analyze(&self, content: &str, user_id: &str) -> Result<StoryAnalysis, AnalysisError>;
}
