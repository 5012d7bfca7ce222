//! Recording Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("无效的录音分类: {0}")]
    InvalidCategory(String),

    #[error("无效的录音名称: {0}")]
    InvalidName(String),

    #[error("录音已锁定: {0}")]
    Locked(i64),
}
