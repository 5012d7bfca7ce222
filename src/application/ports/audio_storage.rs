//! Audio Storage Port - 出站端口
//!
//! 音频产物的对象/文件存储，路径均相对存储根目录

use async_trait::async_trait;
use thiserror::Error;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 已写入的音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAudio {
    /// 相对路径
    pub path: String,
    /// 对外访问 URL
    pub url: String,
}

/// Audio Storage Port
///
/// 每个路径只写一次，之后不再修改
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 写入音频，自动创建父目录
    async fn write(&self, path: &str, data: &[u8]) -> Result<StoredAudio, AudioStorageError>;

    /// 列出目录下的文件名，目录不存在时返回空列表
    async fn list(&self, directory: &str) -> Result<Vec<String>, AudioStorageError>;

    /// 删除文件，不存在时忽略
    async fn delete(&self, path: &str) -> Result<(), AudioStorageError>;

    /// 相对路径对应的访问 URL
    fn url_for(&self, path: &str) -> String;
}
