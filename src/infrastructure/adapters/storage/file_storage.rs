//! File Storage - 文件系统音频存储实现
//!
//! 实现 AudioStoragePort trait，文件通过 /audio 静态路由对外提供

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::application::ports::{AudioStorageError, AudioStoragePort, StoredAudio};

/// 文件系统音频存储
pub struct FileAudioStorage {
    /// 存储根目录
    base_dir: PathBuf,
    /// 对外访问前缀，如 http://localhost:5060/audio
    public_base_url: String,
}

impl FileAudioStorage {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, AudioStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_dir,
            public_base_url,
        })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 相对路径 -> 绝对路径，拒绝越出根目录的路径
    fn resolve(&self, path: &str) -> Result<PathBuf, AudioStorageError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(AudioStorageError::InvalidPath(path.to_string()));
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl AudioStoragePort for FileAudioStorage {
    async fn write(&self, path: &str, data: &[u8]) -> Result<StoredAudio, AudioStorageError> {
        let full_path = self.resolve(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AudioStorageError::IoError(e.to_string()))?;
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?;

        tracing::debug!(path = %path, size = data.len(), "Saved audio");

        Ok(StoredAudio {
            path: path.to_string(),
            url: self.url_for(path),
        })
    }

    async fn list(&self, directory: &str) -> Result<Vec<String>, AudioStorageError> {
        let dir = self.resolve(directory)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AudioStorageError::IoError(e.to_string())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AudioStorageError::IoError(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        Ok(names)
    }

    async fn delete(&self, path: &str) -> Result<(), AudioStorageError> {
        let full_path = self.resolve(path)?;

        match fs::remove_file(&full_path).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Deleted audio");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AudioStorageError::IoError(e.to_string())),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }
}
