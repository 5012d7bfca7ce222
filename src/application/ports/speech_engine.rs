//! Speech Engine Ports - 语音合成服务抽象
//!
//! 两类外部服务:
//! - 通用合成：非个性化音色，按情绪调节角色和语速
//! - 声音克隆：按克隆音色 ID 合成用户自己的声音

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::AudioFormat;

/// 合成错误
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),
}

/// 通用合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本
    pub text: String,
    /// 情绪标签
    pub emotion: String,
    /// 音色角色
    pub persona: String,
    /// 语速倍率（0.5 - 2.0）
    pub rate: f32,
}

/// 合成得到的音频
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
}

/// 通用合成服务
#[async_trait]
pub trait GenericSpeechPort: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}

/// 声音克隆服务
#[async_trait]
pub trait VoiceClonePort: Send + Sync {
    async fn synthesize_with_voice(
        &self,
        voice_id: &str,
        text: &str,
    ) -> Result<SpeechAudio, SpeechError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
