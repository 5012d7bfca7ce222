//! Fake Speech Engine - 离线/测试用的语音合成
//!
//! 同时实现通用合成和声音克隆端口，返回固定音频，不访问网络

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{
    GenericSpeechPort, SpeechAudio, SpeechError, SpeechRequest, VoiceClonePort,
};
use crate::domain::recording::AudioFormat;

/// Fake 引擎配置
#[derive(Debug, Clone)]
pub struct FakeSpeechEngineConfig {
    /// 固定返回的音频数据
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
    /// 文本包含其中任一片段时返回错误
    pub fail_texts: Vec<String>,
    /// 模拟推理延迟（毫秒）
    pub delay_ms: u64,
}

impl Default for FakeSpeechEngineConfig {
    fn default() -> Self {
        Self {
            audio_data: b"ID3fake-audio".to_vec(),
            format: AudioFormat::Mp3,
            fail_texts: Vec::new(),
            delay_ms: 0,
        }
    }
}

/// Fake 语音引擎
pub struct FakeSpeechEngine {
    config: FakeSpeechEngineConfig,
    generic_calls: AtomicUsize,
    clone_calls: AtomicUsize,
}

impl FakeSpeechEngine {
    pub fn new(config: FakeSpeechEngineConfig) -> Self {
        tracing::info!(
            audio_size = config.audio_data.len(),
            fail_texts = config.fail_texts.len(),
            "FakeSpeechEngine initialized"
        );
        Self {
            config,
            generic_calls: AtomicUsize::new(0),
            clone_calls: AtomicUsize::new(0),
        }
    }

    pub fn generic_calls(&self) -> usize {
        self.generic_calls.load(Ordering::SeqCst)
    }

    pub fn clone_calls(&self) -> usize {
        self.clone_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        if self.config.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.delay_ms)).await;
        }

        if let Some(trigger) = self
            .config
            .fail_texts
            .iter()
            .find(|t| text.contains(t.as_str()))
        {
            return Err(SpeechError::ServiceError(format!(
                "fake failure triggered by '{}'",
                trigger
            )));
        }

        Ok(SpeechAudio {
            audio_data: self.config.audio_data.clone(),
            format: self.config.format,
        })
    }
}

impl Default for FakeSpeechEngine {
    fn default() -> Self {
        Self::new(FakeSpeechEngineConfig::default())
    }
}

#[async_trait]
impl GenericSpeechPort for FakeSpeechEngine {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        self.generic_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = request.text.len(),
            persona = %request.persona,
            "FakeSpeechEngine: generic synthesis"
        );
        self.respond(&request.text).await
    }
}

#[async_trait]
impl VoiceClonePort for FakeSpeechEngine {
    async fn synthesize_with_voice(
        &self,
        voice_id: &str,
        text: &str,
    ) -> Result<SpeechAudio, SpeechError> {
        self.clone_calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            text_len = text.len(),
            voice_id = %voice_id,
            "FakeSpeechEngine: voice clone synthesis"
        );
        self.respond(text).await
    }
}
