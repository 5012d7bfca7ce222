//! HTTP Voice Clone Client - 调用外部声音克隆服务
//!
//! 外部 API:
//! POST {base_url}/api/voices/{voice_id}/synthesize
//! Request: {"text": "..."}  (JSON)
//! Response: 音频二进制；404 表示克隆音色不存在

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use super::http_tts_client::{build_client, map_send_error, read_audio};
use crate::application::ports::{SpeechAudio, SpeechError, VoiceClonePort};
use crate::domain::recording::AudioFormat;

#[derive(Debug, Serialize)]
struct CloneHttpRequest<'a> {
    text: &'a str,
}

/// 声音克隆客户端配置
#[derive(Debug, Clone)]
pub struct HttpVoiceCloneClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for HttpVoiceCloneClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 120,
            api_key: None,
        }
    }
}

/// 声音克隆 HTTP 客户端
pub struct HttpVoiceCloneClient {
    client: Client,
    config: HttpVoiceCloneClientConfig,
}

impl HttpVoiceCloneClient {
    pub fn new(config: HttpVoiceCloneClientConfig) -> Result<Self, SpeechError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    fn synthesize_url(&self, voice_id: &str) -> String {
        format!(
            "{}/api/voices/{}/synthesize",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        )
    }
}

#[async_trait]
impl VoiceClonePort for HttpVoiceCloneClient {
    async fn synthesize_with_voice(
        &self,
        voice_id: &str,
        text: &str,
    ) -> Result<SpeechAudio, SpeechError> {
        tracing::debug!(
            voice_id = %voice_id,
            text_len = text.len(),
            "Sending voice clone synthesis request"
        );

        let mut builder = self
            .client
            .post(self.synthesize_url(voice_id))
            .json(&CloneHttpRequest { text });
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, "voice clone service"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SpeechError::VoiceNotFound(voice_id.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio = read_audio(response, AudioFormat::Mp3).await?;

        tracing::info!(
            voice_id = %voice_id,
            audio_size = audio.audio_data.len(),
            "Voice clone synthesis completed"
        );

        Ok(audio)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));
        match self
            .client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
