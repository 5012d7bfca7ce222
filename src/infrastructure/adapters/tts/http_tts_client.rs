//! HTTP Speech Client - 调用外部通用语音合成服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/synthesize
//! Request: {"text": "...", "voice": "nova", "emotion": "joy", "speed": 1.1}  (JSON)
//! Response: 音频二进制，格式由 Content-Type 决定

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{GenericSpeechPort, SpeechAudio, SpeechError, SpeechRequest};
use crate::domain::recording::AudioFormat;

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SynthesizeHttpRequest<'a> {
    text: &'a str,
    voice: &'a str,
    emotion: &'a str,
    speed: f32,
}

/// HTTP 语音客户端配置
#[derive(Debug, Clone)]
pub struct HttpSpeechClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 可选的 Bearer Token
    pub api_key: Option<String>,
}

impl Default for HttpSpeechClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            api_key: None,
        }
    }
}

impl HttpSpeechClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }
}

/// 构建带超时的 reqwest 客户端
pub(super) fn build_client(timeout_secs: u64) -> Result<Client, SpeechError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SpeechError::NetworkError(e.to_string()))
}

/// reqwest 发送错误 -> SpeechError
pub(super) fn map_send_error(e: reqwest::Error, service: &str) -> SpeechError {
    if e.is_timeout() {
        SpeechError::Timeout
    } else if e.is_connect() {
        SpeechError::NetworkError(format!("Cannot connect to {}: {}", service, e))
    } else {
        SpeechError::NetworkError(e.to_string())
    }
}

/// 读取音频响应体，格式从 Content-Type 推断，无法识别时用 fallback
pub(super) async fn read_audio(
    response: Response,
    fallback: AudioFormat,
) -> Result<SpeechAudio, SpeechError> {
    let format = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(AudioFormat::from_content_type)
        .unwrap_or(fallback);

    let audio_data = response
        .bytes()
        .await
        .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {}", e)))?
        .to_vec();

    Ok(SpeechAudio { audio_data, format })
}

/// 通用语音合成 HTTP 客户端
pub struct HttpSpeechClient {
    client: Client,
    config: HttpSpeechClientConfig,
}

impl HttpSpeechClient {
    pub fn new(config: HttpSpeechClientConfig) -> Result<Self, SpeechError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    fn synthesize_url(&self) -> String {
        format!("{}/api/tts/synthesize", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenericSpeechPort for HttpSpeechClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        let body = SynthesizeHttpRequest {
            text: &request.text,
            voice: &request.persona,
            emotion: &request.emotion,
            speed: request.rate,
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            text_len = request.text.len(),
            voice = %request.persona,
            emotion = %request.emotion,
            speed = request.rate,
            "Sending generic synthesis request"
        );

        let mut builder = self.client.post(self.synthesize_url()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, "TTS service"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio = read_audio(response, AudioFormat::Mp3).await?;

        tracing::info!(
            voice = %request.persona,
            format = audio.format.extension(),
            audio_size = audio.audio_data.len(),
            "Generic synthesis completed"
        );

        Ok(audio)
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpSpeechClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = HttpSpeechClientConfig::new("http://example.com:9000/")
            .with_timeout(60)
            .with_api_key(Some(String::new()));
        assert_eq!(config.timeout_secs, 60);
        assert!(config.api_key.is_none());

        let client = HttpSpeechClient::new(config).unwrap();
        assert_eq!(client.synthesize_url(), "http://example.com:9000/api/tts/synthesize");
    }
}
