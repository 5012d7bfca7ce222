//! HTTP Story Analysis Client - 调用外部故事分析服务
//!
//! 外部 API:
//! POST {base_url}/api/analyze
//! Request: {"content": "...", "user_id": "..."}  (JSON)
//! Response: {"emotions": [...], "soundEffects": [...], "moodCategory": "...", "genre": "..."}
//! （也接受 snake_case 字段名）

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{AnalysisError, StoryAnalysisPort};
use crate::domain::narration::StoryAnalysis;

#[derive(Debug, Serialize)]
struct AnalyzeHttpRequest<'a> {
    content: &'a str,
    user_id: &'a str,
}

/// 分析服务客户端配置
#[derive(Debug, Clone)]
pub struct HttpAnalysisClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpAnalysisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout_secs: 60,
        }
    }
}

/// 故事分析 HTTP 客户端
pub struct HttpStoryAnalysisClient {
    client: Client,
    config: HttpAnalysisClientConfig,
}

impl HttpStoryAnalysisClient {
    pub fn new(config: HttpAnalysisClientConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl StoryAnalysisPort for HttpStoryAnalysisClient {
    async fn analyze(&self, content: &str, user_id: &str) -> Result<StoryAnalysis, AnalysisError> {
        tracing::debug!(
            url = %self.analyze_url(),
            content_len = content.len(),
            user_id = %user_id,
            "Requesting story analysis"
        );

        let response = self
            .client
            .post(self.analyze_url())
            .json(&AnalyzeHttpRequest { content, user_id })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout
                } else {
                    AnalysisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let analysis: StoryAnalysis = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            emotions = analysis.emotions.len(),
            sounds = analysis.sounds.len(),
            mood = ?analysis.mood_category,
            "Story analysis received"
        );

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::narration::{detect_context, SubstringMatcher};

    #[test]
    fn test_analyze_url() {
        let client = HttpStoryAnalysisClient::new(HttpAnalysisClientConfig {
            base_url: "http://analysis:8002/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.analyze_url(), "http://analysis:8002/api/analyze");
    }

    #[test]
    fn test_response_accepts_sound_effects_alias() {
        let body = r#"{
            "emotions": [{"label": "joy", "quote": "she laughed", "intensity": 8}],
            "sound_effects": [{"label": "thunder", "context": "storm rolled in"}],
            "genre": "fantasy"
        }"#;
        let analysis: StoryAnalysis = serde_json::from_str(body).unwrap();
        assert_eq!(analysis.emotions[0].intensity, Some(8));
        assert_eq!(analysis.sounds[0].label, "thunder");
        assert!(analysis.mood_category.is_none());
        assert_eq!(analysis.genre.as_deref(), Some("fantasy"));
    }

    #[test]
    fn test_response_accepts_camel_case_fields() {
        let body = r#"{
            "emotions": [],
            "soundEffects": [{"label": "thunder", "quote": "crack", "context": "storm"}],
            "moodCategory": "suspense",
            "genre": "mystery"
        }"#;
        let analysis: StoryAnalysis = serde_json::from_str(body).unwrap();
        assert_eq!(analysis.sounds.len(), 1);
        assert_eq!(analysis.mood_category.as_deref(), Some("suspense"));

        let ctx = detect_context(
            "A crack of thunder in the storm",
            Some(&analysis),
            &SubstringMatcher,
        );
        assert_eq!(ctx.primary_sound.as_deref(), Some("thunder"));
        assert_eq!(ctx.primary_modulation.as_deref(), Some("suspense"));
    }

    #[test]
    fn test_fractional_intensity_is_rounded_not_rejected() {
        let body = r#"{
            "emotions": [
                {"label": "joy", "quote": "smiled", "intensity": 7.5},
                {"label": "fear", "quote": "froze", "intensity": 14},
                {"label": "calm", "quote": "rested", "intensity": null}
            ]
        }"#;
        let analysis: StoryAnalysis = serde_json::from_str(body).unwrap();
        assert_eq!(analysis.emotions[0].intensity, Some(8));
        assert_eq!(analysis.emotions[1].intensity, Some(10));
        assert_eq!(analysis.emotions[2].intensity, None);
    }
}
