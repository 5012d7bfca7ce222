//! Segment Audio Generator - 段落音频生成
//!
//! 通用音色走通用合成服务（按情绪调节角色和语速），
//! 个性化音色走声音克隆服务。克隆失败直接返回错误，不在这里替换为通用音色，
//! 是否跳过由调用方决定。

use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::{
    AudioStorageError, AudioStoragePort, GenericSpeechPort, SpeechAudio, SpeechError,
    SpeechRequest, VoiceClonePort,
};
use crate::domain::narration::{
    generic_segment_label, narrator_profile, segment_label, AudioPathKey, Prosody, SegmentContext,
    VoiceSelection, VoiceSelectionType,
};

/// 段落生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Segment text is empty")]
    EmptyText,

    #[error("Voice selection {0} has no voice id")]
    MissingVoiceId(VoiceSelectionType),

    #[error("Generic synthesis failed: {0}")]
    Generic(#[source] SpeechError),

    #[error("Voice clone synthesis failed for voice {voice_id}: {source}")]
    VoiceClone {
        voice_id: String,
        #[source]
        source: SpeechError,
    },

    #[error("Provider returned empty audio")]
    EmptyAudio,

    #[error("Storage error: {0}")]
    Storage(#[from] AudioStorageError),
}

/// 生成器配置
#[derive(Debug, Clone)]
pub struct SegmentAudioConfig {
    /// 生成前是否按标签前缀复用已有产物
    pub reuse_cached_audio: bool,
}

impl Default for SegmentAudioConfig {
    fn default() -> Self {
        Self {
            reuse_cached_audio: true,
        }
    }
}

/// 单个段落的生成任务
#[derive(Debug, Clone, Copy)]
pub struct SegmentJob<'a> {
    pub user_id: &'a str,
    pub story_id: i64,
    pub conversation_style: &'a str,
    pub segment_index: usize,
    pub text: &'a str,
    pub context: &'a SegmentContext,
    pub selection: &'a VoiceSelection,
}

impl SegmentJob<'_> {
    fn path_key(&self) -> AudioPathKey {
        let emotion = self.context.primary_emotion.as_deref();
        let label = if self.selection.is_personalized() {
            segment_label(emotion, self.text)
        } else {
            generic_segment_label(emotion, self.context.emotion_intensity, self.text)
        };
        AudioPathKey::new(
            self.user_id,
            self.story_id,
            self.conversation_style,
            narrator_profile(self.selection),
            label,
        )
    }
}

/// 生成成功的音频
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAudio {
    pub path: String,
    pub audio_url: String,
    /// 复用了历史产物，未调用外部服务
    pub cached: bool,
}

/// 段落音频生成器
pub struct SegmentAudioGenerator {
    config: SegmentAudioConfig,
    generic: Arc<dyn GenericSpeechPort>,
    voice_clone: Arc<dyn VoiceClonePort>,
    storage: Arc<dyn AudioStoragePort>,
}

impl SegmentAudioGenerator {
    pub fn new(
        config: SegmentAudioConfig,
        generic: Arc<dyn GenericSpeechPort>,
        voice_clone: Arc<dyn VoiceClonePort>,
        storage: Arc<dyn AudioStoragePort>,
    ) -> Self {
        Self {
            config,
            generic,
            voice_clone,
            storage,
        }
    }

    /// 生成段落音频
    pub async fn generate(&self, job: SegmentJob<'_>) -> Result<GeneratedAudio, GenerationError> {
        if job.text.trim().is_empty() {
            return Err(GenerationError::EmptyText);
        }

        let key = job.path_key();

        if self.config.reuse_cached_audio {
            if let Some(cached) = self.lookup_cached(&key).await {
                tracing::debug!(
                    segment_index = job.segment_index,
                    path = %cached.path,
                    "Reusing cached segment audio"
                );
                return Ok(cached);
            }
        }

        let audio = self.synthesize(&job).await?;
        if audio.audio_data.is_empty() {
            return Err(GenerationError::EmptyAudio);
        }

        let path = key.new_path(audio.format);
        let stored = self.storage.write(&path, &audio.audio_data).await?;

        tracing::info!(
            segment_index = job.segment_index,
            voice_type = %job.selection.selection_type,
            path = %stored.path,
            audio_size = audio.audio_data.len(),
            "Segment audio generated"
        );

        Ok(GeneratedAudio {
            path: stored.path,
            audio_url: stored.url,
            cached: false,
        })
    }

    /// 列目录查找同标签的历史产物；列目录失败只记日志，按未命中处理
    async fn lookup_cached(&self, key: &AudioPathKey) -> Option<GeneratedAudio> {
        let directory = key.directory();
        let names = match self.storage.list(&directory).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(directory = %directory, error = %e, "Failed to list audio directory");
                return None;
            }
        };

        key.find_cached(&names).map(|name| {
            let path = format!("{}/{}", directory, name);
            GeneratedAudio {
                audio_url: self.storage.url_for(&path),
                path,
                cached: true,
            }
        })
    }

    async fn synthesize(&self, job: &SegmentJob<'_>) -> Result<SpeechAudio, GenerationError> {
        if !job.selection.is_personalized() {
            let prosody = Prosody::for_emotion(
                job.context.primary_emotion.as_deref(),
                job.context.emotion_intensity,
            );
            let request = SpeechRequest {
                text: job.text.to_string(),
                emotion: prosody.emotion,
                persona: prosody.persona,
                rate: prosody.rate,
            };
            return self
                .generic
                .synthesize(request)
                .await
                .map_err(GenerationError::Generic);
        }

        let voice_id = job
            .selection
            .voice_id
            .as_deref()
            .ok_or(GenerationError::MissingVoiceId(job.selection.selection_type))?;

        self.voice_clone
            .synthesize_with_voice(voice_id, job.text)
            .await
            .map_err(|source| GenerationError::VoiceClone {
                voice_id: voice_id.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{FakeSpeechEngine, FakeSpeechEngineConfig, FileAudioStorage};
    use tempfile::tempdir;

    struct Fixture {
        _dir: tempfile::TempDir,
        engine: Arc<FakeSpeechEngine>,
        generator: SegmentAudioGenerator,
    }

    async fn fixture(config: FakeSpeechEngineConfig, reuse: bool) -> Fixture {
        let dir = tempdir().unwrap();
        let storage = Arc::new(
            FileAudioStorage::new(dir.path(), "http://localhost:5060/audio")
                .await
                .unwrap(),
        );
        let engine = Arc::new(FakeSpeechEngine::new(config));
        let generator = SegmentAudioGenerator::new(
            SegmentAudioConfig {
                reuse_cached_audio: reuse,
            },
            engine.clone(),
            engine.clone(),
            storage,
        );
        Fixture {
            _dir: dir,
            engine,
            generator,
        }
    }

    fn job<'a>(
        text: &'a str,
        context: &'a SegmentContext,
        selection: &'a VoiceSelection,
    ) -> SegmentJob<'a> {
        SegmentJob {
            user_id: "user-1",
            story_id: 11,
            conversation_style: "narrative",
            segment_index: 0,
            text,
            context,
            selection,
        }
    }

    #[tokio::test]
    async fn test_generic_voice_path() {
        let f = fixture(FakeSpeechEngineConfig::default(), false).await;
        let ctx = SegmentContext::default().with_emotion("joy");
        let selection = VoiceSelection::generic();

        let audio = f.generator.generate(job("Hello world", &ctx, &selection)).await.unwrap();
        assert!(!audio.cached);
        assert!(audio.path.starts_with("narrations/user-1/11/narrative/generic/joy-"));
        assert!(audio.audio_url.starts_with("http://localhost:5060/audio/narrations/"));
        assert_eq!(f.engine.generic_calls(), 1);
        assert_eq!(f.engine.clone_calls(), 0);
    }

    #[tokio::test]
    async fn test_clone_voice_path() {
        let f = fixture(FakeSpeechEngineConfig::default(), false).await;
        let ctx = SegmentContext::default();
        let selection = VoiceSelection::combined("voice-7");

        let audio = f.generator.generate(job("Hello world", &ctx, &selection)).await.unwrap();
        assert!(audio.path.contains("/voice-7/neutral-"));
        assert_eq!(f.engine.clone_calls(), 1);
        assert_eq!(f.engine.generic_calls(), 0);
    }

    #[tokio::test]
    async fn test_clone_failure_is_not_substituted() {
        let config = FakeSpeechEngineConfig {
            fail_texts: vec!["boom".to_string()],
            ..Default::default()
        };
        let f = fixture(config, false).await;
        let ctx = SegmentContext::default();
        let selection = VoiceSelection::combined("voice-7");

        let err = f
            .generator
            .generate(job("boom goes the segment", &ctx, &selection))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::VoiceClone { ref voice_id, .. } if voice_id == "voice-7"));
        assert_eq!(f.engine.generic_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_voice_id() {
        let f = fixture(FakeSpeechEngineConfig::default(), false).await;
        let ctx = SegmentContext::default();
        let mut selection = VoiceSelection::combined("x");
        selection.voice_id = None;

        let err = f.generator.generate(job("text", &ctx, &selection)).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingVoiceId(VoiceSelectionType::CombinedVoice)));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let f = fixture(FakeSpeechEngineConfig::default(), false).await;
        let ctx = SegmentContext::default();
        let selection = VoiceSelection::generic();
        let err = f.generator.generate(job("   ", &ctx, &selection)).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyText));
        assert_eq!(f.engine.generic_calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_audio_reused() {
        let f = fixture(FakeSpeechEngineConfig::default(), true).await;
        let ctx = SegmentContext::default().with_emotion("sorrow");
        let selection = VoiceSelection::generic();

        let first = f.generator.generate(job("Rain again", &ctx, &selection)).await.unwrap();
        let second = f.generator.generate(job("Rain again", &ctx, &selection)).await.unwrap();
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.path, second.path);
        assert_eq!(f.engine.generic_calls(), 1);

        // 文本不同则不命中
        let third = f.generator.generate(job("Sun again", &ctx, &selection)).await.unwrap();
        assert!(!third.cached);
        assert_eq!(f.engine.generic_calls(), 2);
    }

    #[tokio::test]
    async fn test_generic_cache_keyed_by_intensity() {
        let f = fixture(FakeSpeechEngineConfig::default(), true).await;
        let selection = VoiceSelection::generic();
        let mut calm = SegmentContext::default().with_emotion("anger");
        calm.emotion_intensity = Some(2);
        let mut furious = calm.clone();
        furious.emotion_intensity = Some(9);

        let first = f.generator.generate(job("Get out", &calm, &selection)).await.unwrap();
        let second = f.generator.generate(job("Get out", &furious, &selection)).await.unwrap();
        assert!(!second.cached);
        assert_ne!(first.path, second.path);
        assert_eq!(f.engine.generic_calls(), 2);

        let again = f.generator.generate(job("Get out", &furious, &selection)).await.unwrap();
        assert!(again.cached);
        assert_eq!(again.path, second.path);
    }

    #[tokio::test]
    async fn test_clone_cache_not_shared_across_voice_ids() {
        let f = fixture(FakeSpeechEngineConfig::default(), true).await;
        let ctx = SegmentContext::default().with_emotion("joy");
        let underscored = VoiceSelection::combined("voice_1");
        let dashed = VoiceSelection::combined("voice-1");

        let first = f.generator.generate(job("Hello", &ctx, &underscored)).await.unwrap();
        let second = f.generator.generate(job("Hello", &ctx, &dashed)).await.unwrap();
        assert!(!second.cached);
        assert_ne!(first.path, second.path);
        assert_eq!(f.engine.clone_calls(), 2);
    }
}
