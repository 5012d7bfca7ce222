//! Narration Command Handlers

use chrono::Utc;
use std::sync::Arc;

use super::segment_audio::{SegmentAudioGenerator, SegmentJob};
use crate::application::commands::{GenerateEmotionSample, GenerateNarration};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioStoragePort, GenericSpeechPort, NarrationRecord, NarrationRepositoryPort,
    RecordingCatalogPort, SpeechRequest, StoryAnalysisPort,
};
use crate::domain::narration::{
    detect_context, frame_sample_text, segment_label, select_voice_with, AudioPathKey,
    ContextMatcher, NarrationAccumulator, NarrationResult, Prosody, SegmentAudioResult,
    SelectionPolicy,
};

// ============================================================================
// GenerateNarration
// ============================================================================

/// GenerateNarration Handler
///
/// 逐段顺序处理：上下文检测 -> 音色选择 -> 音频生成。
/// 单段失败只记录并跳过；目录或分析获取失败则整体失败。
pub struct GenerateNarrationHandler {
    catalog: Arc<dyn RecordingCatalogPort>,
    analysis: Arc<dyn StoryAnalysisPort>,
    generator: Arc<SegmentAudioGenerator>,
    matcher: Arc<dyn ContextMatcher>,
    policy: SelectionPolicy,
    default_conversation_style: String,
    history: Option<Arc<dyn NarrationRepositoryPort>>,
}

impl GenerateNarrationHandler {
    pub fn new(
        catalog: Arc<dyn RecordingCatalogPort>,
        analysis: Arc<dyn StoryAnalysisPort>,
        generator: Arc<SegmentAudioGenerator>,
        matcher: Arc<dyn ContextMatcher>,
        default_conversation_style: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            analysis,
            generator,
            matcher,
            policy: SelectionPolicy::default(),
            default_conversation_style: default_conversation_style.into(),
            history: None,
        }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 记录每次生成的结果，供 GetNarration 查询
    pub fn with_history(mut self, history: Arc<dyn NarrationRepositoryPort>) -> Self {
        self.history = Some(history);
        self
    }

    pub async fn handle(&self, cmd: GenerateNarration) -> NarrationResult {
        let total_segments = cmd.segments.len();
        let conversation_style = cmd
            .conversation_style
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_conversation_style.as_str());

        tracing::info!(
            story_id = cmd.story_id,
            user_id = %cmd.user_id,
            total_segments,
            matcher = self.matcher.name(),
            "Starting narration"
        );

        let catalog = match self.catalog.find_by_user(&cmd.user_id).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(story_id = cmd.story_id, error = %e, "Failed to load recording catalog");
                return NarrationResult::failed(total_segments, e.to_string());
            }
        };

        let analysis = match self.analysis.analyze(&cmd.content, &cmd.user_id).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(story_id = cmd.story_id, error = %e, "Failed to load story analysis");
                return NarrationResult::failed(total_segments, e.to_string());
            }
        };

        let mut acc = NarrationAccumulator::new(total_segments);

        for (segment_index, text) in cmd.segments.iter().enumerate() {
            let context = detect_context(text, Some(&analysis), self.matcher.as_ref());
            let selection = select_voice_with(&self.policy, &context, &catalog);

            let job = SegmentJob {
                user_id: &cmd.user_id,
                story_id: cmd.story_id,
                conversation_style,
                segment_index,
                text,
                context: &context,
                selection: &selection,
            };

            acc = match self.generator.generate(job).await {
                Ok(audio) => acc.push_success(SegmentAudioResult::new(
                    segment_index,
                    audio.audio_url,
                    &selection,
                    audio.cached,
                )),
                Err(e) => {
                    tracing::warn!(
                        story_id = cmd.story_id,
                        segment_index,
                        voice_type = %selection.selection_type,
                        error = %e,
                        "Segment audio generation failed, skipping"
                    );
                    acc.push_failure(segment_index, e.to_string())
                }
            };
        }

        let failed = acc.failures().len();
        let result = acc.finish();

        tracing::info!(
            story_id = cmd.story_id,
            generated = result.audio_files.len(),
            failed,
            total_segments,
            success = result.success,
            "Narration finished"
        );

        if let Some(history) = &self.history {
            let record = NarrationRecord {
                story_id: cmd.story_id,
                user_id: cmd.user_id.clone(),
                conversation_style: conversation_style.to_string(),
                result: result.clone(),
                created_at: Utc::now(),
            };
            // 历史记录写入失败不影响本次结果
            if let Err(e) = history.save(&record).await {
                tracing::warn!(story_id = cmd.story_id, error = %e, "Failed to save narration record");
            }
        }

        result
    }
}

// ============================================================================
// GenerateEmotionSample
// ============================================================================

/// 情绪样本响应
#[derive(Debug, Clone)]
pub struct EmotionSampleResponse {
    pub audio_url: String,
    pub text: String,
    pub persona: String,
    pub rate: f32,
}

/// GenerateEmotionSample Handler
///
/// 用通用音色合成一段简短的情绪样本（引导语 + 截断文本）
pub struct GenerateEmotionSampleHandler {
    generic: Arc<dyn GenericSpeechPort>,
    storage: Arc<dyn AudioStoragePort>,
    max_chars: usize,
}

impl GenerateEmotionSampleHandler {
    pub fn new(
        generic: Arc<dyn GenericSpeechPort>,
        storage: Arc<dyn AudioStoragePort>,
        max_chars: usize,
    ) -> Self {
        Self {
            generic,
            storage,
            max_chars,
        }
    }

    pub async fn handle(
        &self,
        cmd: GenerateEmotionSample,
    ) -> Result<EmotionSampleResponse, ApplicationError> {
        if cmd.text.trim().is_empty() {
            return Err(ApplicationError::validation("Sample text cannot be empty"));
        }
        if let Some(intensity) = cmd.intensity {
            if !(1..=10).contains(&intensity) {
                return Err(ApplicationError::validation(
                    "Intensity must be between 1 and 10",
                ));
            }
        }

        let prosody = Prosody::for_emotion(Some(&cmd.emotion), cmd.intensity);
        let text = frame_sample_text(&prosody.emotion, &cmd.text, self.max_chars);

        let audio = self
            .generic
            .synthesize(SpeechRequest {
                text: text.clone(),
                emotion: prosody.emotion.clone(),
                persona: prosody.persona.clone(),
                rate: prosody.rate,
            })
            .await
            .map_err(|e| ApplicationError::ExternalServiceError(e.to_string()))?;

        let key = AudioPathKey::new(
            &cmd.user_id,
            cmd.story_id.unwrap_or(0),
            "sample",
            &prosody.persona,
            segment_label(Some(&prosody.emotion), &text),
        );
        let stored = self
            .storage
            .write(&key.new_path(audio.format), &audio.audio_data)
            .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            emotion = %prosody.emotion,
            persona = %prosody.persona,
            rate = prosody.rate,
            "Emotion sample generated"
        );

        Ok(EmotionSampleResponse {
            audio_url: stored.url,
            text,
            persona: prosody.persona,
            rate: prosody.rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::SegmentAudioConfig;
    use crate::application::ports::{
        AnalysisError, NewRecording, RepositoryError,
    };
    use crate::domain::narration::{AnalysisEntry, StoryAnalysis, SubstringMatcher, VoiceSelectionType, NO_AUDIO_GENERATED};
    use crate::domain::recording::{RecordingCategory, VoiceRecording};
    use crate::infrastructure::adapters::{FakeSpeechEngine, FakeSpeechEngineConfig, FileAudioStorage};
    use async_trait::async_trait;
    use chrono::Utc;
    use tempfile::{tempdir, TempDir};

    struct StaticCatalog {
        recordings: Vec<VoiceRecording>,
        fail: bool,
    }

    #[async_trait]
    impl RecordingCatalogPort for StaticCatalog {
        async fn find_by_user(&self, _user_id: &str) -> Result<Vec<VoiceRecording>, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::DatabaseError("catalog offline".to_string()));
            }
            Ok(self.recordings.clone())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<VoiceRecording>, RepositoryError> {
            Ok(self.recordings.iter().find(|r| r.id == id).cloned())
        }

        async fn save(&self, _recording: NewRecording) -> Result<VoiceRecording, RepositoryError> {
            Err(RepositoryError::DatabaseError("read only".to_string()))
        }

        async fn delete(&self, _id: i64) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn set_locked(&self, _id: i64, _locked: bool) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    struct StaticAnalysis {
        analysis: StoryAnalysis,
        fail: bool,
    }

    #[async_trait]
    impl StoryAnalysisPort for StaticAnalysis {
        async fn analyze(&self, _content: &str, _user_id: &str) -> Result<StoryAnalysis, AnalysisError> {
            if self.fail {
                return Err(AnalysisError::ServiceError("analysis unavailable".to_string()));
            }
            Ok(self.analysis.clone())
        }
    }

    fn joy_catalog(n: i64) -> Vec<VoiceRecording> {
        (1..=n)
            .map(|id| VoiceRecording {
                id,
                user_id: "user-1".to_string(),
                category: RecordingCategory::Emotion,
                name: "joy".to_string(),
                cloned_voice_id: Some("voice-joy".to_string()),
                is_locked: true,
                duration_seconds: 3.0,
                audio_url: format!("/recordings/{}.wav", id),
                story_id: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    fn analysis() -> StoryAnalysis {
        StoryAnalysis {
            emotions: vec![AnalysisEntry::new("joy", "laughed", "party")],
            sounds: vec![],
            mood_category: None,
            genre: Some("fantasy".to_string()),
        }
    }

    async fn handler(
        catalog: StaticCatalog,
        analysis: StaticAnalysis,
        engine: FakeSpeechEngineConfig,
    ) -> (TempDir, Arc<FakeSpeechEngine>, GenerateNarrationHandler) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(
            FileAudioStorage::new(dir.path(), "http://localhost/audio")
                .await
                .unwrap(),
        );
        let engine = Arc::new(FakeSpeechEngine::new(engine));
        let generator = Arc::new(SegmentAudioGenerator::new(
            SegmentAudioConfig::default(),
            engine.clone(),
            engine.clone(),
            storage,
        ));
        let handler = GenerateNarrationHandler::new(
            Arc::new(catalog),
            Arc::new(analysis),
            generator,
            Arc::new(SubstringMatcher),
            "narrative",
        );
        (dir, engine, handler)
    }

    fn command(segments: &[&str]) -> GenerateNarration {
        GenerateNarration {
            story_id: 3,
            user_id: "user-1".to_string(),
            content: segments.join(" "),
            segments: segments.iter().map(|s| s.to_string()).collect(),
            conversation_style: None,
        }
    }

    fn ok_catalog(n: i64) -> StaticCatalog {
        StaticCatalog {
            recordings: joy_catalog(n),
            fail: false,
        }
    }

    fn ok_analysis() -> StaticAnalysis {
        StaticAnalysis {
            analysis: analysis(),
            fail: false,
        }
    }

    #[tokio::test]
    async fn test_partial_failure_tolerated() {
        let engine = FakeSpeechEngineConfig {
            fail_texts: vec!["third".to_string()],
            ..Default::default()
        };
        let (_dir, _engine, handler) = handler(ok_catalog(0), ok_analysis(), engine).await;

        let result = handler
            .handle(command(&["first", "second", "third", "fourth", "fifth"]))
            .await;

        assert!(result.success);
        assert_eq!(result.audio_files.len(), 4);
        assert_eq!(result.total_segments, 5);
        assert_eq!(result.error, None);
        assert_eq!(result.missing_indices(), vec![2]);
    }

    #[tokio::test]
    async fn test_total_failure_reported() {
        let engine = FakeSpeechEngineConfig {
            fail_texts: vec!["seg".to_string()],
            ..Default::default()
        };
        let (_dir, _engine, handler) = handler(ok_catalog(0), ok_analysis(), engine).await;

        let result = handler.handle(command(&["seg a", "seg b"])).await;
        assert!(!result.success);
        assert!(result.audio_files.is_empty());
        assert_eq!(result.total_segments, 2);
        assert_eq!(result.error.as_deref(), Some(NO_AUDIO_GENERATED));
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts_run() {
        let catalog = StaticCatalog {
            recordings: vec![],
            fail: true,
        };
        let (_dir, engine, handler) =
            handler(catalog, ok_analysis(), FakeSpeechEngineConfig::default()).await;

        let result = handler.handle(command(&["a", "b", "c"])).await;
        assert!(!result.success);
        assert!(result.audio_files.is_empty());
        assert_eq!(result.total_segments, 3);
        assert!(result.error.unwrap().contains("catalog offline"));
        assert_eq!(engine.generic_calls(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_aborts_run() {
        let analysis = StaticAnalysis {
            analysis: StoryAnalysis::default(),
            fail: true,
        };
        let (_dir, _engine, handler) =
            handler(ok_catalog(6), analysis, FakeSpeechEngineConfig::default()).await;

        let result = handler.handle(command(&["a"])).await;
        assert!(!result.success);
        assert_eq!(result.total_segments, 1);
        assert!(result.error.unwrap().contains("analysis unavailable"));
    }

    #[tokio::test]
    async fn test_voice_selected_per_segment() {
        let (_dir, engine, handler) =
            handler(ok_catalog(6), ok_analysis(), FakeSpeechEngineConfig::default()).await;

        let result = handler
            .handle(command(&["Everyone laughed.", "The door creaked."]))
            .await;

        assert!(result.success);
        let first = &result.audio_files[0];
        assert_eq!(first.voice_type, VoiceSelectionType::IndividualEmotion);
        assert_eq!(first.voice_id.as_deref(), Some("voice-joy"));
        assert_eq!(first.emotion.as_deref(), Some("joy"));

        // 第二段没有情绪命中，但 6 条克隆录音满足组合阈值
        let second = &result.audio_files[1];
        assert_eq!(second.voice_type, VoiceSelectionType::CombinedVoice);
        assert_eq!(engine.clone_calls(), 2);
        assert_eq!(engine.generic_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_segments() {
        let (_dir, _engine, handler) =
            handler(ok_catalog(0), ok_analysis(), FakeSpeechEngineConfig::default()).await;
        let result = handler.handle(command(&[])).await;
        assert!(!result.success);
        assert_eq!(result.total_segments, 0);
        assert_eq!(result.error.as_deref(), Some(NO_AUDIO_GENERATED));
    }

    #[tokio::test]
    async fn test_emotion_sample() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FileAudioStorage::new(dir.path(), "http://localhost/audio").await.unwrap());
        let engine = Arc::new(FakeSpeechEngine::new(FakeSpeechEngineConfig::default()));
        let handler = GenerateEmotionSampleHandler::new(engine.clone(), storage, 10);

        let response = handler
            .handle(GenerateEmotionSample {
                user_id: "user-1".to_string(),
                story_id: None,
                emotion: "Joy".to_string(),
                intensity: Some(10),
                text: "A very long sentence indeed".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.text, "With joy: A very lon...");
        assert_eq!(response.persona, "nova");
        assert!(response.audio_url.contains("/narrations/user-1/0/sample/nova/joy-"));
        assert_eq!(engine.generic_calls(), 1);

        let err = handler
            .handle(GenerateEmotionSample {
                user_id: "user-1".to_string(),
                story_id: None,
                emotion: "joy".to_string(),
                intensity: Some(11),
                text: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }
}
