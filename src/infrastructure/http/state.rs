//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteRecordingHandler, GenerateEmotionSampleHandler, GenerateNarrationHandler,
    RegisterRecordingHandler, SegmentAudioConfig, SegmentAudioGenerator, SetRecordingLockHandler,
    // Query handlers
    GetNarrationHandler, ListRecordingsHandler, SelectVoiceHandler,
    // Ports
    AudioStoragePort, GenericSpeechPort, NarrationRepositoryPort, RecordingCatalogPort,
    StoryAnalysisPort, VoiceClonePort,
};
use crate::config::NarrationConfig;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub audio_storage: Arc<dyn AudioStoragePort>,

    // ========== Command Handlers ==========
    pub generate_narration_handler: GenerateNarrationHandler,
    pub emotion_sample_handler: GenerateEmotionSampleHandler,
    pub register_recording_handler: RegisterRecordingHandler,
    pub delete_recording_handler: DeleteRecordingHandler,
    pub set_recording_lock_handler: SetRecordingLockHandler,

    // ========== Query Handlers ==========
    pub get_narration_handler: GetNarrationHandler,
    pub list_recordings_handler: ListRecordingsHandler,
    pub select_voice_handler: SelectVoiceHandler,

    /// 上传文件最大大小（字节）
    pub max_upload_size: usize,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        catalog: Arc<dyn RecordingCatalogPort>,
        narration_repo: Arc<dyn NarrationRepositoryPort>,
        analysis: Arc<dyn StoryAnalysisPort>,
        generic: Arc<dyn GenericSpeechPort>,
        voice_clone: Arc<dyn VoiceClonePort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        narration: &NarrationConfig,
    ) -> Self {
        let generator = Arc::new(SegmentAudioGenerator::new(
            SegmentAudioConfig {
                reuse_cached_audio: narration.reuse_cached_audio,
            },
            generic.clone(),
            voice_clone,
            audio_storage.clone(),
        ));

        Self {
            audio_storage: audio_storage.clone(),

            // Command handlers
            generate_narration_handler: GenerateNarrationHandler::new(
                catalog.clone(),
                analysis,
                generator,
                narration.matcher.build(),
                narration.default_conversation_style.clone(),
            )
            .with_policy(narration.policy)
            .with_history(narration_repo.clone()),
            emotion_sample_handler: GenerateEmotionSampleHandler::new(
                generic,
                audio_storage,
                narration.sample_max_chars,
            ),
            register_recording_handler: RegisterRecordingHandler::new(catalog.clone()),
            delete_recording_handler: DeleteRecordingHandler::new(catalog.clone()),
            set_recording_lock_handler: SetRecordingLockHandler::new(catalog.clone()),

            // Query handlers
            get_narration_handler: GetNarrationHandler::new(narration_repo),
            list_recordings_handler: ListRecordingsHandler::new(catalog.clone()),
            select_voice_handler: SelectVoiceHandler::new(catalog).with_policy(narration.policy),

            max_upload_size: 10 * 1024 * 1024,
        }
    }

    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }
}
