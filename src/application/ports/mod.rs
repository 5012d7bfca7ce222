//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_storage;
mod repositories;
mod speech_engine;
mod story_analysis;

pub use audio_storage::{AudioStorageError, AudioStoragePort, StoredAudio};
pub use repositories::{
    NarrationRecord, NarrationRepositoryPort, NewRecording, RecordingCatalogPort, RepositoryError,
};
pub use speech_engine::{
    GenericSpeechPort, SpeechAudio, SpeechError, SpeechRequest, VoiceClonePort,
};
pub use story_analysis::{AnalysisError, StoryAnalysisPort};
