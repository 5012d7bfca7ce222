//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（录音目录、故事分析、语音合成、音频存储、旁白仓储）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Narration commands
    GenerateEmotionSample,
    GenerateNarration,
    // Recording commands
    DeleteRecording,
    RegisterRecording,
    SetRecordingLock,
    // Handlers
    handlers::{
        DeleteRecordingHandler, EmotionSampleResponse, GenerateEmotionSampleHandler,
        GenerateNarrationHandler, GeneratedAudio, GenerationError, RegisterRecordingHandler,
        SegmentAudioConfig, SegmentAudioGenerator, SegmentJob, SetRecordingLockHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Story analysis
    AnalysisError,
    StoryAnalysisPort,
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    StoredAudio,
    // Repositories
    NarrationRecord,
    NarrationRepositoryPort,
    NewRecording,
    RecordingCatalogPort,
    RepositoryError,
    // Speech engines
    GenericSpeechPort,
    SpeechAudio,
    SpeechError,
    SpeechRequest,
    VoiceClonePort,
};

pub use queries::{
    GetNarration,
    ListRecordings,
    SelectVoice,
    // Handlers
    handlers::{
        GetNarrationHandler, ListRecordingsHandler, SelectVoiceHandler, VoiceSelectionResponse,
    },
};
