//! Narration Context - 旁白生成限界上下文
//!
//! 职责:
//! - 段落上下文检测（情绪/音效/语调）
//! - 四级音色选择策略
//! - 通用音色韵律映射
//! - 音频路径布局与缓存 key
//! - 结果汇总

mod analysis;
mod context;
mod layout;
mod outcome;
mod prosody;
mod selection;

pub use analysis::{clamp_intensity, AnalysisEntry, StoryAnalysis, DEFAULT_INTENSITY};
pub use context::{
    detect_context, ContextMatcher, MatcherKind, SegmentContext, SubstringMatcher, WordMatcher,
};
pub use layout::{
    generic_segment_label, narrator_profile, sanitize_component, segment_label, AudioPathKey,
    GENERIC_PROFILE, NARRATIONS_ROOT,
};
pub use outcome::{NarrationAccumulator, NarrationResult, SegmentAudioResult, NO_AUDIO_GENERATED};
pub use prosody::{
    base_rate, frame_sample_text, intensity_multiplier, persona_for, speech_rate, Prosody,
    DEFAULT_PERSONA, DEFAULT_SAMPLE_MAX_CHARS, MAX_SPEECH_RATE, MIN_SPEECH_RATE, NEUTRAL_EMOTION,
};
pub use selection::{
    category_voice, select_voice, select_voice_with, SelectionPolicy, VoiceSelection,
    VoiceSelectionType,
};
