//! Speech Adapters - 语音合成客户端实现

mod fake_speech_engine;
mod http_tts_client;
mod http_voice_clone_client;

pub use fake_speech_engine::{FakeSpeechEngine, FakeSpeechEngineConfig};
pub use http_tts_client::{HttpSpeechClient, HttpSpeechClientConfig};
pub use http_voice_clone_client::{HttpVoiceCloneClient, HttpVoiceCloneClientConfig};
