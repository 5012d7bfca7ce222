//! Recording Context - 声音录音限界上下文
//!
//! 职责:
//! - 录音实体及分类
//! - 录音名称校验

mod entity;
mod errors;
mod value_objects;

pub use entity::VoiceRecording;
pub use errors::RecordingError;
pub use value_objects::{AudioFormat, RecordingCategory};
