//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Recording Context: 用户声音录音目录
//! - Narration Context: 音色选择与旁白生成规则

pub mod narration;
pub mod recording;
