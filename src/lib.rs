//! StoryVoice - 个性化故事旁白服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Recording Context: 用户声音录音
//! - Narration Context: 上下文检测、音色选择、韵律映射、音频路径布局、结果累加
//!
//! 应用层 (application/):
//! - Ports: 端口定义（RecordingCatalog, StoryAnalysis, GenericSpeech, VoiceClone, AudioStorage, NarrationRepository）
//! - Commands: CQRS 命令处理器（旁白生成、情绪样本、录音管理）
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + /audio 静态文件
//! - Persistence: SQLite + Sled 存储
//! - Adapters: 语音合成/声音克隆/故事分析客户端，文件存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
