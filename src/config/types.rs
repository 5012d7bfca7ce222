//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::narration::{MatcherKind, SelectionPolicy, DEFAULT_SAMPLE_MAX_CHARS};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 通用语音合成配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 声音克隆服务配置
    #[serde(default)]
    pub voice_clone: VoiceCloneConfig,

    /// 故事分析服务配置
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 旁白生成配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（音频 URL 以此为前缀）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                let host = if self.host == "0.0.0.0" {
                    "localhost"
                } else {
                    &self.host
                };
                format!("http://{}:{}", host, self.port)
            })
    }

    /// 音频文件的公开访问前缀
    pub fn audio_base_url(&self) -> String {
        format!("{}/audio", self.public_base_url())
    }
}

/// 通用语音合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 可选的 API Key
    #[serde(default)]
    pub api_key: Option<String>,

    /// 使用离线 Fake 引擎（通用合成与声音克隆均替换）
    #[serde(default)]
    pub fake: bool,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            timeout_secs: default_timeout(),
            api_key: None,
            fake: false,
        }
    }
}

/// 声音克隆服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceCloneConfig {
    #[serde(default = "default_voice_clone_url")]
    pub url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_voice_clone_url() -> String {
    "http://localhost:8001".to_string()
}

impl Default for VoiceCloneConfig {
    fn default() -> Self {
        Self {
            url: default_voice_clone_url(),
            timeout_secs: default_timeout(),
            api_key: None,
        }
    }
}

/// 故事分析服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_analysis_url")]
    pub url: String,

    #[serde(default = "default_analysis_timeout")]
    pub timeout_secs: u64,

    /// 是否启用 sled 分析缓存
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// sled 缓存路径
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

fn default_analysis_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_analysis_timeout() -> u64 {
    60
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/analysis.sled")
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            url: default_analysis_url(),
            timeout_secs: default_analysis_timeout(),
            cache_enabled: default_cache_enabled(),
            cache_path: default_cache_path(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/storyvoice.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音频存储目录（旁白、样本、录音）
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// 上传文件最大大小（字节），默认 10MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 旁白生成配置
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    /// 请求未指定时的对话风格
    #[serde(default = "default_conversation_style")]
    pub default_conversation_style: String,

    /// 是否复用已有的段落音频
    #[serde(default = "default_reuse_cached_audio")]
    pub reuse_cached_audio: bool,

    /// 上下文匹配策略: substring | word
    #[serde(default)]
    pub matcher: MatcherKind,

    /// 情绪样本文本最大字符数
    #[serde(default = "default_sample_max_chars")]
    pub sample_max_chars: usize,

    /// 个性化音色各级的录音数量阈值
    #[serde(default)]
    pub policy: SelectionPolicy,
}

fn default_conversation_style() -> String {
    "narrative".to_string()
}

fn default_reuse_cached_audio() -> bool {
    true
}

fn default_sample_max_chars() -> usize {
    DEFAULT_SAMPLE_MAX_CHARS
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            default_conversation_style: default_conversation_style(),
            reuse_cached_audio: default_reuse_cached_audio(),
            matcher: MatcherKind::default(),
            sample_max_chars: default_sample_max_chars(),
            policy: SelectionPolicy::default(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
