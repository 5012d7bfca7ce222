//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `STORYVOICE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `STORYVOICE_SERVER__PORT=8080`
/// - `STORYVOICE_TTS__URL=http://tts-server:8000`
/// - `STORYVOICE_VOICE_CLONE__API_KEY=secret`
/// - `STORYVOICE_NARRATION__MATCHER=word`
///
/// # 返回
/// - `Ok(AppConfig)` - 成功加载的配置
/// - `Err(ConfigError)` - 加载失败
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("tts.fake", false)?
        .set_default("voice_clone.url", "http://localhost:8001")?
        .set_default("voice_clone.timeout_secs", 120)?
        .set_default("analysis.url", "http://localhost:8002")?
        .set_default("analysis.timeout_secs", 60)?
        .set_default("analysis.cache_enabled", true)?
        .set_default("analysis.cache_path", "data/analysis.sled")?
        .set_default("database.path", "data/storyvoice.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.audio_dir", "data/audio")?
        .set_default("storage.max_upload_size", 10 * 1024 * 1024)?
        .set_default("narration.default_conversation_style", "narrative")?
        .set_default("narration.reuse_cached_audio", true)?
        .set_default("narration.matcher", "substring")?
        .set_default("narration.sample_max_chars", 100)?
        .set_default("narration.policy.individual_min", 6)?
        .set_default("narration.policy.category_min", 3)?
        .set_default("narration.policy.combined_min", 5)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: STORYVOICE_
    // 层级分隔符: __ (双下划线)
    // 例如: STORYVOICE_TTS__URL=http://tts-server:8000
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("STORYVOICE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证端口范围
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // 验证外部服务 URL（Fake 引擎不需要合成服务）
    if !config.tts.fake {
        if config.tts.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "TTS URL cannot be empty".to_string(),
            ));
        }
        if config.voice_clone.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "Voice clone URL cannot be empty".to_string(),
            ));
        }
    }

    if config.analysis.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Analysis URL cannot be empty".to_string(),
        ));
    }

    // 验证数据库路径
    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.narration.sample_max_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Sample max chars must be positive".to_string(),
        ));
    }

    let policy = &config.narration.policy;
    if policy.individual_min == 0 || policy.category_min == 0 || policy.combined_min == 0 {
        return Err(ConfigError::ValidationError(
            "Selection thresholds must be positive".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    if config.tts.fake {
        tracing::info!("Speech Engine: fake");
    } else {
        tracing::info!("TTS URL: {}", config.tts.url);
        tracing::info!("Voice Clone URL: {}", config.voice_clone.url);
    }
    tracing::info!("Analysis URL: {}", config.analysis.url);
    tracing::info!("Analysis Cache: {}", config.analysis.cache_enabled);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!(
        "Conversation Style: {}",
        config.narration.default_conversation_style
    );
    tracing::info!("Context Matcher: {:?}", config.narration.matcher);
    tracing::info!("Reuse Cached Audio: {}", config.narration.reuse_cached_audio);
    tracing::info!(
        "Selection Thresholds: individual={} category={} combined={}",
        config.narration.policy.individual_min,
        config.narration.policy.category_min,
        config.narration.policy.combined_min
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        // 使用临时配置文件测试默认值
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5060);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_tts_url() {
        let mut config = AppConfig::default();
        config.tts.url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_fake_engine_skips_tts_url_check() {
        let mut config = AppConfig::default();
        config.tts.fake = true;
        config.tts.url = String::new();
        config.voice_clone.url = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_sample_length() {
        let mut config = AppConfig::default();
        config.narration.sample_max_chars = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_with_matcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[narration]\nmatcher = \"word\"\ndefault_conversation_style = \"bedtime\"\n\n[tts]\nfake = true\n",
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.narration.matcher, crate::domain::narration::MatcherKind::Word);
        assert_eq!(config.narration.default_conversation_style, "bedtime");
        assert!(config.tts.fake);
        assert_eq!(config.server.port, 5060);
    }

    #[test]
    fn test_load_selection_policy_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[narration.policy]\ncategory_min = 4\n\n[tts]\nfake = true\n",
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.narration.policy.category_min, 4);
        assert_eq!(config.narration.policy.individual_min, 6);
        assert_eq!(config.narration.policy.combined_min, 5);
    }

    #[test]
    fn test_validation_error_for_zero_threshold() {
        let mut config = AppConfig::default();
        config.narration.policy.combined_min = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }
}
