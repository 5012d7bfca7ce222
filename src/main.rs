//! StoryVoice - 个性化故事旁白服务
//!
//! - Domain: recording/, narration/
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, adapters

use std::sync::Arc;

use storyvoice::application::{GenericSpeechPort, StoryAnalysisPort, VoiceClonePort};
use storyvoice::config::{load_config, print_config, AppConfig};
use storyvoice::infrastructure::adapters::{
    FakeSpeechEngine, FileAudioStorage, HttpAnalysisClientConfig, HttpSpeechClient,
    HttpSpeechClientConfig, HttpStoryAnalysisClient, HttpVoiceCloneClient,
    HttpVoiceCloneClientConfig,
};
use storyvoice::infrastructure::http::{AppState, HttpServer, ServerConfig};
use storyvoice::infrastructure::persistence::sled::SledAnalysisCache;
use storyvoice::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteNarrationRepository,
    SqliteRecordingRepository,
};

/// 初始化日志
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},storyvoice={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 创建语音合成引擎（通用 + 声音克隆）
fn build_speech_engines(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn GenericSpeechPort>, Arc<dyn VoiceClonePort>)> {
    if config.tts.fake {
        tracing::warn!("Using fake speech engine, no external synthesis will be performed");
        let engine = Arc::new(FakeSpeechEngine::default());
        return Ok((engine.clone(), engine));
    }

    let generic = HttpSpeechClient::new(
        HttpSpeechClientConfig::new(&config.tts.url)
            .with_timeout(config.tts.timeout_secs)
            .with_api_key(config.tts.api_key.clone()),
    )?;
    let voice_clone = HttpVoiceCloneClient::new(HttpVoiceCloneClientConfig {
        base_url: config.voice_clone.url.clone(),
        timeout_secs: config.voice_clone.timeout_secs,
        api_key: config.voice_clone.api_key.clone().filter(|k| !k.is_empty()),
    })?;

    Ok((Arc::new(generic), Arc::new(voice_clone)))
}

/// 创建故事分析客户端（可选 sled 缓存）
fn build_analysis(config: &AppConfig) -> anyhow::Result<Arc<dyn StoryAnalysisPort>> {
    let client: Arc<dyn StoryAnalysisPort> =
        Arc::new(HttpStoryAnalysisClient::new(HttpAnalysisClientConfig {
            base_url: config.analysis.url.clone(),
            timeout_secs: config.analysis.timeout_secs,
        })?);

    if !config.analysis.cache_enabled {
        return Ok(client);
    }

    if let Some(parent) = config.analysis.cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(SledAnalysisCache::open(
        &config.analysis.cache_path,
        client,
    )?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("StoryVoice - 个性化故事旁白服务");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.audio_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let catalog = Arc::new(SqliteRecordingRepository::new(pool.clone()));
    let narration_repo = Arc::new(SqliteNarrationRepository::new(pool));

    // 创建外部服务客户端
    let (generic, voice_clone) = build_speech_engines(&config)?;
    let analysis = build_analysis(&config)?;

    // 创建音频存储
    let audio_storage = Arc::new(
        FileAudioStorage::new(&config.storage.audio_dir, config.server.audio_base_url()).await?,
    );

    // 创建 HTTP 服务器
    let max_upload_size = config.storage.max_upload_size as usize;
    let state = AppState::new(
        catalog,
        narration_repo,
        analysis,
        generic,
        voice_clone,
        audio_storage,
        &config.narration,
    )
    .with_max_upload_size(max_upload_size);

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        audio_dir: config.storage.audio_dir.clone(),
        // 预留 1MB 给 multipart 其他字段
        body_limit: max_upload_size + 1024 * 1024,
    };
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
