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

/// 环境变量前缀
const ENV_PREFIX: &str = "TGCAST";

/// 加载应用配置
///
/// # 环境变量示例
/// - `TGCAST_TELEGRAM__BOT_TOKEN=123456:ABC...`
/// - `TGCAST_SERVER__PORT=8080`
/// - `TGCAST_VOICE_CALL__URL=http://bridge:8090`
/// - `TGCAST_AUDIO__OUTPUT_FORMAT=mp3`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 10000)?
        .set_default("voice_call.url", "http://localhost:8090")?
        .set_default("voice_call.timeout_secs", 30)?
        .set_default("resolver.ytdlp_path", "yt-dlp")?
        .set_default("resolver.ffmpeg_path", "ffmpeg")?
        .set_default("resolver.max_concurrent", 2)?
        .set_default("resolver.queue_capacity", 64)?
        .set_default("resolver.download_timeout_secs", 600)?
        .set_default("resolver.transcode_timeout_secs", 300)?
        .set_default("audio.output_format", "opus")?
        .set_default("audio.bitrate", 128_000)?
        .set_default("audio.sample_rate", 48_000)?
        .set_default("audio.channels", 2)?
        .set_default("storage.download_dir", "data/downloads")?
        .set_default("storage.delete_on_stop", true)?
        .set_default("storage.sweep_on_startup", true)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 层级分隔符: __ (双下划线)，字段名中的单下划线保留
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "Telegram bot token is required (set {}_TELEGRAM__BOT_TOKEN)",
            ENV_PREFIX
        )));
    }

    if config.voice_call.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Voice call URL cannot be empty".to_string(),
        ));
    }

    if config.storage.download_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Download directory cannot be empty".to_string(),
        ));
    }

    if config.resolver.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Resolver max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.resolver.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Resolver queue_capacity cannot be 0".to_string(),
        ));
    }

    if config.audio.bitrate == 0 {
        return Err(ConfigError::ValidationError(
            "Audio bitrate cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出 token
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Liveness Server: {}", config.server.addr());
    tracing::info!("Voice Call URL: {}", config.voice_call.url);
    tracing::info!("Voice Call Timeout: {}s", config.voice_call.timeout_secs);
    tracing::info!("yt-dlp: {}", config.resolver.ytdlp_path);
    tracing::info!("ffmpeg: {}", config.resolver.ffmpeg_path);
    tracing::info!(
        "Resolver: max_concurrent={}, queue_capacity={}",
        config.resolver.max_concurrent,
        config.resolver.queue_capacity
    );
    tracing::info!(
        "Audio: format={}, bitrate={}, sample_rate={}, channels={}",
        config.audio.output_format,
        config.audio.bitrate,
        config.audio.sample_rate,
        config.audio.channels
    );
    tracing::info!("Download Directory: {:?}", config.storage.download_dir);
    tracing::info!("Delete On Stop: {}", config.storage.delete_on_stop);
    tracing::info!("Sweep On Startup: {}", config.storage.sweep_on_startup);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
