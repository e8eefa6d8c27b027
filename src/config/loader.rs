//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行参数（由 main 覆盖）
//! 2. 环境变量
//! 3. 配置文件（audiobook.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, ProviderKind};
use crate::domain::{ChapterSplitter, DEFAULT_CHAPTER_PATTERN};

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
const CONFIG_FILE_NAMES: &[&str] = &["audiobook", "audiobook.local"];

/// 语速允许范围
const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.5..=2.0;

/// 加载应用配置
///
/// # 环境变量示例
/// - `AUDIOBOOK_TTS__PROVIDER=espeak`
/// - `AUDIOBOOK_TTS__URL=http://tts-server:8000`
/// - `AUDIOBOOK_OUTPUT__FORMAT=mp3`
/// - `AUDIOBOOK_PIPELINE__MAX_CONCURRENT=4`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索当前目录下的 audiobook.toml / audiobook.local.toml
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("tts.provider", "http")?
        .set_default("tts.voice", "default")?
        .set_default("tts.speed", 1.0)?
        .set_default("tts.language", "en")?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("tts.max_retries", 0)?
        .set_default("tts.espeak_binary", "espeak-ng")?
        .set_default("output.format", "wav")?
        .set_default("output.bitrate", "128k")?
        .set_default("output.ffmpeg_binary", "ffmpeg")?
        .set_default("chapter_detection.pattern", DEFAULT_CHAPTER_PATTERN)?
        .set_default("pipeline.max_concurrent", 1)?
        .set_default("pipeline.write_manifest", true)?
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

    // 3. 环境变量
    // 前缀: AUDIOBOOK_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("AUDIOBOOK")
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
///
/// 命令行覆盖之后需要再次调用
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if !SPEED_RANGE.contains(&config.tts.speed) {
        return Err(ConfigError::ValidationError(format!(
            "Speed must be between 0.5 and 2.0, got {}",
            config.tts.speed
        )));
    }

    if config.tts.provider == ProviderKind::Http && config.tts.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty for the http provider".to_string(),
        ));
    }

    if config.pipeline.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent must be at least 1".to_string(),
        ));
    }

    ChapterSplitter::new(&config.chapter_detection.pattern)
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Audiobook Configuration ===");
    tracing::info!("TTS Provider: {}", config.tts.provider);
    if config.tts.provider == ProviderKind::Http {
        tracing::info!("TTS URL: {}", config.tts.url);
        tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    }
    tracing::info!("Voice: {}", config.tts.voice);
    tracing::info!("Speed: {}", config.tts.speed);
    tracing::info!("Language: {}", config.tts.language);
    tracing::info!("Output Format: {}", config.output.format);
    tracing::info!("Chapter Pattern: {}", config.chapter_detection.pattern);
    tracing::info!("Max Concurrent: {}", config.pipeline.max_concurrent);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("===============================");
}
