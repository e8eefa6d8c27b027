//! Configuration Types
//!
//! 定义所有配置结构体

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::pipeline::PipelineConfig;
use crate::application::ports::{AudioFormat, VoiceSettings};
use crate::domain::DEFAULT_CHAPTER_PATTERN;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 语音引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 章节检测配置
    #[serde(default)]
    pub chapter_detection: ChapterDetectionConfig,

    /// 流水线配置
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 转换为流水线运行参数
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            chapter_pattern: self.chapter_detection.pattern.clone(),
            audio_format: self.output.format,
            max_concurrent: self.pipeline.max_concurrent,
        }
    }
}

/// 语音引擎类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// 外部神经语音 HTTP 服务
    #[default]
    Http,
    /// 本地 espeak-ng
    Espeak,
    /// 静音（演练/测试）
    Silent,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Http => "http",
            Self::Espeak => "espeak",
            Self::Silent => "silent",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            "silent" => Ok(Self::Silent),
            other => Err(format!(
                "Unknown provider '{}', expected one of: http, espeak, silent",
                other
            )),
        }
    }
}

/// 语音引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// 音色名称，`default` 表示引擎默认音色
    #[serde(default = "default_voice")]
    pub voice: String,

    /// 语速倍率
    #[serde(default = "default_speed")]
    pub speed: f32,

    #[serde(default = "default_language")]
    pub language: String,

    /// HTTP 服务 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 网络错误重试次数
    #[serde(default)]
    pub max_retries: u32,

    /// espeak-ng 可执行文件
    #[serde(default = "default_espeak_binary")]
    pub espeak_binary: String,
}

fn default_voice() -> String {
    "default".to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_language() -> String {
    "en".to_string()
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

fn default_espeak_binary() -> String {
    "espeak-ng".to_string()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            voice: default_voice(),
            speed: default_speed(),
            language: default_language(),
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
            max_retries: 0,
            espeak_binary: default_espeak_binary(),
        }
    }
}

impl TtsConfig {
    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            voice: self.voice.clone(),
            speed: self.speed,
            language: self.language.clone(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: AudioFormat,

    /// 输出根目录，未设置时为 `./audiobooks/<文件名>`
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// 有损格式比特率
    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,
}

fn default_bitrate() -> String {
    "128k".to_string()
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            directory: None,
            bitrate: default_bitrate(),
            ffmpeg_binary: default_ffmpeg_binary(),
        }
    }
}

impl OutputConfig {
    /// 计算书籍的输出目录
    pub fn book_directory(&self, source: &Path) -> PathBuf {
        match &self.directory {
            Some(dir) => dir.clone(),
            None => {
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "book".to_string());
                PathBuf::from("audiobooks").join(stem)
            }
        }
    }
}

/// 章节检测配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterDetectionConfig {
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    DEFAULT_CHAPTER_PATTERN.to_string()
}

impl Default for ChapterDetectionConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
        }
    }
}

/// 流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 同时合成的章节数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 是否写出 manifest.json
    #[serde(default = "default_write_manifest")]
    pub write_manifest: bool,
}

fn default_max_concurrent() -> usize {
    1
}

fn default_write_manifest() -> bool {
    true
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            write_manifest: default_write_manifest(),
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
