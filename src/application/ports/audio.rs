//! Audio Ports - 音频转码与探测抽象
//!
//! 语音引擎统一产出 WAV，再按输出格式转换为目标容器

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 音频错误
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// 原始 WAV，不转码
    #[default]
    Wav,
    Mp3,
    Ogg,
    Flac,
    /// Opus 编码，OGG 容器
    Opus,
}

impl AudioFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Flac => "flac",
            AudioFormat::Opus => "opus",
        }
    }

    /// 根据文件扩展名推断格式
    pub fn from_path(path: &Path) -> Result<Self, AudioError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AudioError::UnsupportedFormat(format!("no extension: {}", path.display()))
            })?;
        ext.parse()
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            "ogg" => Ok(AudioFormat::Ogg),
            "flac" => Ok(AudioFormat::Flac),
            "opus" => Ok(AudioFormat::Opus),
            _ => Err(AudioError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 音频信息
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
}

impl AudioInfo {
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Audio Transcoder Port
///
/// 把 WAV 文件转换为目标格式
#[async_trait]
pub trait AudioTranscoderPort: Send + Sync {
    /// 转码
    ///
    /// # Arguments
    /// * `input` - 输入的 WAV 文件
    /// * `output` - 输出文件路径（扩展名应与 format 一致）
    /// * `format` - 目标格式
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<(), AudioError>;

    /// 检查是否支持指定格式
    fn supports_format(&self, format: AudioFormat) -> bool;
}

/// Audio Probe Port
///
/// 读取已生成音频文件的信息（不解码全部数据）
pub trait AudioProbePort: Send + Sync {
    fn probe(&self, path: &Path) -> Result<AudioInfo, AudioError>;
}
