//! Voice Provider Port - 语音合成抽象
//!
//! 定义"文本 -> 音频文件"的抽象接口，具体实现（离线引擎、HTTP 神经语音服务等）
//! 在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::AudioError;

/// 语音合成错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Text is empty")]
    EmptyText,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

/// 语音参数
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// 音色名称，`default` 表示引擎默认音色
    pub voice: String,
    /// 语速倍率（1.0 为正常语速）
    pub speed: f32,
    /// 语言代码
    pub language: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: "default".to_string(),
            speed: 1.0,
            language: "en".to_string(),
        }
    }
}

impl VoiceSettings {
    pub fn uses_default_voice(&self) -> bool {
        self.voice.is_empty() || self.voice == "default"
    }
}

/// Voice Provider Port
///
/// 给定非空文本和目标路径，要么在目标路径生成非空音频文件，要么返回错误
#[async_trait]
pub trait VoiceProviderPort: Send + Sync {
    /// 引擎名称（用于日志）
    fn name(&self) -> &str;

    /// 生成音频，返回实际写入的文件路径
    async fn generate(&self, text: &str, destination: &Path) -> Result<PathBuf, TtsError>;

    /// 列出可用音色
    async fn list_voices(&self) -> Result<Vec<String>, TtsError> {
        Ok(Vec::new())
    }

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
