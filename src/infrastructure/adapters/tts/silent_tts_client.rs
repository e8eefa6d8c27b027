//! Silent TTS Client - 不依赖任何外部引擎的语音引擎
//!
//! 按文本长度生成静音 WAV，用于演练流水线和测试。
//! 静音数据流式写入临时文件，超过 WAV 大小上限的章节直接报错

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::renderer::{discard, ensure_parent, AudioRenderer};
use crate::application::ports::{TtsError, VoiceProviderPort};
use crate::infrastructure::adapters::audio::{silent_data_size, write_silent_wav};

/// Silent 引擎配置
#[derive(Debug, Clone)]
pub struct SilentTtsConfig {
    /// 每个字符对应的时长（毫秒）
    pub ms_per_char: u64,
    /// 最短时长（毫秒）
    pub min_duration_ms: u64,
    pub sample_rate: u32,
}

impl Default for SilentTtsConfig {
    fn default() -> Self {
        Self {
            ms_per_char: 60,
            min_duration_ms: 200,
            sample_rate: 22050,
        }
    }
}

/// Silent 语音引擎
pub struct SilentTtsClient {
    config: SilentTtsConfig,
    renderer: AudioRenderer,
}

impl SilentTtsClient {
    pub fn new(config: SilentTtsConfig, renderer: AudioRenderer) -> Self {
        Self { config, renderer }
    }

    pub fn duration_ms(&self, text: &str) -> u64 {
        let chars = text.chars().count() as u64;
        chars
            .saturating_mul(self.config.ms_per_char)
            .max(self.config.min_duration_ms)
    }
}

#[async_trait]
impl VoiceProviderPort for SilentTtsClient {
    fn name(&self) -> &str {
        "silent"
    }

    async fn generate(&self, text: &str, destination: &Path) -> Result<PathBuf, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        let duration_ms = self.duration_ms(text);
        tracing::debug!(
            text_len = text.len(),
            duration_ms,
            "Generating silent audio"
        );

        silent_data_size(duration_ms, self.config.sample_rate)?;

        ensure_parent(destination).await?;
        let staging = AudioRenderer::staging_path(destination, "wav");
        if let Err(e) = write_silent_wav(&staging, duration_ms, self.config.sample_rate).await {
            discard(&staging).await;
            return Err(e.into());
        }

        self.renderer.finish(&staging, destination).await
    }

    async fn list_voices(&self) -> Result<Vec<String>, TtsError> {
        Ok(vec!["silent".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{AudioError, AudioProbePort};
    use crate::infrastructure::adapters::audio::{FfmpegTranscoder, SymphoniaProbe};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn client() -> SilentTtsClient {
        SilentTtsClient::new(
            SilentTtsConfig::default(),
            AudioRenderer::new(Arc::new(FfmpegTranscoder::default())),
        )
    }

    #[test]
    fn test_duration_scales_with_text() {
        let client = client();
        assert_eq!(client.duration_ms("a"), 200);
        assert_eq!(client.duration_ms(&"x".repeat(100)), 6000);
    }

    #[tokio::test]
    async fn test_generates_probeable_wav() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("chapters/chapter_01.wav");

        let path = client().generate(&"word ".repeat(10), &destination).await.unwrap();

        assert_eq!(path, destination);
        let info = SymphoniaProbe::new().probe(&destination).unwrap();
        assert!(info.duration_ms >= 2990 && info.duration_ms <= 3010);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("chapter_01.wav");

        let err = client().generate("   ", &destination).await.unwrap_err();

        assert!(matches!(err, TtsError::EmptyText));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_oversized_chapter_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("chapter_01.wav");
        let client = SilentTtsClient::new(
            SilentTtsConfig {
                ms_per_char: 100_000_000,
                ..Default::default()
            },
            AudioRenderer::new(Arc::new(FfmpegTranscoder::default())),
        );

        let err = client.generate("hello", &destination).await.unwrap_err();

        assert!(matches!(err, TtsError::Audio(AudioError::EncodingError(_))));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_list_voices() {
        assert_eq!(client().list_voices().await.unwrap(), vec!["silent"]);
    }
}
