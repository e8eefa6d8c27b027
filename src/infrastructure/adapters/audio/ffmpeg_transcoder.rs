//! FFmpeg Transcoder - 调用 ffmpeg 把 WAV 转换为目标格式
//!
//! 格式与编码器对应：
//! - mp3  -> libmp3lame
//! - ogg  -> libvorbis
//! - flac -> flac
//! - opus -> libopus
//! - wav  -> pcm_s16le

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::application::ports::{AudioError, AudioFormat, AudioTranscoderPort};

/// FFmpeg 转码配置
#[derive(Debug, Clone)]
pub struct FfmpegTranscoderConfig {
    /// ffmpeg 可执行文件
    pub binary: String,
    /// 有损格式的目标比特率，如 "128k"
    pub bitrate: String,
    /// 单次转码超时（秒）
    pub timeout_secs: u64,
}

impl Default for FfmpegTranscoderConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            bitrate: "128k".to_string(),
            timeout_secs: 300,
        }
    }
}

/// FFmpeg 转码器
pub struct FfmpegTranscoder {
    config: FfmpegTranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegTranscoderConfig) -> Self {
        Self { config }
    }

    /// 构建编码参数
    fn codec_args(&self, format: AudioFormat) -> Vec<String> {
        let bitrate = self.config.bitrate.as_str();
        let args: Vec<&str> = match format {
            AudioFormat::Wav => vec!["-codec:a", "pcm_s16le"],
            AudioFormat::Mp3 => vec!["-codec:a", "libmp3lame", "-b:a", bitrate],
            AudioFormat::Ogg => vec!["-codec:a", "libvorbis", "-b:a", bitrate],
            AudioFormat::Flac => vec!["-codec:a", "flac"],
            AudioFormat::Opus => vec!["-codec:a", "libopus", "-b:a", bitrate],
        };
        args.into_iter().map(String::from).collect()
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(FfmpegTranscoderConfig::default())
    }
}

#[async_trait]
impl AudioTranscoderPort for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: AudioFormat,
    ) -> Result<(), AudioError> {
        let mut command = Command::new(&self.config.binary);
        command
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(self.codec_args(format))
            .arg(output)
            .kill_on_drop(true);

        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            format = %format,
            "Running ffmpeg"
        );

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let result = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                AudioError::EncodingError(format!(
                    "ffmpeg timed out after {}s",
                    self.config.timeout_secs
                ))
            })?;

        let output_status = result.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AudioError::EncodingError(format!(
                    "{} not found; install ffmpeg to produce {} files",
                    self.config.binary, format
                ))
            } else {
                AudioError::IoError(format!("Failed to run ffmpeg: {}", e))
            }
        })?;

        if !output_status.status.success() {
            return Err(AudioError::EncodingError(format!(
                "ffmpeg conversion failed: {}",
                String::from_utf8_lossy(&output_status.stderr).trim()
            )));
        }

        Ok(())
    }

    fn supports_format(&self, _format: AudioFormat) -> bool {
        true
    }
}
