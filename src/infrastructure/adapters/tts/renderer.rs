//! Audio Renderer - 把引擎产出的 WAV 落盘为目标格式
//!
//! 所有语音引擎共用：
//! 1. WAV 先写入目标目录下的临时文件（`.<name>.<uuid>.part.wav`）
//! 2. 目标格式为 WAV 时直接重命名，否则经转码器转换后重命名
//! 3. 任一步骤失败都会删除临时文件和目标文件

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{AudioFormat, AudioTranscoderPort, TtsError};

/// 音频落盘器
#[derive(Clone)]
pub struct AudioRenderer {
    transcoder: Arc<dyn AudioTranscoderPort>,
}

impl AudioRenderer {
    pub fn new(transcoder: Arc<dyn AudioTranscoderPort>) -> Self {
        Self { transcoder }
    }

    /// 目标文件旁边的临时文件路径
    pub fn staging_path(destination: &Path, extension: &str) -> PathBuf {
        let name = destination
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let file_name = format!(".{}.{}.part.{}", name, Uuid::new_v4().simple(), extension);
        destination.with_file_name(file_name)
    }

    /// 写入 WAV 数据并转换为目标格式
    pub async fn write_wav(&self, wav_data: &[u8], destination: &Path) -> Result<PathBuf, TtsError> {
        if wav_data.is_empty() {
            return Err(TtsError::InvalidResponse("Engine returned no audio".to_string()));
        }

        ensure_parent(destination).await?;

        let staging = Self::staging_path(destination, "wav");
        if let Err(e) = fs::write(&staging, wav_data).await {
            discard(&staging).await;
            return Err(TtsError::IoError(e.to_string()));
        }

        self.finish(&staging, destination).await
    }

    /// 把已写好的临时 WAV 转换为目标文件
    ///
    /// 无论成功与否，临时 WAV 都会被删除
    pub async fn finish(&self, staging_wav: &Path, destination: &Path) -> Result<PathBuf, TtsError> {
        let result = self.convert(staging_wav, destination).await;
        discard(staging_wav).await;

        if result.is_err() {
            discard(destination).await;
        }
        result
    }

    async fn convert(&self, staging_wav: &Path, destination: &Path) -> Result<PathBuf, TtsError> {
        let format = AudioFormat::from_path(destination)?;

        if format == AudioFormat::Wav {
            fs::rename(staging_wav, destination)
                .await
                .map_err(|e| TtsError::IoError(e.to_string()))?;
            return Ok(destination.to_path_buf());
        }

        if !self.transcoder.supports_format(format) {
            return Err(TtsError::Audio(
                crate::application::ports::AudioError::UnsupportedFormat(format.to_string()),
            ));
        }

        let converted = Self::staging_path(destination, format.extension());
        let result = async {
            self.transcoder
                .transcode(staging_wav, &converted, format)
                .await?;
            fs::rename(&converted, destination)
                .await
                .map_err(|e| TtsError::IoError(e.to_string()))
        }
        .await;

        if result.is_err() {
            discard(&converted).await;
        }
        result.map(|_| destination.to_path_buf())
    }
}

/// 确保目标目录存在
pub(crate) async fn ensure_parent(destination: &Path) -> Result<(), TtsError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| TtsError::IoError(e.to_string()))?;
    }
    Ok(())
}

/// 删除文件，不存在时忽略
pub(crate) async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
        }
    }
}
