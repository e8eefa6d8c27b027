//! eSpeak TTS Client - 离线语音引擎
//!
//! 调用本地 espeak-ng 生成 WAV，文本通过 stdin 传入（不经过 shell，无需转义）

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::renderer::{discard, ensure_parent, AudioRenderer};
use crate::application::ports::{TtsError, VoiceProviderPort, VoiceSettings};

/// espeak-ng 正常语速（词/分钟）
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// eSpeak 配置
#[derive(Debug, Clone)]
pub struct EspeakConfig {
    /// 可执行文件
    pub binary: String,
    /// 单个章节的合成超时（秒）
    pub timeout_secs: u64,
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            binary: "espeak-ng".to_string(),
            timeout_secs: 600,
        }
    }
}

/// eSpeak 离线语音引擎
pub struct EspeakTtsClient {
    config: EspeakConfig,
    voice: VoiceSettings,
    renderer: AudioRenderer,
}

impl EspeakTtsClient {
    pub fn new(config: EspeakConfig, voice: VoiceSettings, renderer: AudioRenderer) -> Self {
        Self {
            config,
            voice,
            renderer,
        }
    }

    /// 语速倍率换算为 espeak 的词/分钟
    pub fn words_per_minute(speed: f32) -> u32 {
        (BASE_WORDS_PER_MINUTE * speed).round().max(1.0) as u32
    }

    /// 未指定音色时按语言选择
    fn voice_arg(&self) -> Option<&str> {
        if !self.voice.uses_default_voice() {
            Some(&self.voice.voice)
        } else if !self.voice.language.is_empty() {
            Some(&self.voice.language)
        } else {
            None
        }
    }

    fn command_args(&self, wav_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-w".to_string(),
            wav_path.display().to_string(),
            "-s".to_string(),
            Self::words_per_minute(self.voice.speed).to_string(),
        ];
        if let Some(voice) = self.voice_arg() {
            args.push("-v".to_string());
            args.push(voice.to_string());
        }
        args.push("--stdin".to_string());
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> TtsError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TtsError::EngineError(format!(
                "{} not found; install espeak-ng or choose another provider",
                self.config.binary
            ))
        } else {
            TtsError::EngineError(format!("Failed to run {}: {}", self.config.binary, e))
        }
    }

    async fn run_engine(&self, text: &str, wav_path: &Path) -> Result<(), TtsError> {
        let mut child = Command::new(&self.config.binary)
            .args(self.command_args(wav_path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| TtsError::EngineError(format!("Failed to send text: {}", e)))?;
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| TtsError::Timeout)?
            .map_err(|e| TtsError::EngineError(e.to_string()))?;

        if !output.status.success() {
            return Err(TtsError::EngineError(format!(
                "espeak-ng failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// 解析 `espeak-ng --voices` 输出
///
/// 表头之后每行第二列为语言/音色名
pub fn parse_voice_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(String::from)
        .collect()
}

#[async_trait]
impl VoiceProviderPort for EspeakTtsClient {
    fn name(&self) -> &str {
        "espeak"
    }

    async fn generate(&self, text: &str, destination: &Path) -> Result<PathBuf, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        ensure_parent(destination).await?;
        let staging = AudioRenderer::staging_path(destination, "wav");

        tracing::debug!(
            text_len = text.len(),
            voice = ?self.voice_arg(),
            staging = %staging.display(),
            "Running espeak-ng"
        );

        if let Err(e) = self.run_engine(text, &staging).await {
            discard(&staging).await;
            return Err(e);
        }

        self.renderer.finish(&staging, destination).await
    }

    async fn list_voices(&self) -> Result<Vec<String>, TtsError> {
        let output = Command::new(&self.config.binary)
            .arg("--voices")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Ok(vec![]);
        }

        Ok(parse_voice_list(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn health_check(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::audio::FfmpegTranscoder;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn client(config: EspeakConfig, voice: VoiceSettings) -> EspeakTtsClient {
        EspeakTtsClient::new(
            config,
            voice,
            AudioRenderer::new(Arc::new(FfmpegTranscoder::default())),
        )
    }

    #[test]
    fn test_words_per_minute() {
        assert_eq!(EspeakTtsClient::words_per_minute(1.0), 175);
        assert_eq!(EspeakTtsClient::words_per_minute(0.5), 88);
        assert_eq!(EspeakTtsClient::words_per_minute(2.0), 350);
    }

    #[test]
    fn test_command_args_use_language_for_default_voice() {
        let client = client(EspeakConfig::default(), VoiceSettings::default());
        let args = client.command_args(Path::new("/tmp/a.wav"));
        assert_eq!(args, vec!["-w", "/tmp/a.wav", "-s", "175", "-v", "en", "--stdin"]);
    }

    #[test]
    fn test_command_args_with_named_voice() {
        let client = client(
            EspeakConfig::default(),
            VoiceSettings {
                voice: "en-us".to_string(),
                speed: 1.2,
                language: "en".to_string(),
            },
        );
        let args = client.command_args(Path::new("/tmp/b.wav"));
        assert_eq!(args, vec!["-w", "/tmp/b.wav", "-s", "210", "-v", "en-us", "--stdin"]);
    }

    #[test]
    fn test_parse_voice_list() {
        let output = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                      5  af              --/M      Afrikaans          gmw/af\n \
                      5  en-us           --/M      English_(America)  gmw/en-US            (en 3)\n";
        assert_eq!(parse_voice_list(output), vec!["af", "en-us"]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_error() {
        let temp_dir = tempdir().unwrap();
        let config = EspeakConfig {
            binary: "espeak-ng-definitely-missing".to_string(),
            ..Default::default()
        };
        let client = client(config, VoiceSettings::default());
        let destination = temp_dir.path().join("chapter_01.wav");

        let err = client.generate("Hello", &destination).await.unwrap_err();

        assert!(matches!(err, TtsError::EngineError(ref m) if m.contains("not found")));
        assert!(!destination.exists());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
        assert!(!client.health_check().await);
    }
}
