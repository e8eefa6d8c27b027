//! HTTP TTS Client - 调用外部神经语音服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/infer
//! Request: {"text": "...", "voice": "...", "speed": 1.0, "language": "en"}  (JSON)
//! Response: audio/wav binary
//!
//! GET {base_url}/api/tts/voices -> ["voice_a", "voice_b"]
//! GET {base_url}/health

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::renderer::AudioRenderer;
use crate::application::ports::{TtsError, VoiceProviderPort, VoiceSettings};

/// TTS 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    /// 为空时由服务使用默认音色
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
    speed: f32,
    language: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 网络错误/超时的重试次数
    pub max_retries: u32,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
    voice: VoiceSettings,
    renderer: AudioRenderer,
}

impl HttpTtsClient {
    pub fn new(
        config: HttpTtsClientConfig,
        voice: VoiceSettings,
        renderer: AudioRenderer,
    ) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            voice,
            renderer,
        })
    }

    fn infer_url(&self) -> String {
        format!("{}/api/tts/infer", self.config.base_url)
    }

    fn voices_url(&self) -> String {
        format!("{}/api/tts/voices", self.config.base_url)
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url)
    }

    fn request_body<'a>(&'a self, text: &'a str) -> TtsHttpRequest<'a> {
        TtsHttpRequest {
            text,
            voice: (!self.voice.uses_default_voice()).then_some(self.voice.voice.as_str()),
            speed: self.voice.speed,
            language: &self.voice.language,
        }
    }

    /// 单次推理请求
    async fn infer(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .post(self.infer_url())
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        Ok(audio_data)
    }

    /// 带重试的推理请求，只重试网络错误和超时
    async fn infer_with_retry(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let mut attempt = 0;
        loop {
            match self.infer(text).await {
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "TTS request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                result => return result,
            }
        }
    }
}

fn map_send_error(e: reqwest::Error) -> TtsError {
    if e.is_timeout() {
        TtsError::Timeout
    } else if e.is_connect() {
        TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        TtsError::NetworkError(e.to_string())
    }
}

fn is_retryable(error: &TtsError) -> bool {
    matches!(error, TtsError::NetworkError(_) | TtsError::Timeout)
}

#[async_trait]
impl VoiceProviderPort for HttpTtsClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, text: &str, destination: &Path) -> Result<PathBuf, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        tracing::debug!(
            url = %self.infer_url(),
            text_len = text.len(),
            voice = %self.voice.voice,
            "Sending TTS infer request"
        );

        let audio_data = self.infer_with_retry(text).await?;

        tracing::info!(
            audio_size = audio_data.len(),
            destination = %destination.display(),
            "TTS inference completed"
        );

        self.renderer.write_wav(&audio_data, destination).await
    }

    async fn list_voices(&self) -> Result<Vec<String>, TtsError> {
        let response = self
            .client
            .get(self.voices_url())
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::ServiceError(format!("HTTP {}", status)));
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Invalid voice list: {}", e)))
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
