//! Voice Provider Factory - 按配置创建语音引擎

use std::sync::Arc;

use super::{
    AudioRenderer, EspeakConfig, EspeakTtsClient, HttpTtsClient, HttpTtsClientConfig,
    SilentTtsClient, SilentTtsConfig,
};
use crate::application::ports::{TtsError, VoiceProviderPort};
use crate::config::{OutputConfig, ProviderKind, TtsConfig};
use crate::infrastructure::adapters::audio::{FfmpegTranscoder, FfmpegTranscoderConfig};

/// 语音引擎工厂
#[derive(Debug)]
pub struct VoiceProviderFactory;

impl VoiceProviderFactory {
    /// 创建语音引擎
    ///
    /// 所有引擎共用同一个 ffmpeg 转码器
    pub fn create(
        tts: &TtsConfig,
        output: &OutputConfig,
    ) -> Result<Arc<dyn VoiceProviderPort>, TtsError> {
        let transcoder = FfmpegTranscoder::new(FfmpegTranscoderConfig {
            binary: output.ffmpeg_binary.clone(),
            bitrate: output.bitrate.clone(),
            ..Default::default()
        });
        let renderer = AudioRenderer::new(Arc::new(transcoder));
        let voice = tts.voice_settings();

        match tts.provider {
            ProviderKind::Http => {
                let config = HttpTtsClientConfig::new(&tts.url)
                    .with_timeout(tts.timeout_secs)
                    .with_max_retries(tts.max_retries);
                let provider = HttpTtsClient::new(config, voice, renderer)?;
                Ok(Arc::new(provider))
            }

            ProviderKind::Espeak => {
                let config = EspeakConfig {
                    binary: tts.espeak_binary.clone(),
                    ..Default::default()
                };
                Ok(Arc::new(EspeakTtsClient::new(config, voice, renderer)))
            }

            ProviderKind::Silent => Ok(Arc::new(SilentTtsClient::new(
                SilentTtsConfig::default(),
                renderer,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_each_provider() {
        let output = OutputConfig::default();
        for (kind, name) in [
            (ProviderKind::Http, "http"),
            (ProviderKind::Espeak, "espeak"),
            (ProviderKind::Silent, "silent"),
        ] {
            let tts = TtsConfig {
                provider: kind,
                ..Default::default()
            };
            let provider = VoiceProviderFactory::create(&tts, &output).unwrap();
            assert_eq!(provider.name(), name);
        }
    }
}
