//! TTS Adapters - 语音引擎实现

mod espeak_tts_client;
mod factory;
mod http_tts_client;
mod renderer;
mod silent_tts_client;

pub use espeak_tts_client::{parse_voice_list, EspeakConfig, EspeakTtsClient};
pub use factory::VoiceProviderFactory;
pub use http_tts_client::{HttpTtsClient, HttpTtsClientConfig};
pub use renderer::AudioRenderer;
pub use silent_tts_client::{SilentTtsClient, SilentTtsConfig};
