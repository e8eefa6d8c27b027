//! Audio Adapters - 音频编码、转码与探测

mod ffmpeg_transcoder;
mod symphonia_probe;
mod wav;

pub use ffmpeg_transcoder::{FfmpegTranscoder, FfmpegTranscoderConfig};
pub use symphonia_probe::SymphoniaProbe;
pub use wav::{pcm16_header, silent_data_size, write_silent_wav, MAX_WAV_DATA_SIZE};
