//! Symphonia Probe - 基于 symphonia 的音频时长探测
//!
//! 支持 WAV / MP3 / FLAC / OGG(Vorbis)。容器未声明总帧数时逐包累加时长

use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioError, AudioInfo, AudioProbePort};

/// 音频探测器
#[derive(Debug, Default, Clone)]
pub struct SymphoniaProbe;

impl SymphoniaProbe {
    pub fn new() -> Self {
        Self
    }
}

impl AudioProbePort for SymphoniaProbe {
    fn probe(&self, path: &Path) -> Result<AudioInfo, AudioError> {
        let file = File::open(path).map_err(|e| AudioError::IoError(e.to_string()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::DecodingError("No audio track found".to_string()))?;

        let track_id = track.id;
        let params = track.codec_params.clone();

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| AudioError::DecodingError("Unknown sample rate".to_string()))?;
        let channels = params.channels.map(|c| c.count() as u8).unwrap_or(1);

        let frames = match params.n_frames {
            Some(frames) => frames,
            None => {
                // 逐包累加
                let mut total = 0u64;
                loop {
                    match format.next_packet() {
                        Ok(packet) if packet.track_id() == track_id => total += packet.dur,
                        Ok(_) => {}
                        Err(symphonia::core::errors::Error::IoError(e))
                            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                        {
                            break;
                        }
                        Err(e) => {
                            return Err(AudioError::DecodingError(format!(
                                "Packet read error: {}",
                                e
                            )));
                        }
                    }
                }
                total
            }
        };

        let duration_ms = match params.time_base {
            Some(tb) => {
                let time = tb.calc_time(frames);
                time.seconds * 1000 + (time.frac * 1000.0) as u64
            }
            None => frames * 1000 / sample_rate as u64,
        };

        Ok(AudioInfo {
            duration_ms,
            sample_rate,
            channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::audio::write_silent_wav;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_probe_wav_duration() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("chapter_01.wav");
        write_silent_wav(&path, 1500, 16000).await.unwrap();

        let info = SymphoniaProbe::new().probe(&path).unwrap();
        assert_eq!(info.sample_rate, 16000);
        assert_eq!(info.channels, 1);
        assert!(info.duration_ms >= 1490 && info.duration_ms <= 1510);
    }

    #[test]
    fn test_probe_garbage_fails() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("chapter_01.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(SymphoniaProbe::new().probe(&path).is_err());
    }

    #[test]
    fn test_probe_missing_file() {
        let err = SymphoniaProbe::new()
            .probe(Path::new("/nonexistent/chapter_01.wav"))
            .unwrap_err();
        assert!(matches!(err, AudioError::IoError(_)));
    }
}
