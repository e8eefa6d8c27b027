//! WAV 编码
//!
//! 16 位 PCM WAV（RIFF/WAVE + fmt + data）。RIFF 的长度字段是 u32，
//! data 块超过 `MAX_WAV_DATA_SIZE` 的音频无法用单个 WAV 表示

use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::application::ports::AudioError;

/// WAV 头长度
pub const WAV_HEADER_SIZE: usize = 44;

/// data 块最大字节数（RIFF 长度字段 = 36 + data）
pub const MAX_WAV_DATA_SIZE: u64 = u32::MAX as u64 - 36;

const BITS_PER_SAMPLE: u16 = 16;

/// 静音写入块大小
const ZERO_CHUNK: [u8; 64 * 1024] = [0; 64 * 1024];

/// 构建 16 位 PCM WAV 头
pub fn pcm16_header(
    sample_rate: u32,
    channels: u16,
    data_size: u64,
) -> Result<[u8; WAV_HEADER_SIZE], AudioError> {
    if data_size > MAX_WAV_DATA_SIZE {
        return Err(AudioError::EncodingError(format!(
            "{} bytes of audio exceed the WAV size limit of {} bytes",
            data_size, MAX_WAV_DATA_SIZE
        )));
    }
    let data_size = data_size as u32;
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * block_align as u32;

    let mut header = [0u8; WAV_HEADER_SIZE];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
    Ok(header)
}

/// 单声道静音的 data 块字节数
pub fn silent_data_size(duration_ms: u64, sample_rate: u32) -> Result<u64, AudioError> {
    (sample_rate as u64)
        .checked_mul(duration_ms)
        .map(|n| n / 1000)
        .and_then(|samples| samples.checked_mul((BITS_PER_SAMPLE / 8) as u64))
        .filter(|size| *size <= MAX_WAV_DATA_SIZE)
        .ok_or_else(|| {
            AudioError::EncodingError(format!(
                "{} ms of audio exceed the WAV size limit",
                duration_ms
            ))
        })
}

/// 把指定时长的单声道静音 WAV 流式写入文件，返回文件字节数
pub async fn write_silent_wav(
    path: &Path,
    duration_ms: u64,
    sample_rate: u32,
) -> Result<u64, AudioError> {
    let data_size = silent_data_size(duration_ms, sample_rate)?;
    let header = pcm16_header(sample_rate, 1, data_size)?;

    let file = File::create(path)
        .await
        .map_err(|e| AudioError::IoError(e.to_string()))?;
    let mut writer = BufWriter::new(file);

    let io = |e: std::io::Error| AudioError::IoError(e.to_string());
    writer.write_all(&header).await.map_err(io)?;

    let mut remaining = data_size;
    while remaining > 0 {
        let n = remaining.min(ZERO_CHUNK.len() as u64) as usize;
        writer.write_all(&ZERO_CHUNK[..n]).await.map_err(io)?;
        remaining -= n as u64;
    }
    writer.flush().await.map_err(io)?;

    Ok(WAV_HEADER_SIZE as u64 + data_size)
}
