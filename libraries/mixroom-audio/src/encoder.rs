//! WAV encoder, renders a buffer to a 16-bit PCM WAV byte buffer.

use mixroom_core::{AudioBuffer, MixroomError, Result};

/// Size of the RIFF/fmt/data header written before the samples
pub const WAV_HEADER_LEN: usize = 44;

/// Convert a float sample to 16-bit PCM
///
/// The sample is clamped to [-1.0, 1.0]; negative values scale by 32768 and
/// non-negative values by 32767, truncating toward zero.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a buffer as a canonical 44-byte-header PCM WAV file
///
/// # Errors
/// Returns a render error if the data does not fit a RIFF chunk.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let format = buffer.format();
    let channels = format.channels;
    let sample_rate = format.sample_rate.as_hz();
    let bits_per_sample = format.bits_per_sample;

    let data_len = buffer.len() * 2;
    let data_size = u32::try_from(data_len)
        .ok()
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| {
            MixroomError::render(format!("{} bytes of PCM do not fit a WAV file", data_len))
        })?;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + data_len);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&format.byte_rate().to_le_bytes());
    buf.extend_from_slice(&format.block_align().to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for frame in 0..buffer.frames() {
        for channel in buffer.channels() {
            buf.extend_from_slice(&sample_to_i16(channel[frame]).to_le_bytes());
        }
    }

    Ok(buf)
}
