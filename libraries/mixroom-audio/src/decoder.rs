/// Audio decoding using Symphonia
use crate::context::ContextTracker;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mixroom_core::{AudioBuffer, ContextKind, MixroomError, Result, SampleRate};
use std::io::Cursor;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::debug;

/// Decodes uploaded files into planar f32 buffers
///
/// Supports: MP3, FLAC, OGG/Vorbis, WAV, AAC/M4A
///
/// The native sample rate and channel layout are kept. The format reader and
/// codec only live for the duration of one `decode_bytes` call, inside a
/// decode context taken from the shared [`ContextTracker`].
#[derive(Debug, Clone)]
pub struct SymphoniaDecoder {
    contexts: ContextTracker,
}

impl SymphoniaDecoder {
    /// Create a decoder that accounts its contexts on `contexts`
    pub fn new(contexts: ContextTracker) -> Self {
        Self { contexts }
    }

    /// Decode a complete file held in memory
    ///
    /// `extension_hint` (e.g. `"mp3"`) helps the probe pick a container.
    ///
    /// # Errors
    /// Returns a decode error for empty or unrecognized input, a missing
    /// audio track, a corrupt packet, a stream with no audio frames, or a
    /// stream that ends before the frame count its header declares.
    pub fn decode_bytes(&self, bytes: Vec<u8>, extension_hint: Option<&str>) -> Result<AudioBuffer> {
        if bytes.is_empty() {
            return Err(MixroomError::decode("input is empty"));
        }

        let _context = self.contexts.open(ContextKind::Decode)?;
        let byte_len = bytes.len();

        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext.trim_start_matches('.'));
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| MixroomError::decode(format!("Failed to probe input: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| MixroomError::decode("No audio tracks found"))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let declared_frames = track.codec_params.n_frames;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| MixroomError::decode(format!("Failed to create decoder: {}", e)))?;

        let mut planar: Vec<Vec<f32>> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(MixroomError::decode(
                        "Stream parameters changed mid-file (chained streams are not supported)",
                    ));
                }
                Err(e) => {
                    return Err(MixroomError::decode(format!("Error reading packet: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder
                .decode(&packet)
                .map_err(|e| MixroomError::decode(format!("Corrupt audio packet: {}", e)))?;

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);

            let channels = spec.channels.count();
            if planar.is_empty() {
                planar = vec![Vec::new(); channels];
            } else if planar.len() != channels {
                return Err(MixroomError::decode(format!(
                    "Channel count changed mid-stream ({} -> {})",
                    planar.len(),
                    channels
                )));
            }

            append_planar(decoded, &mut planar);
        }

        let frames = planar.first().map_or(0, Vec::len);
        if frames == 0 {
            return Err(MixroomError::decode("Input contains no audio frames"));
        }
        if let Some(declared) = declared_frames {
            if (frames as u64) < declared {
                return Err(MixroomError::decode(format!(
                    "Input is truncated: decoded {} of {} frames",
                    frames, declared
                )));
            }
        }

        let sample_rate = sample_rate
            .filter(|&hz| hz > 0)
            .ok_or_else(|| MixroomError::decode("Unknown sample rate"))?;

        debug!(
            bytes = byte_len,
            sample_rate,
            channels = planar.len(),
            frames,
            "Decoded input"
        );

        AudioBuffer::new(planar, SampleRate::new(sample_rate))
    }
}

/// Convert a decoded Symphonia buffer to f32 and append it channel by channel
///
/// Signed integers use symmetric scaling (divide by 2^(N-1)), unsigned
/// formats are centered around zero.
fn append_planar(decoded: AudioBufferRef<'_>, planar: &mut [Vec<f32>]) {
    match decoded {
        // Float audio can carry intersample peaks above 1.0; keep them, the
        // encoder clamps on output
        AudioBufferRef::F32(buf) => extend_channels(&buf, planar, |s| s),
        AudioBufferRef::F64(buf) => extend_channels(&buf, planar, |s| s as f32),
        AudioBufferRef::S32(buf) => extend_channels(&buf, planar, |s| s as f32 / 2147483648.0),
        AudioBufferRef::S24(buf) => {
            extend_channels(&buf, planar, |s| s.inner() as f32 / 8388608.0);
        }
        AudioBufferRef::S16(buf) => extend_channels(&buf, planar, |s| f32::from(s) / 32768.0),
        AudioBufferRef::S8(buf) => extend_channels(&buf, planar, |s| f32::from(s) / 128.0),
        AudioBufferRef::U32(buf) => {
            extend_channels(&buf, planar, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0);
        }
        AudioBufferRef::U24(buf) => {
            extend_channels(&buf, planar, |s| (s.inner() as f32 / 16777215.0) * 2.0 - 1.0);
        }
        AudioBufferRef::U16(buf) => {
            extend_channels(&buf, planar, |s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0);
        }
        AudioBufferRef::U8(buf) => {
            extend_channels(&buf, planar, |s| (f32::from(s) / f32::from(u8::MAX)) * 2.0 - 1.0);
        }
    }
}

fn extend_channels<T, F>(
    buf: &symphonia::core::audio::AudioBuffer<T>,
    planar: &mut [Vec<f32>],
    normalize: F,
) where
    T: Sample + Copy,
    F: Fn(T) -> f32,
{
    for (index, channel) in planar.iter_mut().enumerate() {
        channel.extend(buf.chan(index).iter().map(|&s| normalize(s)));
    }
}

/// Decode base64 16-bit little-endian mono PCM (synthesized speech)
///
/// # Errors
/// Returns a decode error for invalid base64, an odd byte count, or an empty
/// payload.
pub fn decode_pcm16_base64(text: &str, sample_rate: SampleRate) -> Result<AudioBuffer> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| MixroomError::decode(format!("Invalid base64 audio: {}", e)))?;

    if bytes.is_empty() {
        return Err(MixroomError::decode("PCM payload is empty"));
    }
    if bytes.len() % 2 != 0 {
        return Err(MixroomError::decode(format!(
            "PCM payload has an odd byte count ({})",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect();

    AudioBuffer::mono(samples, sample_rate)
}
