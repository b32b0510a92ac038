/// Audio-related types
use crate::error::{MixroomError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// CD quality (44.1 kHz)
    pub const CD_QUALITY: Self = Self(44_100);
    /// DVD quality (48 kHz)
    pub const DVD_QUALITY: Self = Self(48_000);
    /// Rate of the synthesized speech delivered by the text-to-speech collaborator
    pub const VOICE: Self = Self(24_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Bits per sample
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Calculate the byte rate (bytes per second)
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.as_hz() * u32::from(self.channels) * u32::from(self.bits_per_sample) / 8
    }

    /// Bytes per interleaved frame
    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }
}

/// Decoded audio, one sample vector per channel.
///
/// Samples are f32 in the range [-1.0, 1.0]. The buffer is immutable once
/// built: processing stages read it and produce a new buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: SampleRate,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data.
    ///
    /// # Errors
    /// Fails when there are no channels, the channel lengths differ or the
    /// sample rate is zero.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: SampleRate) -> Result<Self> {
        if channels.is_empty() {
            return Err(MixroomError::decode("audio buffer has no channels"));
        }
        if sample_rate.as_hz() == 0 {
            return Err(MixroomError::decode("sample rate must be non-zero"));
        }
        if u16::try_from(channels.len()).is_err() {
            return Err(MixroomError::decode(format!(
                "too many channels: {}",
                channels.len()
            )));
        }
        let frames = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != frames) {
            return Err(MixroomError::decode(format!(
                "channel {} has {} frames, expected {}",
                bad,
                channels[bad].len(),
                frames
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Create a mono buffer
    pub fn mono(samples: Vec<f32>, sample_rate: SampleRate) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }

    /// Create a buffer from interleaved samples ([L, R, L, R, ...] for stereo)
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: SampleRate) -> Result<Self> {
        if channels == 0 {
            return Err(MixroomError::decode("audio buffer has no channels"));
        }
        if samples.len() % channels != 0 {
            return Err(MixroomError::decode(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        let frames = samples.len() / channels;
        let mut planar = vec![Vec::with_capacity(frames); channels];
        for frame in samples.chunks_exact(channels) {
            for (channel, &sample) in planar.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(planar, sample_rate)
    }

    /// Interleave all channels into a single vector
    pub fn to_interleaved(&self) -> Vec<f32> {
        let channels = self.channel_count();
        let mut out = Vec::with_capacity(self.frames() * channels);
        for i in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    /// Samples of one channel
    ///
    /// # Panics
    /// Panics if `index >= channel_count()`
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Iterate over the channels
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Sample rate
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Format of this buffer when written as 16-bit PCM
    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.channel_count() as u16, 16)
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.as_hz())
    }

    /// Check if the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Total number of samples across all channels
    pub fn len(&self) -> usize {
        self.frames() * self.channel_count()
    }
}
