//! Live voice playback
//!
//! Synthesized speech arrives as base64 16-bit PCM. Each clip is resampled
//! for the requested pitch/speed, run through the voice chain and handed to
//! an [`AudioOutput`]. The voice chain's coefficients are computed once, on
//! the first clip, and shared: every `play` call spawns its own chain state
//! from that kernel, so overlapping calls never touch each other's filters.

use crate::chain::{ChainKernel, VOICE_CHAIN};
use crate::decoder::decode_pcm16_base64;
use crate::renderer::{run_chain, DEFAULT_RENDER_QUANTUM};
use mixroom_core::{AudioBuffer, AudioOutput, MixroomError, Result, SampleRate, VoiceSettings};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error};

/// Slowest and fastest supported playback rates
const MIN_RATE: f64 = 1.0 / 16.0;
const MAX_RATE: f64 = 16.0;

/// Pitch and speed applied to a voice clip
///
/// Both change the playback rate together, like a tape: `rate = speed *
/// 2^(pitch_cents / 1200)`. A faster rate gives a shorter, higher clip.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackOptions {
    /// Detune in cents (100 = one semitone)
    pub pitch_cents: Option<f32>,
    /// Playback speed multiplier
    pub speed: Option<f32>,
}

impl PlaybackOptions {
    /// Deeper, slower voice used for custom voice identities
    pub const CUSTOM_VOICE: Self = Self {
        pitch_cents: Some(-150.0),
        speed: Some(0.95),
    };

    /// Combined playback rate
    pub fn playback_rate(&self) -> f64 {
        let speed = f64::from(self.speed.unwrap_or(1.0));
        let cents = f64::from(self.pitch_cents.unwrap_or(0.0));
        speed * (cents / 1200.0).exp2()
    }
}

/// Resample a buffer by playing it back at `rate` (linear interpolation)
///
/// # Errors
/// Returns a playback error if the rate is not finite or outside 1/16..=16.
pub fn varispeed(buffer: &AudioBuffer, rate: f64) -> Result<AudioBuffer> {
    if !rate.is_finite() || !(MIN_RATE..=MAX_RATE).contains(&rate) {
        return Err(MixroomError::playback(format!(
            "playback rate {rate} outside {MIN_RATE}..={MAX_RATE}"
        )));
    }
    if (rate - 1.0).abs() < f64::EPSILON || buffer.is_empty() {
        return Ok(buffer.clone());
    }

    let frames = buffer.frames();
    let out_frames = ((frames as f64) / rate).ceil() as usize;

    let channels = buffer
        .channels()
        .map(|input| {
            (0..out_frames)
                .map(|i| {
                    let position = i as f64 * rate;
                    let index = position.floor() as usize;
                    let frac = (position - index as f64) as f32;
                    let current = input.get(index).copied().unwrap_or(0.0);
                    let next = input.get(index + 1).copied().unwrap_or(current);
                    current + (next - current) * frac
                })
                .collect()
        })
        .collect();

    AudioBuffer::new(channels, buffer.sample_rate())
}

/// Process-lifetime voice pipeline
pub struct VoicePlayback {
    output: Arc<dyn AudioOutput>,
    sample_rate: SampleRate,
    kernel: OnceLock<ChainKernel>,
}

impl VoicePlayback {
    /// Create a voice pipeline writing to `output`
    pub fn new(output: Arc<dyn AudioOutput>, sample_rate: SampleRate) -> Self {
        Self {
            output,
            sample_rate,
            kernel: OnceLock::new(),
        }
    }

    /// Create a voice pipeline from configuration
    pub fn from_settings(output: Arc<dyn AudioOutput>, settings: &VoiceSettings) -> Self {
        Self::new(output, SampleRate::new(settings.sample_rate))
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Whether the voice chain has been built yet
    pub fn is_initialized(&self) -> bool {
        self.kernel.get().is_some()
    }

    fn kernel(&self) -> Result<&ChainKernel> {
        if let Some(kernel) = self.kernel.get() {
            return Ok(kernel);
        }
        let kernel = ChainKernel::new(VOICE_CHAIN, self.sample_rate.as_hz(), 1)?;
        debug!(sample_rate = self.sample_rate.as_hz(), "Voice chain initialized");
        // A concurrent first call may have won the race; either kernel is identical
        Ok(self.kernel.get_or_init(|| kernel))
    }

    /// Decode, resample and process one clip without playing it
    ///
    /// # Errors
    /// Returns a decode error for bad PCM, a playback error for an invalid
    /// rate, or a render error if processing fails.
    pub fn prepare(&self, pcm_base64: &str, options: PlaybackOptions) -> Result<AudioBuffer> {
        let decoded = decode_pcm16_base64(pcm_base64, self.sample_rate)?;
        let resampled = varispeed(&decoded, options.playback_rate())?;

        let mut chain = self.kernel()?.spawn();
        run_chain(&mut chain, &resampled, DEFAULT_RENDER_QUANTUM)
    }

    /// Play one clip
    ///
    /// Failures are logged and swallowed; a broken clip never interrupts
    /// the conversation.
    pub fn play(&self, pcm_base64: &str, options: PlaybackOptions) {
        let result = self
            .prepare(pcm_base64, options)
            .and_then(|buffer| self.output.play(buffer));

        if let Err(e) = result {
            error!(error = %e, "Voice playback failed");
        }
    }
}

impl std::fmt::Debug for VoicePlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoicePlayback")
            .field("sample_rate", &self.sample_rate)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
