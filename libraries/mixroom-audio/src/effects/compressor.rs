/// Dynamic Range Compressor
///
/// Reduces the dynamic range of audio by attenuating signals above a threshold.
/// With a high ratio and fast attack the same stage acts as a limiter.
use super::AudioEffect;
use mixroom_core::{MixroomError, Result};

/// Compressor settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Threshold in dB (-100 to 0)
    /// Signals above this level will be compressed
    pub threshold_db: f32,

    /// Knee width in dB (0 to 40)
    /// Softens the transition at the threshold (0 = hard knee, >0 = soft knee)
    pub knee_db: f32,

    /// Ratio (1.0 to 20.0)
    /// Amount of compression (e.g., 4.0 means 4:1 compression)
    pub ratio: f32,

    /// Attack time in milliseconds (0.1 to 1000)
    pub attack_ms: f32,

    /// Release time in milliseconds (1 to 1000)
    pub release_ms: f32,
}

impl CompressorSettings {
    /// Hard-knee settings
    pub const fn hard_knee(threshold_db: f32, ratio: f32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            threshold_db,
            knee_db: 0.0,
            ratio,
            attack_ms,
            release_ms,
        }
    }

    /// Check every parameter against its valid range
    ///
    /// # Errors
    /// Returns a render error naming the first parameter out of range.
    pub fn validate(&self) -> Result<()> {
        fn check(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
            if value.is_finite() && (min..=max).contains(&value) {
                Ok(())
            } else {
                Err(MixroomError::render(format!(
                    "compressor {name} out of range: {value} (expected {min} to {max})"
                )))
            }
        }

        check("threshold", self.threshold_db, -100.0, 0.0)?;
        check("knee", self.knee_db, 0.0, 40.0)?;
        check("ratio", self.ratio, 1.0, 20.0)?;
        check("attack", self.attack_ms, 0.1, 1000.0)?;
        check("release", self.release_ms, 1.0, 1000.0)
    }
}

/// Dynamic Range Compressor
///
/// Uses a two-stage design for proper timing and low THD:
/// 1. Peak level detection with instant attack and slow release (peak hold)
/// 2. Gain smoothing with the configured attack/release
///
/// Detection is linked across channels: the loudest channel of each frame
/// drives one gain that is applied to every channel.
#[derive(Debug, Clone)]
pub struct Compressor {
    settings: CompressorSettings,

    // Peak level detector (in dB)
    peak_level_db: f32,

    // Smoothed gain reduction in dB
    gain_reduction_db: f32,

    // Coefficient cache
    peak_release_coeff: f32,
    gr_attack_coeff: f32,
    gr_release_coeff: f32,
}

/// Floor the peak detector decays toward
const NOISE_FLOOR_DB: f32 = -120.0;

/// Hold time of the peak detector
const PEAK_RELEASE_MS: f32 = 50.0;

impl Compressor {
    /// Create a compressor for a sample rate
    ///
    /// # Errors
    /// Returns a render error when the settings are out of range.
    pub fn new(settings: CompressorSettings, sample_rate: u32) -> Result<Self> {
        settings.validate()?;
        if sample_rate == 0 {
            return Err(MixroomError::render("compressor sample rate must be non-zero"));
        }

        let sr = sample_rate as f32;
        let time_coeff = |ms: f32| (-1.0 / (ms * sr / 1000.0)).exp();

        Ok(Self {
            settings,
            peak_level_db: NOISE_FLOOR_DB,
            gain_reduction_db: 0.0,
            peak_release_coeff: time_coeff(PEAK_RELEASE_MS),
            // 63.2% (1 - 1/e) response at the configured time
            gr_attack_coeff: time_coeff(settings.attack_ms),
            gr_release_coeff: time_coeff(settings.release_ms),
        })
    }

    /// Get current settings
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Compute the desired output level for a given input level (in dB)
    #[inline]
    fn compute_output_level(&self, input_db: f32) -> f32 {
        let threshold = self.settings.threshold_db;
        let ratio = self.settings.ratio;
        let knee = self.settings.knee_db;

        if knee <= 0.0 {
            if input_db <= threshold {
                input_db
            } else {
                threshold + (input_db - threshold) / ratio
            }
        } else {
            let half_knee = knee / 2.0;
            let knee_start = threshold - half_knee;
            let knee_end = threshold + half_knee;

            if input_db <= knee_start {
                input_db
            } else if input_db >= knee_end {
                threshold + (input_db - threshold) / ratio
            } else {
                // Quadratic transition through the knee
                let x = input_db - knee_start;
                let slope_change = (1.0 - 1.0 / ratio) / (2.0 * knee);
                input_db - slope_change * x * x
            }
        }
    }

    /// Gain reduction in dB (negative means reduction)
    #[inline]
    fn compute_gain_reduction(&self, input_db: f32) -> f32 {
        self.compute_output_level(input_db) - input_db
    }

    #[inline]
    fn update_peak_level(&mut self, input_db: f32) {
        if input_db > self.peak_level_db {
            self.peak_level_db = input_db;
        } else {
            // Decay toward the noise floor, not the input: the input is -inf
            // at zero crossings
            self.peak_level_db = self.peak_release_coeff * (self.peak_level_db - NOISE_FLOOR_DB)
                + NOISE_FLOOR_DB;
        }
    }

    #[inline]
    fn smooth_gain_reduction(&mut self, target_gr_db: f32) {
        let coeff = if target_gr_db < self.gain_reduction_db {
            self.gr_attack_coeff
        } else {
            self.gr_release_coeff
        };

        self.gain_reduction_db = coeff * self.gain_reduction_db + (1.0 - coeff) * target_gr_db;
    }
}

impl AudioEffect for Compressor {
    fn process(&mut self, block: &mut [f32], channels: usize) {
        for frame in block.chunks_exact_mut(channels) {
            let max_sample = frame.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));

            let input_db = if max_sample > 1e-10 {
                20.0 * max_sample.log10()
            } else {
                -200.0
            };

            self.update_peak_level(input_db);
            let target_gr_db = self.compute_gain_reduction(self.peak_level_db);
            self.smooth_gain_reduction(target_gr_db);

            if self.gain_reduction_db != 0.0 {
                let gain = 10.0_f32.powf(self.gain_reduction_db / 20.0);
                for sample in frame.iter_mut() {
                    *sample *= gain;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.peak_level_db = NOISE_FLOOR_DB;
        self.gain_reduction_db = 0.0;
    }

    fn name(&self) -> &str {
        "Dynamic Range Compressor"
    }
}
