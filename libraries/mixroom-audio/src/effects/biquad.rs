/// Biquad filter stage
///
/// Second-order IIR filter using the RBJ cookbook formulas. Coefficients are
/// computed once for a sample rate and never change while processing, so a
/// configured `Biquad` can be cloned to get an identical filter with its own
/// state.
use super::AudioEffect;
use mixroom_core::{MixroomError, Result};

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    /// Removes content below the frequency
    HighPass,
    /// Boosts/cuts below frequency
    LowShelf,
    /// Boosts/cuts around frequency with Q bandwidth
    Peaking,
    /// Boosts/cuts above frequency
    HighShelf,
}

/// Normalized biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

/// Shelf slope used for both shelves (S = 1, steepest monotonic shelf)
const SHELF_SLOPE: f32 = 1.0;

impl BiquadCoefficients {
    /// Compute coefficients for a filter.
    ///
    /// `q` is used by the high-pass and peaking responses; shelves use a
    /// fixed slope. The frequency is clamped to 45% of the sample rate to
    /// stay clear of Nyquist instability.
    ///
    /// # Errors
    /// Returns a render error when a parameter is outside the valid range.
    pub fn new(
        filter_type: FilterType,
        sample_rate: u32,
        frequency: f32,
        q: f32,
        gain_db: f32,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MixroomError::render("filter sample rate must be non-zero"));
        }
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(MixroomError::render(format!(
                "filter frequency out of range: {frequency} Hz"
            )));
        }
        if !q.is_finite() || !(0.0001..=1000.0).contains(&q) {
            return Err(MixroomError::render(format!("filter Q out of range: {q}")));
        }
        if !gain_db.is_finite() || !(-40.0..=40.0).contains(&gain_db) {
            return Err(MixroomError::render(format!(
                "filter gain out of range: {gain_db} dB"
            )));
        }

        let sr = sample_rate as f32;
        let clamped_freq = frequency.min(sr * 0.45);
        let omega = 2.0 * std::f32::consts::PI * clamped_freq / sr;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let a = 10.0_f32.powf(gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match filter_type {
            FilterType::HighPass => {
                let alpha = sin_omega / (2.0 * q);
                (
                    (1.0 + cos_omega) / 2.0,
                    -(1.0 + cos_omega),
                    (1.0 + cos_omega) / 2.0,
                    1.0 + alpha,
                    -2.0 * cos_omega,
                    1.0 - alpha,
                )
            }
            FilterType::Peaking => {
                let alpha = sin_omega / (2.0 * q);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_omega,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_omega,
                    1.0 - alpha / a,
                )
            }
            FilterType::LowShelf => {
                let alpha =
                    sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / SHELF_SLOPE - 1.0) + 2.0).sqrt();
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_omega + beta),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega),
                    a * ((a + 1.0) - (a - 1.0) * cos_omega - beta),
                    (a + 1.0) + (a - 1.0) * cos_omega + beta,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega),
                    (a + 1.0) + (a - 1.0) * cos_omega - beta,
                )
            }
            FilterType::HighShelf => {
                let alpha =
                    sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / SHELF_SLOPE - 1.0) + 2.0).sqrt();
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_omega + beta),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega),
                    a * ((a + 1.0) + (a - 1.0) * cos_omega - beta),
                    (a + 1.0) - (a - 1.0) * cos_omega + beta,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_omega),
                    (a + 1.0) - (a - 1.0) * cos_omega - beta,
                )
            }
        };

        Ok(Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        })
    }
}

/// Per-channel filter memory
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

/// Biquad filter applied to every channel of an interleaved block
#[derive(Debug, Clone)]
pub struct Biquad {
    filter_type: FilterType,
    coeffs: BiquadCoefficients,
    state: Vec<ChannelState>,
}

impl Biquad {
    /// Create a filter for `channels` interleaved channels
    pub fn new(filter_type: FilterType, coeffs: BiquadCoefficients, channels: usize) -> Self {
        Self {
            filter_type,
            coeffs,
            state: vec![ChannelState::default(); channels],
        }
    }

    /// Filter response
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Active coefficients
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    #[inline]
    fn process_sample(coeffs: &BiquadCoefficients, state: &mut ChannelState, input: f32) -> f32 {
        let mut out = coeffs.b0 * input + coeffs.b1 * state.x1 + coeffs.b2 * state.x2
            - coeffs.a1 * state.y1
            - coeffs.a2 * state.y2;

        // Flush denormals
        if out.abs() < 1e-15 {
            out = 0.0;
        }

        state.x2 = state.x1;
        state.x1 = input;
        state.y2 = state.y1;
        state.y1 = out;
        out
    }
}

impl AudioEffect for Biquad {
    fn process(&mut self, block: &mut [f32], channels: usize) {
        debug_assert_eq!(channels, self.state.len());
        let coeffs = self.coeffs;
        for frame in block.chunks_exact_mut(channels) {
            for (sample, state) in frame.iter_mut().zip(self.state.iter_mut()) {
                *sample = Self::process_sample(&coeffs, state, *sample);
            }
        }
    }

    fn reset(&mut self) {
        for state in &mut self.state {
            *state = ChannelState::default();
        }
    }

    fn name(&self) -> &str {
        match self.filter_type {
            FilterType::HighPass => "High-Pass Filter",
            FilterType::LowShelf => "Low Shelf",
            FilterType::Peaking => "Peaking EQ",
            FilterType::HighShelf => "High Shelf",
        }
    }
}
