/// Fixed gain stage
use super::AudioEffect;
use mixroom_core::{MixroomError, Result};

/// Multiplies every sample by a constant linear factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    linear: f32,
}

impl Gain {
    /// Create a gain stage
    ///
    /// # Errors
    /// Returns a render error if the factor is negative or not finite.
    pub fn new(linear: f32) -> Result<Self> {
        if !linear.is_finite() || linear < 0.0 {
            return Err(MixroomError::render(format!(
                "gain must be a finite non-negative factor, got {linear}"
            )));
        }
        Ok(Self { linear })
    }

    /// Linear factor
    pub fn linear(&self) -> f32 {
        self.linear
    }

    /// Factor expressed in dB
    pub fn db(&self) -> f32 {
        20.0 * self.linear.log10()
    }
}

impl AudioEffect for Gain {
    fn process(&mut self, block: &mut [f32], _channels: usize) {
        if (self.linear - 1.0).abs() < f32::EPSILON {
            return;
        }
        for sample in block.iter_mut() {
            *sample *= self.linear;
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "Gain"
    }
}
