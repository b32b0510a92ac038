//! Audio processing stages
//!
//! Every stage processes interleaved f32 blocks in place. Multi-channel
//! state is kept per channel; dynamics stages link their detector across
//! channels so the stereo image is preserved.
//!
//! Available stages:
//! - **Biquad**: high-pass, low-shelf, high-shelf and peaking filters
//! - **Compressor**: feed-forward compressor, also used as a limiter
//! - **Gain**: fixed linear gain (makeup gain)

mod biquad;
mod compressor;
mod gain;

pub use biquad::{Biquad, BiquadCoefficients, FilterType};
pub use compressor::{Compressor, CompressorSettings};
pub use gain::Gain;

/// Trait for processing stages that can be chained together
///
/// # Safety
/// - Must NOT allocate memory in `process()`
/// - Must be Send so chains can run on a blocking worker
pub trait AudioEffect: Send {
    /// Process an interleaved block in place
    ///
    /// # Arguments
    /// * `block` - Interleaved samples, `block.len()` is a multiple of `channels`
    /// * `channels` - Number of interleaved channels
    fn process(&mut self, block: &mut [f32], channels: usize);

    /// Reset processing state (filter memories, envelopes)
    fn reset(&mut self);

    /// Get effect name (for debugging)
    fn name(&self) -> &str;
}
