//! Offline rendering
//!
//! Runs a complete buffer through a signal chain faster than real time and
//! returns a new buffer with the same channel count, frame count and sample
//! rate. The input buffer is never modified.

use crate::chain::{SignalChain, StageSpec};
use crate::context::ContextTracker;
use mixroom_core::{AudioBuffer, ContextKind, MixroomError, Result};
use std::time::Instant;
use tracing::debug;

/// Frames processed per block unless configured otherwise
pub const DEFAULT_RENDER_QUANTUM: usize = 128;

/// Renders buffers through freshly built chains
#[derive(Debug, Clone)]
pub struct OfflineRenderer {
    contexts: ContextTracker,
    quantum: usize,
}

impl OfflineRenderer {
    /// Create a renderer processing `quantum` frames per block
    pub fn new(contexts: ContextTracker, quantum: usize) -> Self {
        Self {
            contexts,
            quantum: quantum.max(1),
        }
    }

    /// Frames per block
    pub fn quantum(&self) -> usize {
        self.quantum
    }

    /// Render `input` through a new chain built from `stages`
    ///
    /// A render context is held for the duration of the call.
    ///
    /// # Errors
    /// Returns a render error when a stage parameter is out of range, the
    /// work buffer cannot be allocated, or the output is not finite.
    /// Returns `ResourceExhausted` when no render context is available.
    pub fn render(&self, input: &AudioBuffer, stages: &[StageSpec]) -> Result<AudioBuffer> {
        let _context = self.contexts.open(ContextKind::Render)?;
        let start = Instant::now();

        let mut chain = SignalChain::build(
            stages,
            input.sample_rate().as_hz(),
            input.channel_count(),
        )?;
        let output = run_chain(&mut chain, input, self.quantum)?;

        debug!(
            frames = input.frames(),
            channels = input.channel_count(),
            stages = chain.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rendered buffer"
        );

        Ok(output)
    }
}

/// Process a whole buffer through `chain` in blocks of `quantum` frames
///
/// # Errors
/// Returns a render error when the chain layout does not match the buffer,
/// the work buffer cannot be allocated, or a non-finite sample is produced.
pub fn run_chain(chain: &mut SignalChain, input: &AudioBuffer, quantum: usize) -> Result<AudioBuffer> {
    let channels = input.channel_count();
    if chain.channels() != channels || chain.sample_rate() != input.sample_rate().as_hz() {
        return Err(MixroomError::render(format!(
            "chain built for {} Hz x{} cannot render {} Hz x{}",
            chain.sample_rate(),
            chain.channels(),
            input.sample_rate().as_hz(),
            channels
        )));
    }

    let total = input.len();
    let mut work: Vec<f32> = Vec::new();
    work.try_reserve_exact(total).map_err(|e| {
        MixroomError::render(format!("cannot allocate {} samples for rendering: {}", total, e))
    })?;
    for frame in 0..input.frames() {
        work.extend(input.channels().map(|channel| channel[frame]));
    }

    for block in work.chunks_mut(quantum.max(1) * channels) {
        chain.process(block);
    }

    if let Some(position) = work.iter().position(|s| !s.is_finite()) {
        return Err(MixroomError::render(format!(
            "non-finite sample at frame {}",
            position / channels
        )));
    }

    AudioBuffer::from_interleaved(&work, channels, input.sample_rate())
        .map_err(|e| MixroomError::render(e.to_string()))
}
