/// Collaborator traits for Mixroom
use crate::error::Result;
use crate::types::{AudioBuffer, FeedbackRequest};
use async_trait::async_trait;

/// Audio output trait
///
/// Receives fully processed buffers from the voice pipeline and starts
/// playing them immediately. Shared between overlapping playback calls,
/// so implementations take `&self`.
pub trait AudioOutput: Send + Sync {
    /// Start playing a buffer
    ///
    /// # Errors
    /// Returns an error if the device rejects the buffer
    fn play(&self, buffer: AudioBuffer) -> Result<()>;
}

/// Text-generation collaborator producing human feedback for a mix
#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    /// Produce a short feedback text for a processed file
    ///
    /// # Errors
    /// Returns an error if the hosted service fails
    async fn mix_feedback(&self, request: &FeedbackRequest) -> Result<String>;
}
