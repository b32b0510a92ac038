/// In-memory audio output
use mixroom_core::{AudioBuffer, AudioOutput, MixroomError, Result};
use std::sync::Mutex;

/// Output that keeps every played buffer
///
/// Useful headless, and for inspecting what the voice pipeline produced.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    played: Mutex<Vec<AudioBuffer>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers played so far, oldest first
    pub fn take(&self) -> Vec<AudioBuffer> {
        self.played
            .lock()
            .map(|mut played| std::mem::take(&mut *played))
            .unwrap_or_default()
    }

    /// Number of buffers played so far
    pub fn len(&self) -> usize {
        self.played.lock().map(|played| played.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioOutput for BufferedOutput {
    fn play(&self, buffer: AudioBuffer) -> Result<()> {
        self.played
            .lock()
            .map_err(|_| MixroomError::playback("output lock poisoned"))?
            .push(buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixroom_core::SampleRate;

    #[test]
    fn keeps_played_buffers_in_order() {
        let output = BufferedOutput::new();
        assert!(output.is_empty());

        for len in [1, 2, 3] {
            let buffer = AudioBuffer::mono(vec![0.0; len], SampleRate::VOICE).unwrap();
            output.play(buffer).unwrap();
        }
        assert_eq!(output.len(), 3);

        let played = output.take();
        let lengths: Vec<_> = played.iter().map(AudioBuffer::frames).collect();
        assert_eq!(lengths, [1, 2, 3]);
        assert!(output.is_empty());
    }
}
