//! Mix engine
//!
//! Turns an uploaded file into a processed WAV plus quality statistics:
//! decode, render through the preset chain, analyze, encode. Each step is
//! awaited before the next one starts and runs on tokio's blocking pool.
//! Calls share nothing mutable except the context tracker.

use crate::analyzer::analyze;
use crate::chain::chain_for;
use crate::context::ContextTracker;
use crate::decoder::SymphoniaDecoder;
use crate::encoder::encode_wav;
use crate::renderer::OfflineRenderer;
use mixroom_core::{
    AudioBuffer, EngineSettings, MixPreset, MixroomConfig, MixroomError, QualityStats, Result,
};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Processed track handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMix {
    /// Complete 16-bit PCM WAV file
    pub wav: Vec<u8>,
    /// Length of the rendered audio
    pub duration_secs: f64,
    /// Measurements of the rendered audio
    pub stats: QualityStats,
    /// Preset the track was processed with
    pub preset: MixPreset,
}

impl RenderedMix {
    /// MIME type of `wav`
    pub const MIME_TYPE: &'static str = "audio/wav";
}

/// Decode/render/analyze/encode pipeline
#[derive(Debug, Clone)]
pub struct MixEngine {
    contexts: ContextTracker,
    decoder: SymphoniaDecoder,
    renderer: OfflineRenderer,
}

impl MixEngine {
    /// Create an engine from engine settings
    pub fn new(settings: &EngineSettings) -> Self {
        let contexts = ContextTracker::new(settings.max_open_contexts);
        Self {
            decoder: SymphoniaDecoder::new(contexts.clone()),
            renderer: OfflineRenderer::new(contexts.clone(), settings.render_quantum),
            contexts,
        }
    }

    /// Create an engine from a loaded configuration
    pub fn from_config(config: &MixroomConfig) -> Self {
        Self::new(&config.engine)
    }

    /// Tracker of the decode/render contexts opened by this engine
    pub fn contexts(&self) -> &ContextTracker {
        &self.contexts
    }

    pub fn renderer(&self) -> &OfflineRenderer {
        &self.renderer
    }

    /// Decode file bytes on the blocking pool
    pub async fn decode(&self, bytes: Vec<u8>, extension_hint: Option<&str>) -> Result<AudioBuffer> {
        let decoder = self.decoder.clone();
        let hint = extension_hint.map(str::to_owned);
        tokio::task::spawn_blocking(move || decoder.decode_bytes(bytes, hint.as_deref()))
            .await
            .map_err(|e| MixroomError::decode(format!("decode task failed: {}", e)))?
    }

    /// Render, analyze and encode an already decoded buffer
    pub fn mix_blocking(&self, decoded: &AudioBuffer, preset: MixPreset) -> Result<RenderedMix> {
        let start = Instant::now();

        let rendered = self.renderer.render(decoded, chain_for(preset))?;
        let stats = analyze(&rendered);
        let wav = encode_wav(&rendered)?;

        debug!(
            %preset,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            wav_bytes = wav.len(),
            "Mix rendered"
        );

        Ok(RenderedMix {
            wav,
            duration_secs: rendered.duration_secs(),
            stats,
            preset,
        })
    }

    /// Render, analyze and encode an already decoded buffer on the blocking pool
    pub async fn mix_decoded(&self, decoded: AudioBuffer, preset: MixPreset) -> Result<RenderedMix> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.mix_blocking(&decoded, preset))
            .await
            .map_err(|e| MixroomError::render(format!("render task failed: {}", e)))?
    }

    /// Process one uploaded file with a preset
    ///
    /// The decode context is closed before the render context opens, so a
    /// sequential caller never holds more than one context.
    ///
    /// # Errors
    /// `Decode` if the bytes are not supported audio, `Render` if rendering
    /// fails, `ResourceExhausted` if too many contexts are open.
    pub async fn process_track(
        &self,
        bytes: Vec<u8>,
        extension_hint: Option<&str>,
        preset: MixPreset,
    ) -> Result<RenderedMix> {
        let decoded = self.decode(bytes, extension_hint).await?;
        let mix = self.mix_decoded(decoded, preset).await?;

        info!(
            %preset,
            duration_secs = mix.duration_secs,
            peak = mix.stats.peak,
            rms = mix.stats.rms,
            clips = mix.stats.clipping_count,
            score = mix.stats.score,
            "Track processed"
        );

        Ok(mix)
    }

    /// Read a file and process it with a preset
    pub async fn process_file(&self, path: impl AsRef<Path>, preset: MixPreset) -> Result<RenderedMix> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let hint = path.extension().and_then(|e| e.to_str());
        self.process_track(bytes, hint, preset).await
    }
}

impl Default for MixEngine {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}
