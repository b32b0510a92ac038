//! Mixroom Audio
//!
//! Offline mixing and mastering of uploaded tracks, plus the live voice
//! pipeline for synthesized speech.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (MP3, FLAC, OGG, WAV, AAC)
//! - Preset signal chains (high-pass, shelves, peaking EQ, compressor, limiter, gain)
//! - Offline rendering, level analysis and 16-bit WAV encoding
//! - Voice playback with pitch/speed control through a shared voice chain
//!
//! # Example: Processing a Track
//!
//! ```rust,no_run
//! use mixroom_audio::MixEngine;
//! use mixroom_core::{MixPreset, MixroomConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MixroomConfig::load()?;
//! let engine = MixEngine::from_config(&config);
//!
//! let mix = engine.process_file("/music/demo.mp3", MixPreset::Clean).await?;
//! println!("{} ({} bytes)", mix.stats, mix.wav.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Rendering a Buffer
//!
//! ```rust
//! use mixroom_audio::{analyze, chain_for, ContextTracker, OfflineRenderer};
//! use mixroom_core::{AudioBuffer, MixPreset, SampleRate};
//!
//! let input = AudioBuffer::mono(vec![0.25; 4410], SampleRate::CD_QUALITY).unwrap();
//! let renderer = OfflineRenderer::new(ContextTracker::new(1), 128);
//!
//! let output = renderer.render(&input, chain_for(MixPreset::Raw)).unwrap();
//! assert_eq!(output.frames(), input.frames());
//! assert_eq!(analyze(&output).clipping_count, 0);
//! ```

pub mod analyzer;
pub mod chain;
mod context;
mod decoder;
pub mod effects;
pub mod encoder;
mod engine;
mod output;
pub mod renderer;
mod session;
pub mod voice;

pub use analyzer::{analyze, score_for, CLIP_THRESHOLD};
pub use chain::{chain_for, ChainKernel, SignalChain, StageSpec, VOICE_CHAIN};
pub use context::{ContextGuard, ContextTracker};
pub use decoder::{decode_pcm16_base64, SymphoniaDecoder};
pub use encoder::{encode_wav, WAV_HEADER_LEN};
pub use engine::{MixEngine, RenderedMix};
pub use output::BufferedOutput;
pub use renderer::{OfflineRenderer, DEFAULT_RENDER_QUANTUM};
pub use session::{MixReport, MixRequest, MixSession};
pub use voice::{PlaybackOptions, VoicePlayback};
