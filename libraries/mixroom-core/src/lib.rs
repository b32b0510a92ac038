//! Mixroom Core
//!
//! Platform-agnostic types, traits, configuration and error handling for the
//! Mixroom audio engine.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Audio Types**: `AudioBuffer`, `AudioFormat`, `SampleRate`
//! - **Mix Types**: `MixPreset`, `QualityStats`, plan and usage records
//! - **Collaborator Traits**: `AudioOutput`, `FeedbackGenerator`
//! - **Error Handling**: Unified `MixroomError` and `Result` types
//! - **Configuration**: `MixroomConfig` loaded from file and environment
//!
//! # Example
//!
//! ```rust
//! use mixroom_core::{AudioBuffer, MixPreset, SampleRate};
//!
//! let buffer = AudioBuffer::mono(vec![0.0; 480], SampleRate::new(48_000)).unwrap();
//! assert_eq!(buffer.frames(), 480);
//!
//! let preset: MixPreset = "loud".parse().unwrap();
//! assert!(preset.info().premium);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{EngineSettings, MixroomConfig, VoiceSettings};
pub use error::{ContextKind, MixroomError, Result};
pub use traits::{AudioOutput, FeedbackGenerator};
pub use types::{
    AudioBuffer, AudioFormat, FeedbackRequest, Language, MixPreset, PlanLimits, PresetInfo,
    ProcessKind, QualityStats, SampleRate, UserPlan, UserUsage,
};
