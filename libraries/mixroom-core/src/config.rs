/// Engine configuration
use crate::error::{MixroomError, Result};
use crate::types::PlanLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up by `MixroomConfig::load`
pub const CONFIG_FILE: &str = "mixroom.toml";

/// Environment variable prefix (`MIXROOM_ENGINE__MAX_OPEN_CONTEXTS=4`)
pub const ENV_PREFIX: &str = "MIXROOM";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MixroomConfig {
    /// Offline engine settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Voice playback settings
    #[serde(default)]
    pub voice: VoiceSettings,

    /// Free plan limits
    #[serde(default)]
    pub plan: PlanLimits,
}

/// Settings of the offline mix engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Maximum number of decode/render contexts open at the same time
    #[serde(default = "default_max_open_contexts")]
    pub max_open_contexts: usize,

    /// Frames processed per block by the offline renderer
    #[serde(default = "default_render_quantum")]
    pub render_quantum: usize,
}

/// Settings of the voice pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceSettings {
    /// Sample rate of the base64 PCM delivered for spoken playback
    #[serde(default = "default_voice_sample_rate")]
    pub sample_rate: u32,
}

fn default_max_open_contexts() -> usize {
    6
}

fn default_render_quantum() -> usize {
    128
}

fn default_voice_sample_rate() -> u32 {
    24_000
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_open_contexts: default_max_open_contexts(),
            render_quantum: default_render_quantum(),
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_voice_sample_rate(),
        }
    }
}

impl MixroomConfig {
    /// Load configuration from `mixroom.toml` (if present) and environment
    ///
    /// # Errors
    /// Returns a configuration error for unreadable or invalid settings.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from the given file (if present) and environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path));
        }

        // Override with environment variables (MIXROOM_ENGINE__RENDER_QUANTUM)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    /// Returns a configuration error naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.engine.max_open_contexts == 0 {
            return Err(MixroomError::config(
                "engine.max_open_contexts must be at least 1",
            ));
        }
        if self.engine.render_quantum == 0 {
            return Err(MixroomError::config("engine.render_quantum must be at least 1"));
        }
        if self.voice.sample_rate == 0 {
            return Err(MixroomError::config("voice.sample_rate must be non-zero"));
        }
        Ok(())
    }
}
