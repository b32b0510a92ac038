/// Core error types for Mixroom
use std::fmt;
use thiserror::Error;

/// Result type alias using `MixroomError`
pub type Result<T> = std::result::Result<T, MixroomError>;

/// Kind of host audio context held open by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Short-lived context used to decode a file
    Decode,
    /// Offline context used to render a chain
    Render,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => write!(f, "decode"),
            Self::Render => write!(f, "render"),
        }
    }
}

/// Core error type for Mixroom
#[derive(Error, Debug)]
pub enum MixroomError {
    /// Input is not valid or supported audio
    #[error("Decode error: {0}")]
    Decode(String),

    /// The renderer rejected the chain or could not allocate its work buffer
    #[error("Render error: {0}")]
    Render(String),

    /// A preset name that does not exist reached the engine
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    /// Too many audio contexts open at once
    #[error("Too many open {kind} contexts (limit {limit})")]
    ResourceExhausted {
        /// Kind of context that could not be opened
        kind: ContextKind,
        /// Configured limit of simultaneously open contexts
        limit: usize,
    },

    /// Caller-side plan limit rejected the request
    #[error("Plan limit: {0}")]
    PlanLimit(String),

    /// Feedback collaborator failed
    #[error("Feedback error: {0}")]
    Feedback(String),

    /// Audio output failed
    #[error("Playback error: {0}")]
    Playback(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MixroomError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a render error
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a plan limit error
    pub fn plan_limit(msg: impl Into<String>) -> Self {
        Self::PlanLimit(msg.into())
    }

    /// Create a feedback error
    pub fn feedback(msg: impl Into<String>) -> Self {
        Self::Feedback(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the user can simply retry (the file selection is kept).
    ///
    /// `UnknownPreset` is an integration bug and `ResourceExhausted` needs a
    /// reload, so neither is recoverable from the UI.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Render(_) | Self::PlanLimit(_) | Self::Feedback(_) | Self::Io(_)
        )
    }
}

impl From<config::ConfigError> for MixroomError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
