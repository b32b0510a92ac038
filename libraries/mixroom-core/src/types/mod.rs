mod audio;
mod feedback;
mod plan;
mod preset;
mod quality;

pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use feedback::{FeedbackRequest, Language, ProcessKind};
pub use plan::{PlanLimits, UserPlan, UserUsage};
pub use preset::{MixPreset, PresetInfo};
pub use quality::QualityStats;
