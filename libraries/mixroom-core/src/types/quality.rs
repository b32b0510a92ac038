/// Quality statistics for a rendered mix
use serde::{Deserialize, Serialize};
use std::fmt;

/// Level measurements and heuristic score of one rendered buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStats {
    /// Maximum absolute sample value
    pub peak: f32,
    /// Root-mean-square level across all channels
    pub rms: f32,
    /// Whether any sample reached the clipping ceiling
    pub clipping: bool,
    /// Number of clipped samples across all channels
    pub clipping_count: u64,
    /// Heuristic quality score, 0-100
    pub score: u8,
}

impl QualityStats {
    /// Compact technical summary handed to the feedback collaborator,
    /// e.g. `Peak: 0.30, RMS: 0.212, Clips: 0`.
    pub fn summary(&self) -> String {
        format!(
            "Peak: {:.2}, RMS: {:.3}, Clips: {}",
            self.peak, self.rms, self.clipping_count
        )
    }
}

impl fmt::Display for QualityStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (score {})", self.summary(), self.score)
    }
}
