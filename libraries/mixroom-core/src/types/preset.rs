/// Mix presets
use crate::error::MixroomError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named processing recipe applied to an uploaded track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixPreset {
    /// Balanced EQ, natural dynamics
    Clean,
    /// Safety limiting only
    Raw,
    /// Heavy compression and limiting
    Loud,
    /// Low-end boost, softened highs
    Dark,
}

/// Display information for a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetInfo {
    /// Display name
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Whether only premium plans may use it
    pub premium: bool,
}

impl MixPreset {
    /// Every preset, in display order
    pub const ALL: [Self; 4] = [Self::Clean, Self::Raw, Self::Loud, Self::Dark];

    /// Lowercase identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Raw => "raw",
            Self::Loud => "loud",
            Self::Dark => "dark",
        }
    }

    /// Catalogue entry for this preset
    pub fn info(&self) -> PresetInfo {
        match self {
            Self::Clean => PresetInfo {
                name: "Clean",
                description: "Balanced EQ, natural dynamics. Studio standard.",
                premium: false,
            },
            Self::Raw => PresetInfo {
                name: "Raw",
                description: "Minimal processing. Gritty, underground vibe.",
                premium: true,
            },
            Self::Loud => PresetInfo {
                name: "Loud",
                description: "Max loudness, heavy compression. Streaming ready.",
                premium: true,
            },
            Self::Dark => PresetInfo {
                name: "Dark",
                description: "Heavy low-end, softer highs. Trap/Drill focus.",
                premium: true,
            },
        }
    }
}

impl Default for MixPreset {
    fn default() -> Self {
        Self::Clean
    }
}

impl fmt::Display for MixPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MixPreset {
    type Err = MixroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clean" => Ok(Self::Clean),
            "raw" => Ok(Self::Raw),
            "loud" => Ok(Self::Loud),
            "dark" => Ok(Self::Dark),
            other => Err(MixroomError::UnknownPreset(other.to_string())),
        }
    }
}
