/// Request handed to the text-generation collaborator after a mix
use serde::{Deserialize, Serialize};

/// Which process produced the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    /// Automatic mixing
    Mix,
    /// Mastering
    Master,
}

impl ProcessKind {
    /// Label used in the feedback prompt
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mix => "Automatic Mixing",
            Self::Master => "AI Mastering",
        }
    }
}

/// UI language of the feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Portuguese
    Pt,
}

impl Language {
    /// English name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Pt => "Portuguese",
        }
    }
}

/// Everything the feedback collaborator receives about one processed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Name of the uploaded file
    pub file_name: String,
    /// Process that produced the file
    pub kind: ProcessKind,
    /// Language the feedback is written in
    pub language: Language,
    /// `QualityStats::summary()` of the rendered file
    pub technical_stats: String,
}
