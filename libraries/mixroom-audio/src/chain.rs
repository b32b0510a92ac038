//! Signal chain construction
//!
//! Every chain is described by an ordered, immutable list of [`StageSpec`]s.
//! The preset recipes and the voice chain are static tables; a single
//! routine ([`SignalChain::build`]) turns any table into processing stages
//! with fresh state, so no preset carries its own wiring code.

use crate::effects::{
    AudioEffect, Biquad, BiquadCoefficients, Compressor, CompressorSettings, FilterType, Gain,
};
use mixroom_core::{MixPreset, MixroomError, Result};
use tracing::debug;

/// Butterworth Q used by every high-pass stage
pub const BUTTERWORTH_Q: f32 = 0.7071;

/// Descriptor of one processing stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageSpec {
    /// Second-order high-pass filter
    HighPass { frequency: f32, q: f32 },
    /// Low shelf boost/cut
    LowShelf { frequency: f32, gain_db: f32 },
    /// High shelf boost/cut
    HighShelf { frequency: f32, gain_db: f32 },
    /// Peaking (presence) boost/cut
    Peaking { frequency: f32, gain_db: f32, q: f32 },
    /// Compressor, or limiter with a high ratio
    Compressor(CompressorSettings),
    /// Fixed linear gain
    Gain { linear: f32 },
}

const CLEAN_CHAIN: &[StageSpec] = &[
    StageSpec::HighPass {
        frequency: 60.0,
        q: BUTTERWORTH_Q,
    },
    StageSpec::Peaking {
        frequency: 3000.0,
        gain_db: 2.0,
        q: 1.0,
    },
    StageSpec::Compressor(CompressorSettings::hard_knee(-18.0, 3.0, 10.0, 200.0)),
];

const RAW_CHAIN: &[StageSpec] = &[StageSpec::Compressor(CompressorSettings::hard_knee(
    -1.0, 10.0, 5.0, 100.0,
))];

const LOUD_CHAIN: &[StageSpec] = &[
    StageSpec::HighPass {
        frequency: 35.0,
        q: BUTTERWORTH_Q,
    },
    StageSpec::Compressor(CompressorSettings::hard_knee(-20.0, 5.0, 2.0, 150.0)),
    StageSpec::Gain { linear: 2.0 },
    StageSpec::Compressor(CompressorSettings::hard_knee(-0.5, 20.0, 1.0, 50.0)),
];

const DARK_CHAIN: &[StageSpec] = &[
    StageSpec::LowShelf {
        frequency: 100.0,
        gain_db: 3.5,
    },
    StageSpec::HighShelf {
        frequency: 6000.0,
        gain_db: -2.0,
    },
    StageSpec::Compressor(CompressorSettings::hard_knee(-18.0, 3.0, 3.0, 250.0)),
];

/// Always-on chain applied to synthesized speech
pub const VOICE_CHAIN: &[StageSpec] = &[
    StageSpec::HighPass {
        frequency: 85.0,
        q: BUTTERWORTH_Q,
    },
    StageSpec::LowShelf {
        frequency: 200.0,
        gain_db: 2.0,
    },
    StageSpec::Peaking {
        frequency: 3000.0,
        gain_db: 2.0,
        q: 1.0,
    },
    StageSpec::HighShelf {
        frequency: 10_000.0,
        gain_db: 3.0,
    },
    StageSpec::Compressor(CompressorSettings {
        threshold_db: -24.0,
        knee_db: 30.0,
        ratio: 12.0,
        attack_ms: 3.0,
        release_ms: 250.0,
    }),
    StageSpec::Gain { linear: 1.2 },
];

/// Stage recipe for a preset
pub fn chain_for(preset: MixPreset) -> &'static [StageSpec] {
    match preset {
        MixPreset::Clean => CLEAN_CHAIN,
        MixPreset::Raw => RAW_CHAIN,
        MixPreset::Loud => LOUD_CHAIN,
        MixPreset::Dark => DARK_CHAIN,
    }
}

impl StageSpec {
    /// Instantiate the stage with zeroed state
    fn instantiate(&self, sample_rate: u32, channels: usize) -> Result<Stage> {
        // Shelves have a fixed slope; Q is only a placeholder for them
        let filter = |filter_type, frequency, q, gain_db| -> Result<Stage> {
            let coeffs = BiquadCoefficients::new(filter_type, sample_rate, frequency, q, gain_db)?;
            Ok(Stage::Filter(Biquad::new(filter_type, coeffs, channels)))
        };

        match *self {
            Self::HighPass { frequency, q } => filter(FilterType::HighPass, frequency, q, 0.0),
            Self::LowShelf { frequency, gain_db } => {
                filter(FilterType::LowShelf, frequency, 1.0, gain_db)
            }
            Self::HighShelf { frequency, gain_db } => {
                filter(FilterType::HighShelf, frequency, 1.0, gain_db)
            }
            Self::Peaking {
                frequency,
                gain_db,
                q,
            } => filter(FilterType::Peaking, frequency, q, gain_db),
            Self::Compressor(settings) => {
                Ok(Stage::Dynamics(Compressor::new(settings, sample_rate)?))
            }
            Self::Gain { linear } => Ok(Stage::Gain(Gain::new(linear)?)),
        }
    }
}

/// A configured stage
#[derive(Debug, Clone)]
enum Stage {
    Filter(Biquad),
    Dynamics(Compressor),
    Gain(Gain),
}

impl AudioEffect for Stage {
    fn process(&mut self, block: &mut [f32], channels: usize) {
        match self {
            Self::Filter(stage) => stage.process(block, channels),
            Self::Dynamics(stage) => stage.process(block, channels),
            Self::Gain(stage) => stage.process(block, channels),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Filter(stage) => stage.reset(),
            Self::Dynamics(stage) => stage.reset(),
            Self::Gain(stage) => stage.reset(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Filter(stage) => stage.name(),
            Self::Dynamics(stage) => stage.name(),
            Self::Gain(stage) => stage.name(),
        }
    }
}

/// Ordered stages with their processing state
///
/// A chain is built for one sample rate and channel count and is meant to
/// process exactly one signal from start to end.
#[derive(Debug, Clone)]
pub struct SignalChain {
    stages: Vec<Stage>,
    sample_rate: u32,
    channels: usize,
}

impl SignalChain {
    /// Build a chain from stage descriptors
    ///
    /// # Errors
    /// Returns a render error if the layout is empty or a stage parameter is
    /// out of range.
    pub fn build(stages: &[StageSpec], sample_rate: u32, channels: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MixroomError::render("chain sample rate must be non-zero"));
        }
        if channels == 0 {
            return Err(MixroomError::render("chain needs at least one channel"));
        }

        let stages = stages
            .iter()
            .map(|spec| spec.instantiate(sample_rate, channels))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            sample_rate,
            channels,
            stages = ?stages.iter().map(Stage::name).collect::<Vec<_>>(),
            "Signal chain built"
        );

        Ok(Self {
            stages,
            sample_rate,
            channels,
        })
    }

    /// Build the chain for a preset
    pub fn for_preset(preset: MixPreset, sample_rate: u32, channels: usize) -> Result<Self> {
        Self::build(chain_for(preset), sample_rate, channels)
    }

    /// Process an interleaved block through every stage in order
    pub fn process(&mut self, block: &mut [f32]) {
        for stage in &mut self.stages {
            stage.process(block, self.channels);
        }
    }

    /// Reset every stage
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in processing order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }
}

/// Immutable, shareable chain configuration
///
/// Coefficients are computed once. Each call to [`ChainKernel::spawn`] hands
/// out an independent [`SignalChain`] with zeroed state, so a kernel behind an
/// `Arc` can serve overlapping callers without locking.
#[derive(Debug, Clone)]
pub struct ChainKernel {
    prototype: SignalChain,
}

impl ChainKernel {
    /// Precompute a chain
    pub fn new(stages: &[StageSpec], sample_rate: u32, channels: usize) -> Result<Self> {
        Ok(Self {
            prototype: SignalChain::build(stages, sample_rate, channels)?,
        })
    }

    /// Fresh chain sharing the precomputed coefficients
    pub fn spawn(&self) -> SignalChain {
        self.prototype.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.prototype.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.prototype.channels
    }
}
