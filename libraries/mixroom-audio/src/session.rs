//! Mix tab workflow
//!
//! Wraps the engine with the caller-side rules of the mix screen: plan
//! gating on the decoded duration, usage accounting and engineer feedback
//! on the result.

use crate::engine::{MixEngine, RenderedMix};
use chrono::NaiveDate;
use mixroom_core::{
    FeedbackGenerator, FeedbackRequest, Language, MixPreset, MixroomError, PlanLimits,
    ProcessKind, Result, UserPlan, UserUsage,
};
use std::path::Path;
use tracing::{info, warn};

/// One upload to process
#[derive(Debug, Clone)]
pub struct MixRequest {
    /// Original file name, used for the container hint and the feedback
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub preset: MixPreset,
    pub kind: ProcessKind,
    pub language: Language,
    pub plan: UserPlan,
    /// Usage as last stored by the caller
    pub usage: UserUsage,
    /// Current day, for the daily counter
    pub today: NaiveDate,
}

/// Result of a successful mix
#[derive(Debug, Clone)]
pub struct MixReport {
    pub mix: RenderedMix,
    /// Engineer feedback text
    pub feedback: String,
    /// Usage after this mix, to be stored by the caller
    pub usage: UserUsage,
}

/// Engine plus plan limits plus feedback collaborator
pub struct MixSession<F> {
    engine: MixEngine,
    limits: PlanLimits,
    feedback: F,
}

impl<F: FeedbackGenerator> MixSession<F> {
    pub fn new(engine: MixEngine, limits: PlanLimits, feedback: F) -> Self {
        Self {
            engine,
            limits,
            feedback,
        }
    }

    pub fn engine(&self) -> &MixEngine {
        &self.engine
    }

    pub fn limits(&self) -> &PlanLimits {
        &self.limits
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Gate, process and review one upload
    ///
    /// Usage is only charged when the whole workflow succeeds: a file that
    /// fails to decode or render, or whose feedback fails, does not count
    /// against the daily limit. On error the caller keeps its stored usage.
    ///
    /// # Errors
    /// `PlanLimit` when the plan does not allow this mix, otherwise any
    /// engine or feedback error.
    pub async fn run(&self, request: MixRequest) -> Result<MixReport> {
        let MixRequest {
            file_name,
            bytes,
            preset,
            kind,
            language,
            plan,
            usage,
            today,
        } = request;

        let usage = usage.rolled_over(today);

        // Cheap checks first so a rejected user does not pay for a decode
        if plan == UserPlan::Free && usage.mixes_today >= self.limits.max_mixes_per_day {
            warn!(mixes_today = usage.mixes_today, "Daily mix limit reached");
            return Err(MixroomError::plan_limit("Daily mix limit reached."));
        }

        let hint = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_owned);
        let decoded = self.engine.decode(bytes, hint.as_deref()).await?;

        if let Err(e) = self
            .limits
            .check(plan, &usage, preset, decoded.duration_secs())
        {
            warn!(%preset, duration_secs = decoded.duration_secs(), error = %e, "Mix rejected by plan");
            return Err(e);
        }

        let mix = self.engine.mix_decoded(decoded, preset).await?;

        let request = FeedbackRequest {
            file_name,
            kind,
            language,
            technical_stats: mix.stats.summary(),
        };
        let feedback = self.feedback.mix_feedback(&request).await?;

        let usage = usage.incremented(today);
        info!(
            file = %request.file_name,
            %preset,
            score = mix.stats.score,
            mixes_today = usage.mixes_today,
            "Mix session complete"
        );

        Ok(MixReport {
            mix,
            feedback,
            usage,
        })
    }
}
