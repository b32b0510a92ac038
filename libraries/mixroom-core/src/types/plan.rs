/// Subscription plans, usage counters and their limits
use crate::error::{MixroomError, Result};
use crate::types::MixPreset;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Subscription plan of the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserPlan {
    /// Free tier, limited mixes and presets
    #[default]
    Free,
    /// Paid tier, unlimited
    Premium,
}

/// Daily mix counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUsage {
    /// Mixes started on `last_mix_date`
    pub mixes_today: u32,
    /// Day the counter refers to
    pub last_mix_date: NaiveDate,
}

impl UserUsage {
    /// Fresh counter for `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mixes_today: 0,
            last_mix_date: today,
        }
    }

    /// Counter as seen on `today`: reset to zero when the day changed
    #[must_use]
    pub fn rolled_over(self, today: NaiveDate) -> Self {
        if self.last_mix_date == today {
            self
        } else {
            Self::new(today)
        }
    }

    /// Counter after one more mix on `today`
    #[must_use]
    pub fn incremented(self, today: NaiveDate) -> Self {
        let current = self.rolled_over(today);
        Self {
            mixes_today: current.mixes_today.saturating_add(1),
            last_mix_date: today,
        }
    }
}

/// Limits applied to the free plan
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PlanLimits {
    /// Mixes allowed per day
    #[serde(default = "default_max_mixes_per_day")]
    pub max_mixes_per_day: u32,

    /// Longest track accepted, in seconds
    #[serde(default = "default_max_duration_seconds")]
    pub max_duration_seconds: f64,
}

fn default_max_mixes_per_day() -> u32 {
    2
}

fn default_max_duration_seconds() -> f64 {
    120.0
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            max_mixes_per_day: default_max_mixes_per_day(),
            max_duration_seconds: default_max_duration_seconds(),
        }
    }
}

impl PlanLimits {
    /// Check whether `plan` may mix a track of `duration_secs` with `preset`.
    ///
    /// Checks run in the order the mix screen reports them: daily count,
    /// track length, premium preset. Premium plans are never limited.
    pub fn check(
        &self,
        plan: UserPlan,
        usage: &UserUsage,
        preset: MixPreset,
        duration_secs: f64,
    ) -> Result<()> {
        if plan == UserPlan::Premium {
            return Ok(());
        }
        if usage.mixes_today >= self.max_mixes_per_day {
            return Err(MixroomError::plan_limit("Daily mix limit reached."));
        }
        if duration_secs > self.max_duration_seconds {
            return Err(MixroomError::plan_limit(format!(
                "Track too long. Free plan: max {}s.",
                self.max_duration_seconds
            )));
        }
        if preset.info().premium {
            return Err(MixroomError::plan_limit("Premium exclusive preset."));
        }
        Ok(())
    }
}
