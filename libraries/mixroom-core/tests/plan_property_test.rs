//! Property-based tests for plan gating and usage accounting

use chrono::{Days, NaiveDate};
use mixroom_core::{MixPreset, MixroomError, PlanLimits, UserPlan, UserUsage};
use proptest::prelude::*;

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn preset_strategy() -> impl Strategy<Value = MixPreset> {
    prop::sample::select(MixPreset::ALL.to_vec())
}

proptest! {
    #[test]
    fn premium_is_never_limited(
        mixes_today in any::<u32>(),
        today in date_strategy(),
        preset in preset_strategy(),
        duration in 0.0f64..100_000.0,
    ) {
        let usage = UserUsage { mixes_today, last_mix_date: today };
        prop_assert!(PlanLimits::default().check(UserPlan::Premium, &usage, preset, duration).is_ok());
    }

    #[test]
    fn free_plan_rejections_are_plan_limit_errors(
        mixes_today in 0u32..10,
        today in date_strategy(),
        preset in preset_strategy(),
        duration in 0.0f64..600.0,
    ) {
        let limits = PlanLimits::default();
        let usage = UserUsage { mixes_today, last_mix_date: today };
        let allowed = mixes_today < 2 && duration <= 120.0 && !preset.info().premium;

        match limits.check(UserPlan::Free, &usage, preset, duration) {
            Ok(()) => prop_assert!(allowed),
            Err(MixroomError::PlanLimit(_)) => prop_assert!(!allowed),
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn increments_count_within_a_day(
        start in date_strategy(),
        mixes in 1u32..20,
        gap in 1u64..30,
    ) {
        let mut usage = UserUsage::new(start);
        for _ in 0..mixes {
            usage = usage.incremented(start);
        }
        prop_assert_eq!(usage.mixes_today, mixes);

        let later = start.checked_add_days(Days::new(gap)).unwrap();
        prop_assert_eq!(usage.rolled_over(later).mixes_today, 0);
        prop_assert_eq!(usage.incremented(later).mixes_today, 1);
    }
}
