//! Onboarding summary screen

use chrono::NaiveDate;

use crate::health_metrics::{calculate_bmi, classify_bmi};
use crate::profile::Profile;
use crate::targets::DailyTargets;
use crate::types::{OnboardingSummary, SummaryGoal, SummaryProfile, SummaryTargets, SummaryTracking};

/// Build the summary from the committed profile
///
/// `latest_weight_kg` is the most recent logged measurement; without one the
/// starting weight stands in as the current weight.
pub fn build_summary(
    profile: &Profile,
    baseline: Option<&DailyTargets>,
    latest_weight_kg: Option<f64>,
    today: NaiveDate,
) -> OnboardingSummary {
    let current_weight_kg = latest_weight_kg.or(profile.starting_weight_kg);
    let bmi = current_weight_kg
        .zip(profile.height_cm)
        .and_then(|(weight, height)| calculate_bmi(weight, height));

    let prefs = &profile.preferences;
    let metrics_count = [
        current_weight_kg.is_some(),
        prefs.meals_per_day.is_some(),
        prefs.diet_type.is_some() || !prefs.exclude_foods.is_empty(),
    ]
    .into_iter()
    .filter(|enabled| *enabled)
    .count() as u32;

    OnboardingSummary {
        profile: SummaryProfile {
            name: profile.name.clone(),
            age: profile.age_on(today),
            current_weight_kg,
            height_cm: profile.height_cm.map(|h| h.trunc() as i32),
            bmi,
            bmi_category: bmi.map(classify_bmi),
        },
        goal: SummaryGoal {
            primary_goal: profile.primary_goal.clone(),
            target_weight_kg: profile.target_weight_kg,
            activity_level: profile.activity_level,
        },
        daily_targets: SummaryTargets {
            daily_calories: baseline.map(|b| b.calories),
            macro_targets: baseline.map(|b| b.macro_targets),
        },
        tracking: SummaryTracking {
            metrics_count,
            meals_per_day: prefs.meals_per_day,
            diet_type: prefs.diet_type.clone(),
            units: profile.units,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health_metrics::BmiCategory;
    use crate::macros::allocate_macros;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_latest_measurement_is_current_weight() {
        let profile = Profile {
            height_cm: Some(175.0),
            starting_weight_kg: Some(90.0),
            ..Default::default()
        };
        let summary = build_summary(&profile, None, Some(70.0), today());
        assert_eq!(summary.profile.current_weight_kg, Some(70.0));
        assert_eq!(summary.profile.bmi, Some(22.86));
        assert_eq!(summary.profile.bmi_category, Some(BmiCategory::Normal));
        assert_eq!(summary.tracking.metrics_count, 1);
    }

    #[test]
    fn test_starting_weight_fallback_and_counts() {
        let mut profile = Profile {
            height_cm: Some(175.0),
            starting_weight_kg: Some(95.0),
            ..Default::default()
        };
        profile.preferences.meals_per_day = Some(3);
        profile.preferences.diet_type = Some("vegetarian".to_string());
        let baseline = DailyTargets {
            calories: 2000,
            macro_targets: allocate_macros(2000, None),
        };

        let summary = build_summary(&profile, Some(&baseline), None, today());
        assert_eq!(summary.profile.current_weight_kg, Some(95.0));
        assert_eq!(summary.profile.bmi_category, Some(BmiCategory::Obese));
        assert_eq!(summary.daily_targets.daily_calories, Some(2000));
        assert_eq!(summary.tracking.metrics_count, 3);
    }

    #[test]
    fn test_empty_profile() {
        let summary = build_summary(&Profile::default(), None, None, today());
        assert_eq!(summary.profile.bmi, None);
        assert_eq!(summary.profile.bmi_category, None);
        assert_eq!(summary.tracking.metrics_count, 0);
    }
}
