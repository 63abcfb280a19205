//! Current daily targets
//!
//! Composes the base targets of the merged profile with the accumulated
//! metabolic adjustment. Percentages are held constant between the base and
//! adjusted views; only the calorie budget and the grams move.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::adjustment::AdjustmentState;
use crate::errors::NutritionResult;
use crate::profile::{merge_inputs, Profile, ProfileOverrides};
use crate::targets::{compute_daily_targets, DailyTargets, NutritionSettings};
use crate::units::round_to;

/// Base and adjusted targets plus the adjustment that separates them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub base: DailyTargets,
    pub adjusted: DailyTargets,
    pub metabolic_adjustment_kcal: f64,
    pub weekly_goal_kg: Option<f64>,
}

/// Apply an adjustment to base targets, keeping the base percentages
pub fn adjust_targets(base: &DailyTargets, state: AdjustmentState, settings: &NutritionSettings) -> DailyTargets {
    let adjustment = settings.clamp_adjustment(state.metabolic_adjustment_kcal);
    let calories = settings.apply_floor((f64::from(base.calories) + adjustment).round() as i32);
    DailyTargets::from_split(calories, base.macro_targets.split())
}

/// Today's targets for a profile
///
/// `overrides` should only be passed while onboarding is still in progress.
///
/// # Errors
///
/// [`crate::NutritionError::MissingInput`] when the merged profile lacks
/// weight, height or age.
pub fn daily_nutrition(
    profile: &Profile,
    overrides: Option<&ProfileOverrides>,
    state: AdjustmentState,
    today: NaiveDate,
    settings: &NutritionSettings,
) -> NutritionResult<DailyNutrition> {
    let merged = merge_inputs(profile, overrides, today);
    let base = compute_daily_targets(
        &merged.inputs,
        merged.weekly_goal_kg,
        merged.macro_split.as_ref(),
        settings,
    )?;
    let adjusted = adjust_targets(&base, state, settings);

    Ok(DailyNutrition {
        base,
        adjusted,
        metabolic_adjustment_kcal: round_to(settings.clamp_adjustment(state.metabolic_adjustment_kcal), 1),
        weekly_goal_kg: merged.weekly_goal_kg,
    })
}

/// Adjusted calories for immediate feedback after a measurement
///
/// `fallback_weight_kg` stands in when the profile has no starting weight.
/// Returns `None` instead of an error when the profile is incomplete.
pub fn estimate_adjusted_calories(
    profile: &Profile,
    state: AdjustmentState,
    fallback_weight_kg: Option<f64>,
    today: NaiveDate,
    settings: &NutritionSettings,
) -> Option<i32> {
    let mut merged = merge_inputs(profile, None, today);
    merged.inputs.weight_kg = merged.inputs.weight_kg.or(fallback_weight_kg);
    let base = compute_daily_targets(
        &merged.inputs,
        merged.weekly_goal_kg,
        merged.macro_split.as_ref(),
        settings,
    )
    .ok()?;
    Some(adjust_targets(&base, state, settings).calories)
}
