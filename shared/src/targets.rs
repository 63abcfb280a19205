//! Baseline daily targets
//!
//! BMR → TDEE → goal-driven surplus/deficit → calorie floor → macro grams.
//! This is the "base" target; the adaptive correction is layered on top by
//! [`crate::aggregate`].

use serde::{Deserialize, Serialize};

use crate::errors::{NutritionError, NutritionResult};
use crate::goals::GoalDirection;
use crate::health_metrics::{calculate_bmr_mifflin, calculate_tdee, ActivityLevel, BiologicalSex};
use crate::macros::{MacroSplit, MacroTargets, NormalizedSplit};

/// Legacy deficit used when a loss goal has no resolved rate (kcal/day)
pub const LEGACY_LOSS_DELTA_KCAL: f64 = -500.0;
/// Legacy surplus used when a gain goal has no resolved rate (kcal/day)
pub const LEGACY_GAIN_DELTA_KCAL: f64 = 300.0;

// ============================================================================
// Settings
// ============================================================================

/// Tunable constants of the target pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionSettings {
    /// Daily calories never go below this
    pub calorie_floor: i32,
    /// Bound on both a single correction and the accumulated correction (kcal/day)
    pub max_adjustment_kcal: f64,
    /// Energy equivalent of one kilogram of body mass
    pub kcal_per_kg: f64,
}

impl Default for NutritionSettings {
    fn default() -> Self {
        Self {
            calorie_floor: 1200,
            max_adjustment_kcal: 1000.0,
            kcal_per_kg: 7700.0,
        }
    }
}

impl NutritionSettings {
    /// Clamp a calorie figure to the floor
    pub fn apply_floor(&self, calories: i32) -> i32 {
        calories.max(self.calorie_floor)
    }

    /// Clamp a correction to ±`max_adjustment_kcal`
    pub fn clamp_adjustment(&self, kcal: f64) -> f64 {
        let cap = self.max_adjustment_kcal.abs();
        if kcal.is_nan() {
            return 0.0;
        }
        kcal.clamp(-cap, cap)
    }
}

// ============================================================================
// Inputs & outputs
// ============================================================================

/// Body and activity inputs of the calculator
///
/// Weight, height and age are optional here because they come from partially
/// filled profiles; [`compute_daily_targets`] rejects them when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TargetInputs {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<i32>,
    #[serde(default)]
    pub sex: BiologicalSex,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// Used only for the legacy adjustment when no weekly goal is resolved
    #[serde(default)]
    pub goal: GoalDirection,
}

/// Intermediate energy figures, useful for explaining a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    pub bmr: f64,
    pub tdee: f64,
    /// Surplus (positive) or deficit (negative) added to TDEE
    pub goal_delta_kcal: f64,
}

impl EnergyEstimate {
    /// Calories before the floor is applied
    pub fn raw_calories(&self) -> f64 {
        self.tdee + self.goal_delta_kcal
    }
}

/// Calorie target plus the macro grams that fill it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub calories: i32,
    pub macro_targets: MacroTargets,
}

impl DailyTargets {
    /// Targets for `calories` using an already-normalized split
    pub fn from_split(calories: i32, split: NormalizedSplit) -> Self {
        Self {
            calories,
            macro_targets: split.allocate(calories),
        }
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// Daily surplus/deficit implied by a weekly goal, or the legacy fallback
pub fn goal_delta_kcal(weekly_goal_kg: Option<f64>, goal: GoalDirection, settings: &NutritionSettings) -> f64 {
    match weekly_goal_kg.filter(|v| v.is_finite()) {
        Some(weekly) => weekly * settings.kcal_per_kg / 7.0,
        None => match goal {
            GoalDirection::Loss => LEGACY_LOSS_DELTA_KCAL,
            GoalDirection::Gain => LEGACY_GAIN_DELTA_KCAL,
            GoalDirection::Maintain | GoalDirection::Unknown => 0.0,
        },
    }
}

/// BMR, TDEE and goal delta for the given inputs
///
/// # Errors
///
/// [`NutritionError::MissingInput`] naming every absent field among weight,
/// height and age.
pub fn estimate_energy(
    inputs: &TargetInputs,
    weekly_goal_kg: Option<f64>,
    settings: &NutritionSettings,
) -> NutritionResult<EnergyEstimate> {
    let weight = inputs.weight_kg.filter(|v| v.is_finite());
    let height = inputs.height_cm.filter(|v| v.is_finite());
    let (Some(weight_kg), Some(height_cm), Some(age_years)) = (weight, height, inputs.age_years) else {
        let missing: Vec<&str> = [
            (weight.is_none(), "weight_kg"),
            (height.is_none(), "height_cm"),
            (inputs.age_years.is_none(), "age"),
        ]
        .into_iter()
        .filter_map(|(absent, name)| absent.then_some(name))
        .collect();
        return Err(NutritionError::MissingInput(format!(
            "Cannot calculate targets without {}",
            missing.join(", ")
        )));
    };

    let bmr = calculate_bmr_mifflin(weight_kg, height_cm, age_years, inputs.sex);
    let tdee = calculate_tdee(bmr, inputs.activity_level);
    Ok(EnergyEstimate {
        bmr,
        tdee,
        goal_delta_kcal: goal_delta_kcal(weekly_goal_kg, inputs.goal, settings),
    })
}

/// Compute the base daily calorie and macro targets
///
/// Deterministic: identical inputs always produce identical targets.
///
/// # Errors
///
/// [`NutritionError::MissingInput`] when weight, height or age is absent.
pub fn compute_daily_targets(
    inputs: &TargetInputs,
    weekly_goal_kg: Option<f64>,
    split: Option<&MacroSplit>,
    settings: &NutritionSettings,
) -> NutritionResult<DailyTargets> {
    let estimate = estimate_energy(inputs, weekly_goal_kg, settings)?;
    let calories = settings.apply_floor(estimate.raw_calories().round() as i32);
    let split = split.map(MacroSplit::normalize).unwrap_or_default();
    Ok(DailyTargets::from_split(calories, split))
}
