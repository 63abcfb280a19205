//! Committed profile and live onboarding overrides
//!
//! The profile is what onboarding completion writes; overrides are what the
//! user has typed into an unfinished onboarding flow. Both are fully typed so
//! merging them is an exhaustive field-by-field decision.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::goals::{GoalDirection, GoalProvenance};
use crate::health_metrics::{ActivityLevel, BiologicalSex};
use crate::macros::MacroSplit;
use crate::targets::TargetInputs;
use crate::units::{age_from_dob, UnitPreferences, WeightUnit};

/// Non-numeric preferences collected during onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProfilePreferences {
    pub diet_type: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub exclude_foods: Vec<String>,
    pub meals_per_day: Option<i32>,
    #[serde(default)]
    pub preferred_meal_times: Vec<String>,
}

/// The committed user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Profile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Explicit age; wins over the date of birth
    pub age_years: Option<i32>,
    pub sex: BiologicalSex,
    pub height_cm: Option<f64>,
    pub starting_weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    /// Goal label as the user picked it ("lose_weight", "muscle_gain", ...)
    pub primary_goal: Option<String>,
    pub goal: GoalDirection,
    /// Signed kg/week; `None` when the goal never resolved to a rate
    pub weekly_goal_kg: Option<f64>,
    pub goal_provenance: GoalProvenance,
    pub activity_level: Option<ActivityLevel>,
    pub macro_split: Option<MacroSplit>,
    pub units: UnitPreferences,
    pub preferences: ProfilePreferences,
}

impl Profile {
    /// Age on `today`, from the explicit value or the date of birth
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.age_years.or_else(|| age_from_dob(self.date_of_birth, today))
    }
}

/// Values from an unfinished onboarding flow that shadow the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProfileOverrides {
    pub age_years: Option<i32>,
    pub sex: Option<BiologicalSex>,
    pub height_cm: Option<f64>,
    /// Weight already known to be in kilograms
    pub weight_kg: Option<f64>,
    /// Weight without a unit; read with the effective weight unit preference
    pub weight_unitless: Option<f64>,
    pub goal: Option<GoalDirection>,
    pub weekly_goal_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub macro_split: Option<MacroSplit>,
    pub units: Option<UnitPreferences>,
}

impl ProfileOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the target calculator needs, after merging
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalculatorInputs {
    pub inputs: TargetInputs,
    pub weekly_goal_kg: Option<f64>,
    pub macro_split: Option<MacroSplit>,
}

/// Merge overrides over the profile; any override that is present wins
pub fn merge_inputs(profile: &Profile, overrides: Option<&ProfileOverrides>, today: NaiveDate) -> CalculatorInputs {
    let empty = ProfileOverrides::default();
    let o = overrides.unwrap_or(&empty);

    let units = o.units.unwrap_or(profile.units);
    let weight_kg = o
        .weight_kg
        .or_else(|| match units.weight {
            WeightUnit::Kg => o.weight_unitless,
            WeightUnit::Lb => units.weight.to_kg(o.weight_unitless),
        })
        .or(profile.starting_weight_kg);

    CalculatorInputs {
        inputs: TargetInputs {
            weight_kg,
            height_cm: o.height_cm.or(profile.height_cm),
            age_years: o.age_years.or_else(|| profile.age_on(today)),
            sex: o.sex.unwrap_or(profile.sex),
            activity_level: o.activity_level.or(profile.activity_level).unwrap_or_default(),
            goal: o.goal.unwrap_or(profile.goal),
        },
        weekly_goal_kg: o.weekly_goal_kg.or(profile.weekly_goal_kg),
        macro_split: o.macro_split.or(profile.macro_split),
    }
}
