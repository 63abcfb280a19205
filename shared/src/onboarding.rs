//! Onboarding flow
//!
//! Steps are saved one at a time into a typed progress record. Completion
//! turns the progress into a committed [`Profile`] and a baseline target;
//! until then the progress doubles as a set of live [`ProfileOverrides`].

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{NutritionError, NutritionResult};
use crate::goals::{resolve_weekly_goal, GoalPayload, ResolvedGoal};
use crate::health_metrics::{ActivityLevel, BiologicalSex};
use crate::macros::MacroSplit;
use crate::profile::{Profile, ProfileOverrides};
use crate::targets::{compute_daily_targets, DailyTargets, NutritionSettings, TargetInputs};
use crate::units::{
    feet_inches_to_cm, lbs_to_kg, lenient_integer, lenient_number, HeightUnit, UnitPreferences, WeightUnit,
};
use crate::validation::{
    check_field, validate_age, validate_date_of_birth, validate_email, validate_height_cm, validate_weight,
    ValidationError,
};

// ============================================================================
// Steps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    #[default]
    PersonalInfo,
    BodyMetrics,
    Goals,
    DietaryPreferences,
    MealPreferences,
    MacroDistribution,
    Lifestyle,
    UnitPreferences,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 8] = [
        OnboardingStep::PersonalInfo,
        OnboardingStep::BodyMetrics,
        OnboardingStep::Goals,
        OnboardingStep::DietaryPreferences,
        OnboardingStep::MealPreferences,
        OnboardingStep::MacroDistribution,
        OnboardingStep::Lifestyle,
        OnboardingStep::UnitPreferences,
    ];

    /// Steps that must be saved before onboarding can complete
    pub const REQUIRED: [OnboardingStep; 3] = [
        OnboardingStep::PersonalInfo,
        OnboardingStep::BodyMetrics,
        OnboardingStep::Goals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::PersonalInfo => "personal_info",
            OnboardingStep::BodyMetrics => "body_metrics",
            OnboardingStep::Goals => "goals",
            OnboardingStep::DietaryPreferences => "dietary_preferences",
            OnboardingStep::MealPreferences => "meal_preferences",
            OnboardingStep::MacroDistribution => "macro_distribution",
            OnboardingStep::Lifestyle => "lifestyle",
            OnboardingStep::UnitPreferences => "unit_preferences",
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OnboardingStep {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OnboardingStep::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| NutritionError::Validation(format!("Unknown onboarding step: {}", s)))
    }
}

// ============================================================================
// Step payloads
// ============================================================================

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PersonalInfo {
    #[serde(alias = "name")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_integer")]
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub weight_unit: Option<String>,
    pub height_unit: Option<String>,
}

impl PersonalInfo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(age) = self.age {
            check_field("age", validate_age(age))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BodyMetrics {
    /// Weight in the user's preferred unit
    #[serde(deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub weight_kg: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub weight_lbs: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub height_cm: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub height_ft: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub height_in: Option<f64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl BodyMetrics {
    /// Height in cm and whether it was entered in feet/inches
    pub fn height(&self) -> Option<(f64, HeightUnit)> {
        if let Some(cm) = self.height_cm {
            return Some((cm.trunc(), HeightUnit::Cm));
        }
        feet_inches_to_cm(self.height_ft, self.height_in).map(|cm| (f64::from(cm), HeightUnit::FtIn))
    }

    /// Weight in kg plus the unit it implies, if the field names one
    pub fn weight(&self, preferred: WeightUnit) -> Option<(f64, Option<WeightUnit>)> {
        if let Some(kg) = self.weight_kg {
            return Some((kg, None));
        }
        if self.weight_lbs.is_some() {
            return lbs_to_kg(self.weight_lbs).map(|kg| (kg, Some(WeightUnit::Lb)));
        }
        preferred.to_kg(self.weight).map(|kg| (kg, None))
    }

    /// Range-check the values entered in a fixed unit
    ///
    /// A bare `weight` depends on the unit preference and is checked at completion.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(kg) = self.weight_kg.or_else(|| lbs_to_kg(self.weight_lbs)) {
            check_field("weight_kg", validate_weight(kg))?;
        }
        if let Some((cm, _)) = self.height() {
            check_field("height_cm", validate_height_cm(cm))?;
        }
        if let Some(age) = self.age {
            check_field("age", validate_age(age))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DietaryPreferences {
    pub diet_type: Option<String>,
    pub allergies: Vec<String>,
    pub dislikes: Vec<String>,
    pub exclude_foods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MealPreferences {
    #[serde(deserialize_with = "lenient_integer")]
    pub meals_per_day: Option<i32>,
    pub preferred_meal_times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Lifestyle {
    pub activity_level: Option<String>,
    /// Free-form lifestyle answers (sleep, job, ...) kept as sent
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Unit step, either `{"units": {"height": .., "weight": ..}}` or flat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UnitPreferencesStep {
    pub units: Option<RawUnits>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawUnits {
    pub height: Option<String>,
    pub weight: Option<String>,
}

impl UnitPreferencesStep {
    fn labels(&self) -> (Option<&str>, Option<&str>) {
        match &self.units {
            Some(units) => (units.height.as_deref(), units.weight.as_deref()),
            None => (self.height.as_deref(), self.weight.as_deref()),
        }
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Every step the user has saved so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OnboardingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_metrics: Option<BodyMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<GoalPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<DietaryPreferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_preferences: Option<MealPreferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_distribution: Option<MacroSplit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Lifestyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_preferences: Option<UnitPreferencesStep>,
}

impl OnboardingData {
    pub fn has_step(&self, step: OnboardingStep) -> bool {
        match step {
            OnboardingStep::PersonalInfo => self.personal_info.is_some(),
            OnboardingStep::BodyMetrics => self.body_metrics.is_some(),
            OnboardingStep::Goals => self.goals.is_some(),
            OnboardingStep::DietaryPreferences => self.dietary_preferences.is_some(),
            OnboardingStep::MealPreferences => self.meal_preferences.is_some(),
            OnboardingStep::MacroDistribution => self.macro_distribution.is_some(),
            OnboardingStep::Lifestyle => self.lifestyle.is_some(),
            OnboardingStep::UnitPreferences => self.unit_preferences.is_some(),
        }
    }

    /// Unit preferences: explicit step first, then the personal info hints
    pub fn unit_preferences(&self) -> UnitPreferences {
        let (height, weight) = match &self.unit_preferences {
            Some(step) => step.labels(),
            None => self
                .personal_info
                .as_ref()
                .map(|p| (p.height_unit.as_deref(), p.weight_unit.as_deref()))
                .unwrap_or((None, None)),
        };
        UnitPreferences {
            height: height.and_then(|h| h.parse().ok()).unwrap_or_default(),
            weight: weight.and_then(|w| w.parse().ok()).unwrap_or_default(),
        }
    }

    /// Activity level from the lifestyle step, falling back to the goals step
    pub fn activity_level(&self) -> Option<ActivityLevel> {
        self.lifestyle
            .as_ref()
            .and_then(|l| l.activity_level.as_deref())
            .or_else(|| self.goals.as_ref().and_then(|g| g.activity_level.as_deref()))
            .filter(|label| !label.trim().is_empty())
            .map(ActivityLevel::from_label)
    }

    /// Sex from body metrics, then personal info
    pub fn sex(&self) -> Option<BiologicalSex> {
        self.body_metrics
            .as_ref()
            .and_then(|b| b.gender.as_deref())
            .or_else(|| self.personal_info.as_ref().and_then(|p| p.gender.as_deref()))
            .filter(|label| !label.trim().is_empty())
            .map(BiologicalSex::from_label)
    }

    pub fn age(&self) -> Option<i32> {
        self.body_metrics
            .as_ref()
            .and_then(|b| b.age)
            .or_else(|| self.personal_info.as_ref().and_then(|p| p.age))
    }
}

/// Persisted onboarding state of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OnboardingProgress {
    pub current_step: OnboardingStep,
    pub progress: OnboardingData,
    pub is_complete: bool,
}

impl OnboardingProgress {
    /// Parse and store a step payload, replacing any previous value
    ///
    /// # Errors
    ///
    /// [`NutritionError::Validation`] when the payload isn't an object of the
    /// step's shape, or a body measurement or age is out of range. A rejected
    /// step leaves the progress untouched.
    pub fn record_step(&mut self, step: OnboardingStep, payload: serde_json::Value) -> NutritionResult<()> {
        if !payload.is_object() {
            return Err(NutritionError::Validation(format!(
                "Payload for step '{}' must be a JSON object",
                step
            )));
        }

        fn parse<T: serde::de::DeserializeOwned>(step: OnboardingStep, payload: serde_json::Value) -> NutritionResult<T> {
            serde_json::from_value(payload)
                .map_err(|e| NutritionError::Validation(format!("Invalid payload for step '{}': {}", step, e)))
        }

        let data = &mut self.progress;
        match step {
            OnboardingStep::PersonalInfo => {
                let info: PersonalInfo = parse(step, payload)?;
                info.validate()?;
                data.personal_info = Some(info);
            }
            OnboardingStep::BodyMetrics => {
                let body: BodyMetrics = parse(step, payload)?;
                body.validate()?;
                data.body_metrics = Some(body);
            }
            OnboardingStep::Goals => data.goals = Some(parse(step, payload)?),
            OnboardingStep::DietaryPreferences => data.dietary_preferences = Some(parse(step, payload)?),
            OnboardingStep::MealPreferences => data.meal_preferences = Some(parse(step, payload)?),
            OnboardingStep::MacroDistribution => data.macro_distribution = Some(parse(step, payload)?),
            OnboardingStep::Lifestyle => data.lifestyle = Some(parse(step, payload)?),
            OnboardingStep::UnitPreferences => data.unit_preferences = Some(parse(step, payload)?),
        }
        self.current_step = step;
        Ok(())
    }

    pub fn missing_required_steps(&self) -> Vec<OnboardingStep> {
        OnboardingStep::REQUIRED
            .into_iter()
            .filter(|step| !self.progress.has_step(*step))
            .collect()
    }

    /// Live overrides for the target calculator
    ///
    /// A goals draft that fails validation contributes no weekly goal.
    pub fn overrides(&self) -> ProfileOverrides {
        let data = &self.progress;
        let units = data
            .has_step(OnboardingStep::UnitPreferences)
            .then(|| data.unit_preferences());
        let body = data.body_metrics.as_ref();

        let (weight_kg, weight_unitless) = match body {
            Some(b) if b.weight_kg.is_some() => (b.weight_kg, None),
            Some(b) if b.weight_lbs.is_some() => (lbs_to_kg(b.weight_lbs), None),
            Some(b) => (None, b.weight),
            None => (None, None),
        };

        ProfileOverrides {
            age_years: data.age(),
            sex: data.sex(),
            height_cm: body.and_then(BodyMetrics::height).map(|(cm, _)| cm),
            weight_kg,
            weight_unitless,
            goal: data
                .goals
                .as_ref()
                .filter(|g| g.goal_label().is_some())
                .map(GoalPayload::direction),
            weekly_goal_kg: data
                .goals
                .as_ref()
                .and_then(|g| resolve_weekly_goal(g).ok())
                .and_then(|resolved| resolved.weekly_goal_kg),
            activity_level: data.activity_level(),
            macro_split: data.macro_distribution,
            units,
        }
    }

    /// Build the committed profile and baseline targets
    ///
    /// `existing` supplies values the flow never asked for again. A profile
    /// too incomplete for a baseline still completes; the reason is returned
    /// in [`OnboardingCompletion::baseline_issue`].
    ///
    /// # Errors
    ///
    /// [`NutritionError::Validation`] for missing required steps, an invalid
    /// email, an out-of-range body measurement, age or date of birth, or a
    /// weekly goal outside its allowed range.
    pub fn complete(
        &self,
        existing: &Profile,
        today: NaiveDate,
        settings: &NutritionSettings,
    ) -> NutritionResult<OnboardingCompletion> {
        let missing = self.missing_required_steps();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(OnboardingStep::as_str).collect();
            return Err(NutritionError::Validation(format!(
                "Missing required onboarding steps: {}",
                names.join(", ")
            )));
        }

        let data = &self.progress;
        let personal = data.personal_info.clone().unwrap_or_default();
        let body = data.body_metrics.clone().unwrap_or_default();
        let goals = data.goals.clone().unwrap_or_default();

        let mut profile = existing.clone();
        let mut units = data.unit_preferences();

        if let Some(name) = personal.full_name.filter(|n| !n.trim().is_empty()) {
            profile.name = Some(name);
        }
        if let Some(email) = personal.email.filter(|e| !e.trim().is_empty()) {
            check_field("email", validate_email(email.trim()))?;
            profile.email = Some(email.trim().to_string());
        }
        if personal.date_of_birth.is_some() {
            profile.date_of_birth = personal.date_of_birth;
        }
        if let Some(sex) = data.sex() {
            profile.sex = sex;
        }
        if let Some(age) = data.age() {
            profile.age_years = Some(age);
        }

        if let Some((cm, unit)) = body.height() {
            profile.height_cm = Some(cm);
            if unit == HeightUnit::FtIn {
                units.height = HeightUnit::FtIn;
            }
        }
        if let Some((kg, unit)) = body.weight(units.weight) {
            profile.starting_weight_kg = Some(kg);
            if let Some(unit) = unit {
                units.weight = unit;
            }
        }
        profile.units = units;
        validate_body(&profile, today)?;

        let resolved = resolve_weekly_goal(&goals)?;
        if resolved.weekly_goal_kg.is_some() {
            profile.weekly_goal_kg = resolved.weekly_goal_kg;
            profile.goal_provenance = resolved.provenance.clone();
        }
        if let Some(target) = goals.target_weight_kg.or_else(|| lbs_to_kg(goals.target_weight_lbs)) {
            profile.target_weight_kg = Some(target);
        }
        if let Some(label) = goals.goal_label() {
            let direction = goals.direction();
            // the old rate belongs to the old direction
            if direction != profile.goal && resolved.weekly_goal_kg.is_none() {
                profile.weekly_goal_kg = None;
                profile.goal_provenance = resolved.provenance.clone();
            }
            profile.primary_goal = Some(label.to_string());
            profile.goal = direction;
        }

        if let Some(dietary) = &data.dietary_preferences {
            profile.preferences.diet_type = dietary.diet_type.clone();
            profile.preferences.allergies = dietary.allergies.clone();
            profile.preferences.exclude_foods = dietary.exclude_foods.clone();
        }
        if let Some(meals) = &data.meal_preferences {
            profile.preferences.meals_per_day = meals.meals_per_day;
            profile.preferences.preferred_meal_times = meals.preferred_meal_times.clone();
        }
        if let Some(activity) = data.activity_level() {
            profile.activity_level = Some(activity);
        }
        if data.macro_distribution.is_some() {
            profile.macro_split = data.macro_distribution;
        }

        let inputs = TargetInputs {
            weight_kg: profile.starting_weight_kg,
            height_cm: profile.height_cm,
            age_years: profile.age_on(today),
            sex: profile.sex,
            activity_level: profile.activity_level.unwrap_or_default(),
            goal: profile.goal,
        };
        let (baseline, baseline_issue) = match compute_daily_targets(
            &inputs,
            profile.weekly_goal_kg,
            profile.macro_split.as_ref(),
            settings,
        ) {
            Ok(targets) => (Some(targets), None),
            Err(err) => (None, Some(err.to_string())),
        };

        Ok(OnboardingCompletion {
            profile,
            baseline,
            baseline_issue,
            weekly_goal: resolved,
        })
    }
}

/// Range checks on the values the baseline is computed from
fn validate_body(profile: &Profile, today: NaiveDate) -> Result<(), ValidationError> {
    if let Some(kg) = profile.starting_weight_kg {
        check_field("weight_kg", validate_weight(kg))?;
    }
    if let Some(cm) = profile.height_cm {
        check_field("height_cm", validate_height_cm(cm))?;
    }
    if let Some(age) = profile.age_years {
        check_field("age", validate_age(age))?;
    }
    if let Some(dob) = profile.date_of_birth {
        check_field("date_of_birth", validate_date_of_birth(dob, today))?;
    }
    Ok(())
}

/// Result of completing onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingCompletion {
    pub profile: Profile,
    pub baseline: Option<DailyTargets>,
    /// Why no baseline could be computed
    pub baseline_issue: Option<String>,
    pub weekly_goal: ResolvedGoal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{GoalDirection, GoalSource};
    use rstest::rstest;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn filled() -> OnboardingProgress {
        let mut progress = OnboardingProgress::default();
        progress
            .record_step(
                OnboardingStep::PersonalInfo,
                json!({"full_name": "Alex", "email": "alex@example.com", "date_of_birth": "1994-01-15", "gender": "male"}),
            )
            .unwrap();
        progress
            .record_step(OnboardingStep::BodyMetrics, json!({"weight_kg": 70, "height_cm": "175"}))
            .unwrap();
        progress
            .record_step(OnboardingStep::Goals, json!({"goal_type": "lose_weight", "rate_option": "standard"}))
            .unwrap();
        progress
    }

    #[test]
    fn test_step_names_parse() {
        assert_eq!("goals".parse::<OnboardingStep>().unwrap(), OnboardingStep::Goals);
        assert!("notifications".parse::<OnboardingStep>().is_err());
    }

    #[test]
    fn test_record_step_rejects_non_object() {
        let mut progress = OnboardingProgress::default();
        let err = progress.record_step(OnboardingStep::Goals, json!([1, 2])).unwrap_err();
        assert!(matches!(err, NutritionError::Validation(_)));
    }

    #[test]
    fn test_record_step_rejects_malformed_fields() {
        let mut progress = OnboardingProgress::default();
        let result = progress.record_step(OnboardingStep::DietaryPreferences, json!({"allergies": "peanuts"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unparsable_numbers_become_absent() {
        let mut progress = OnboardingProgress::default();
        progress
            .record_step(OnboardingStep::BodyMetrics, json!({"weight_kg": "heavy", "age": "31"}))
            .unwrap();
        let body = progress.progress.body_metrics.unwrap();
        assert_eq!(body.weight_kg, None);
        assert_eq!(body.age, Some(31));
        assert_eq!(progress.current_step, OnboardingStep::BodyMetrics);
    }

    #[rstest]
    #[case(json!({"weight_kg": 70, "height_cm": 0}), "height_cm")]
    #[case(json!({"weight_kg": -5, "height_cm": 175}), "weight_kg")]
    #[case(json!({"weight_lbs": 20, "height_cm": 175}), "weight_kg")]
    #[case(json!({"weight_kg": 70, "height_ft": 12, "height_in": 0}), "height_cm")]
    #[case(json!({"weight_kg": 70, "height_cm": 175, "age": 900}), "age")]
    fn test_record_step_rejects_out_of_range_body_metrics(#[case] payload: serde_json::Value, #[case] field: &str) {
        let mut progress = filled();
        let err = progress.record_step(OnboardingStep::BodyMetrics, payload).unwrap_err();
        assert!(matches!(err, NutritionError::InvalidField { field: ref f, .. } if f == field));
        assert_eq!(progress, filled());
    }

    #[test]
    fn test_record_step_rejects_impossible_personal_age() {
        let mut progress = OnboardingProgress::default();
        let err = progress
            .record_step(OnboardingStep::PersonalInfo, json!({"full_name": "Alex", "age": 0}))
            .unwrap_err();
        assert!(matches!(err, NutritionError::InvalidField { ref field, .. } if field == "age"));
        assert!(progress.progress.personal_info.is_none());
    }

    #[test]
    fn test_complete_rejects_out_of_range_unitless_weight() {
        let mut progress = filled();
        progress
            .record_step(OnboardingStep::BodyMetrics, json!({"weight": 5, "height_cm": 175}))
            .unwrap();
        let err = progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap_err();
        assert!(matches!(err, NutritionError::InvalidField { ref field, .. } if field == "weight_kg"));
    }

    #[rstest]
    #[case("2030-01-01")]
    #[case("2024-01-01")]
    #[case("1800-01-01")]
    fn test_complete_rejects_impossible_date_of_birth(#[case] dob: &str) {
        let mut progress = filled();
        progress
            .record_step(OnboardingStep::PersonalInfo, json!({"full_name": "Alex", "date_of_birth": dob}))
            .unwrap();
        let err = progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap_err();
        assert!(matches!(err, NutritionError::InvalidField { ref field, .. } if field == "date_of_birth"));
    }

    #[test]
    fn test_complete_requires_steps() {
        let mut progress = OnboardingProgress::default();
        progress
            .record_step(OnboardingStep::PersonalInfo, json!({"full_name": "Alex"}))
            .unwrap();
        let err = progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap_err();
        let NutritionError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains("body_metrics"));
        assert!(message.contains("goals"));
    }

    #[test]
    fn test_complete_builds_profile_and_baseline() {
        let completion = filled()
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap();
        let profile = &completion.profile;
        assert_eq!(profile.name.as_deref(), Some("Alex"));
        assert_eq!(profile.sex, BiologicalSex::Male);
        assert_eq!(profile.height_cm, Some(175.0));
        assert_eq!(profile.starting_weight_kg, Some(70.0));
        assert_eq!(profile.goal, GoalDirection::Loss);
        assert_eq!(profile.weekly_goal_kg, Some(-0.5));
        assert_eq!(completion.weekly_goal.provenance.source, Some(GoalSource::Preset));
        assert_eq!(completion.baseline.map(|b| b.calories), Some(2006));
        assert!(completion.baseline_issue.is_none());
    }

    #[test]
    fn test_complete_rejects_bad_email() {
        let mut progress = filled();
        progress
            .record_step(OnboardingStep::PersonalInfo, json!({"email": "not-an-email"}))
            .unwrap();
        assert!(progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .is_err());
    }

    #[test]
    fn test_complete_propagates_goal_validation() {
        let mut progress = filled();
        progress
            .record_step(
                OnboardingStep::Goals,
                json!({"goal_type": "gain", "rate_option": "custom", "custom_rate": 2.0}),
            )
            .unwrap();
        assert!(matches!(
            progress.complete(&Profile::default(), today(), &NutritionSettings::default()),
            Err(NutritionError::Validation(_))
        ));
    }

    #[test]
    fn test_complete_without_baseline_inputs_still_succeeds() {
        let mut progress = OnboardingProgress::default();
        progress.record_step(OnboardingStep::PersonalInfo, json!({})).unwrap();
        progress.record_step(OnboardingStep::BodyMetrics, json!({"height_cm": 170})).unwrap();
        progress.record_step(OnboardingStep::Goals, json!({"goal_type": "maintain"})).unwrap();

        let completion = progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap();
        assert!(completion.baseline.is_none());
        assert!(completion.baseline_issue.unwrap().contains("weight_kg"));
        assert_eq!(completion.profile.weekly_goal_kg, Some(0.0));
    }

    #[test]
    fn test_direction_change_without_rate_drops_old_weekly_goal() {
        let existing = filled()
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap()
            .profile;
        assert_eq!(existing.weekly_goal_kg, Some(-0.5));

        let mut progress = filled();
        progress
            .record_step(OnboardingStep::Goals, json!({"goal_type": "gain_muscle"}))
            .unwrap();
        let completion = progress
            .complete(&existing, today(), &NutritionSettings::default())
            .unwrap();
        assert_eq!(completion.profile.goal, GoalDirection::Gain);
        assert_eq!(completion.profile.weekly_goal_kg, None);
        assert_eq!(completion.profile.goal_provenance.source, None);
        // legacy surplus: round(2555.5625 + 300)
        assert_eq!(completion.baseline.map(|b| b.calories), Some(2856));
    }

    #[test]
    fn test_same_direction_without_rate_keeps_weekly_goal() {
        let existing = filled()
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap()
            .profile;

        let mut progress = filled();
        progress
            .record_step(OnboardingStep::Goals, json!({"goal_type": "lose_weight"}))
            .unwrap();
        let completion = progress
            .complete(&existing, today(), &NutritionSettings::default())
            .unwrap();
        assert_eq!(completion.profile.weekly_goal_kg, Some(-0.5));
    }

    #[test]
    fn test_imperial_entry_switches_units() {
        let mut progress = filled();
        progress
            .record_step(
                OnboardingStep::BodyMetrics,
                json!({"weight_lbs": 165, "height_ft": 5, "height_in": 10}),
            )
            .unwrap();
        let completion = progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap();
        assert_eq!(completion.profile.units.weight, WeightUnit::Lb);
        assert_eq!(completion.profile.units.height, HeightUnit::FtIn);
        assert_eq!(completion.profile.starting_weight_kg, Some(74.84));
        assert_eq!(completion.profile.height_cm, Some(178.0));
    }

    #[test]
    fn test_unitless_weight_uses_unit_step() {
        let mut progress = filled();
        progress
            .record_step(OnboardingStep::UnitPreferences, json!({"units": {"weight": "lbs", "height": "cm"}}))
            .unwrap();
        progress
            .record_step(OnboardingStep::BodyMetrics, json!({"weight": 200, "height_cm": 180}))
            .unwrap();
        let completion = progress
            .complete(&Profile::default(), today(), &NutritionSettings::default())
            .unwrap();
        assert_eq!(completion.profile.starting_weight_kg, Some(90.72));
    }

    #[test]
    fn test_existing_profile_values_survive() {
        let existing = Profile {
            activity_level: Some(ActivityLevel::Active),
            target_weight_kg: Some(65.0),
            ..Default::default()
        };
        let completion = filled()
            .complete(&existing, today(), &NutritionSettings::default())
            .unwrap();
        assert_eq!(completion.profile.activity_level, Some(ActivityLevel::Active));
        assert_eq!(completion.profile.target_weight_kg, Some(65.0));
    }

    #[test]
    fn test_overrides_ignore_invalid_goal_draft() {
        let mut progress = filled();
        progress
            .record_step(OnboardingStep::Goals, json!({"goal_type": "lose", "custom_rate": 3.0}))
            .unwrap();
        let overrides = progress.overrides();
        assert_eq!(overrides.weekly_goal_kg, None);
        assert_eq!(overrides.goal, Some(GoalDirection::Loss));
        assert_eq!(overrides.weight_kg, Some(70.0));
        assert_eq!(overrides.height_cm, Some(175.0));
    }

    #[test]
    fn test_lifestyle_activity_beats_goals_activity() {
        let mut progress = filled();
        progress
            .record_step(OnboardingStep::Goals, json!({"goal_type": "maintain", "activity_level": "sedentary"}))
            .unwrap();
        assert_eq!(progress.overrides().activity_level, Some(ActivityLevel::Sedentary));
        progress
            .record_step(OnboardingStep::Lifestyle, json!({"activity_level": "very_active", "sleep_hours": 7}))
            .unwrap();
        assert_eq!(progress.overrides().activity_level, Some(ActivityLevel::VeryActive));
    }

    #[test]
    fn test_progress_roundtrips_through_json() {
        let progress = filled();
        let stored = serde_json::to_value(&progress).unwrap();
        let restored: OnboardingProgress = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, progress);
    }
}
