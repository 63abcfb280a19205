//! Weekly goal resolution
//!
//! Interprets what the user said they want ("lose weight, standard pace")
//! as a signed rate of body-mass change in kg/week. Negative means loss,
//! positive means gain, zero means maintain.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{NutritionError, NutritionResult};
use crate::units::{lenient_number, number_from_json};

/// Allowed weekly loss magnitudes (kg/week)
pub const LOSS_RATE_RANGE: (f64, f64) = (0.1, 1.0);
/// Allowed weekly gain magnitudes (kg/week)
pub const GAIN_RATE_RANGE: (f64, f64) = (0.05, 0.75);
/// Range applied when the goal direction can't be determined
pub const UNKNOWN_RATE_RANGE: (f64, f64) = (0.0, 1.0);

// ============================================================================
// Goal direction
// ============================================================================

/// Direction of the user's body-mass goal
///
/// Free-text goal labels are normalized into this enum once, at the edge;
/// everything downstream matches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    Loss,
    Gain,
    Maintain,
    #[default]
    Unknown,
}

impl GoalDirection {
    /// Classify a goal label by keyword ("lose_weight", "muscle_gain", "maintenance", ...)
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("lose") || label.contains("loss") {
            GoalDirection::Loss
        } else if label.contains("gain") || label.contains("muscle") {
            GoalDirection::Gain
        } else if label.contains("maintain") || label.contains("maintenance") {
            GoalDirection::Maintain
        } else {
            GoalDirection::Unknown
        }
    }

    /// Classify an optional label; absent labels are `Unknown`
    pub fn from_optional_label(label: Option<&str>) -> Self {
        label.map(Self::from_label).unwrap_or_default()
    }

    /// Allowed magnitude range for this direction
    pub fn allowed_range(&self) -> (f64, f64) {
        match self {
            GoalDirection::Loss => LOSS_RATE_RANGE,
            GoalDirection::Gain => GAIN_RATE_RANGE,
            GoalDirection::Maintain => (0.0, 0.0),
            GoalDirection::Unknown => UNKNOWN_RATE_RANGE,
        }
    }

    /// Sign applied to a rate magnitude
    pub fn sign(&self) -> f64 {
        match self {
            GoalDirection::Loss => -1.0,
            GoalDirection::Gain => 1.0,
            GoalDirection::Maintain | GoalDirection::Unknown => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalDirection::Loss => "loss",
            GoalDirection::Gain => "gain",
            GoalDirection::Maintain => "maintain",
            GoalDirection::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GoalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Rate presets
// ============================================================================

/// Named pace presets offered by the onboarding UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePreset {
    Conservative,
    Standard,
    Aggressive,
}

impl RatePreset {
    /// Magnitude in kg/week
    pub fn magnitude(&self) -> f64 {
        match self {
            RatePreset::Conservative => 0.25,
            RatePreset::Standard => 0.5,
            RatePreset::Aggressive => 0.75,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "conservative" => Some(RatePreset::Conservative),
            "standard" => Some(RatePreset::Standard),
            "aggressive" => Some(RatePreset::Aggressive),
            _ => None,
        }
    }
}

// ============================================================================
// Payload & provenance
// ============================================================================

/// The `goals` onboarding step, as sent by any client version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GoalPayload {
    #[serde(default)]
    pub goal_type: Option<String>,
    #[serde(default)]
    pub primary_goal: Option<String>,
    /// Signed kg/week sent directly by older clients, kept raw until resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_goal: Option<serde_json::Value>,
    /// Preset name, "custom", or a bare number
    #[serde(default, alias = "rate_choice", alias = "progress_rate", deserialize_with = "lenient_label")]
    pub rate_option: Option<String>,
    #[serde(default, alias = "custom_rate", alias = "rate_custom", deserialize_with = "lenient_number")]
    pub custom_rate_kg_per_week: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub target_weight_lbs: Option<f64>,
    #[serde(default)]
    pub activity_level: Option<String>,
}

fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl GoalPayload {
    /// The goal label, preferring `goal_type` over `primary_goal`
    pub fn goal_label(&self) -> Option<&str> {
        self.goal_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.primary_goal.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn direction(&self) -> GoalDirection {
        GoalDirection::from_optional_label(self.goal_label())
    }
}

/// Where a resolved weekly goal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalSource {
    Explicit,
    Preset,
    Custom,
    RawNumeric,
    Maintain,
}

/// Provenance metadata attached to a resolved goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GoalProvenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<GoalSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<RatePreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
}

/// Result of goal resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResolvedGoal {
    /// Signed kg/week, or `None` when the payload carried no rate at all
    pub weekly_goal_kg: Option<f64>,
    pub provenance: GoalProvenance,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a goals payload into a signed weekly goal
///
/// # Errors
///
/// Returns [`NutritionError::Validation`] when the rate is out of range for
/// its direction, when `custom` is selected without a value, or when the
/// preset name is neither known nor numeric.
pub fn resolve_weekly_goal(payload: &GoalPayload) -> NutritionResult<ResolvedGoal> {
    // Older clients send the signed number directly
    if let Some(raw) = payload.weekly_goal.as_ref().filter(|v| !v.is_null()) {
        let value = number_from_json(raw).ok_or_else(|| {
            NutritionError::Validation("Invalid numeric weekly_goal provided".to_string())
        })?;
        return Ok(ResolvedGoal {
            weekly_goal_kg: Some(value),
            provenance: GoalProvenance {
                source: Some(GoalSource::Explicit),
                ..Default::default()
            },
        });
    }

    let direction = payload.direction();
    if direction == GoalDirection::Maintain {
        return Ok(ResolvedGoal {
            weekly_goal_kg: Some(0.0),
            provenance: GoalProvenance {
                source: Some(GoalSource::Maintain),
                ..Default::default()
            },
        });
    }

    let Some((magnitude, source, preset)) = rate_magnitude(payload)? else {
        return Ok(ResolvedGoal::default());
    };
    let magnitude = magnitude.abs();

    let (min, max) = direction.allowed_range();
    if !(min..=max).contains(&magnitude) {
        return Err(NutritionError::Validation(format!(
            "Selected rate {} kg/week is outside allowed range for '{}' ({} to {} kg/week).",
            magnitude, direction, min, max
        )));
    }

    let weekly_goal = direction.sign() * magnitude;
    Ok(ResolvedGoal {
        // avoid handing out -0.0 for unknown directions
        weekly_goal_kg: Some(weekly_goal + 0.0),
        provenance: GoalProvenance {
            source: Some(source),
            preset,
            magnitude: Some(magnitude),
        },
    })
}

/// Pick the rate magnitude out of the preset/custom fields
fn rate_magnitude(
    payload: &GoalPayload,
) -> NutritionResult<Option<(f64, GoalSource, Option<RatePreset>)>> {
    let custom = payload.custom_rate_kg_per_week;

    let Some(choice) = payload.rate_option.as_deref() else {
        return Ok(custom.map(|value| (value, GoalSource::Custom, None)));
    };

    let choice = choice.trim().to_lowercase();
    if let Some(preset) = RatePreset::from_name(&choice) {
        return Ok(Some((preset.magnitude(), GoalSource::Preset, Some(preset))));
    }
    if choice == "custom" {
        let value = custom.ok_or_else(|| {
            NutritionError::Validation(
                "Custom rate selected but no custom_rate_kg_per_week provided".to_string(),
            )
        })?;
        return Ok(Some((value, GoalSource::Custom, None)));
    }

    match choice.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some((value, GoalSource::RawNumeric, None))),
        _ => Err(NutritionError::Validation(format!(
            "Unknown rate_option: {}",
            choice
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payload(goal_type: &str, rate: Option<&str>, custom: Option<f64>) -> GoalPayload {
        GoalPayload {
            goal_type: Some(goal_type.to_string()),
            rate_option: rate.map(str::to_string),
            custom_rate_kg_per_week: custom,
            ..Default::default()
        }
    }

    #[rstest]
    #[case("lose_weight", GoalDirection::Loss)]
    #[case("weight_loss", GoalDirection::Loss)]
    #[case("gain_weight", GoalDirection::Gain)]
    #[case("muscle_building", GoalDirection::Gain)]
    #[case("maintain", GoalDirection::Maintain)]
    #[case("Maintenance", GoalDirection::Maintain)]
    #[case("get_fit", GoalDirection::Unknown)]
    fn test_direction_from_label(#[case] label: &str, #[case] expected: GoalDirection) {
        assert_eq!(GoalDirection::from_label(label), expected);
    }

    #[test]
    fn test_standard_preset_for_weight_loss() {
        let resolved = resolve_weekly_goal(&payload("lose_weight", Some("standard"), None)).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(-0.5));
        assert_eq!(resolved.provenance.source, Some(GoalSource::Preset));
        assert_eq!(resolved.provenance.preset, Some(RatePreset::Standard));
    }

    #[rstest]
    #[case("conservative", 0.25)]
    #[case("standard", 0.5)]
    #[case("aggressive", 0.75)]
    fn test_gain_presets(#[case] preset: &str, #[case] expected: f64) {
        let resolved = resolve_weekly_goal(&payload("gain_muscle", Some(preset), None)).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(expected));
    }

    #[test]
    fn test_explicit_weekly_goal_wins() {
        let goals: GoalPayload = serde_json::from_value(serde_json::json!({
            "goal_type": "gain_weight",
            "weekly_goal": -0.3,
            "rate_option": "aggressive"
        }))
        .unwrap();
        let resolved = resolve_weekly_goal(&goals).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(-0.3));
        assert_eq!(resolved.provenance.source, Some(GoalSource::Explicit));
    }

    #[test]
    fn test_unparsable_explicit_goal_is_rejected() {
        let goals: GoalPayload =
            serde_json::from_value(serde_json::json!({ "weekly_goal": "fast" })).unwrap();
        assert!(matches!(
            resolve_weekly_goal(&goals),
            Err(NutritionError::Validation(_))
        ));
    }

    #[test]
    fn test_maintain_ignores_rate() {
        let resolved = resolve_weekly_goal(&payload("maintain", Some("aggressive"), Some(5.0))).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(0.0));
        assert_eq!(resolved.provenance.source, Some(GoalSource::Maintain));
    }

    #[rstest]
    #[case(0.1)]
    #[case(1.0)]
    fn test_loss_boundaries_accepted(#[case] rate: f64) {
        let resolved = resolve_weekly_goal(&payload("lose", Some("custom"), Some(rate))).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(-rate));
    }

    #[rstest]
    #[case(0.09)]
    #[case(1.01)]
    fn test_loss_out_of_range_rejected(#[case] rate: f64) {
        let err = resolve_weekly_goal(&payload("lose", Some("custom"), Some(rate))).unwrap_err();
        let NutritionError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.contains(&rate.to_string()));
        assert!(message.contains("0.1 to 1 kg/week"));
    }

    #[rstest]
    #[case(0.05, true)]
    #[case(0.75, true)]
    #[case(0.04, false)]
    #[case(0.8, false)]
    fn test_gain_boundaries(#[case] rate: f64, #[case] ok: bool) {
        let result = resolve_weekly_goal(&payload("gain", None, Some(rate)));
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_negative_custom_rate_uses_magnitude() {
        let resolved = resolve_weekly_goal(&payload("lose", None, Some(-0.4))).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(-0.4));
        assert_eq!(resolved.provenance.magnitude, Some(0.4));
    }

    #[test]
    fn test_custom_without_value_rejected() {
        assert!(resolve_weekly_goal(&payload("lose", Some("custom"), None)).is_err());
    }

    #[test]
    fn test_numeric_rate_option() {
        let resolved = resolve_weekly_goal(&payload("lose", Some("0.3"), None)).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(-0.3));
        assert_eq!(resolved.provenance.source, Some(GoalSource::RawNumeric));
    }

    #[test]
    fn test_unknown_rate_option_rejected() {
        assert!(resolve_weekly_goal(&payload("lose", Some("turbo"), None)).is_err());
    }

    #[test]
    fn test_no_rate_information_is_unresolved() {
        let resolved = resolve_weekly_goal(&payload("lose", None, None)).unwrap();
        assert_eq!(resolved.weekly_goal_kg, None);
        assert_eq!(resolved.provenance, GoalProvenance::default());
    }

    #[test]
    fn test_unknown_direction_resolves_to_zero() {
        let resolved = resolve_weekly_goal(&payload("get_fit", Some("standard"), None)).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(0.0));
        assert!(resolve_weekly_goal(&payload("get_fit", None, Some(1.5))).is_err());
    }

    #[test]
    fn test_payload_aliases() {
        let goals: GoalPayload = serde_json::from_value(serde_json::json!({
            "primary_goal": "weight_loss",
            "rate_choice": "conservative"
        }))
        .unwrap();
        let resolved = resolve_weekly_goal(&goals).unwrap();
        assert_eq!(resolved.weekly_goal_kg, Some(-0.25));
    }
}
