//! Unit conversion and normalization module
//!
//! All body data is stored in SI units (kg, cm) and converted on the way in.
//! Every helper here returns `None` instead of failing when an input is
//! missing or numerically unusable, so callers never have to guard against
//! NaN or negative lengths themselves.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Exact international avoirdupois pound
pub const KG_PER_LB: f64 = 0.45359237;

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

// ============================================================================
// Conversions
// ============================================================================

/// Convert pounds to kilograms, rounded to 2 decimals
pub fn lbs_to_kg(lbs: Option<f64>) -> Option<f64> {
    let lbs = lbs.filter(|v| v.is_finite())?;
    Some(round_to(lbs * KG_PER_LB, 2))
}

/// Convert a feet + inches height to whole centimeters
///
/// A missing part counts as zero; the result is absent only when both parts
/// are missing or the total is negative.
pub fn feet_inches_to_cm(feet: Option<f64>, inches: Option<f64>) -> Option<i32> {
    if feet.is_none() && inches.is_none() {
        return None;
    }
    let total_inches = feet.unwrap_or(0.0).trunc() * 12.0 + inches.unwrap_or(0.0).trunc();
    if !total_inches.is_finite() || total_inches < 0.0 {
        return None;
    }
    Some((total_inches * CM_PER_INCH).round() as i32)
}

/// Age in whole years on `today`
///
/// One year is subtracted when the birthday hasn't happened yet this year.
/// Birth dates in the future yield `None`.
pub fn age_from_dob(dob: Option<NaiveDate>, today: NaiveDate) -> Option<i32> {
    let dob = dob?;
    if dob > today {
        return None;
    }
    let before_birthday = (today.month(), today.day()) < (dob.month(), dob.day());
    Some(today.year() - dob.year() - i32::from(before_birthday))
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============================================================================
// Lenient numeric parsing
// ============================================================================

/// Interpret a loosely-typed JSON value as a number
///
/// Onboarding clients send numbers, numeric strings, or nothing at all.
/// Anything that doesn't parse to a finite number becomes `None`.
pub fn number_from_json(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Serde adapter for optional numeric fields that tolerates strings and junk
///
/// Use with `#[serde(default, deserialize_with = "lenient_number")]`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_json))
}

/// Same as [`lenient_number`], truncated to a whole number
pub fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.map(|v| v.trunc() as i32))
}

// ============================================================================
// Unit preferences
// ============================================================================

/// Weight unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    /// Convert a value in this unit to kilograms
    pub fn to_kg(&self, value: Option<f64>) -> Option<f64> {
        match self {
            WeightUnit::Kg => value.filter(|v| v.is_finite()),
            WeightUnit::Lb => lbs_to_kg(value),
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lb),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

/// Height unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightUnit {
    #[default]
    Cm,
    FtIn,
}

impl HeightUnit {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::FtIn => "ft_in",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for HeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(HeightUnit::Cm),
            "ft_in" | "ft-in" | "ft/in" | "ft" | "feet" => Ok(HeightUnit::FtIn),
            _ => Err(format!("Unknown height unit: {}", s)),
        }
    }
}

/// Display units chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnitPreferences {
    #[serde(default)]
    pub height: HeightUnit,
    #[serde(default)]
    pub weight: WeightUnit,
}
