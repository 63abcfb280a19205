//! Health metrics calculations module
//!
//! Basal metabolic rate, activity multipliers and BMI. All calculations are
//! pure functions over SI inputs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::round_to;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex for physiological calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
    /// Other or not stated; uses the female constant of Mifflin-St Jeor
    #[default]
    Unspecified,
}

impl BiologicalSex {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "male" | "m" | "man" => BiologicalSex::Male,
            "female" | "f" | "woman" => BiologicalSex::Female,
            _ => BiologicalSex::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BiologicalSex::Male => "male",
            BiologicalSex::Female => "female",
            BiologicalSex::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for BiologicalSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    #[default]
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Very hard exercise or physical job
    VeryActive,
}

impl ActivityLevel {
    /// Parse a client label; unrecognized labels fall back to `Moderate`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" | "lightly_active" => ActivityLevel::Light,
            "moderate" | "moderately_active" => ActivityLevel::Moderate,
            "active" => ActivityLevel::Active,
            "very_active" | "extra_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Moderate,
        }
    }

    /// Parse an optional label, defaulting to `Moderate`
    pub fn from_optional_label(label: Option<&str>) -> Self {
        label.map(Self::from_label).unwrap_or_default()
    }

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// BMR and TDEE
// ============================================================================

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Everyone else: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn calculate_bmr_mifflin(weight_kg: f64, height_cm: f64, age_years: i32, sex: BiologicalSex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match sex {
        BiologicalSex::Male => base + 5.0,
        BiologicalSex::Female | BiologicalSex::Unspecified => base - 161.0,
    }
}

/// Total Daily Energy Expenditure: BMR × activity multiplier
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

// ============================================================================
// BMI
// ============================================================================

/// BMI category shown on the onboarding summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Calculate BMI from weight and height, rounded to 2 decimals
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    let height_m = height_cm / 100.0;
    if !(height_m > 0.0) || !weight_kg.is_finite() {
        return None;
    }
    let bmi = weight_kg / (height_m * height_m);
    bmi.is_finite().then(|| round_to(bmi, 2))
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}
