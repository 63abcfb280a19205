//! Input validation functions
//!
//! Range checks for values a user types in. Each validator returns a
//! human-readable message; callers attach the field name with
//! [`ValidationError`].

use chrono::NaiveDate;
use validator::ValidateEmail;

use crate::errors::NutritionError;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate an explicitly entered age
pub fn validate_age(age_years: i32) -> Result<(), String> {
    if !(1..=150).contains(&age_years) {
        return Err("Age must be between 1 and 150 years".to_string());
    }
    Ok(())
}

/// Validate date of birth as of `today`
/// Must not be in the future, and age must be between 1 and 150 years
pub fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if dob > today {
        return Err("Date of birth cannot be in the future".to_string());
    }

    match today.years_since(dob) {
        Some(age) if age < 1 => Err("Age must be at least 1 year".to_string()),
        Some(age) if age > 150 => Err("Age cannot exceed 150 years".to_string()),
        None => Err("Invalid date of birth".to_string()),
        _ => Ok(()),
    }
}

/// Validate a free-text note on a weight entry
pub fn validate_note(note: &str) -> Result<(), String> {
    if note.chars().count() > 500 {
        return Err("Note cannot exceed 500 characters".to_string());
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "weight" | "weight_kg" => "Weight",
        "height" | "height_cm" => "Height",
        "age" => "Age",
        "date_of_birth" => "Date of Birth",
        "email" => "Email",
        "note" => "Note",
        "activity_level" => "Activity Level",
        "weekly_goal" => "Weekly Goal",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl From<ValidationError> for NutritionError {
    fn from(err: ValidationError) -> Self {
        NutritionError::InvalidField {
            message: err.user_message(),
            field: err.field,
        }
    }
}

/// Run a validator and attach the field name to its message
pub fn check_field(field: &str, result: Result<(), String>) -> Result<(), ValidationError> {
    result.map_err(|message| ValidationError::new(field, &message))
}
