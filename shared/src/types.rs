//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adjustment::CorrectionReport;
use crate::goals::GoalProvenance;
use crate::macros::MacroTargets;
use crate::onboarding::OnboardingStep;
use crate::units::UnitPreferences;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Weight Types
// ============================================================================

/// Weight log entry request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWeightRequest {
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Stored weight entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntryResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of logging a weight: the entry and what it did to the adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWeightResponse {
    pub entry: WeightEntryResponse,
    pub adjustment: CorrectionReport,
}

/// Response of deleting a weight entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWeightResponse {
    pub ok: bool,
    pub adjustment: CorrectionReport,
}

/// Optional inclusive date filter for the weight history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightListQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

// ============================================================================
// Onboarding Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveStepResponse {
    pub ok: bool,
    pub step: OnboardingStep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteOnboardingResponse {
    pub ok: bool,
    pub user_id: Uuid,
    pub is_profile_complete: bool,
    pub completed_at: DateTime<Utc>,
    pub units: UnitPreferences,
    pub daily_calories: Option<i32>,
    pub macro_targets: Option<MacroTargets>,
    pub weekly_goal: Option<f64>,
    pub weekly_goal_meta: GoalProvenance,
}

/// Onboarding summary screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingSummary {
    pub profile: SummaryProfile,
    pub goal: SummaryGoal,
    pub daily_targets: SummaryTargets,
    pub tracking: SummaryTracking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryProfile {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub current_weight_kg: Option<f64>,
    pub height_cm: Option<i32>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<crate::health_metrics::BmiCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGoal {
    pub primary_goal: Option<String>,
    pub target_weight_kg: Option<f64>,
    pub activity_level: Option<crate::health_metrics::ActivityLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTargets {
    pub daily_calories: Option<i32>,
    pub macro_targets: Option<MacroTargets>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTracking {
    pub metrics_count: u32,
    pub meals_per_day: Option<i32>,
    pub diet_type: Option<String>,
    pub units: UnitPreferences,
}
