//! Nutrition Coach WASM Module
//!
//! Browser bindings over the shared engine, so the onboarding UI previews
//! exactly the targets the backend will compute. Structured values cross the
//! boundary as JSON strings; errors surface as thrown strings.

use chrono::{NaiveDate, Utc};
use nutrition_coach_shared::{
    daily_nutrition, onboarding::OnboardingData, AdjustmentState, GoalPayload, MacroSplit,
    NutritionSettings, OnboardingProgress, Profile,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// Input to [`preview_daily_targets`]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PreviewRequest {
    /// Onboarding step drafts, keyed by step name
    progress: OnboardingData,
    metabolic_adjustment_kcal: f64,
    /// Defaults to the current date; only matters for date-of-birth ages
    today: Option<NaiveDate>,
    settings: NutritionSettings,
}

fn preview(json: &str) -> Result<String, String> {
    let request: PreviewRequest = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let overrides = OnboardingProgress {
        progress: request.progress,
        ..Default::default()
    }
    .overrides();

    let nutrition = daily_nutrition(
        &Profile::default(),
        Some(&overrides),
        AdjustmentState::new(request.metabolic_adjustment_kcal),
        request.today.unwrap_or_else(|| Utc::now().date_naive()),
        &request.settings,
    )
    .map_err(|e| e.to_string())?;

    serde_json::to_string(&nutrition).map_err(|e| e.to_string())
}

fn resolve(json: &str) -> Result<String, String> {
    let payload: GoalPayload = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let resolved = nutrition_coach_shared::resolve_weekly_goal(&payload).map_err(|e| e.to_string())?;
    serde_json::to_string(&resolved).map_err(|e| e.to_string())
}

/// Base and adjusted daily targets from onboarding drafts
#[wasm_bindgen]
pub fn preview_daily_targets(json: &str) -> Result<String, JsValue> {
    preview(json).map_err(|e| JsValue::from_str(&e))
}

/// Resolve a goals payload into a signed kg/week plus provenance
#[wasm_bindgen]
pub fn resolve_weekly_goal(json: &str) -> Result<String, JsValue> {
    resolve(json).map_err(|e| JsValue::from_str(&e))
}

/// Macro grams for `calories` under the given split (JSON)
#[wasm_bindgen]
pub fn allocate_macros(calories: i32, protein_pct: f64, carbs_pct: f64, fat_pct: f64) -> String {
    let split = MacroSplit::new(protein_pct, carbs_pct, fat_pct);
    let targets = nutrition_coach_shared::allocate_macros(calories, Some(&split));
    serde_json::to_string(&targets).unwrap_or_default()
}

#[wasm_bindgen]
pub fn lbs_to_kg(lbs: f64) -> Option<f64> {
    nutrition_coach_shared::lbs_to_kg(Some(lbs))
}

#[wasm_bindgen]
pub fn feet_inches_to_cm(feet: f64, inches: f64) -> Option<i32> {
    nutrition_coach_shared::feet_inches_to_cm(Some(feet), Some(inches))
}
