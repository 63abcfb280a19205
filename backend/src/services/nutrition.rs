//! Nutrition target service
//!
//! Reads the committed profile and adjustment state and runs the target
//! aggregator. While onboarding is still running, the saved step drafts
//! override the committed profile so the UI can preview targets.

use crate::error::ApiError;
use crate::repositories::{OnboardingRepository, ProfileRepository};
use chrono::Utc;
use nutrition_coach_shared::{
    daily_nutrition, resolve_weekly_goal, DailyNutrition, GoalPayload, NutritionSettings, ResolvedGoal,
};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

pub struct NutritionService;

impl NutritionService {
    /// Base and adjusted targets for today
    pub async fn daily_targets(
        pool: &PgPool,
        user_id: Uuid,
        settings: &NutritionSettings,
    ) -> Result<DailyNutrition, ApiError> {
        let profile = ProfileRepository::find(pool, user_id)
            .await
            .map_err(ApiError::repository)?
            .ok_or_else(|| ApiError::NotFound("User profile not found".to_string()))?;

        let overrides = OnboardingRepository::find(pool, user_id)
            .await
            .map_err(ApiError::repository)?
            .filter(|record| !record.is_complete)
            .map(|record| record.into_progress().overrides())
            .filter(|overrides| !overrides.is_empty());
        if overrides.is_some() {
            debug!(%user_id, "Applying onboarding drafts to daily targets");
        }

        let nutrition = daily_nutrition(
            &profile.profile.0,
            overrides.as_ref(),
            profile.adjustment_state(),
            Utc::now().date_naive(),
            settings,
        )?;
        Ok(nutrition)
    }

    /// Resolve a goal payload without touching storage
    pub fn preview_weekly_goal(payload: &GoalPayload) -> Result<ResolvedGoal, ApiError> {
        Ok(resolve_weekly_goal(payload)?)
    }
}
