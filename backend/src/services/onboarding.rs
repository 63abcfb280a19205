//! Onboarding service
//!
//! Stores step payloads as they arrive and, on completion, commits the
//! profile together with its baseline targets. The profile row lock
//! serializes concurrent step saves and completions for one user.

use crate::error::ApiError;
use crate::repositories::{OnboardingRepository, OutboxRepository, ProfileRepository, WeightRepository};
use chrono::Utc;
use nutrition_coach_shared::summary::build_summary;
use nutrition_coach_shared::{
    CompleteOnboardingResponse, NutritionEvent, NutritionSettings, OnboardingProgress, OnboardingStep,
    OnboardingSummary,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

pub struct OnboardingService;

impl OnboardingService {
    /// Current progress, created empty on first access
    pub async fn get_progress(pool: &PgPool, user_id: Uuid) -> Result<OnboardingProgress, ApiError> {
        let mut tx = pool.begin().await?;
        let progress = Self::load_progress(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(progress)
    }

    /// Parse and store one step payload
    pub async fn save_step(
        pool: &PgPool,
        user_id: Uuid,
        step: &str,
        payload: serde_json::Value,
    ) -> Result<OnboardingStep, ApiError> {
        let step: OnboardingStep = step.parse()?;

        let mut tx = pool.begin().await?;
        let mut progress = Self::load_progress(&mut tx, user_id).await?;
        progress.record_step(step, payload)?;

        OnboardingRepository::save(&mut *tx, user_id, &progress)
            .await
            .map_err(ApiError::repository)?;
        OutboxRepository::append(&mut *tx, &NutritionEvent::OnboardingStepSaved { user_id, step })
            .await
            .map_err(ApiError::repository)?;
        tx.commit().await?;

        info!(%user_id, step = %step, "Onboarding step saved");
        Ok(step)
    }

    /// Commit the profile built from the stored steps
    ///
    /// Missing inputs for the baseline don't fail completion; the profile is
    /// stored without targets and the reason is logged.
    pub async fn complete(
        pool: &PgPool,
        user_id: Uuid,
        settings: &NutritionSettings,
    ) -> Result<CompleteOnboardingResponse, ApiError> {
        let mut tx = pool.begin().await?;
        let progress = Self::load_progress(&mut tx, user_id).await?;
        let existing = ProfileRepository::find(&mut *tx, user_id)
            .await
            .map_err(ApiError::repository)?
            .ok_or_else(|| ApiError::NotFound("User profile not found".to_string()))?;

        let completion = progress.complete(&existing.profile.0, Utc::now().date_naive(), settings)?;
        if let Some(issue) = &completion.baseline_issue {
            warn!(%user_id, reason = %issue, "Onboarding completed without baseline targets");
        }

        ProfileRepository::save_completion(&mut *tx, user_id, &completion.profile, completion.baseline.as_ref())
            .await
            .map_err(ApiError::repository)?;
        let completed_at = OnboardingRepository::mark_complete(&mut *tx, user_id)
            .await
            .map_err(ApiError::repository)?;

        let event = NutritionEvent::OnboardingCompleted {
            user_id,
            baseline: completion.baseline,
            weekly_goal_kg: completion.weekly_goal.weekly_goal_kg,
        };
        OutboxRepository::append(&mut *tx, &event)
            .await
            .map_err(ApiError::repository)?;
        tx.commit().await?;

        metrics::counter!("nutrition_onboarding_completed_total").increment(1);
        info!(
            %user_id,
            daily_calories = ?completion.baseline.map(|b| b.calories),
            weekly_goal_kg = ?completion.weekly_goal.weekly_goal_kg,
            "Onboarding completed"
        );

        Ok(CompleteOnboardingResponse {
            ok: true,
            user_id,
            is_profile_complete: true,
            completed_at,
            units: completion.profile.units,
            daily_calories: completion.baseline.map(|b| b.calories),
            macro_targets: completion.baseline.map(|b| b.macro_targets),
            weekly_goal: completion.weekly_goal.weekly_goal_kg,
            weekly_goal_meta: completion.weekly_goal.provenance,
        })
    }

    /// Summary of the committed profile
    pub async fn summary(pool: &PgPool, user_id: Uuid) -> Result<OnboardingSummary, ApiError> {
        let profile = ProfileRepository::find(pool, user_id)
            .await
            .map_err(ApiError::repository)?
            .ok_or_else(|| ApiError::NotFound("User profile not found".to_string()))?;
        let latest = WeightRepository::get_latest(pool, user_id)
            .await
            .map_err(ApiError::repository)?;

        Ok(build_summary(
            &profile.profile.0,
            profile.baseline().as_ref(),
            latest.map(|entry| entry.weight_kg()),
            Utc::now().date_naive(),
        ))
    }

    /// Lock the user's rows, creating them on first access
    async fn load_progress(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<OnboardingProgress, ApiError> {
        ProfileRepository::ensure(&mut **tx, user_id)
            .await
            .map_err(ApiError::repository)?;
        ProfileRepository::lock(&mut **tx, user_id)
            .await
            .map_err(ApiError::repository)?;
        OnboardingRepository::ensure(&mut **tx, user_id)
            .await
            .map_err(ApiError::repository)?;

        let record = OnboardingRepository::find(&mut **tx, user_id)
            .await
            .map_err(ApiError::repository)?
            .ok_or_else(|| ApiError::NotFound("Onboarding progress not found".to_string()))?;
        Ok(record.into_progress())
    }
}
