//! Onboarding progress repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use nutrition_coach_shared::{onboarding::OnboardingData, OnboardingProgress, OnboardingStep};
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Onboarding progress record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OnboardingRecord {
    pub user_id: Uuid,
    pub current_step: String,
    pub progress: Json<OnboardingData>,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OnboardingRecord {
    /// Typed progress; an unrecognised stored step falls back to the first one
    pub fn into_progress(self) -> OnboardingProgress {
        OnboardingProgress {
            current_step: self.current_step.parse().unwrap_or_default(),
            progress: self.progress.0,
            is_complete: self.is_complete,
        }
    }
}

/// Onboarding repository for database operations
pub struct OnboardingRepository;

impl OnboardingRepository {
    /// Create an empty progress record unless one exists
    ///
    /// The profile row must already exist.
    pub async fn ensure<'e, E>(executor: E, user_id: Uuid) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO onboarding_progress (user_id, current_step)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(OnboardingStep::default().as_str())
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Get progress by user ID
    pub async fn find<'e, E>(executor: E, user_id: Uuid) -> Result<Option<OnboardingRecord>>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, OnboardingRecord>(
            r#"
            SELECT user_id, current_step, progress, is_complete, completed_at, created_at, updated_at
            FROM onboarding_progress
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Overwrite the stored progress
    pub async fn save<'e, E>(
        executor: E,
        user_id: Uuid,
        progress: &OnboardingProgress,
    ) -> Result<OnboardingRecord>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, OnboardingRecord>(
            r#"
            UPDATE onboarding_progress
            SET current_step = $2, progress = $3, is_complete = $4, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, current_step, progress, is_complete, completed_at, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(progress.current_step.as_str())
        .bind(Json(&progress.progress))
        .bind(progress.is_complete)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Mark onboarding as finished
    pub async fn mark_complete<'e, E>(executor: E, user_id: Uuid) -> Result<DateTime<Utc>>
    where
        E: PgExecutor<'e>,
    {
        let completed_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            UPDATE onboarding_progress
            SET is_complete = TRUE, completed_at = NOW(), updated_at = NOW()
            WHERE user_id = $1
            RETURNING completed_at
            "#,
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(completed_at)
    }
}
