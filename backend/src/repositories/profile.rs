//! Profile repository for database operations
//!
//! The profile row doubles as the per-user lock: every write that reads and
//! then updates the adjustment state starts with [`ProfileRepository::lock`].

use anyhow::Result;
use chrono::{DateTime, Utc};
use nutrition_coach_shared::{AdjustmentState, DailyTargets, MacroTargets, Profile};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Profile record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRecord {
    pub user_id: Uuid,
    pub profile: Json<Profile>,
    pub metabolic_adjustment_kcal: Decimal,
    pub daily_calories: Option<i32>,
    pub macro_targets: Option<Json<MacroTargets>>,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn adjustment_state(&self) -> AdjustmentState {
        AdjustmentState::new(self.metabolic_adjustment_kcal.to_f64().unwrap_or(0.0))
    }

    /// Stored baseline targets, if onboarding computed one
    pub fn baseline(&self) -> Option<DailyTargets> {
        match (self.daily_calories, &self.macro_targets) {
            (Some(calories), Some(Json(macro_targets))) => Some(DailyTargets {
                calories,
                macro_targets: *macro_targets,
            }),
            _ => None,
        }
    }
}

/// Profile repository for database operations
pub struct ProfileRepository;

impl ProfileRepository {
    /// Create an empty profile row unless one exists
    pub async fn ensure<'e, E>(executor: E, user_id: Uuid) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Get a profile by user ID
    pub async fn find<'e, E>(executor: E, user_id: Uuid) -> Result<Option<ProfileRecord>>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT user_id, profile, metabolic_adjustment_kcal, daily_calories, macro_targets,
                   is_profile_complete, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Get a profile and hold its row lock until the transaction ends
    pub async fn lock<'e, E>(executor: E, user_id: Uuid) -> Result<Option<ProfileRecord>>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT user_id, profile, metabolic_adjustment_kcal, daily_calories, macro_targets,
                   is_profile_complete, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(record)
    }

    /// Store the committed profile and its baseline targets
    ///
    /// The adjustment state is left untouched.
    pub async fn save_completion<'e, E>(
        executor: E,
        user_id: Uuid,
        profile: &Profile,
        baseline: Option<&DailyTargets>,
    ) -> Result<ProfileRecord>
    where
        E: PgExecutor<'e>,
    {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            UPDATE user_profiles
            SET profile = $2,
                daily_calories = $3,
                macro_targets = $4,
                is_profile_complete = TRUE,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, profile, metabolic_adjustment_kcal, daily_calories, macro_targets,
                      is_profile_complete, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(profile))
        .bind(baseline.map(|b| b.calories))
        .bind(baseline.map(|b| Json(b.macro_targets)))
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Persist a new adjustment state
    pub async fn update_adjustment<'e, E>(
        executor: E,
        user_id: Uuid,
        state: AdjustmentState,
    ) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET metabolic_adjustment_kcal = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(state.metabolic_adjustment_kcal)
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrition_coach_shared::allocate_macros;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn record() -> ProfileRecord {
        ProfileRecord {
            user_id: Uuid::new_v4(),
            profile: Json(Profile::default()),
            metabolic_adjustment_kcal: Decimal::from_str("-250.5").unwrap(),
            daily_calories: None,
            macro_targets: None,
            is_profile_complete: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_adjustment_state_from_numeric() {
        assert_eq!(record().adjustment_state().metabolic_adjustment_kcal, -250.5);
    }

    #[test]
    fn test_baseline_needs_both_columns() {
        let mut rec = record();
        assert!(rec.baseline().is_none());

        rec.daily_calories = Some(2000);
        assert!(rec.baseline().is_none());

        rec.macro_targets = Some(Json(allocate_macros(2000, None)));
        let baseline = rec.baseline().unwrap();
        assert_eq!(baseline.calories, 2000);
        assert_eq!(baseline.macro_targets.protein_g, 150);
    }

    proptest! {
        /// Any one-decimal adjustment within the cap survives the NUMERIC column
        #[test]
        fn prop_adjustment_numeric_roundtrip(tenths in -10_000i64..=10_000) {
            let mut rec = record();
            rec.metabolic_adjustment_kcal = Decimal::new(tenths, 1);
            let expected = tenths as f64 / 10.0;
            prop_assert!((rec.adjustment_state().metabolic_adjustment_kcal - expected).abs() < 1e-9);
        }
    }
}
