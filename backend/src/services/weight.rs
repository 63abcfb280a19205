//! Weight log service
//!
//! Provides business logic for weight tracking including:
//! - Range validation of new entries
//! - Adaptive calorie correction on every insert and delete
//! - Outbox events for each recalculation
//!
//! Inserts and deletes run in one transaction holding the profile row lock,
//! so the "previous measurement" read and the adjustment write can't
//! interleave with another request for the same user.

use crate::error::ApiError;
use crate::repositories::{
    CreateWeightEntry, OutboxRepository, ProfileRecord, ProfileRepository, WeightRepository,
};
use chrono::Utc;
use nutrition_coach_shared::validation::{check_field, validate_note, validate_weight};
use nutrition_coach_shared::{
    apply_weight_measurement, estimate_adjusted_calories, recompute_after_deletion, AdjustmentState,
    CorrectionOutcome, CorrectionReport, DeleteWeightResponse, LogWeightRequest, LogWeightResponse,
    NutritionError, NutritionEvent, NutritionSettings, WeightEntryResponse, WeightListQuery,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

/// Weight service for business logic
pub struct WeightService;

impl WeightService {
    /// Log a measurement and fold it into the adjustment state
    pub async fn add_entry(
        pool: &PgPool,
        user_id: Uuid,
        request: LogWeightRequest,
        settings: &NutritionSettings,
    ) -> Result<LogWeightResponse, ApiError> {
        check_field("weight_kg", validate_weight(request.weight_kg)).map_err(NutritionError::from)?;
        if let Some(note) = request.note.as_deref() {
            check_field("note", validate_note(note)).map_err(NutritionError::from)?;
        }

        let mut tx = pool.begin().await?;
        let profile = Self::lock_profile(&mut tx, user_id).await?;

        let previous = WeightRepository::latest_before(&mut *tx, user_id, request.date)
            .await
            .map_err(ApiError::repository)?
            .map(|record| record.measurement());
        let entry = WeightRepository::create(
            &mut *tx,
            CreateWeightEntry {
                user_id,
                entry_date: request.date,
                weight_kg: request.weight_kg,
                note: request.note,
            },
        )
        .await
        .map_err(ApiError::repository)?;

        let (state, report) = apply_weight_measurement(
            profile.adjustment_state(),
            previous.as_ref(),
            &entry.measurement(),
            profile.profile.weekly_goal_kg,
            settings,
        );
        let report = Self::persist(&mut tx, &profile, state, report, Some(entry.weight_kg()), settings).await?;
        tx.commit().await?;

        record_metrics(&report);
        Ok(LogWeightResponse {
            entry: entry.into(),
            adjustment: report,
        })
    }

    /// Entries newest first, optionally bounded by date
    pub async fn list_entries(
        pool: &PgPool,
        user_id: Uuid,
        query: WeightListQuery,
    ) -> Result<Vec<WeightEntryResponse>, ApiError> {
        if let (Some(start), Some(end)) = (query.start, query.end) {
            if start > end {
                return Err(ApiError::Validation("start must not be after end".to_string()));
            }
        }

        let records = WeightRepository::list(pool, user_id, query.start, query.end)
            .await
            .map_err(ApiError::repository)?;
        Ok(records.into_iter().map(WeightEntryResponse::from).collect())
    }

    pub async fn get_entry(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<WeightEntryResponse, ApiError> {
        WeightRepository::get_by_id(pool, id, user_id)
            .await
            .map_err(ApiError::repository)?
            .map(WeightEntryResponse::from)
            .ok_or_else(|| ApiError::NotFound("Weight entry not found".to_string()))
    }

    /// Delete a measurement and recompute from what remains
    pub async fn delete_entry(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        settings: &NutritionSettings,
    ) -> Result<DeleteWeightResponse, ApiError> {
        let mut tx = pool.begin().await?;
        let profile = Self::lock_profile(&mut tx, user_id).await?;

        let deleted = WeightRepository::delete(&mut *tx, id, user_id)
            .await
            .map_err(ApiError::repository)?;
        if !deleted {
            return Err(ApiError::NotFound("Weight entry not found".to_string()));
        }

        let remaining: Vec<_> = WeightRepository::list(&mut *tx, user_id, None, None)
            .await
            .map_err(ApiError::repository)?
            .iter()
            .map(|record| record.measurement())
            .collect();
        let latest_weight = remaining.first().map(|m| m.weight_kg);

        let (state, report) = recompute_after_deletion(
            profile.adjustment_state(),
            &remaining,
            profile.profile.weekly_goal_kg,
            settings,
        );
        let report = Self::persist(&mut tx, &profile, state, report, latest_weight, settings).await?;
        tx.commit().await?;

        record_metrics(&report);
        Ok(DeleteWeightResponse {
            ok: true,
            adjustment: report,
        })
    }

    async fn lock_profile(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<ProfileRecord, ApiError> {
        ProfileRepository::lock(&mut **tx, user_id)
            .await
            .map_err(ApiError::repository)?
            .ok_or_else(|| ApiError::NotFound("User profile not found".to_string()))
    }

    /// Store the new state, attach the calorie estimate and queue the event
    async fn persist(
        tx: &mut Transaction<'_, Postgres>,
        profile: &ProfileRecord,
        state: AdjustmentState,
        report: CorrectionReport,
        latest_weight_kg: Option<f64>,
        settings: &NutritionSettings,
    ) -> Result<CorrectionReport, ApiError> {
        let user_id = profile.user_id;
        if report.changed_state() {
            ProfileRepository::update_adjustment(&mut **tx, user_id, state)
                .await
                .map_err(ApiError::repository)?;
        }

        let estimate = estimate_adjusted_calories(
            &profile.profile.0,
            state,
            latest_weight_kg,
            Utc::now().date_naive(),
            settings,
        );
        let report = report.with_estimate(estimate);

        if let Some(event) = NutritionEvent::adjustment(user_id, state.metabolic_adjustment_kcal, report) {
            OutboxRepository::append(&mut **tx, &event)
                .await
                .map_err(ApiError::repository)?;
        }

        match report.details() {
            Some(details) => info!(
                %user_id,
                days = details.days,
                delta = details.daily_delta_kcal,
                cumulative = details.cumulative_adjustment_kcal,
                "Metabolic adjustment recalculated"
            ),
            None => info!(%user_id, outcome = outcome_label(&report.outcome), "Adjustment unchanged or reset"),
        }

        Ok(report)
    }
}

fn outcome_label(outcome: &CorrectionOutcome) -> &'static str {
    match outcome {
        CorrectionOutcome::Applied(_) => "applied",
        CorrectionOutcome::Baseline => "baseline",
        CorrectionOutcome::Reset => "reset",
    }
}

fn record_metrics(report: &CorrectionReport) {
    metrics::counter!("nutrition_adjustments_total", "outcome" => outcome_label(&report.outcome)).increment(1);
    if let Some(details) = report.details() {
        metrics::histogram!("nutrition_adjustment_delta_kcal").record(details.daily_delta_kcal);
    }
}
