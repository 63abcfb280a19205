//! Adaptive metabolic adjustment
//!
//! Compares the observed weight change between the two most recent
//! measurements with the change the weekly goal predicts, and turns the
//! difference into a daily calorie correction that accumulates across
//! measurements.
//!
//! # Design Principles
//!
//! 1. **Rolling, not regressive**: only the newest measurement and the one
//!    strictly before it are consulted.
//! 2. **Bounded**: both the single correction and the running total are
//!    clamped to ±`max_adjustment_kcal`.
//! 3. **Never fails**: unusable numbers degrade to a zero correction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::targets::NutritionSettings;
use crate::units::round_to;

// ============================================================================
// State & measurements
// ============================================================================

/// Accumulated daily calorie correction persisted per user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AdjustmentState {
    pub metabolic_adjustment_kcal: f64,
}

impl AdjustmentState {
    pub fn new(metabolic_adjustment_kcal: f64) -> Self {
        Self {
            metabolic_adjustment_kcal,
        }
    }

    /// Add a correction, re-clamp the total, and round to 0.1 kcal
    pub fn accumulate(&self, delta_kcal: f64, settings: &NutritionSettings) -> Self {
        let current = if self.metabolic_adjustment_kcal.is_finite() {
            self.metabolic_adjustment_kcal
        } else {
            0.0
        };
        let total = settings.clamp_adjustment(current + delta_kcal);
        Self::new(round_to(total, 1))
    }
}

/// A single body-weight measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMeasurement {
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl WeightMeasurement {
    pub fn new(date: NaiveDate, weight_kg: f64) -> Self {
        Self {
            date,
            weight_kg,
            note: None,
        }
    }
}

// ============================================================================
// Correction report
// ============================================================================

/// The numbers behind an applied correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionDetails {
    pub days: i64,
    pub previous_weight_kg: f64,
    pub new_weight_kg: f64,
    pub actual_change_kg: f64,
    pub expected_change_kg: f64,
    pub discrepancy_kg: f64,
    /// Clamped correction from this measurement, rounded to 0.1
    pub daily_delta_kcal: f64,
    /// Running total after this measurement
    pub cumulative_adjustment_kcal: f64,
}

/// What a measurement did to the adjustment state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CorrectionOutcome {
    /// A correction was computed against the previous measurement
    Applied(CorrectionDetails),
    /// No earlier measurement exists; this one only establishes a baseline
    Baseline,
    /// Fewer than two measurements remain; the state went back to zero
    Reset,
}

/// User-facing explanation of a recalculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionReport {
    #[serde(flatten)]
    pub outcome: CorrectionOutcome,
    /// Adjusted daily calories after the change, when the profile allows it
    pub adjusted_calories_estimate: Option<i32>,
}

impl CorrectionReport {
    fn new(outcome: CorrectionOutcome) -> Self {
        Self {
            outcome,
            adjusted_calories_estimate: None,
        }
    }

    pub fn with_estimate(mut self, estimate: Option<i32>) -> Self {
        self.adjusted_calories_estimate = estimate;
        self
    }

    /// Whether the persisted state may have changed
    pub fn changed_state(&self) -> bool {
        !matches!(self.outcome, CorrectionOutcome::Baseline)
    }

    pub fn details(&self) -> Option<&CorrectionDetails> {
        match &self.outcome {
            CorrectionOutcome::Applied(details) => Some(details),
            _ => None,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Fold a new measurement into the adjustment state
///
/// `previous` must be the latest measurement strictly before `new`; anything
/// else is treated as "no previous measurement".
pub fn apply_weight_measurement(
    state: AdjustmentState,
    previous: Option<&WeightMeasurement>,
    new: &WeightMeasurement,
    weekly_goal_kg: Option<f64>,
    settings: &NutritionSettings,
) -> (AdjustmentState, CorrectionReport) {
    let Some(previous) = previous.filter(|p| p.date < new.date) else {
        return (state, CorrectionReport::new(CorrectionOutcome::Baseline));
    };

    let days = (new.date - previous.date).num_days().max(1);
    let actual_change = new.weight_kg - previous.weight_kg;
    let expected_change = weekly_goal_kg
        .filter(|g| g.is_finite())
        .map(|g| g * days as f64 / 7.0)
        .unwrap_or(0.0);
    let discrepancy = actual_change - expected_change;

    // gained more than planned => eat less, and vice versa
    let kcal_total_needed = -discrepancy * settings.kcal_per_kg;
    let raw_delta = kcal_total_needed / days as f64;
    let daily_delta = if raw_delta.is_finite() {
        settings.clamp_adjustment(raw_delta)
    } else {
        0.0
    };

    let next = state.accumulate(daily_delta, settings);
    let details = CorrectionDetails {
        days,
        previous_weight_kg: previous.weight_kg,
        new_weight_kg: new.weight_kg,
        actual_change_kg: actual_change,
        expected_change_kg: expected_change,
        discrepancy_kg: discrepancy,
        daily_delta_kcal: round_to(daily_delta, 1),
        cumulative_adjustment_kcal: next.metabolic_adjustment_kcal,
    };

    (next, CorrectionReport::new(CorrectionOutcome::Applied(details)))
}

/// Recompute after a measurement was deleted
///
/// With fewer than two measurements left the state resets to zero. Otherwise
/// the newest remaining measurement is re-applied against the latest one
/// strictly before it, on top of the current state.
pub fn recompute_after_deletion(
    state: AdjustmentState,
    remaining: &[WeightMeasurement],
    weekly_goal_kg: Option<f64>,
    settings: &NutritionSettings,
) -> (AdjustmentState, CorrectionReport) {
    if remaining.len() < 2 {
        return (
            AdjustmentState::default(),
            CorrectionReport::new(CorrectionOutcome::Reset),
        );
    }

    let Some(newest) = remaining.iter().max_by_key(|m| m.date) else {
        return (
            AdjustmentState::default(),
            CorrectionReport::new(CorrectionOutcome::Reset),
        );
    };
    let previous = remaining
        .iter()
        .filter(|m| m.date < newest.date)
        .max_by_key(|m| m.date);

    apply_weight_measurement(state, previous, newest, weekly_goal_kg, settings)
}
