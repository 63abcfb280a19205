//! Domain events
//!
//! Operations return events as values; the backend writes them to its outbox
//! in the same transaction as the state change they describe.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adjustment::CorrectionReport;
use crate::onboarding::OnboardingStep;
use crate::targets::DailyTargets;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum NutritionEvent {
    OnboardingStepSaved {
        user_id: Uuid,
        step: OnboardingStep,
    },
    OnboardingCompleted {
        user_id: Uuid,
        baseline: Option<DailyTargets>,
        weekly_goal_kg: Option<f64>,
    },
    AdjustmentRecalculated {
        user_id: Uuid,
        metabolic_adjustment_kcal: f64,
        report: CorrectionReport,
    },
}

impl NutritionEvent {
    /// Stable name used as the outbox event type
    pub fn event_type(&self) -> &'static str {
        match self {
            NutritionEvent::OnboardingStepSaved { .. } => "OnboardingStepSaved",
            NutritionEvent::OnboardingCompleted { .. } => "OnboardingCompleted",
            NutritionEvent::AdjustmentRecalculated { .. } => "AdjustmentRecalculated",
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            NutritionEvent::OnboardingStepSaved { user_id, .. }
            | NutritionEvent::OnboardingCompleted { user_id, .. }
            | NutritionEvent::AdjustmentRecalculated { user_id, .. } => *user_id,
        }
    }

    /// Event for a recalculation, or `None` when the state can't have moved
    pub fn adjustment(user_id: Uuid, metabolic_adjustment_kcal: f64, report: CorrectionReport) -> Option<Self> {
        report.changed_state().then_some(NutritionEvent::AdjustmentRecalculated {
            user_id,
            metabolic_adjustment_kcal,
            report,
        })
    }
}
