//! Nutrition Coach Shared Library
//!
//! The nutrition target engine: unit conversion, goal resolution, energy
//! expenditure, macro allocation, adaptive adjustment and the onboarding
//! flow that feeds them. Everything here is pure; the backend and the WASM
//! bindings supply the data and persist the results.

pub mod adjustment;
pub mod aggregate;
pub mod errors;
pub mod events;
pub mod goals;
pub mod health_metrics;
pub mod macros;
pub mod onboarding;
pub mod profile;
pub mod summary;
pub mod targets;
pub mod types;
pub mod units;
pub mod validation;

// Re-export commonly used items
pub use adjustment::{
    apply_weight_measurement, recompute_after_deletion, AdjustmentState, CorrectionDetails,
    CorrectionOutcome, CorrectionReport, WeightMeasurement,
};
pub use aggregate::{daily_nutrition, estimate_adjusted_calories, DailyNutrition};
pub use errors::*;
pub use events::NutritionEvent;
pub use goals::{resolve_weekly_goal, GoalDirection, GoalPayload, GoalProvenance, GoalSource, ResolvedGoal};
pub use health_metrics::*;
pub use macros::{allocate_macros, MacroSplit, MacroTargets, NormalizedSplit};
pub use onboarding::{OnboardingCompletion, OnboardingProgress, OnboardingStep};
pub use profile::{Profile, ProfileOverrides, ProfilePreferences};
pub use targets::{compute_daily_targets, DailyTargets, NutritionSettings, TargetInputs};
pub use types::*;

// Export units module items (canonical source for unit types)
pub use units::*;
