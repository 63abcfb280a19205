//! Onboarding API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::OnboardingService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use nutrition_coach_shared::{
    CompleteOnboardingResponse, OnboardingProgress, OnboardingSummary, SaveStepResponse,
};

/// Create onboarding routes
pub fn onboarding_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_progress))
        .route("/steps/:step", put(save_step))
        .route("/complete", post(complete))
        .route("/summary", get(summary))
}

/// GET /api/v1/onboarding - Current step, saved payloads and completion flag
async fn get_progress(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OnboardingProgress>, ApiError> {
    let progress = OnboardingService::get_progress(state.db(), auth.user_id).await?;
    Ok(Json(progress))
}

/// PUT /api/v1/onboarding/steps/:step - Save one step payload
///
/// The body is kept as raw JSON so an unknown step is reported as such
/// rather than as a body parse failure.
async fn save_step(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(step): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<SaveStepResponse>, ApiError> {
    let step = OnboardingService::save_step(state.db(), auth.user_id, &step, payload).await?;
    Ok(Json(SaveStepResponse { ok: true, step }))
}

/// POST /api/v1/onboarding/complete - Commit the profile and baseline targets
async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CompleteOnboardingResponse>, ApiError> {
    let response = OnboardingService::complete(state.db(), auth.user_id, state.nutrition()).await?;
    Ok(Json(response))
}

/// GET /api/v1/onboarding/summary - Profile, goal, targets and tracking overview
async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OnboardingSummary>, ApiError> {
    let summary = OnboardingService::summary(state.db(), auth.user_id).await?;
    Ok(Json(summary))
}
