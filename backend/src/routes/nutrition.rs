//! Nutrition target API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::NutritionService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use nutrition_coach_shared::{DailyNutrition, GoalPayload, ResolvedGoal};

/// Create nutrition routes
pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/daily", get(daily_targets))
        .route("/weekly-goal", post(preview_weekly_goal))
}

/// GET /api/v1/nutrition/daily - Base and adjusted targets for today
async fn daily_targets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DailyNutrition>, ApiError> {
    let nutrition = NutritionService::daily_targets(state.db(), auth.user_id, state.nutrition()).await?;
    Ok(Json(nutrition))
}

/// POST /api/v1/nutrition/weekly-goal - Resolve a goals payload for preview
async fn preview_weekly_goal(
    _auth: AuthUser,
    Json(payload): Json<GoalPayload>,
) -> Result<Json<ResolvedGoal>, ApiError> {
    Ok(Json(NutritionService::preview_weekly_goal(&payload)?))
}
