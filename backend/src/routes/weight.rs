//! Weight log API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::WeightService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use nutrition_coach_shared::{
    DeleteWeightResponse, LogWeightRequest, LogWeightResponse, WeightEntryResponse, WeightListQuery,
};
use uuid::Uuid;

/// Create weight routes
pub fn weight_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries).post(add_entry))
        .route("/:id", get(get_entry).delete(delete_entry))
}

/// POST /api/v1/weights - Log a measurement in kg
///
/// The response carries the correction the measurement caused.
async fn add_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogWeightRequest>,
) -> Result<(StatusCode, Json<LogWeightResponse>), ApiError> {
    let response = WeightService::add_entry(state.db(), auth.user_id, req, state.nutrition()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/weights - Entries newest first, optionally within [start, end]
async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<WeightListQuery>,
) -> Result<Json<Vec<WeightEntryResponse>>, ApiError> {
    let entries = WeightService::list_entries(state.db(), auth.user_id, query).await?;
    Ok(Json(entries))
}

/// GET /api/v1/weights/:id
async fn get_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<WeightEntryResponse>, ApiError> {
    let entry = WeightService::get_entry(state.db(), auth.user_id, id).await?;
    Ok(Json(entry))
}

/// DELETE /api/v1/weights/:id - Remove a measurement and recompute the adjustment
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteWeightResponse>, ApiError> {
    let response = WeightService::delete_entry(state.db(), auth.user_id, id, state.nutrition()).await?;
    Ok(Json(response))
}
