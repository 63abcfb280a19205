//! Identity extraction
//!
//! Authentication happens at the gateway, which forwards the verified user
//! id in a header. The header name comes from `identity.user_id_header`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

/// Authenticated user extracted from the identity header
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl AuthUser {
    /// Read and parse the user id from `header`
    pub fn from_headers(headers: &HeaderMap, header: &str) -> Result<Self, ApiError> {
        let value = headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing user identity header".to_string()))?;

        let user_id = Uuid::parse_str(value.trim())
            .map_err(|_| ApiError::Unauthorized("Invalid user id in identity header".to_string()))?;

        Ok(AuthUser { user_id })
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        AuthUser::from_headers(&parts.headers, &app_state.config().identity.user_id_header)
    }
}
