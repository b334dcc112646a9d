//! Caller key endpoints
//!
//! Reached only through the authentication gate, quota enforcer and usage
//! recorder; the key in the body may differ from the one in `X-Api-Key`.

use axum::{
    extract::State,
    middleware,
    routing::{patch, post},
    Router,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, Json, KeyRequest, OperationResponse, UsageSummaryResponse, ValidateKeyResponse,
};

use super::middleware::{auth_gate, caller_quota, record_usage, RequestDeadline};

pub const KEY_REQUIRED: &str = "Key is required";

/// Create the caller router
///
/// Layers run outermost first: gate, quota, usage recorder.
pub fn create_keys_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate_key))
        .route("/revoke", patch(revoke_key))
        .route("/usage", post(key_usage))
        .layer(middleware::from_fn_with_state(state.clone(), record_usage))
        .layer(middleware::from_fn_with_state(state.clone(), caller_quota))
        .layer(middleware::from_fn_with_state(state, auth_gate))
}

fn required_key(request: &KeyRequest) -> Result<&str, ApiError> {
    request.key().ok_or_else(|| ApiError::bad_request(KEY_REQUIRED))
}

/// POST /api/keys/validate
pub async fn validate_key(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ValidateKeyResponse>, ApiError> {
    let key = required_key(&request)?;

    let result = deadline
        .run("validate API key", state.api_key_service.authenticate(key))
        .await?;

    debug!(is_valid = result.is_valid, "Validated API key");

    Ok(Json(ValidateKeyResponse {
        is_valid: result.is_valid,
        reason: result.reason,
        tier: result.tier,
    }))
}

/// PATCH /api/keys/revoke
pub async fn revoke_key(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<KeyRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let key = required_key(&request)?;

    let result = deadline
        .run("revoke API key", state.api_key_service.revoke(key))
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/keys/usage
pub async fn key_usage(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<KeyRequest>,
) -> Result<Json<UsageSummaryResponse>, ApiError> {
    let key = required_key(&request)?;

    let summary = deadline
        .run("get API key usage", state.api_key_service.get_usage(key))
        .await?
        .ok_or_else(|| ApiError::not_found("API key not found"))?;

    Ok(Json(summary.into()))
}
