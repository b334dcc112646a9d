//! Admin shared-secret guard

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::{error, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;

use super::context::{header_value, ADMIN_KEY_HEADER};

/// Require the configured admin secret in `X-Admin-Key`
///
/// An unset secret fails closed: every admin request gets a 500.
pub async fn admin_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.admin.secret.as_deref() else {
        error!("Admin secret is not configured; rejecting admin request");
        return Err(ApiError::internal("Admin access is not configured"));
    };

    let provided = header_value(request.headers(), ADMIN_KEY_HEADER)
        .ok_or_else(|| ApiError::unauthorized("Missing admin key"))?;

    // Constant-time comparison
    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(next.run(request).await)
    } else {
        warn!(path = %request.uri().path(), "Invalid admin key");
        Err(ApiError::unauthorized("Invalid admin key"))
    }
}
