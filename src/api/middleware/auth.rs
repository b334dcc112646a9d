//! API key authentication gate

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::ip::is_whitelisted;
use crate::infrastructure::api_key::ApiKeyGenerator;

use super::context::{client_ip, header_value, CallerContext, API_KEY_HEADER};
use super::deadline::RequestDeadline;

pub const MISSING_KEY: &str = "Missing API key";
pub const INVALID_KEY: &str = "Invalid API key";
pub const UNRESOLVED_IP: &str = "Unable to determine client IP address";
pub const IP_NOT_WHITELISTED: &str = "IP address has not been whitelisted";

/// Authenticate the `X-Api-Key` header and check the client IP whitelist
///
/// On success a [`CallerContext`] is attached to the request. Every rejection
/// is a 401 with a generic message; a failing or slow credential store is a
/// 500. The lookup and hash verification count against the request deadline.
pub async fn auth_gate(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let secret = header_value(request.headers(), API_KEY_HEADER)
        .ok_or_else(|| ApiError::unauthorized(MISSING_KEY))?
        .to_string();

    let auth = deadline
        .run("authenticate API key", state.api_key_service.authenticate(&secret))
        .await?;

    let (Some(api_key_id), Some(tier)) = (auth.id, auth.tier) else {
        debug!("Rejected request with invalid API key");
        return Err(ApiError::unauthorized(INVALID_KEY));
    };

    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_forwarded_for,
    )
    .ok_or_else(|| ApiError::unauthorized(UNRESOLVED_IP))?;

    if !is_whitelisted(&auth.ip_whitelist, &ip) {
        debug!(api_key_id = %api_key_id, client_ip = %ip, "Client IP not whitelisted");
        return Err(ApiError::unauthorized(IP_NOT_WHITELISTED));
    }

    request.extensions_mut().insert(CallerContext {
        api_key_id,
        tier,
        subject_hash: ApiKeyGenerator::subject_hash(&secret),
        client_ip: ip,
    });

    Ok(next.run(request).await)
}
