//! Fixed-window quota enforcement

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{error, info};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::deadline::Deadline;

use super::auth::UNRESOLVED_IP;
use super::context::{client_ip, CallerContext};
use super::deadline::RequestDeadline;

/// Per-key quota, partitioned by subject hash and limited by tier
///
/// Must run after [`super::auth_gate`].
pub async fn caller_quota(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(context) = request.extensions().get::<CallerContext>().cloned() else {
        error!(path = %request.uri().path(), "Quota check reached without caller context");
        return Err(ApiError::internal("Caller context missing"));
    };

    let limit = state.config.rate_limit.limit_for(context.tier);
    enforce(&state, deadline, &context.subject_hash, limit).await?;

    Ok(next.run(request).await)
}

/// Admin quota, partitioned by client IP
pub async fn admin_quota(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_forwarded_for,
    )
    .ok_or_else(|| ApiError::unauthorized(UNRESOLVED_IP))?;

    let subject = format!("admin:{}", ip);
    enforce(&state, deadline, &subject, state.config.rate_limit.admin_limit).await?;

    Ok(next.run(request).await)
}

async fn enforce(
    state: &AppState,
    deadline: Deadline,
    subject: &str,
    limit: u32,
) -> Result<(), ApiError> {
    let result = deadline
        .run("check rate limit", state.rate_limiter.check(subject, limit))
        .await?;

    if result.allowed {
        return Ok(());
    }

    info!(
        count = result.count,
        limit = result.limit,
        retry_after = result.reset_in_seconds,
        "Rate limit exceeded"
    );

    Err(ApiError::rate_limited(result.reset_in_seconds))
}
