//! Per-request dependency deadline

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::state::AppState;
use crate::infrastructure::deadline::Deadline;

/// Extractor for the request's shared [`Deadline`]
///
/// The first extraction starts the clock with `timeouts.store_ms` and stores
/// it in the request extensions; later middleware and the handler get the
/// same instant.
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(pub Deadline);

impl FromRequestParts<AppState> for RequestDeadline {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(deadline) = parts.extensions.get::<Deadline>() {
            return Ok(RequestDeadline(*deadline));
        }

        let deadline = Deadline::after(state.config.timeouts.store());
        parts.extensions.insert(deadline);

        Ok(RequestDeadline(deadline))
    }
}
