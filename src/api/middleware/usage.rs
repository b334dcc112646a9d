//! Usage recording around caller requests

use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::state::AppState;
use crate::domain::usage::UsageRecord;

use super::context::CallerContext;

/// Run the handler, then append one usage record in the background
///
/// The response is returned untouched whatever happens to the write.
pub async fn record_usage(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let context = request.extensions().get::<CallerContext>().cloned();
    // Nested routers see the path with their prefix stripped
    let endpoint = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    if let Some(context) = context {
        state.usage_recorder.record(UsageRecord {
            timestamp: state.clock.now(),
            endpoint,
            ip_address: context.client_ip,
            status_code: response.status().as_u16(),
            api_key_id: context.api_key_id,
        });
    }

    response
}
