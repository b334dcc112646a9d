//! Admin API endpoints for managing API keys

pub mod keys;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use super::middleware::{admin_guard, admin_quota};
use super::state::AppState;

/// Create admin API router
///
/// Layers run outermost first: admin guard, then the per-IP admin quota.
pub fn create_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/keys", get(keys::list_keys))
        .route("/keys/generate", post(keys::generate_key))
        .route("/keys/delete", delete(keys::delete_key))
        .route("/keys/whitelist/add", post(keys::add_to_whitelist))
        .route("/keys/whitelist/remove", delete(keys::remove_from_whitelist))
        .layer(middleware::from_fn_with_state(state.clone(), admin_quota))
        .layer(middleware::from_fn_with_state(state, admin_guard))
}
