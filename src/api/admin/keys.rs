//! API key management admin endpoints

use axum::extract::State;
use tracing::{debug, info};

use crate::api::middleware::RequestDeadline;
use crate::api::state::AppState;
use crate::api::types::{
    ApiError, ApiKeySummaryResponse, DeleteKeyRequest, GenerateKeyRequest, GenerateKeyResponse,
    Json, ListApiKeysResponse, OperationResponse, WhitelistRequest, WhitelistResponse,
};
use crate::domain::api_key::ApiKeyId;
use crate::infrastructure::api_key::GenerateApiKeyRequest;

/// POST /api/admin/keys/generate
pub async fn generate_key(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<GenerateKeyRequest>,
) -> Result<Json<GenerateKeyResponse>, ApiError> {
    debug!(name = %request.name, tier = %request.tier, "Admin generating API key");

    let created = deadline
        .run(
            "generate API key",
            state.api_key_service.generate(GenerateApiKeyRequest {
                name: request.name,
                tier: request.tier,
                expires_at: request.expires_at,
            }),
        )
        .await?;

    info!(api_key_id = %created.api_key.id(), "API key generated");

    Ok(Json(GenerateKeyResponse::from(created)))
}

/// GET /api/admin/keys
pub async fn list_keys(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    debug!("Admin listing all API keys");

    let keys = deadline
        .run("list API keys", state.api_key_service.list())
        .await?;

    let api_keys: Vec<ApiKeySummaryResponse> = keys.iter().map(ApiKeySummaryResponse::from).collect();
    let total = api_keys.len();

    Ok(Json(ListApiKeysResponse { api_keys, total }))
}

/// DELETE /api/admin/keys/delete
pub async fn delete_key(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<DeleteKeyRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    debug!(api_key_id = request.id, "Admin deleting API key");

    let result = deadline
        .run("delete API key", state.api_key_service.delete(ApiKeyId::new(request.id)))
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/admin/keys/whitelist/add
pub async fn add_to_whitelist(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<WhitelistRequest>,
) -> Result<Json<WhitelistResponse>, ApiError> {
    debug!(api_key_id = request.id, ip = %request.ip_address, "Admin whitelisting IP");

    let result = deadline
        .run(
            "whitelist IP",
            state
                .api_key_service
                .add_to_whitelist(ApiKeyId::new(request.id), &request.ip_address),
        )
        .await?;

    Ok(Json(result.into()))
}

/// DELETE /api/admin/keys/whitelist/remove
pub async fn remove_from_whitelist(
    State(state): State<AppState>,
    RequestDeadline(deadline): RequestDeadline,
    Json(request): Json<WhitelistRequest>,
) -> Result<Json<WhitelistResponse>, ApiError> {
    debug!(api_key_id = request.id, ip = %request.ip_address, "Admin removing whitelisted IP");

    let result = deadline
        .run(
            "remove whitelisted IP",
            state
                .api_key_service
                .remove_from_whitelist(ApiKeyId::new(request.id), &request.ip_address),
        )
        .await?;

    Ok(Json(result.into()))
}
