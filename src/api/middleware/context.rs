//! Per-request caller context threaded through the middleware chain

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};

use crate::domain::api_key::{ApiKeyId, Tier};
use crate::domain::ip::resolve_client_ip;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Identity of an authenticated caller
///
/// Inserted into request extensions by the authentication gate; read by the
/// quota enforcer and the usage recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub api_key_id: ApiKeyId,
    pub tier: Tier,
    /// Rate-limit partition key; never the raw secret
    pub subject_hash: String,
    /// Normalized client IP
    pub client_ip: String,
}

/// Resolve the normalized client IP of a request
///
/// The peer address is only available when the server was started with
/// connect info; tests without it rely on the forwarded-for header.
pub fn client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_forwarded_for: bool,
) -> Option<String> {
    let forwarded_for = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok());
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    resolve_client_ip(forwarded_for, peer, trust_forwarded_for)
}

/// Trimmed, non-empty header value
pub fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
