use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::keys;
use super::middleware::logging_middleware;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints, outside the key pipeline
        .route("/health/live", get(health::live_check))
        .route("/health/ready", get(health::ready_check))
        // Caller endpoints
        .nest("/api/keys", keys::create_keys_router(state.clone()))
        // Admin API
        .nest("/api/admin", admin::create_admin_router(state.clone()))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        // Outermost, so every later layer sees the id
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use chrono::Duration as ChronoDuration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::assemble_state;
    use crate::config::AppConfig;
    use crate::domain::clock::mock::ManualClock;
    use crate::domain::rate_limit::mock::UnavailableCounterStore;
    use crate::domain::rate_limit::{CounterStore, FixedWindow};
    use crate::domain::{Clock, DomainError};
    use crate::infrastructure::api_key::hasher::fast_hasher;
    use crate::infrastructure::api_key::{ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository};
    use crate::infrastructure::rate_limit::InMemoryCounterStore;
    use crate::infrastructure::usage::InMemoryUsageRepository;

    const ADMIN_SECRET: &str = "test-admin-secret";
    const CLIENT_IP: &str = "203.0.113.7";

    struct TestApp {
        router: Router,
        usage: Arc<InMemoryUsageRepository>,
        counters: Arc<InMemoryCounterStore>,
        clock: Arc<ManualClock>,
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.admin.secret = Some(ADMIN_SECRET.to_string());
        config.rate_limit.free_tier_limit = 3;
        config.rate_limit.pro_tier_limit = 6;
        config.rate_limit.admin_limit = 20;
        config.rate_limit.window_minutes = 10;
        config
    }

    fn build_app(config: AppConfig) -> TestApp {
        build_app_with_counters(config, None)
    }

    fn build_app_with_counters(
        config: AppConfig,
        counter_override: Option<Arc<dyn CounterStore>>,
    ) -> TestApp {
        let clock = Arc::new(ManualClock::at("2024-05-01T12:03:00Z"));
        let usage = Arc::new(InMemoryUsageRepository::new());
        let counters = Arc::new(InMemoryCounterStore::with_clock(clock.clone()));

        let service = ApiKeyService::new(
            Arc::new(InMemoryApiKeyRepository::new()),
            usage.clone(),
            Arc::new(fast_hasher()),
        )
        .with_clock(clock.clone());

        let counter_store: Arc<dyn CounterStore> = match counter_override {
            Some(store) => store,
            None => counters.clone(),
        };

        let state = assemble_state(
            Arc::new(service),
            usage.clone(),
            counter_store,
            clock.clone(),
            config,
        )
        .unwrap();

        TestApp {
            router: create_router_with_state(state),
            usage,
            counters,
            clock,
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, headers, body)
    }

    fn json_request(method: Method, uri: &str, body: Option<Value>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);

        match body {
            Some(_) => builder.header(header::CONTENT_TYPE, "application/json"),
            None => builder,
        }
    }

    fn admin_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = json_request(method, uri, body.clone())
            .header("x-admin-key", ADMIN_SECRET)
            .header("x-forwarded-for", "10.9.9.9");

        builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap()
    }

    fn caller_request(method: Method, uri: &str, key: &str, ip: &str, body: Value) -> Request<Body> {
        json_request(method, uri, Some(body.clone()))
            .header("x-api-key", key)
            .header("x-forwarded-for", ip)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn validate(key: &str, ip: &str) -> Request<Body> {
        caller_request(Method::POST, "/api/keys/validate", key, ip, json!({ "key": key }))
    }

    /// Generate a key through the admin API; returns (secret, id)
    async fn generate(app: &TestApp, tier: &str) -> (String, i64) {
        let (status, _, body) = send(
            &app.router,
            admin_request(
                Method::POST,
                "/api/admin/keys/generate",
                Some(json!({ "name": "billing-service", "tier": tier })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");

        (
            body["key"].as_str().unwrap().to_string(),
            body["id"].as_i64().unwrap(),
        )
    }

    async fn whitelist(app: &TestApp, id: i64, ip: &str) -> Value {
        let (status, _, body) = send(
            &app.router,
            admin_request(
                Method::POST,
                "/api/admin/keys/whitelist/add",
                Some(json!({ "id": id, "ipAddress": ip })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    async fn whitelisted_key(app: &TestApp, tier: &str) -> (String, i64) {
        let (key, id) = generate(app, tier).await;
        whitelist(app, id, CLIENT_IP).await;
        (key, id)
    }

    async fn wait_for_records(usage: &InMemoryUsageRepository, expected: usize) {
        for _ in 0..200 {
            if usage.len() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        panic!("expected {} usage records, found {}", expected, usage.len());
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = build_app(test_config());

        let (status, _, body) = send(
            &app.router,
            Request::get("/health/live").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let response = app
            .router
            .clone()
            .oneshot(
                Request::get("/health/live")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-123");

        let (status, _, body) = send(
            &app.router,
            Request::get("/health/ready").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ready_reports_unreachable_counter_store() {
        let app = build_app_with_counters(test_config(), Some(Arc::new(UnavailableCounterStore)));

        let (status, _, body) = send(
            &app.router,
            Request::get("/health/ready").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert!(!body.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_admin_guard_rejects_missing_and_wrong_secret() {
        let app = build_app(test_config());

        let missing = Request::get("/api/admin/keys")
            .header("x-forwarded-for", "10.9.9.9")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app.router, missing).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing admin key");

        let wrong = Request::get("/api/admin/keys")
            .header("x-admin-key", "not-the-secret")
            .header("x-forwarded-for", "10.9.9.9")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app.router, wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid admin key");
    }

    #[tokio::test]
    async fn test_admin_guard_fails_closed_without_secret() {
        let mut config = test_config();
        config.admin.secret = None;
        let app = build_app(config);

        let (status, _, _) = send(
            &app.router,
            admin_request(Method::GET, "/api/admin/keys", None),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_admin_quota_is_per_ip() {
        let mut config = test_config();
        config.rate_limit.admin_limit = 2;
        let app = build_app(config);

        for _ in 0..2 {
            let (status, _, _) = send(
                &app.router,
                admin_request(Method::GET, "/api/admin/keys", None),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, headers, body) = send(
            &app.router,
            admin_request(Method::GET, "/api/admin/keys", None),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(headers.contains_key(header::RETRY_AFTER));
        assert!(body["retryAfterSeconds"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_generate_validates_input() {
        let app = build_app(test_config());

        let (status, _, body) = send(
            &app.router,
            admin_request(
                Method::POST,
                "/api/admin/keys/generate",
                Some(json!({ "name": "   ", "tier": "Free" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name is required");

        let (status, _, _) = send(
            &app.router,
            admin_request(
                Method::POST,
                "/api/admin/keys/generate",
                Some(json!({ "name": "old", "expiresAt": "2020-01-01T00:00:00Z" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_returns_secret_once() {
        let app = build_app(test_config());
        let (key, id) = generate(&app, "Pro").await;

        assert!(key.starts_with("mk_"));

        let (status, _, body) = send(
            &app.router,
            admin_request(Method::GET, "/api/admin/keys", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);

        let listed = &body["apiKeys"][0];
        assert_eq!(listed["id"], id);
        assert_eq!(listed["tier"], "Pro");
        assert_eq!(listed["status"], "Active");
        assert!(listed.get("keyHash").is_none());

        let text = body.to_string();
        assert!(!text.contains(&key));
        assert!(!text.contains("$argon2"));
    }

    #[tokio::test]
    async fn test_gate_rejections() {
        let app = build_app(test_config());
        let (key, _) = generate(&app, "Free").await;

        let no_key = json_request(Method::POST, "/api/keys/validate", Some(json!({})))
            .header("x-forwarded-for", CLIENT_IP)
            .body(Body::from("{}"))
            .unwrap();
        let (status, _, body) = send(&app.router, no_key).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing API key");

        let (status, _, body) = send(&app.router, validate("mk_notarealkey", CLIENT_IP)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid API key");

        // Fresh key, empty whitelist: no IP is authorized
        let (status, _, body) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "IP address has not been whitelisted");

        let unresolvable = json_request(Method::POST, "/api/keys/validate", Some(json!({})))
            .header("x-api-key", &key)
            .body(Body::from("{}"))
            .unwrap();
        let (status, _, body) = send(&app.router, unresolvable).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unable to determine client IP address");
    }

    #[tokio::test]
    async fn test_whitelist_is_exact_and_collapses_mapped_ipv6() {
        let app = build_app(test_config());
        let (key, id) = generate(&app, "Free").await;

        let body = whitelist(&app, id, "127.0.0.1").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["whitelistedIps"], json!(["127.0.0.1"]));

        let (status, _, body) = send(&app.router, validate(&key, "::ffff:127.0.0.1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], true);
        assert_eq!(body["tier"], "Free");

        let (status, _, _) = send(&app.router, validate(&key, "127.0.0.2")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Duplicate add is an outcome, not an error
        let body = whitelist(&app, id, "::ffff:127.0.0.1").await;
        assert_eq!(body["success"], false);
        assert_eq!(body["whitelistedIps"], json!(["127.0.0.1"]));
    }

    #[tokio::test]
    async fn test_whitelist_rejects_invalid_ip() {
        let app = build_app(test_config());
        let (_, id) = generate(&app, "Free").await;

        let (status, _, body) = send(
            &app.router,
            admin_request(
                Method::POST,
                "/api/admin/keys/whitelist/add",
                Some(json!({ "id": id, "ipAddress": "not-an-ip" })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid IP address format");
    }

    #[tokio::test]
    async fn test_whitelist_remove_revokes_access() {
        let app = build_app(test_config());
        let (key, id) = whitelisted_key(&app, "Free").await;

        let (status, _, body) = send(
            &app.router,
            admin_request(
                Method::DELETE,
                "/api/admin/keys/whitelist/remove",
                Some(json!({ "id": id, "ipAddress": CLIENT_IP })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["whitelistedIps"], json!([]));

        let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rate_limit_window_resets_at_boundary() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Free").await;

        for _ in 0..3 {
            let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, headers, body) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Rate limit exceeded");
        // 12:03 in a 10 minute window: the bucket closes at 12:10
        assert_eq!(body["retryAfterSeconds"], 420);
        assert_eq!(headers[header::RETRY_AFTER], "420");

        app.clock.advance(ChronoDuration::minutes(7));

        let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::OK);

        let window = FixedWindow::new(10).unwrap();
        let counter_key = window.counter_key(&ApiKeyGenerator::subject_hash(&key), app.clock.now());
        assert_eq!(app.counters.get(&counter_key), Some(1));
    }

    #[tokio::test]
    async fn test_tier_limits_differ() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Pro").await;

        for _ in 0..6 {
            let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_never_over_admit() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Free").await;

        let requests = (0..12).map(|_| send(&app.router, validate(&key, CLIENT_IP)));
        let results = futures::future::join_all(requests).await;

        let allowed = results
            .iter()
            .filter(|(status, _, _)| *status == StatusCode::OK)
            .count();
        let throttled = results
            .iter()
            .filter(|(status, _, _)| *status == StatusCode::TOO_MANY_REQUESTS)
            .count();

        assert_eq!(allowed, 3);
        assert_eq!(throttled, 9);
    }

    #[tokio::test]
    async fn test_counter_store_failure_fails_closed() {
        let app = build_app_with_counters(test_config(), Some(Arc::new(UnavailableCounterStore)));

        // The admin quota needs the counter store as well
        let (status, _, body) = send(
            &app.router,
            admin_request(Method::GET, "/api/admin/keys", None),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Operation failed");
    }

    /// Counter store whose caller counters answer slowly; admin counters stay fast
    #[derive(Debug, Default)]
    struct SlowCallerCounterStore {
        inner: InMemoryCounterStore,
    }

    const SLOW_CALL: Duration = Duration::from_millis(120);

    #[async_trait::async_trait]
    impl CounterStore for SlowCallerCounterStore {
        async fn increment(&self, key: &str) -> Result<u64, DomainError> {
            if !key.contains("admin:") {
                tokio::time::sleep(SLOW_CALL).await;
            }
            self.inner.increment(key).await
        }

        async fn expire(&self, key: &str, ttl: Duration) -> Result<(), DomainError> {
            if !key.contains("admin:") {
                tokio::time::sleep(SLOW_CALL).await;
            }
            self.inner.expire(key, ttl).await
        }

        async fn ping(&self) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_store_calls_share_one_request_deadline() {
        let mut config = test_config();
        config.timeouts.store_ms = 200;
        let app = build_app_with_counters(config, Some(Arc::new(SlowCallerCounterStore::default())));
        let (key, _) = whitelisted_key(&app, "free").await;

        // Increment and expire each fit in 200ms, but not together
        let (status, _, body) = send(&app.router, validate(&key, CLIENT_IP)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Operation failed");
        assert!(app.usage.is_empty());
    }

    #[tokio::test]
    async fn test_usage_summary_counts() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Pro").await;

        let (status, _, body) = send(
            &app.router,
            caller_request(Method::POST, "/api/keys/validate", &key, CLIENT_IP, json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Key is required");

        for _ in 0..2 {
            let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
            assert_eq!(status, StatusCode::OK);
        }

        wait_for_records(&app.usage, 3).await;

        let (status, _, body) = send(
            &app.router,
            caller_request(Method::POST, "/api/keys/usage", &key, CLIENT_IP, json!({ "key": key })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["tier"], "Pro");
        assert_eq!(body["totalRequests"], 3);
        assert_eq!(body["successfulRequests"], 2);
        assert_eq!(body["failedRequests"], 1);
        assert_eq!(
            body["endpointUsage"],
            json!([{ "endpoint": "/api/keys/validate", "count": 3 }])
        );
        assert_eq!(
            body["statusCodeSummaries"],
            json!([
                { "statusCode": 200, "count": 2 },
                { "statusCode": 400, "count": 1 }
            ])
        );
    }

    #[tokio::test]
    async fn test_usage_for_unknown_key_is_not_found() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Free").await;

        let (status, _, body) = send(
            &app.router,
            caller_request(
                Method::POST,
                "/api/keys/usage",
                &key,
                CLIENT_IP,
                json!({ "key": "mk_unknownkeyvalue" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "API key not found");
    }

    #[tokio::test]
    async fn test_rejected_requests_are_not_recorded() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Free").await;

        for _ in 0..3 {
            send(&app.router, validate(&key, CLIENT_IP)).await;
        }
        wait_for_records(&app.usage, 3).await;

        let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _, _) = send(&app.router, validate(&key, "198.51.100.1")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(app.usage.len(), 3);
    }

    #[tokio::test]
    async fn test_revoke_is_terminal_and_idempotent() {
        let app = build_app(test_config());
        let (key, _) = whitelisted_key(&app, "Free").await;
        let (other, _) = whitelisted_key(&app, "Pro").await;

        let (status, _, body) = send(
            &app.router,
            caller_request(Method::PATCH, "/api/keys/revoke", &key, CLIENT_IP, json!({ "key": key })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _, body) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid API key");

        // Another caller sees the revoked key as invalid, and a second revoke is a no-op
        let (status, _, body) = send(
            &app.router,
            caller_request(Method::POST, "/api/keys/validate", &other, CLIENT_IP, json!({ "key": key })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isValid"], false);
        assert_eq!(body["reason"], "Invalid or expired API key");

        let (status, _, body) = send(
            &app.router,
            caller_request(Method::PATCH, "/api/keys/revoke", &other, CLIENT_IP, json!({ "key": key })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "API key is already revoked");
    }

    #[tokio::test]
    async fn test_delete_removes_key() {
        let app = build_app(test_config());
        let (key, id) = whitelisted_key(&app, "Free").await;

        let (status, _, body) = send(
            &app.router,
            admin_request(Method::DELETE, "/api/admin/keys/delete", Some(json!({ "id": id }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _, _) = send(&app.router, validate(&key, CLIENT_IP)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, _, body) = send(
            &app.router,
            admin_request(Method::GET, "/api/admin/keys", None),
        )
        .await;
        assert_eq!(body["total"], 0);

        let (status, _, body) = send(
            &app.router,
            admin_request(Method::DELETE, "/api/admin/keys/delete", Some(json!({ "id": id }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "API key not found");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = build_app(test_config());

        let request = Request::post("/api/admin/keys/generate")
            .header("x-admin-key", ADMIN_SECRET)
            .header("x-forwarded-for", "10.9.9.9")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, _, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
