//! End-to-end API tests
//!
//! Drives the full router against the in-process store:
//! login → session → bot commands → engine events → reads

use arb_api::{app, AppConfig, AppState, MemoryStore, Store};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const WALLET: &str = "0x52908400098527886e0f7030069857d2e4169ee7";
const INTERNAL_KEY: &str = "engine-key";

/// Router plus direct store access for assertions
struct Harness {
    router: Router,
    store: Arc<MemoryStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(AppConfig {
            internal_api_key: INTERNAL_KEY.to_string(),
            ..AppConfig::default()
        })
    }

    fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(config, store.clone(), None));
        Self { router: app(state), store }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn login(&self, wallet: &str, access_token: &str) -> (StatusCode, Value) {
        self.send(json_request(
            Method::POST,
            "/auth/login",
            None,
            json!({"wallet_address": wallet, "access_token": access_token}),
        ))
        .await
    }

    async fn token(&self) -> String {
        let (status, body) = self.login(WALLET, "secret-token").await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, Some(token), body)).await
    }

    async fn event(&self, kind: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/internal/event")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-internal-key", INTERNAL_KEY)
            .body(Body::from(
                json!({"wallet_address": WALLET, "type": kind, "payload": payload}).to_string(),
            ))
            .unwrap();
        self.send(request).await
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_login_seeds_wallet() {
    let harness = Harness::new();
    let (status, body) = harness.login(WALLET, "secret-token").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["profile"]["wallet_address"], WALLET);
    assert!(body["data"]["profile"].get("access_token_hash").is_none());
    assert_eq!(harness.store.count_ops(WALLET).await.unwrap(), 30);
    assert_eq!(harness.store.count_logs(WALLET).await.unwrap(), 12);
    assert_eq!(harness.store.count_notifications(WALLET).await.unwrap(), 5);
}

#[tokio::test]
async fn test_login_rejects_bad_wallet() {
    let harness = Harness::new();
    let (status, body) = harness.login("0x1234", "secret-token").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "WALLET_INVALID");
}

#[tokio::test]
async fn test_login_short_token_is_validation_error() {
    let harness = Harness::new();
    let (status, body) = harness.login(WALLET, "ab").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_token_mismatch() {
    let harness = Harness::new();
    harness.token().await;

    let (status, body) = harness.login(WALLET, "another-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_INVALID");
}

#[tokio::test]
async fn test_master_token_gates_new_wallets() {
    let harness = Harness::with_config(AppConfig {
        access_token_master: "master-key".to_string(),
        ..AppConfig::default()
    });

    let (status, _) = harness.login(WALLET, "not-master").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = harness.login(WALLET, "master-key").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_routes_require_session() {
    let harness = Harness::new();

    let (status, body) = harness.get("/me", "garbage").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);

    let request = Request::builder().uri("/bot/status").body(Body::empty()).unwrap();
    let (status, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bot_start_stop_cycle() {
    let harness = Harness::new();
    let token = harness.token().await;

    let (_, body) = harness.get("/bot/status", &token).await;
    assert_eq!(body["data"]["status"], "stopped");
    assert!(body["data"]["last_error"].is_null());

    let (status, body) = harness.post("/bot/start", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = harness.get("/bot/status", &token).await;
    assert_eq!(body["data"]["status"], "active");

    let (_, active) = harness
        .send(
            Request::builder()
                .uri("/internal/active-users")
                .header("x-internal-key", INTERNAL_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(active["data"], json!([WALLET]));

    harness.post("/bot/stop", &token, json!({})).await;
    let (_, body) = harness.get("/bot/status", &token).await;
    assert_eq!(body["data"]["status"], "stopped");
}

#[tokio::test]
async fn test_op_event_updates_profile() {
    let harness = Harness::new();
    let token = harness.token().await;

    let (status, body) = harness.event("op", json!({"pair": "ETH/USDT", "profit": 0.12})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "accepted");

    let (_, body) = harness.get("/me", &token).await;
    assert_eq!(body["data"]["total_profit"], 0.12);
    assert_eq!(body["data"]["successful_arbs"], 1);
    assert_eq!(body["data"]["avg_profitability"], 0.12);
}

#[tokio::test]
async fn test_two_ops_accumulate() {
    let harness = Harness::new();
    let token = harness.token().await;

    harness.event("op", json!({"profit": 0.20})).await;
    harness.event("op", json!({"profit": 0.10})).await;

    let (_, body) = harness.get("/me", &token).await;
    let total = body["data"]["total_profit"].as_f64().unwrap();
    let avg = body["data"]["avg_profitability"].as_f64().unwrap();
    assert!((total - 0.30).abs() < 1e-9);
    assert!((avg - 0.15).abs() < 1e-9);
    assert_eq!(body["data"]["successful_arbs"], 2);
}

#[tokio::test]
async fn test_unknown_event_rejected_without_writes() {
    let harness = Harness::new();

    let (status, body) = harness.event("bogus", json!({"profit": 1.0})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EVENT_INVALID");
    assert_eq!(harness.store.count_ops(WALLET).await.unwrap(), 0);
    assert_eq!(harness.store.count_notifications(WALLET).await.unwrap(), 0);
    assert_eq!(harness.store.count_logs(WALLET).await.unwrap(), 0);
}

#[tokio::test]
async fn test_status_event_surfaces_error() {
    let harness = Harness::new();
    let token = harness.token().await;
    let before = harness.store.count_notifications(WALLET).await.unwrap();

    harness
        .event("status", json!({"status": "error", "last_error": "RPC timeout"}))
        .await;

    let (_, body) = harness.get("/bot/status", &token).await;
    assert_eq!(body["data"]["status"], "error");
    assert_eq!(body["data"]["last_error"], "RPC timeout");

    let (_, body) = harness.get("/notifications?limit=50", &token).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len() as i64, before + 1);
    assert_eq!(items[0]["type"], "error");
    assert_eq!(items[0]["message"], "RPC timeout");
}

#[tokio::test]
async fn test_internal_key_required() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/internal/event")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-internal-key", "wrong")
        .body(Body::from(json!({"wallet_address": WALLET, "type": "log", "payload": {}}).to_string()))
        .unwrap();

    let (status, body) = harness.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_INVALID");
}

#[tokio::test]
async fn test_internal_routes_closed_without_key() {
    let harness = Harness::with_config(AppConfig::default());
    let request = Request::builder()
        .uri("/internal/active-users")
        .header("x-internal-key", "")
        .body(Body::empty())
        .unwrap();

    let (status, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mark_read() {
    let harness = Harness::new();
    let token = harness.token().await;

    let (status, body) = harness.post("/notifications/read", &token, json!({"ids": []})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 0);

    let (_, body) = harness.get("/notifications", &token).await;
    let ids: Vec<Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .take(2)
        .map(|n| n["id"].clone())
        .collect();

    let (_, body) = harness.post("/notifications/read", &token, json!({"ids": ids})).await;
    assert_eq!(body["data"]["updated"], 2);

    let (_, body) = harness.get("/notifications", &token).await;
    let read = body["data"].as_array().unwrap().iter().filter(|n| n["read"] == true).count();
    assert_eq!(read, 2);
}

#[tokio::test]
async fn test_settings_defaults_and_update() {
    let harness = Harness::new();
    let token = harness.token().await;

    let (_, body) = harness.get("/settings", &token).await;
    assert_eq!(body["data"]["min_profit_pct"], 0.3);
    assert_eq!(body["data"]["scan_frequency_sec"], 15);
    assert_eq!(body["data"]["dex_list"], json!(["Uniswap", "SushiSwap", "Curve"]));

    let update = json!({"min_profit_pct": 0.5, "loan_limit": 1.0, "dex_list": ["Curve"], "pairs": [], "scan_frequency_sec": 30});
    let request = json_request(Method::PUT, "/settings", Some(&token), update);
    let (status, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = harness.get("/settings", &token).await;
    assert_eq!(body["data"]["min_profit_pct"], 0.5);
    assert_eq!(body["data"]["dex_list"], json!(["Curve"]));

    let bad = json!({"scan_frequency_sec": 0});
    let (status, body) = harness.send(json_request(Method::PUT, "/settings", Some(&token), bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_reports_and_market() {
    let harness = Harness::new();
    let token = harness.token().await;

    let (_, body) = harness.get("/ops?limit=5", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (_, body) = harness.get("/stats/summary", &token).await;
    let rate = body["data"]["success_rate"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&rate));

    let (_, body) = harness.get("/market/opportunities", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let (_, summary) = harness.get("/market/analysis", &token).await;
    let (_, stats) = harness.get("/stats/summary", &token).await;
    assert_eq!(summary["data"]["summary"], stats["data"]);
}

#[tokio::test]
async fn test_list_limits_are_bounded() {
    let harness = Harness::new();
    let token = harness.token().await;

    for uri in [
        "/ops?limit=0",
        "/ops?limit=-1",
        "/ops?limit=10000000",
        "/notifications?limit=-1",
        "/logs/recent?limit=0",
    ] {
        let (status, body) = harness.get(uri, &token).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{}", uri);
    }

    let (status, body) = harness.get("/notifications?limit=2", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_csv_export() {
    let harness = Harness::new();
    let token = harness.token().await;

    let request = Request::builder()
        .uri("/export/csv")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = harness.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=ops.csv"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 31);
}

#[tokio::test]
async fn test_malformed_body_uses_envelope() {
    let harness = Harness::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = harness.send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_health_endpoints() {
    let harness = Harness::new();

    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let (status, _) = harness.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder().uri("/health/detail").body(Body::empty()).unwrap();
    let (status, body) = harness.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
