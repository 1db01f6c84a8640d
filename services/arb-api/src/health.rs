//! Health check endpoints for load balancers and monitoring

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Liveness: no external dependencies
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness: the store answers a ping
pub async fn readyz(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(ReadinessResponse {
            status: "ready".to_string(),
            checks: vec![HealthCheck::new("store", "ok")],
        })),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

pub async fn health_detail(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let store_ok = state.store.ping().await.is_ok();
    let checks = vec![
        HealthCheck::new("store", if store_ok { "ok" } else { "error" }),
        HealthCheck::new(
            "chat_relay",
            if state.config.bot_token().is_some() { "configured" } else { "disabled" },
        ),
        HealthCheck::new(
            "internal_api",
            if state.config.internal_api_key().is_some() { "configured" } else { "disabled" },
        ),
    ];

    let metrics = state.metrics.snapshot().await;
    let response = DetailedHealthResponse {
        status: if store_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
        metrics: HealthMetrics {
            uptime_secs: metrics.uptime_secs,
            counters: metrics.counters,
        },
    };

    let code = if store_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(response))
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: Vec<HealthCheck>,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheck>,
    pub metrics: HealthMetrics,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
}

impl HealthCheck {
    fn new(name: &str, status: &str) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthMetrics {
    pub uptime_secs: u64,
    pub counters: std::collections::HashMap<String, u64>,
}
