pub mod adapter;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod lifecycle;
pub mod middleware;
pub mod mock_data;
pub mod models;
pub mod notify;
pub mod observability;
pub mod seed;
pub mod stats;
pub mod wallet;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use adapter::{MockTradingAdapter, TradingAdapter};
pub use auth::SessionKeys;
pub use crate::config::AppConfig;
pub use db::{MemoryStore, PgStore, Store};
pub use errors::{ApiError, ApiResult};
pub use lifecycle::BotLifecycle;
pub use models::*;
pub use notify::{ChatRelay, Notifier, TelegramRelay};
pub use observability::{Logger, MetricsCollector};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub sessions: SessionKeys,
    pub lifecycle: BotLifecycle,
    pub adapter: Arc<dyn TradingAdapter>,
    pub metrics: MetricsCollector,
    pub rate_limiter: middleware::RateLimiter,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, relay: Option<Arc<dyn ChatRelay>>) -> Self {
        let metrics = MetricsCollector::new();
        let adapter: Arc<dyn TradingAdapter> = Arc::new(MockTradingAdapter::new(store.clone()));
        let notifier = Notifier::new(
            store.clone(),
            relay,
            Duration::from_secs(config.chat_relay_timeout_secs),
            metrics.clone(),
        );
        let lifecycle = BotLifecycle::new(store.clone(), adapter.clone(), notifier, metrics.clone());

        Self {
            sessions: SessionKeys::new(&config.jwt_secret, config.jwt_ttl_minutes),
            rate_limiter: middleware::RateLimiter::new(60, config.rate_limit_per_minute),
            config: Arc::new(config),
            store,
            lifecycle,
            adapter,
            metrics,
        }
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let rate_limit = axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::rate_limit_middleware,
    );

    // Wallet-session routes
    let user_routes = Router::new()
        .route("/me", get(handlers::profile::me))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/bot/start", post(handlers::bot::start_bot))
        .route("/bot/stop", post(handlers::bot::stop_bot))
        .route("/bot/status", get(handlers::bot::bot_status))
        .route("/ops", get(handlers::reports::list_ops))
        .route("/stats/summary", get(handlers::reports::stats_summary))
        .route("/export/csv", get(handlers::reports::export_csv))
        .route("/export/json", get(handlers::reports::export_json))
        .route("/market/analysis", get(handlers::market::analysis))
        .route("/market/opportunities", get(handlers::market::opportunities))
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/read", post(handlers::notifications::mark_read))
        .route("/logs/recent", get(handlers::logs::recent_logs))
        .route_layer(rate_limit.clone())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let auth_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(rate_limit);

    // Trading-engine routes
    let internal_routes = Router::new()
        .route("/internal/event", post(handlers::internal::ingest_event))
        .route("/internal/active-users", get(handlers::internal::active_users))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::internal_key_middleware,
        ));

    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/health/detail", get(health::health_detail));

    Router::new()
        .merge(user_routes)
        .merge(auth_routes)
        .merge(internal_routes)
        .merge(health_routes)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
