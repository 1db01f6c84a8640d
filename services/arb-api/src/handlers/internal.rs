//! Engine-facing routes, guarded by the internal key

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::errors::{ok, ApiJson, ApiResult, Envelope};
use crate::lifecycle::run_detached;
use crate::models::{EventAccepted, InternalEvent};
use crate::observability::Logger;
use crate::AppState;

/// POST /internal/event
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    ApiJson(event): ApiJson<InternalEvent>,
) -> ApiResult<Json<Envelope<EventAccepted>>> {
    Logger::bot_event(&event.wallet_address, &event.kind, "received");

    let lifecycle = state.lifecycle.clone();
    run_detached(async move { lifecycle.ingest(event).await }).await?;
    Ok(ok(EventAccepted { status: "accepted" }))
}

/// GET /internal/active-users - wallets the engine should be running
pub async fn active_users(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Envelope<Vec<String>>>> {
    Ok(ok(state.store.list_active_wallets().await?))
}
