//! Bot lifecycle commands

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::errors::{ok, ApiResult, Envelope};
use crate::lifecycle::run_detached;
use crate::models::{BotActionResponse, BotStatusResponse, User};
use crate::AppState;

/// POST /bot/start
pub async fn start_bot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Envelope<BotActionResponse>>> {
    let lifecycle = state.lifecycle.clone();
    let bot_state = run_detached(async move { lifecycle.start(&user.wallet_address).await }).await?;
    Ok(ok(BotActionResponse { status: bot_state.status }))
}

/// POST /bot/stop
pub async fn stop_bot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Envelope<BotActionResponse>>> {
    let lifecycle = state.lifecycle.clone();
    let bot_state = run_detached(async move { lifecycle.stop(&user.wallet_address).await }).await?;
    Ok(ok(BotActionResponse { status: bot_state.status }))
}

/// GET /bot/status
pub async fn bot_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Envelope<BotStatusResponse>>> {
    Ok(ok(state.lifecycle.bot_status(&user.wallet_address).await?))
}
