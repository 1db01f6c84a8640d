//! Wallet login

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::auth::hash_access_token;
use crate::errors::{ok, ApiError, ApiJson, ApiResult, Envelope};
use crate::models::*;
use crate::observability::metrics;
use crate::seed::ensure_mock_seed;
use crate::wallet::is_valid_wallet;
use crate::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<Envelope<LoginResponse>>> {
    req.validate()?;
    if !is_valid_wallet(&req.wallet_address) {
        return Err(ApiError::WalletInvalid("Invalid wallet address".to_string()));
    }

    let wallet = req.wallet_address.as_str();
    let store = state.store.as_ref();
    let token_hash = hash_access_token(&req.access_token);
    let master_ok = state
        .config
        .access_token_master()
        .is_some_and(|master| master == req.access_token);

    match store.find_user(wallet).await? {
        Some(user) => match user.access_token_hash.as_deref() {
            Some(stored) if stored == token_hash => {}
            Some(_) if master_ok => store.set_access_token_hash(wallet, &token_hash).await?,
            Some(_) => {
                warn!(wallet = %wallet, "Login rejected: access token mismatch");
                state.metrics.increment(metrics::LOGIN_FAILURES, 1).await;
                return Err(ApiError::auth("Access token mismatch"));
            }
            None => store.set_access_token_hash(wallet, &token_hash).await?,
        },
        None => {
            if state.config.access_token_master().is_some() && !master_ok {
                state.metrics.increment(metrics::LOGIN_FAILURES, 1).await;
                return Err(ApiError::auth("Access token invalid"));
            }
            store.insert_user(&User::new(wallet, Some(token_hash))).await?;
            info!(wallet = %wallet, "New wallet registered");
        }
    }

    store.touch_last_login(wallet).await?;
    if let Some(telegram_user_id) = req.telegram_user_id {
        store.link_telegram_wallet(telegram_user_id, wallet).await?;
    }
    ensure_mock_seed(store, wallet).await?;

    let token = state.sessions.issue(wallet)?;
    let user = store
        .find_user(wallet)
        .await?
        .ok_or_else(|| ApiError::Internal("user vanished after login".to_string()))?;

    state.metrics.increment(metrics::LOGINS, 1).await;
    Ok(ok(LoginResponse {
        token,
        profile: Profile::from(&user),
    }))
}
