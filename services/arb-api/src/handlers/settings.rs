//! Per-wallet bot settings

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::errors::{ok, ApiJson, ApiResult, Envelope};
use crate::models::{BotSettings, SettingsInput, User};
use crate::AppState;

/// GET /settings - persisted defaults on first read
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Envelope<BotSettings>>> {
    let wallet = &user.wallet_address;
    let settings = match state.store.find_settings(wallet).await? {
        Some(settings) => settings,
        None => {
            let defaults = BotSettings::default_for(wallet);
            state.store.upsert_settings(&defaults).await?;
            defaults
        }
    };
    Ok(ok(settings))
}

/// PUT /settings - wholesale overwrite
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(input): ApiJson<SettingsInput>,
) -> ApiResult<Json<Envelope<BotSettings>>> {
    input.validate()?;

    let settings = BotSettings {
        wallet_address: user.wallet_address.clone(),
        min_profit_pct: input.min_profit_pct,
        loan_limit: input.loan_limit,
        dex_list: input.dex_list,
        pairs: input.pairs,
        scan_frequency_sec: input.scan_frequency_sec,
        updated_at: Utc::now(),
    };
    state.store.upsert_settings(&settings).await?;
    Ok(ok(settings))
}
