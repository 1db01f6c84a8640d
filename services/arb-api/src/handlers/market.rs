//! Market views backed by the trading adapter

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::errors::{ok, ApiResult, Envelope};
use crate::models::{MarketAnalysisResponse, Opportunity, User};
use crate::AppState;

/// GET /market/analysis
pub async fn analysis(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Envelope<MarketAnalysisResponse>>> {
    let summary = state.adapter.stats(&user.wallet_address).await?;
    Ok(ok(MarketAnalysisResponse { summary }))
}

/// GET /market/opportunities
pub async fn opportunities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> ApiResult<Json<Envelope<Vec<Opportunity>>>> {
    Ok(ok(state.adapter.opportunities(&user.wallet_address).await?))
}
