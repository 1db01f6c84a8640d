use axum::{
    extract::{Query, State},
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::errors::{ok, ApiResult, Envelope};
use crate::models::{ListQuery, LogEntry, User};
use crate::AppState;

/// GET /logs/recent - newest first
pub async fn recent_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<Vec<LogEntry>>>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(20);
    Ok(ok(state.store.list_logs(&user.wallet_address, limit).await?))
}
