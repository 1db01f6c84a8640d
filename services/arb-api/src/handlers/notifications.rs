use axum::{
    extract::{Query, State},
    Extension, Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::errors::{ok, ApiJson, ApiResult, Envelope};
use crate::models::{ListQuery, MarkReadResponse, Notification, NotificationReadRequest, User};
use crate::AppState;

const DEFAULT_LIMIT: i64 = 20;

/// GET /notifications - newest first
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<Vec<Notification>>>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(ok(state.store.list_notifications(&user.wallet_address, limit).await?))
}

/// POST /notifications/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<NotificationReadRequest>,
) -> ApiResult<Json<Envelope<MarkReadResponse>>> {
    if req.ids.is_empty() {
        return Ok(ok(MarkReadResponse { updated: 0 }));
    }
    let updated = state
        .store
        .mark_notifications_read(&user.wallet_address, &req.ids)
        .await?;
    Ok(ok(MarkReadResponse { updated }))
}
