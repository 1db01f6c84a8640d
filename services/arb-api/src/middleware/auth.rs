//! Authentication middleware
//!
//! User routes carry `Authorization: Bearer <token>`; the resolved `User` is
//! attached to the request extensions. Engine-facing routes carry the shared
//! `X-Internal-Key` instead.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::AppState;

pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::auth("Missing token"))?;

    let user = state.sessions.resolve_user(state.store.as_ref(), token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Shared-secret check for the trading engine. With no key configured every
/// call is rejected.
pub async fn internal_key_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state
        .config
        .internal_api_key()
        .ok_or_else(|| ApiError::auth("Invalid internal key"))?;

    let provided = request
        .headers()
        .get(INTERNAL_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        tracing::warn!("Rejected internal call with bad key");
        return Err(ApiError::auth("Invalid internal key"));
    }

    Ok(next.run(request).await)
}
