//! API error taxonomy and response envelopes
//!
//! Every response body is either `{ok: true, data}` or
//! `{ok: false, error: {code, message}}`.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    AuthInvalid(String),
    #[error("{0}")]
    WalletInvalid(String),
    #[error("{0}")]
    EventInvalid(String),
    #[error("Too many requests")]
    RateLimited,
    #[error("{0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::AuthInvalid(_) => "AUTH_INVALID",
            ApiError::WalletInvalid(_) => "WALLET_INVALID",
            ApiError::EventInvalid(_) => "EVENT_INVALID",
            ApiError::RateLimited => "RATE_LIMIT",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Store(_) | ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthInvalid(_) => StatusCode::UNAUTHORIZED,
            ApiError::WalletInvalid(_) | ApiError::EventInvalid(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ApiError::AuthInvalid(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                "Internal server error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "ok": false,
            "error": { "code": self.code(), "message": message },
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { ok: true, data })
}

/// JSON body extractor whose rejections use the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        let cases = [
            (ApiError::auth("x"), "AUTH_INVALID", 401),
            (ApiError::WalletInvalid("x".into()), "WALLET_INVALID", 400),
            (ApiError::EventInvalid("x".into()), "EVENT_INVALID", 400),
            (ApiError::RateLimited, "RATE_LIMIT", 429),
            (ApiError::Validation("x".into()), "VALIDATION_ERROR", 422),
            (ApiError::Internal("x".into()), "INTERNAL_ERROR", 500),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.status().as_u16(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_message_is_hidden() {
        let response = ApiError::Internal("db password leaked".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
