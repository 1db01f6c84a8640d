//! Wallet sessions
//!
//! Bearer tokens are HS256 JWTs carrying the wallet address as `sub`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::db::Store;
use crate::errors::{ApiError, ApiResult};
use crate::models::User;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: String,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, wallet_address: &str) -> ApiResult<String> {
        let claims = Claims {
            sub: wallet_address.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
    }

    /// Wallet address carried by a valid, unexpired token
    pub fn verify(&self, token: &str) -> ApiResult<String> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                ApiError::auth("Invalid token")
            })?;

        if data.claims.sub.is_empty() {
            return Err(ApiError::auth("Invalid token payload"));
        }
        Ok(data.claims.sub)
    }

    pub async fn resolve_user(&self, store: &dyn Store, token: &str) -> ApiResult<User> {
        let wallet = self.verify(token)?;
        store
            .find_user(&wallet)
            .await?
            .ok_or_else(|| ApiError::auth("User not found"))
    }
}

pub fn hash_access_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
