//! Process configuration
//!
//! Loaded once at startup from `.env` (if present) and the environment,
//! then shared through `AppState`.

use config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    #[serde(default)]
    pub access_token_master: String,
    #[serde(default)]
    pub internal_api_key: String,
    #[serde(default)]
    pub bot_token: String,
    pub cors_origins: String,
    #[serde(default)]
    pub miniapp_url: String,
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub chat_relay_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let cfg = Config::builder()
            .set_default("jwt_secret", "dev-secret")?
            .set_default("jwt_ttl_minutes", 10080)?
            .set_default("cors_origins", "http://localhost:5173")?
            .set_default("port", 8000)?
            .set_default("rate_limit_per_minute", 60)?
            .set_default("chat_relay_timeout_secs", 5)?
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    pub fn database_url(&self) -> Option<&str> {
        non_empty(&self.database_url)
    }

    pub fn access_token_master(&self) -> Option<&str> {
        non_empty(&self.access_token_master)
    }

    pub fn internal_api_key(&self) -> Option<&str> {
        non_empty(&self.internal_api_key)
    }

    pub fn bot_token(&self) -> Option<&str> {
        non_empty(&self.bot_token)
    }

    pub fn miniapp_url(&self) -> Option<&str> {
        non_empty(&self.miniapp_url)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: "dev-secret".to_string(),
            jwt_ttl_minutes: 10080,
            access_token_master: String::new(),
            internal_api_key: String::new(),
            bot_token: String::new(),
            cors_origins: "http://localhost:5173".to_string(),
            miniapp_url: String::new(),
            port: 8000,
            rate_limit_per_minute: 60,
            chat_relay_timeout_secs: 5,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_disabled() {
        let cfg = AppConfig {
            internal_api_key: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(cfg.internal_api_key().is_none());
        assert!(cfg.database_url().is_none());
        assert!(cfg.bot_token().is_none());
    }

    #[test]
    fn test_cors_origin_list() {
        let cfg = AppConfig {
            cors_origins: "http://a.test, http://b.test,,".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(cfg.cors_origins(), vec!["http://a.test", "http://b.test"]);
    }
}
