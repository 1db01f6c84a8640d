//! Notification fan-out
//!
//! Notifications are written to the store first. The chat relay runs after
//! the write, under a timeout, and its failures are only logged.

use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::db::{Store, StoreResult};
use crate::models::{Notification, NotificationType};
use crate::observability::{metrics, MetricsCollector};

/// Outbound chat channel
#[async_trait]
pub trait ChatRelay: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
}

/// Telegram Bot API `sendMessage` client
pub struct TelegramRelay {
    client: reqwest::Client,
    api_url: String,
}

impl TelegramRelay {
    pub fn new(bot_token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: format!("https://api.telegram.org/bot{}/sendMessage", bot_token),
        })
    }
}

#[async_trait]
impl ChatRelay for TelegramRelay {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let params = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self.client.post(&self.api_url).json(&params).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Telegram sendMessage failed: HTTP {}", response.status()));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn Store>,
    relay: Option<Arc<dyn ChatRelay>>,
    timeout: Duration,
    metrics: MetricsCollector,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn Store>,
        relay: Option<Arc<dyn ChatRelay>>,
        timeout: Duration,
        metrics: MetricsCollector,
    ) -> Self {
        Self { store, relay, timeout, metrics }
    }

    /// Durable: a store failure fails the caller
    pub async fn notify(
        &self,
        wallet_address: &str,
        kind: NotificationType,
        title: &str,
        message: &str,
    ) -> StoreResult<Notification> {
        let notification = Notification::new(wallet_address, kind, title, message);
        self.store.insert_notification(&notification).await?;
        Ok(notification)
    }

    /// Best effort: never fails, never waits longer than the relay timeout
    pub async fn relay_to_chat(&self, wallet_address: &str, text: &str) {
        let Some(relay) = &self.relay else {
            return;
        };

        let chat_id = match self.store.find_chat_id(wallet_address).await {
            Ok(Some(chat_id)) => chat_id,
            Ok(None) => return,
            Err(e) => {
                warn!(wallet = %wallet_address, "Chat lookup failed: {}", e);
                return;
            }
        };

        match tokio::time::timeout(self.timeout, relay.send(chat_id, text)).await {
            Ok(Ok(())) => {
                debug!(wallet = %wallet_address, chat_id, "Chat relay delivered");
                self.metrics.increment(metrics::CHAT_RELAY_SENT, 1).await;
            }
            Ok(Err(e)) => {
                warn!(wallet = %wallet_address, chat_id, "Chat relay failed: {}", e);
                self.metrics.increment(metrics::CHAT_RELAY_FAILED, 1).await;
            }
            Err(_) => {
                warn!(wallet = %wallet_address, chat_id, "Chat relay timed out");
                self.metrics.increment(metrics::CHAT_RELAY_FAILED, 1).await;
            }
        }
    }
}
