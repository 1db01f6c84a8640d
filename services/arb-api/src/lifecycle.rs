//! Bot lifecycle and event ingestion
//!
//! Per-wallet state machine (`stopped`, `active`, `error`) driven by user
//! commands and by events from the external trading engine. Every branch
//! persists first and relays to chat last.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::TradingAdapter;
use crate::db::Store;
use crate::errors::{ApiError, ApiResult};
use crate::models::*;
use crate::notify::Notifier;
use crate::observability::{metrics, Logger, MetricsCollector};
use crate::stats::compute_kpis;

/// Ops considered for the KPIs in `bot_status`
pub const STATUS_KPI_WINDOW: i64 = 200;

#[derive(Debug, Deserialize)]
struct OpPayload {
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pair: String,
    #[serde(default)]
    dex: String,
    #[serde(default)]
    profit: f64,
    #[serde(default)]
    fees: f64,
    #[serde(default)]
    exec_time_ms: i64,
    #[serde(default)]
    status: OpStatus,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogPayload {
    #[serde(default)]
    level: LogLevel,
    #[serde(default)]
    message: String,
    context: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct NotificationPayload {
    #[serde(default, rename = "type")]
    kind: NotificationType,
    title: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusPayload {
    #[serde(default = "default_event_status")]
    status: BotStatus,
    last_error: Option<String>,
}

fn default_event_status() -> BotStatus {
    BotStatus::Error
}

/// Internal event after its kind and payload have been checked
#[derive(Debug)]
enum BotEvent {
    Op(OpPayload),
    Log(LogPayload),
    Notification(NotificationPayload),
    Opportunity(NotificationPayload),
    Status(StatusPayload),
}

impl BotEvent {
    fn parse(kind: &str, payload: serde_json::Map<String, serde_json::Value>) -> ApiResult<Self> {
        let payload = serde_json::Value::Object(payload);
        let event = match kind {
            "op" => BotEvent::Op(decode(payload)?),
            "log" => BotEvent::Log(decode(payload)?),
            "notification" => BotEvent::Notification(decode(payload)?),
            "opportunity" => BotEvent::Opportunity(decode(payload)?),
            "status" => BotEvent::Status(decode(payload)?),
            other => {
                return Err(ApiError::EventInvalid(format!("Unknown event type: {}", other)));
            }
        };
        Ok(event)
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: serde_json::Value) -> ApiResult<T> {
    serde_json::from_value(payload).map_err(|e| ApiError::Validation(format!("Invalid payload: {}", e)))
}

/// Drive `fut` on its own task so a dropped request cannot cancel it midway
pub async fn run_detached<F, T>(fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|e| ApiError::Internal(format!("detached task failed: {}", e)))?
}

#[derive(Clone)]
pub struct BotLifecycle {
    store: Arc<dyn Store>,
    adapter: Arc<dyn TradingAdapter>,
    notifier: Notifier,
    metrics: MetricsCollector,
}

impl BotLifecycle {
    pub fn new(
        store: Arc<dyn Store>,
        adapter: Arc<dyn TradingAdapter>,
        notifier: Notifier,
        metrics: MetricsCollector,
    ) -> Self {
        Self { store, adapter, notifier, metrics }
    }

    pub async fn start(&self, wallet_address: &str) -> ApiResult<BotState> {
        let settings = self
            .store
            .find_settings(wallet_address)
            .await?
            .unwrap_or_else(|| BotSettings::default_for(wallet_address));
        self.adapter.start(wallet_address, &settings).await?;

        let state = self
            .store
            .set_bot_status(wallet_address, BotStatus::Active, ErrorUpdate::Replace(None))
            .await?;
        self.notifier
            .notify(wallet_address, NotificationType::Info, "Bot started", "Monitoring enabled")
            .await?;

        Logger::bot_event(wallet_address, "start", state.status.as_str());
        self.metrics.increment(metrics::BOT_STARTED, 1).await;
        Ok(state)
    }

    pub async fn stop(&self, wallet_address: &str) -> ApiResult<BotState> {
        self.adapter.stop(wallet_address).await?;

        let state = self
            .store
            .set_bot_status(wallet_address, BotStatus::Stopped, ErrorUpdate::Keep)
            .await?;
        self.notifier
            .notify(wallet_address, NotificationType::Info, "Bot stopped", "Monitoring paused")
            .await?;

        Logger::bot_event(wallet_address, "stop", state.status.as_str());
        self.metrics.increment(metrics::BOT_STOPPED, 1).await;
        Ok(state)
    }

    pub async fn bot_status(&self, wallet_address: &str) -> ApiResult<BotStatusResponse> {
        let state = self.store.find_bot_state(wallet_address).await?;
        let ops = self
            .store
            .list_ops(wallet_address, &OpsFilter::default(), STATUS_KPI_WINDOW)
            .await?;

        let (status, last_error) = match state {
            Some(state) => (state.status, state.last_error),
            None => (BotStatus::Stopped, None),
        };
        Ok(BotStatusResponse {
            status,
            last_error,
            kpis: compute_kpis(&ops),
        })
    }

    /// Apply one event from the trading engine.
    ///
    /// Unknown kinds and malformed payloads are rejected before any write.
    pub async fn ingest(&self, event: InternalEvent) -> ApiResult<()> {
        let wallet = event.wallet_address;
        let parsed = match BotEvent::parse(&event.kind, event.payload) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.metrics.increment(metrics::EVENTS_REJECTED, 1).await;
                return Err(e);
            }
        };

        match parsed {
            BotEvent::Op(payload) => self.ingest_op(&wallet, payload).await?,
            BotEvent::Log(payload) => {
                let entry = LogEntry {
                    id: Uuid::new_v4(),
                    wallet_address: wallet.clone(),
                    created_at: Utc::now(),
                    level: payload.level,
                    message: payload.message,
                    context: serde_json::Value::Object(payload.context.unwrap_or_default()),
                };
                self.store.insert_log(&entry).await?;
            }
            BotEvent::Notification(payload) => {
                let title = payload.title.unwrap_or_else(|| "Update".to_string());
                let message = payload.message.unwrap_or_default();
                self.notifier.notify(&wallet, payload.kind, &title, &message).await?;
                self.notifier
                    .relay_to_chat(&wallet, &format!("{}: {}", title, message))
                    .await;
            }
            BotEvent::Opportunity(payload) => {
                let title = payload.title.unwrap_or_else(|| "Opportunity found".to_string());
                let message = payload.message.unwrap_or_else(|| "New route detected".to_string());
                self.notifier
                    .notify(&wallet, NotificationType::Opportunity, &title, &message)
                    .await?;
                self.notifier
                    .relay_to_chat(&wallet, &format!("Opportunity: {}", message))
                    .await;
            }
            BotEvent::Status(payload) => {
                let error_text = payload.last_error.clone().unwrap_or_default();
                let state = self
                    .store
                    .set_bot_status(&wallet, payload.status, ErrorUpdate::Replace(payload.last_error))
                    .await?;
                self.notifier
                    .notify(&wallet, NotificationType::Error, "Critical error", &error_text)
                    .await?;
                Logger::bot_event(&wallet, "status", state.status.as_str());
                self.notifier
                    .relay_to_chat(&wallet, &format!("Critical error: {}", error_text))
                    .await;
            }
        }

        self.metrics.increment(metrics::EVENTS_INGESTED, 1).await;
        Ok(())
    }

    async fn ingest_op(&self, wallet: &str, payload: OpPayload) -> ApiResult<()> {
        let op = Operation {
            id: Uuid::new_v4(),
            wallet_address: wallet.to_string(),
            timestamp: payload.timestamp.unwrap_or_else(Utc::now),
            pair: payload.pair,
            dex: payload.dex,
            profit: payload.profit,
            fees: payload.fees,
            exec_time_ms: payload.exec_time_ms,
            status: payload.status,
            error_message: payload.error_message,
        };
        self.store.insert_op(&op).await?;

        if op.status == OpStatus::Success {
            let user = self.store.record_successful_op(wallet, op.profit).await?;
            tracing::debug!(
                wallet = %wallet,
                total_profit = user.total_profit,
                successful_arbs = user.successful_arbs,
                "op recorded"
            );
        }
        self.metrics.increment(metrics::OPS_RECORDED, 1).await;

        self.notifier
            .notify(wallet, NotificationType::Deal, "Deal completed", &format!("Profit {}", op.profit))
            .await?;
        self.notifier
            .relay_to_chat(wallet, &format!("Deal completed: {} profit {}", op.pair, op.profit))
            .await;
        Ok(())
    }
}
