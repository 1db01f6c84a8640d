//! Observability: in-process counters and structured bot logging

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<RwLock<MetricsInner>>,
}

struct MetricsInner {
    counters: HashMap<String, u64>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsInner {
                counters: HashMap::new(),
                start_time: Instant::now(),
            })),
        }
    }

    pub async fn increment(&self, name: &str, value: u64) {
        let mut inner = self.inner.write().await;
        *inner.counters.entry(name.to_string()).or_insert(0) += value;
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.read().await;
        MetricsSnapshot {
            counters: inner.counters.clone(),
            uptime_secs: inner.start_time.elapsed().as_secs(),
        }
    }

    pub async fn get_counter(&self, name: &str) -> u64 {
        let inner = self.inner.read().await;
        inner.counters.get(name).copied().unwrap_or(0)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: HashMap<String, u64>,
    pub uptime_secs: u64,
}

pub struct Logger;

impl Logger {
    /// Lifecycle or ingestion event for one wallet's bot
    pub fn bot_event(wallet_address: &str, event_type: &str, details: &str) {
        tracing::info!(
            wallet = %wallet_address,
            event_type = %event_type,
            details = %details,
            "bot_event"
        );
    }
}

/// Predefined metric names
pub mod metrics {
    pub const LOGINS: &str = "logins_total";
    pub const LOGIN_FAILURES: &str = "login_failures_total";

    pub const BOT_STARTED: &str = "bot_started_total";
    pub const BOT_STOPPED: &str = "bot_stopped_total";

    pub const EVENTS_INGESTED: &str = "events_ingested_total";
    pub const EVENTS_REJECTED: &str = "events_rejected_total";
    pub const OPS_RECORDED: &str = "ops_recorded_total";

    pub const CHAT_RELAY_SENT: &str = "chat_relay_sent_total";
    pub const CHAT_RELAY_FAILED: &str = "chat_relay_failed_total";

    pub const RATE_LIMITED: &str = "rate_limited_total";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counters_accumulate() {
        let collector = MetricsCollector::new();
        collector.increment(metrics::LOGINS, 1).await;
        collector.increment(metrics::LOGINS, 2).await;

        assert_eq!(collector.get_counter(metrics::LOGINS).await, 3);
        assert_eq!(collector.get_counter(metrics::BOT_STARTED).await, 0);
        assert_eq!(collector.snapshot().await.counters.len(), 1);
    }
}
