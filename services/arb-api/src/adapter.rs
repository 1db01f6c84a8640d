//! Trading engine seam
//!
//! The real engine runs out of process and reports back through
//! `/internal/event`. `MockTradingAdapter` answers from the store and the
//! deterministic per-wallet generators.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::{Store, StoreResult};
use crate::mock_data::generate_opportunities;
use crate::models::{BotSettings, Opportunity, OpsFilter, StatsSummary};
use crate::stats::compute_summary;

pub const ANALYSIS_WINDOW: i64 = 1000;
pub const OPPORTUNITY_COUNT: usize = 4;

#[async_trait]
pub trait TradingAdapter: Send + Sync {
    async fn start(&self, wallet_address: &str, settings: &BotSettings) -> StoreResult<()>;
    async fn stop(&self, wallet_address: &str) -> StoreResult<()>;
    async fn stats(&self, wallet_address: &str) -> StoreResult<StatsSummary>;
    async fn opportunities(&self, wallet_address: &str) -> StoreResult<Vec<Opportunity>>;
}

pub struct MockTradingAdapter {
    store: Arc<dyn Store>,
}

impl MockTradingAdapter {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TradingAdapter for MockTradingAdapter {
    async fn start(&self, wallet_address: &str, settings: &BotSettings) -> StoreResult<()> {
        tracing::debug!(
            wallet = %wallet_address,
            pairs = settings.pairs.len(),
            scan_frequency_sec = settings.scan_frequency_sec,
            "mock adapter start"
        );
        Ok(())
    }

    async fn stop(&self, wallet_address: &str) -> StoreResult<()> {
        tracing::debug!(wallet = %wallet_address, "mock adapter stop");
        Ok(())
    }

    async fn stats(&self, wallet_address: &str) -> StoreResult<StatsSummary> {
        let ops = self
            .store
            .list_ops(wallet_address, &OpsFilter::default(), ANALYSIS_WINDOW)
            .await?;
        Ok(compute_summary(&ops))
    }

    async fn opportunities(&self, wallet_address: &str) -> StoreResult<Vec<Opportunity>> {
        Ok(generate_opportunities(wallet_address, OPPORTUNITY_COUNT))
    }
}
