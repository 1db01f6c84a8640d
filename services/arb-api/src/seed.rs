//! First-login data seeding

use crate::db::{Store, StoreResult};
use crate::mock_data::{generate_logs, generate_notifications, generate_ops};

const SEED_OPS: usize = 30;
const SEED_LOGS: usize = 12;
const SEED_NOTIFICATIONS: usize = 5;

/// Fill each empty collection for the wallet with sample data and make sure
/// a bot_state row exists. Collections that already hold data are left alone.
pub async fn ensure_mock_seed(store: &dyn Store, wallet_address: &str) -> StoreResult<()> {
    if store.count_ops(wallet_address).await? == 0 {
        store.insert_ops(&generate_ops(wallet_address, SEED_OPS)).await?;
    }
    if store.count_logs(wallet_address).await? == 0 {
        store.insert_logs(&generate_logs(wallet_address, SEED_LOGS)).await?;
    }
    if store.count_notifications(wallet_address).await? == 0 {
        store
            .insert_notifications(&generate_notifications(wallet_address, SEED_NOTIFICATIONS))
            .await?;
    }
    if store.init_bot_state(wallet_address).await? {
        tracing::debug!(wallet = %wallet_address, "bot state initialised");
    }
    Ok(())
}
