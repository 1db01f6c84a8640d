//! Persistence layer
//!
//! Every collection is partitioned by wallet address. The `Store` trait is
//! the seam handlers and the bot lifecycle talk to; `PgStore` backs it with
//! Postgres and `MemoryStore` keeps everything in-process.

mod memory;
mod postgres;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use uuid::Uuid;

use crate::models::*;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type Db = Pool<Postgres>;

pub async fn init_db(database_url: &str) -> anyhow::Result<Db> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for readiness checks
    async fn ping(&self) -> StoreResult<()>;

    // Users
    async fn find_user(&self, wallet: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn touch_last_login(&self, wallet: &str) -> StoreResult<()>;
    async fn set_access_token_hash(&self, wallet: &str, hash: &str) -> StoreResult<()>;

    /// Add one successful op worth `profit` to the wallet's running totals.
    ///
    /// Must be a single atomic increment: concurrent calls for the same
    /// wallet may not lose updates. Creates the user row if absent.
    async fn record_successful_op(&self, wallet: &str, profit: f64) -> StoreResult<User>;

    // Settings
    async fn find_settings(&self, wallet: &str) -> StoreResult<Option<BotSettings>>;
    async fn upsert_settings(&self, settings: &BotSettings) -> StoreResult<()>;

    // Bot state
    async fn find_bot_state(&self, wallet: &str) -> StoreResult<Option<BotState>>;

    /// Upsert the wallet's status. `last_change_at` is always moved strictly
    /// forward from the previously stored value.
    async fn set_bot_status(
        &self,
        wallet: &str,
        status: BotStatus,
        last_error: ErrorUpdate,
    ) -> StoreResult<BotState>;

    /// Insert a `stopped` row only when the wallet has none. Returns true if inserted.
    async fn init_bot_state(&self, wallet: &str) -> StoreResult<bool>;
    async fn list_active_wallets(&self) -> StoreResult<Vec<String>>;

    // Ops
    async fn insert_op(&self, op: &Operation) -> StoreResult<()>;
    async fn insert_ops(&self, ops: &[Operation]) -> StoreResult<()>;
    async fn count_ops(&self, wallet: &str) -> StoreResult<i64>;
    /// Newest first
    async fn list_ops(&self, wallet: &str, filter: &OpsFilter, limit: i64) -> StoreResult<Vec<Operation>>;

    // Notifications
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;
    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()>;
    async fn count_notifications(&self, wallet: &str) -> StoreResult<i64>;
    async fn list_notifications(&self, wallet: &str, limit: i64) -> StoreResult<Vec<Notification>>;
    /// Flip `read` to true for the given ids owned by `wallet`; returns rows touched
    async fn mark_notifications_read(&self, wallet: &str, ids: &[Uuid]) -> StoreResult<u64>;

    // Logs
    async fn insert_log(&self, entry: &LogEntry) -> StoreResult<()>;
    async fn insert_logs(&self, entries: &[LogEntry]) -> StoreResult<()>;
    async fn count_logs(&self, wallet: &str) -> StoreResult<i64>;
    async fn list_logs(&self, wallet: &str, limit: i64) -> StoreResult<Vec<LogEntry>>;

    // Telegram links
    async fn link_telegram_wallet(&self, telegram_user_id: i64, wallet: &str) -> StoreResult<()>;
    async fn link_telegram_chat(&self, telegram_user_id: i64, chat_id: i64) -> StoreResult<()>;
    async fn find_chat_id(&self, wallet: &str) -> StoreResult<Option<i64>>;
}
