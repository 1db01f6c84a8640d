use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::*;

/// In-process store (per-process, not durable, unbounded)
///
/// Ops, notifications and logs are kept in growing `Vec`s and every read
/// scans them, so this is for development and tests only.
///
/// Every mutation runs under a single write lock, which makes the
/// statistics increment atomic with respect to concurrent callers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    users: HashMap<String, User>,
    settings: HashMap<String, BotSettings>,
    bot_state: HashMap<String, BotState>,
    ops: Vec<Operation>,
    notifications: Vec<Notification>,
    logs: Vec<LogEntry>,
    telegram_users: HashMap<i64, TelegramLink>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn take_newest<T: Clone>(mut items: Vec<&T>, key: impl Fn(&T) -> chrono::DateTime<Utc>, limit: i64) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
        .into_iter()
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, wallet: &str) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(wallet).cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .users
            .entry(user.wallet_address.clone())
            .or_insert_with(|| user.clone());
        Ok(())
    }

    async fn touch_last_login(&self, wallet: &str) -> StoreResult<()> {
        if let Some(user) = self.inner.write().await.users.get_mut(wallet) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_access_token_hash(&self, wallet: &str, hash: &str) -> StoreResult<()> {
        if let Some(user) = self.inner.write().await.users.get_mut(wallet) {
            user.access_token_hash = Some(hash.to_string());
        }
        Ok(())
    }

    async fn record_successful_op(&self, wallet: &str, profit: f64) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let user = inner.users.entry(wallet.to_string()).or_insert_with(|| User {
            last_login: None,
            ..User::new(wallet, None)
        });
        user.total_profit += profit;
        user.successful_arbs += 1;
        user.avg_profitability = user.total_profit / user.successful_arbs as f64;
        Ok(user.clone())
    }

    async fn find_settings(&self, wallet: &str) -> StoreResult<Option<BotSettings>> {
        Ok(self.inner.read().await.settings.get(wallet).cloned())
    }

    async fn upsert_settings(&self, settings: &BotSettings) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .settings
            .insert(settings.wallet_address.clone(), settings.clone());
        Ok(())
    }

    async fn find_bot_state(&self, wallet: &str) -> StoreResult<Option<BotState>> {
        Ok(self.inner.read().await.bot_state.get(wallet).cloned())
    }

    async fn set_bot_status(
        &self,
        wallet: &str,
        status: BotStatus,
        last_error: ErrorUpdate,
    ) -> StoreResult<BotState> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let state = inner
            .bot_state
            .entry(wallet.to_string())
            .and_modify(|state| {
                state.last_change_at = now.max(state.last_change_at + Duration::microseconds(1));
            })
            .or_insert_with(|| BotState {
                wallet_address: wallet.to_string(),
                status,
                last_error: None,
                last_change_at: now,
            });
        state.status = status;
        if let ErrorUpdate::Replace(value) = last_error {
            state.last_error = value;
        }
        Ok(state.clone())
    }

    async fn init_bot_state(&self, wallet: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.bot_state.contains_key(wallet) {
            return Ok(false);
        }
        inner.bot_state.insert(
            wallet.to_string(),
            BotState {
                wallet_address: wallet.to_string(),
                status: BotStatus::Stopped,
                last_error: None,
                last_change_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn list_active_wallets(&self) -> StoreResult<Vec<String>> {
        let inner = self.inner.read().await;
        let mut wallets: Vec<String> = inner
            .bot_state
            .values()
            .filter(|state| state.status == BotStatus::Active)
            .map(|state| state.wallet_address.clone())
            .collect();
        wallets.sort();
        Ok(wallets)
    }

    async fn insert_op(&self, op: &Operation) -> StoreResult<()> {
        self.inner.write().await.ops.push(op.clone());
        Ok(())
    }

    async fn insert_ops(&self, ops: &[Operation]) -> StoreResult<()> {
        self.inner.write().await.ops.extend_from_slice(ops);
        Ok(())
    }

    async fn count_ops(&self, wallet: &str) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.ops.iter().filter(|op| op.wallet_address == wallet).count() as i64)
    }

    async fn list_ops(&self, wallet: &str, filter: &OpsFilter, limit: i64) -> StoreResult<Vec<Operation>> {
        let inner = self.inner.read().await;
        let matching: Vec<&Operation> = inner
            .ops
            .iter()
            .filter(|op| op.wallet_address == wallet && filter.matches(op))
            .collect();
        Ok(take_newest(matching, |op| op.timestamp, limit))
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.inner.write().await.notifications.push(notification.clone());
        Ok(())
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .notifications
            .extend_from_slice(notifications);
        Ok(())
    }

    async fn count_notifications(&self, wallet: &str) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .filter(|n| n.wallet_address == wallet)
            .count() as i64)
    }

    async fn list_notifications(&self, wallet: &str, limit: i64) -> StoreResult<Vec<Notification>> {
        let inner = self.inner.read().await;
        let matching: Vec<&Notification> = inner
            .notifications
            .iter()
            .filter(|n| n.wallet_address == wallet)
            .collect();
        Ok(take_newest(matching, |n| n.created_at, limit))
    }

    async fn mark_notifications_read(&self, wallet: &str, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for n in inner
            .notifications
            .iter_mut()
            .filter(|n| n.wallet_address == wallet && ids.contains(&n.id))
        {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn insert_log(&self, entry: &LogEntry) -> StoreResult<()> {
        self.inner.write().await.logs.push(entry.clone());
        Ok(())
    }

    async fn insert_logs(&self, entries: &[LogEntry]) -> StoreResult<()> {
        self.inner.write().await.logs.extend_from_slice(entries);
        Ok(())
    }

    async fn count_logs(&self, wallet: &str) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.logs.iter().filter(|l| l.wallet_address == wallet).count() as i64)
    }

    async fn list_logs(&self, wallet: &str, limit: i64) -> StoreResult<Vec<LogEntry>> {
        let inner = self.inner.read().await;
        let matching: Vec<&LogEntry> = inner
            .logs
            .iter()
            .filter(|l| l.wallet_address == wallet)
            .collect();
        Ok(take_newest(matching, |l| l.created_at, limit))
    }

    async fn link_telegram_wallet(&self, telegram_user_id: i64, wallet: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let link = inner
            .telegram_users
            .entry(telegram_user_id)
            .or_insert_with(|| TelegramLink {
                telegram_user_id,
                wallet_address: None,
                chat_id: None,
            });
        link.wallet_address = Some(wallet.to_string());
        Ok(())
    }

    async fn link_telegram_chat(&self, telegram_user_id: i64, chat_id: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let link = inner
            .telegram_users
            .entry(telegram_user_id)
            .or_insert_with(|| TelegramLink {
                telegram_user_id,
                wallet_address: None,
                chat_id: None,
            });
        link.chat_id = Some(chat_id);
        Ok(())
    }

    async fn find_chat_id(&self, wallet: &str) -> StoreResult<Option<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .telegram_users
            .values()
            .filter(|link| link.wallet_address.as_deref() == Some(wallet))
            .find_map(|link| link.chat_id))
    }
}
