use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Db, Store, StoreResult};
use crate::models::*;

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: Db,
}

impl PgStore {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, wallet: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                wallet_address, created_at, last_login, total_profit,
                successful_arbs, avg_profitability, access_token_hash
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&user.wallet_address)
        .bind(user.created_at)
        .bind(user.last_login)
        .bind(user.total_profit)
        .bind(user.successful_arbs)
        .bind(user.avg_profitability)
        .bind(&user.access_token_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch_last_login(&self, wallet: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE wallet_address = $1")
            .bind(wallet)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_access_token_hash(&self, wallet: &str, hash: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET access_token_hash = $1 WHERE wallet_address = $2")
            .bind(hash)
            .bind(wallet)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_successful_op(&self, wallet: &str, profit: f64) -> StoreResult<User> {
        // Single statement: the row lock taken by ON CONFLICT serialises
        // concurrent increments for the same wallet.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (wallet_address, created_at, total_profit, successful_arbs, avg_profitability)
            VALUES ($1, NOW(), $2, 1, $2)
            ON CONFLICT (wallet_address) DO UPDATE SET
                total_profit = users.total_profit + EXCLUDED.total_profit,
                successful_arbs = users.successful_arbs + 1,
                avg_profitability = (users.total_profit + EXCLUDED.total_profit)
                    / (users.successful_arbs + 1)
            RETURNING *
            "#,
        )
        .bind(wallet)
        .bind(profit)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_settings(&self, wallet: &str) -> StoreResult<Option<BotSettings>> {
        let settings =
            sqlx::query_as::<_, BotSettings>("SELECT * FROM settings WHERE wallet_address = $1")
                .bind(wallet)
                .fetch_optional(&self.pool)
                .await?;
        Ok(settings)
    }

    async fn upsert_settings(&self, settings: &BotSettings) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (
                wallet_address, min_profit_pct, loan_limit, dex_list, pairs,
                scan_frequency_sec, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (wallet_address) DO UPDATE SET
                min_profit_pct = EXCLUDED.min_profit_pct,
                loan_limit = EXCLUDED.loan_limit,
                dex_list = EXCLUDED.dex_list,
                pairs = EXCLUDED.pairs,
                scan_frequency_sec = EXCLUDED.scan_frequency_sec,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&settings.wallet_address)
        .bind(settings.min_profit_pct)
        .bind(settings.loan_limit)
        .bind(&settings.dex_list)
        .bind(&settings.pairs)
        .bind(settings.scan_frequency_sec)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_bot_state(&self, wallet: &str) -> StoreResult<Option<BotState>> {
        let state =
            sqlx::query_as::<_, BotState>("SELECT * FROM bot_state WHERE wallet_address = $1")
                .bind(wallet)
                .fetch_optional(&self.pool)
                .await?;
        Ok(state)
    }

    async fn set_bot_status(
        &self,
        wallet: &str,
        status: BotStatus,
        last_error: ErrorUpdate,
    ) -> StoreResult<BotState> {
        let (replace_error, error_value) = match last_error {
            ErrorUpdate::Keep => (false, None),
            ErrorUpdate::Replace(value) => (true, value),
        };

        let state = sqlx::query_as::<_, BotState>(
            r#"
            INSERT INTO bot_state (wallet_address, status, last_error, last_change_at)
            VALUES ($1, $2, $4, NOW())
            ON CONFLICT (wallet_address) DO UPDATE SET
                status = EXCLUDED.status,
                last_error = CASE WHEN $3 THEN EXCLUDED.last_error ELSE bot_state.last_error END,
                last_change_at = GREATEST(NOW(), bot_state.last_change_at + INTERVAL '1 microsecond')
            RETURNING *
            "#,
        )
        .bind(wallet)
        .bind(status)
        .bind(replace_error)
        .bind(error_value)
        .fetch_one(&self.pool)
        .await?;
        Ok(state)
    }

    async fn init_bot_state(&self, wallet: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO bot_state (wallet_address, status, last_error, last_change_at)
            VALUES ($1, 'stopped', NULL, NOW())
            ON CONFLICT (wallet_address) DO NOTHING
            "#,
        )
        .bind(wallet)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_active_wallets(&self) -> StoreResult<Vec<String>> {
        let wallets: Vec<String> = sqlx::query_scalar(
            "SELECT wallet_address FROM bot_state WHERE status = 'active' ORDER BY wallet_address",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(wallets)
    }

    async fn insert_op(&self, op: &Operation) -> StoreResult<()> {
        self.insert_ops(std::slice::from_ref(op)).await
    }

    async fn insert_ops(&self, ops: &[Operation]) -> StoreResult<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO ops (id, wallet_address, timestamp, pair, dex, profit, fees, exec_time_ms, status, error_message) ",
        );
        builder.push_values(ops, |mut row, op| {
            row.push_bind(op.id)
                .push_bind(&op.wallet_address)
                .push_bind(op.timestamp)
                .push_bind(&op.pair)
                .push_bind(&op.dex)
                .push_bind(op.profit)
                .push_bind(op.fees)
                .push_bind(op.exec_time_ms)
                .push_bind(op.status)
                .push_bind(&op.error_message);
        });
        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn count_ops(&self, wallet: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ops WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_ops(&self, wallet: &str, filter: &OpsFilter, limit: i64) -> StoreResult<Vec<Operation>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM ops WHERE wallet_address = ");
        builder.push_bind(wallet);
        if let Some(from) = filter.from_ts {
            builder.push(" AND timestamp >= ").push_bind(from);
        }
        if let Some(to) = filter.to_ts {
            builder.push(" AND timestamp <= ").push_bind(to);
        }
        if let Some(pair) = &filter.pair {
            builder.push(" AND pair = ").push_bind(pair);
        }
        if let Some(dex) = &filter.dex {
            builder.push(" AND dex = ").push_bind(dex);
        }
        builder.push(" ORDER BY timestamp DESC LIMIT ").push_bind(limit);

        let ops = builder
            .build_query_as::<Operation>()
            .fetch_all(&self.pool)
            .await?;
        Ok(ops)
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.insert_notifications(std::slice::from_ref(notification)).await
    }

    async fn insert_notifications(&self, notifications: &[Notification]) -> StoreResult<()> {
        if notifications.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO notifications (id, wallet_address, created_at, type, title, message, read) ",
        );
        builder.push_values(notifications, |mut row, n| {
            row.push_bind(n.id)
                .push_bind(&n.wallet_address)
                .push_bind(n.created_at)
                .push_bind(n.kind)
                .push_bind(&n.title)
                .push_bind(&n.message)
                .push_bind(n.read);
        });
        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn count_notifications(&self, wallet: &str) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE wallet_address = $1")
                .bind(wallet)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn list_notifications(&self, wallet: &str, limit: i64) -> StoreResult<Vec<Notification>> {
        let items = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE wallet_address = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(wallet)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn mark_notifications_read(&self, wallet: &str, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE wallet_address = $1 AND id = ANY($2)",
        )
        .bind(wallet)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn insert_log(&self, entry: &LogEntry) -> StoreResult<()> {
        self.insert_logs(std::slice::from_ref(entry)).await
    }

    async fn insert_logs(&self, entries: &[LogEntry]) -> StoreResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO logs (id, wallet_address, created_at, level, message, context) ",
        );
        builder.push_values(entries, |mut row, entry| {
            row.push_bind(entry.id)
                .push_bind(&entry.wallet_address)
                .push_bind(entry.created_at)
                .push_bind(entry.level)
                .push_bind(&entry.message)
                .push_bind(&entry.context);
        });
        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn count_logs(&self, wallet: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE wallet_address = $1")
            .bind(wallet)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_logs(&self, wallet: &str, limit: i64) -> StoreResult<Vec<LogEntry>> {
        let items = sqlx::query_as::<_, LogEntry>(
            "SELECT * FROM logs WHERE wallet_address = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(wallet)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn link_telegram_wallet(&self, telegram_user_id: i64, wallet: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO telegram_users (telegram_user_id, wallet_address)
            VALUES ($1, $2)
            ON CONFLICT (telegram_user_id) DO UPDATE SET wallet_address = EXCLUDED.wallet_address
            "#,
        )
        .bind(telegram_user_id)
        .bind(wallet)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn link_telegram_chat(&self, telegram_user_id: i64, chat_id: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO telegram_users (telegram_user_id, chat_id)
            VALUES ($1, $2)
            ON CONFLICT (telegram_user_id) DO UPDATE SET chat_id = EXCLUDED.chat_id
            "#,
        )
        .bind(telegram_user_id)
        .bind(chat_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_chat_id(&self, wallet: &str) -> StoreResult<Option<i64>> {
        let link = sqlx::query_as::<_, TelegramLink>(
            "SELECT * FROM telegram_users WHERE wallet_address = $1 AND chat_id IS NOT NULL LIMIT 1",
        )
        .bind(wallet)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link.and_then(|l| l.chat_id))
    }
}
