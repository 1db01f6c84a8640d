use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bot lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "bot_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    #[default]
    Stopped,
    Active,
    Error,
}

impl BotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotStatus::Stopped => "stopped",
            BotStatus::Active => "active",
            BotStatus::Error => "error",
        }
    }
}

/// Outcome of a single trading attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "op_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OpStatus {
    #[default]
    Success,
    Fail,
}

impl OpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpStatus::Success => "success",
            OpStatus::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[default]
    Info,
    Deal,
    Opportunity,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "log_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// User entity, keyed by wallet address
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub total_profit: f64,
    pub successful_arbs: i64,
    pub avg_profitability: f64,
    #[serde(skip_serializing)]
    pub access_token_hash: Option<String>,
}

impl User {
    pub fn new(wallet_address: &str, access_token_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            wallet_address: wallet_address.to_string(),
            created_at: now,
            last_login: Some(now),
            total_profit: 0.0,
            successful_arbs: 0,
            avg_profitability: 0.0,
            access_token_hash,
        }
    }
}

/// Bot state row: one per wallet, last write wins
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BotState {
    pub wallet_address: String,
    pub status: BotStatus,
    pub last_error: Option<String>,
    pub last_change_at: DateTime<Utc>,
}

/// How a status mutation treats the stored `last_error`
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorUpdate {
    Keep,
    Replace(Option<String>),
}

/// Operation record (append-only)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub wallet_address: String,
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub dex: String,
    pub profit: f64,
    pub fees: f64,
    pub exec_time_ms: i64,
    pub status: OpStatus,
    pub error_message: Option<String>,
}

/// Notification entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub read: bool,
}

impl Notification {
    pub fn new(wallet_address: &str, kind: NotificationType, title: &str, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_address: wallet_address.to_string(),
            created_at: Utc::now(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            read: false,
        }
    }
}

/// Log entry entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub context: serde_json::Value,
}

/// Per-wallet bot settings
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BotSettings {
    #[serde(skip_serializing)]
    pub wallet_address: String,
    pub min_profit_pct: f64,
    pub loan_limit: f64,
    pub dex_list: Vec<String>,
    pub pairs: Vec<String>,
    pub scan_frequency_sec: i32,
    pub updated_at: DateTime<Utc>,
}

impl BotSettings {
    /// Defaults handed out on first read
    pub fn default_for(wallet_address: &str) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            min_profit_pct: 0.3,
            loan_limit: 3.0,
            dex_list: vec!["Uniswap".to_string(), "SushiSwap".to_string(), "Curve".to_string()],
            pairs: vec!["ETH/USDT".to_string(), "WBTC/ETH".to_string()],
            scan_frequency_sec: 15,
            updated_at: Utc::now(),
        }
    }
}

/// Telegram user -> wallet/chat link
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TelegramLink {
    pub telegram_user_id: i64,
    pub wallet_address: Option<String>,
    pub chat_id: Option<i64>,
}

/// Filters shared by the ops listing, summary and exports
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpsFilter {
    #[serde(rename = "from")]
    pub from_ts: Option<DateTime<Utc>>,
    #[serde(rename = "to")]
    pub to_ts: Option<DateTime<Utc>>,
    pub pair: Option<String>,
    pub dex: Option<String>,
}

impl OpsFilter {
    pub fn matches(&self, op: &Operation) -> bool {
        self.from_ts.map_or(true, |from| op.timestamp >= from)
            && self.to_ts.map_or(true, |to| op.timestamp <= to)
            && self.pair.as_ref().map_or(true, |pair| &op.pair == pair)
            && self.dex.as_ref().map_or(true, |dex| &op.dex == dex)
    }
}

// Response types for API

/// Public profile view of a user
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub wallet_address: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub total_profit: f64,
    pub successful_arbs: i64,
    pub avg_profitability: f64,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            wallet_address: user.wallet_address.clone(),
            created_at: Some(user.created_at),
            last_login: user.last_login,
            total_profit: user.total_profit,
            successful_arbs: user.successful_arbs,
            avg_profitability: user.avg_profitability,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BotKpis {
    pub current_profit: f64,
    pub completed_deals: i64,
    pub avg_profitability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_profit: f64,
    pub successful_arbs: i64,
    pub avg_profitability: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotStatusResponse {
    pub status: BotStatus,
    pub last_error: Option<String>,
    pub kpis: BotKpis,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotActionResponse {
    pub status: BotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub pair: String,
    pub dex: String,
    pub expected_profit_pct: f64,
    pub liquidity_score: f64,
}

#[derive(Debug, Serialize)]
pub struct MarketAnalysisResponse {
    pub summary: StatsSummary,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct EventAccepted {
    pub status: &'static str,
}

// Request types for API

#[derive(Debug, Deserialize, validator::Validate)]
pub struct LoginRequest {
    pub wallet_address: String,
    #[validate(length(min = 3))]
    pub access_token: String,
    pub telegram_user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, validator::Validate)]
pub struct SettingsInput {
    #[serde(default = "default_min_profit_pct")]
    #[validate(range(min = 0.0))]
    pub min_profit_pct: f64,
    #[serde(default = "default_loan_limit")]
    #[validate(range(min = 0.0))]
    pub loan_limit: f64,
    #[serde(default)]
    pub dex_list: Vec<String>,
    #[serde(default)]
    pub pairs: Vec<String>,
    #[serde(default = "default_scan_frequency_sec")]
    #[validate(range(min = 1))]
    pub scan_frequency_sec: i32,
}

fn default_min_profit_pct() -> f64 {
    0.3
}

fn default_loan_limit() -> f64 {
    3.0
}

fn default_scan_frequency_sec() -> i32 {
    15
}

#[derive(Debug, Deserialize)]
pub struct NotificationReadRequest {
    pub ids: Vec<Uuid>,
}

/// `limit` is bounded to 1..=2000 on every list endpoint
#[derive(Debug, Deserialize, validator::Validate)]
pub struct ListQuery {
    #[validate(range(min = 1, max = 2000))]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct OpsQuery {
    #[serde(rename = "from")]
    pub from_ts: Option<DateTime<Utc>>,
    #[serde(rename = "to")]
    pub to_ts: Option<DateTime<Utc>>,
    pub pair: Option<String>,
    pub dex: Option<String>,
    #[validate(range(min = 1, max = 2000))]
    pub limit: Option<i64>,
}

impl OpsQuery {
    pub fn filter(&self) -> OpsFilter {
        OpsFilter {
            from_ts: self.from_ts,
            to_ts: self.to_ts,
            pair: self.pair.clone(),
            dex: self.dex.clone(),
        }
    }
}

/// Event pushed by the external trading engine
#[derive(Debug, Deserialize)]
pub struct InternalEvent {
    pub wallet_address: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}
