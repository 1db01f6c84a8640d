//! Deterministic per-wallet sample data
//!
//! Stands in for a real trading engine: every generator draws from the
//! wallet's own random stream, so a wallet always sees the same history.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::models::*;
use crate::stats::round4;
use crate::wallet::wallet_rng;

pub const DEXES: [&str; 5] = ["Uniswap", "SushiSwap", "Curve", "Balancer", "PancakeSwap"];
pub const PAIRS: [&str; 5] = ["ETH/USDT", "WBTC/ETH", "ETH/DAI", "ARB/ETH", "UNI/USDC"];

const LOG_MESSAGES: [&str; 7] = [
    "Scanner tick completed",
    "Liquidity snapshot updated",
    "Price impact above threshold",
    "Adapter heartbeat ok",
    "Execution delayed by RPC",
    "Profit window met",
    "Route rejected due to gas cost",
];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Operations spread evenly over the last 24 hours, oldest first
pub fn generate_ops(wallet_address: &str, count: usize) -> Vec<Operation> {
    let mut rng = wallet_rng(wallet_address);
    let now = Utc::now();
    let window_secs = 24 * 3600;

    (0..count)
        .map(|i| {
            let offset = window_secs * (count - i) as i64 / count as i64;
            let pair = pick(&mut rng, &PAIRS);
            let dex = pick(&mut rng, &DEXES);
            let profit = round4(rng.gen_range(-0.05..=0.24));
            let fees = round4(rng.gen_range(0.001..=0.02));
            let exec_time_ms = rng.gen_range(180..=1450);
            let status = if profit > 0.0 { OpStatus::Success } else { OpStatus::Fail };

            Operation {
                id: Uuid::new_v4(),
                wallet_address: wallet_address.to_string(),
                timestamp: now - Duration::seconds(offset),
                pair: pair.to_string(),
                dex: dex.to_string(),
                profit,
                fees,
                exec_time_ms,
                status,
                error_message: match status {
                    OpStatus::Success => None,
                    OpStatus::Fail => Some("Slippage exceeded".to_string()),
                },
            }
        })
        .collect()
}

/// Log entries six minutes apart, oldest first
pub fn generate_logs(wallet_address: &str, count: usize) -> Vec<LogEntry> {
    let mut rng = wallet_rng(wallet_address);
    let levels = [LogLevel::Info, LogLevel::Warning, LogLevel::Error];
    let now = Utc::now();

    (0..count)
        .map(|i| LogEntry {
            id: Uuid::new_v4(),
            wallet_address: wallet_address.to_string(),
            created_at: now - Duration::minutes(6 * (count - i) as i64),
            level: levels.choose(&mut rng).copied().unwrap_or_default(),
            message: pick(&mut rng, &LOG_MESSAGES).to_string(),
            context: serde_json::json!({ "tick": i + 1 }),
        })
        .collect()
}

/// Canned notifications two hours apart
pub fn generate_notifications(wallet_address: &str, count: usize) -> Vec<Notification> {
    let items = [
        (NotificationType::Opportunity, "New opportunity", "Route ETH/USDT via Uniswap > Curve"),
        (NotificationType::Deal, "Deal completed", "+0.12 ETH net profit"),
        (NotificationType::Error, "Critical error", "Gas price spike interrupted execution"),
        (NotificationType::Info, "Bot started", "Monitoring enabled"),
        (NotificationType::Info, "Bot stopped", "Monitoring paused"),
    ];
    let count = count.min(items.len());
    let now = Utc::now();

    items
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, (kind, title, message))| Notification {
            created_at: now - Duration::hours(2 * (count - i) as i64),
            ..Notification::new(wallet_address, *kind, title, message)
        })
        .collect()
}

pub fn generate_opportunities(wallet_address: &str, count: usize) -> Vec<Opportunity> {
    let mut rng = wallet_rng(wallet_address);

    (0..count)
        .map(|i| Opportunity {
            id: format!("opp-{}", i + 1),
            pair: pick(&mut rng, &PAIRS).to_string(),
            dex: pick(&mut rng, &DEXES).to_string(),
            expected_profit_pct: round2(rng.gen_range(0.2..=1.4)),
            liquidity_score: round2(rng.gen_range(0.6..=0.98)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0xde709f2102306220921060314715629080e2fb77";

    #[test]
    fn test_ops_are_deterministic_per_wallet() {
        let a = generate_ops(WALLET, 30);
        let b = generate_ops(WALLET, 30);
        assert_eq!(a.len(), 30);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.pair, y.pair);
            assert_eq!(x.profit, y.profit);
            assert_eq!(x.status, y.status);
        }
    }

    #[test]
    fn test_op_status_follows_profit() {
        for op in generate_ops(WALLET, 50) {
            assert!((-0.05..=0.24).contains(&op.profit));
            match op.status {
                OpStatus::Success => {
                    assert!(op.profit > 0.0);
                    assert!(op.error_message.is_none());
                }
                OpStatus::Fail => {
                    assert!(op.profit <= 0.0);
                    assert_eq!(op.error_message.as_deref(), Some("Slippage exceeded"));
                }
            }
        }
    }

    #[test]
    fn test_ops_oldest_first_within_a_day() {
        let ops = generate_ops(WALLET, 10);
        assert!(ops.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(Utc::now() - ops[0].timestamp <= Duration::hours(24));
    }

    #[test]
    fn test_logs_carry_tick_context() {
        let logs = generate_logs(WALLET, 12);
        assert_eq!(logs.len(), 12);
        assert_eq!(logs[0].context["tick"], 1);
        assert_eq!(logs[11].context["tick"], 12);
    }

    #[test]
    fn test_notifications_capped_at_canned_set() {
        assert_eq!(generate_notifications(WALLET, 10).len(), 5);
        let two = generate_notifications(WALLET, 2);
        assert_eq!(two[0].kind, NotificationType::Opportunity);
        assert!(two.iter().all(|n| !n.read));
    }

    #[test]
    fn test_opportunities_ranges() {
        let opps = generate_opportunities(WALLET, 4);
        assert_eq!(opps[3].id, "opp-4");
        for opp in opps {
            assert!((0.2..=1.4).contains(&opp.expected_profit_pct));
            assert!((0.6..=0.98).contains(&opp.liquidity_score));
        }
    }
}
