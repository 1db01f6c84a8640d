//! KPI and summary aggregation over operation records
//!
//! Pure functions: sums and counts only, so the result does not depend on
//! the order of the input.

use crate::models::{BotKpis, OpStatus, Operation, StatsSummary};

/// Round to 4 decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

pub fn compute_kpis(ops: &[Operation]) -> BotKpis {
    let (profit, completed) = ops
        .iter()
        .filter(|op| op.status == OpStatus::Success)
        .fold((0.0_f64, 0_i64), |(profit, count), op| (profit + op.profit, count + 1));

    let avg = if completed > 0 { profit / completed as f64 } else { 0.0 };

    BotKpis {
        current_profit: round4(profit),
        completed_deals: completed,
        avg_profitability: round4(avg),
    }
}

pub fn compute_summary(ops: &[Operation]) -> StatsSummary {
    let kpis = compute_kpis(ops);
    let success_rate = if ops.is_empty() {
        0.0
    } else {
        kpis.completed_deals as f64 / ops.len() as f64
    };

    StatsSummary {
        total_profit: kpis.current_profit,
        successful_arbs: kpis.completed_deals,
        avg_profitability: kpis.avg_profitability,
        success_rate: round4(success_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn op(profit: f64, status: OpStatus) -> Operation {
        Operation {
            id: Uuid::new_v4(),
            wallet_address: "0xabc".to_string(),
            timestamp: Utc::now(),
            pair: "ETH/USDT".to_string(),
            dex: "Uniswap".to_string(),
            profit,
            fees: 0.01,
            exec_time_ms: 300,
            status,
            error_message: None,
        }
    }

    #[test]
    fn test_empty_kpis() {
        let kpis = compute_kpis(&[]);
        assert_eq!(kpis.current_profit, 0.0);
        assert_eq!(kpis.completed_deals, 0);
        assert_eq!(kpis.avg_profitability, 0.0);
    }

    #[test]
    fn test_failed_ops_do_not_count() {
        let ops = vec![op(0.1, OpStatus::Success), op(-0.3, OpStatus::Fail)];
        let kpis = compute_kpis(&ops);
        assert_eq!(kpis.current_profit, 0.1);
        assert_eq!(kpis.completed_deals, 1);
        assert_eq!(kpis.avg_profitability, 0.1);
    }

    #[test]
    fn test_only_failures() {
        let ops = vec![op(-0.1, OpStatus::Fail), op(-0.2, OpStatus::Fail)];
        let summary = compute_summary(&ops);
        assert_eq!(summary.total_profit, 0.0);
        assert_eq!(summary.avg_profitability, 0.0);
        assert_eq!(summary.success_rate, 0.0);
    }

    #[test]
    fn test_success_rate_rounding() {
        let ops = vec![
            op(0.1, OpStatus::Success),
            op(0.2, OpStatus::Success),
            op(0.0, OpStatus::Fail),
        ];
        let summary = compute_summary(&ops);
        assert_eq!(summary.success_rate, 0.6667);
        assert_eq!(summary.successful_arbs, 2);
        assert_eq!(summary.total_profit, 0.3);
        assert_eq!(summary.avg_profitability, 0.15);
    }

    #[test]
    fn test_order_independent() {
        let mut ops = vec![
            op(0.12345, OpStatus::Success),
            op(0.5, OpStatus::Fail),
            op(0.07777, OpStatus::Success),
        ];
        let forward = compute_summary(&ops);
        ops.reverse();
        assert_eq!(forward, compute_summary(&ops));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(compute_summary(&[]), StatsSummary::default());
    }
}
