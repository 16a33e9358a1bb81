//! Shielded-pool flow metrics.
//!
//! A positive `shielded_value_delta` moves funds into the shielded pool,
//! a negative one moves funds out. Zero-delta transactions are transparent.

use crate::{
    config::ZATOSHI_PER_ZEC,
    stats,
    table::Transaction,
    types::{Zatoshi, Zec},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyMetrics {
    pub total_zec_shielded: Zec,
    pub total_zec_deshielded: Zec,
    pub net_privacy_flow: Zec,
    pub shielded_transactions_count: u64,
    pub percentage_shielded_transactions: f64,
    pub median_absolute_shielded_value_delta: Zec,
    pub mean_absolute_shielded_value_delta: Zec,
    pub transparent_transactions_count: u64,
}

pub fn to_zec(zatoshi: Zatoshi) -> Zec {
    zatoshi as f64 / ZATOSHI_PER_ZEC
}

/// Absolute display-denomination delta of every shielded transaction.
pub fn absolute_shielded_deltas(transactions: &[Transaction]) -> Vec<Zec> {
    transactions
        .iter()
        .filter(|tx| tx.shielded_value_delta != 0)
        .map(|tx| to_zec(tx.shielded_value_delta.abs()))
        .collect()
}

impl PrivacyMetrics {
    pub fn compute(transactions: &[Transaction]) -> Self {
        let shielded: Zatoshi = transactions
            .iter()
            .map(|tx| tx.shielded_value_delta)
            .filter(|d| *d > 0)
            .sum();
        let deshielded: Zatoshi = transactions
            .iter()
            .map(|tx| tx.shielded_value_delta)
            .filter(|d| *d < 0)
            .sum();
        let total_zec_shielded = to_zec(shielded);
        let total_zec_deshielded = to_zec(deshielded);

        let abs_deltas = absolute_shielded_deltas(transactions);
        let shielded_count = abs_deltas.len() as u64;
        let total = transactions.len() as u64;

        let percentage_shielded_transactions = if total > 0 {
            (shielded_count as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total_zec_shielded,
            total_zec_deshielded,
            net_privacy_flow: total_zec_shielded + total_zec_deshielded,
            shielded_transactions_count: shielded_count,
            percentage_shielded_transactions,
            median_absolute_shielded_value_delta: stats::median(&abs_deltas),
            mean_absolute_shielded_value_delta: stats::mean(&abs_deltas),
            transparent_transactions_count: total - shielded_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(delta: Zatoshi) -> Transaction {
        Transaction {
            shielded_value_delta: delta,
            fee_usd: Some(0.01),
            output_total: 0.0,
            output_total_usd: 0.0,
        }
    }

    #[test]
    fn shielding_flows_split_by_sign() {
        let txs = vec![tx(500_000_000), tx(-200_000_000), tx(0), tx(0)];
        let m = PrivacyMetrics::compute(&txs);

        assert_eq!(m.total_zec_shielded, 5.0);
        assert_eq!(m.total_zec_deshielded, -2.0);
        assert_eq!(m.net_privacy_flow, 3.0);
        assert_eq!(m.shielded_transactions_count, 2);
        assert_eq!(m.transparent_transactions_count, 2);
        assert_eq!(m.percentage_shielded_transactions, 50.0);
        assert_eq!(m.median_absolute_shielded_value_delta, 3.5);
        assert_eq!(m.mean_absolute_shielded_value_delta, 3.5);
    }

    #[test]
    fn empty_relation_yields_zeroes() {
        let m = PrivacyMetrics::compute(&[]);
        assert_eq!(m.percentage_shielded_transactions, 0.0);
        assert_eq!(m.median_absolute_shielded_value_delta, 0.0);
        assert_eq!(m.mean_absolute_shielded_value_delta, 0.0);
        assert_eq!(m.shielded_transactions_count, 0);
        assert_eq!(m.transparent_transactions_count, 0);
    }

    #[test]
    fn fully_transparent_day_has_no_shielded_statistics() {
        let m = PrivacyMetrics::compute(&[tx(0), tx(0), tx(0)]);
        assert_eq!(m.percentage_shielded_transactions, 0.0);
        assert_eq!(m.median_absolute_shielded_value_delta, 0.0);
        assert_eq!(m.transparent_transactions_count, 3);
    }
}
