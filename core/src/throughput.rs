//! Network throughput metrics: value moved, fees, rate and activity.

use crate::{
    config::{LARGE_TX_MAX_USD, MEDIUM_TX_MAX_USD, SMALL_TX_MAX_USD, ZATOSHI_PER_ZEC},
    stats,
    table::{Block, InputRecord, OutputRecord, Transaction},
    types::{Usd, Zec},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Transaction size bucket by quote-currency output total.
/// Upper bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    Whale,
}

impl SizeCategory {
    pub fn from_usd(value: Usd) -> Self {
        if value <= SMALL_TX_MAX_USD {
            SizeCategory::Small
        } else if value <= MEDIUM_TX_MAX_USD {
            SizeCategory::Medium
        } else if value <= LARGE_TX_MAX_USD {
            SizeCategory::Large
        } else {
            SizeCategory::Whale
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkThroughputMetrics {
    pub total_zec_transferred: Zec,
    pub total_usd_transferred: Usd,
    pub average_transaction_fee_usd: Usd,
    pub median_transaction_fee_usd: Usd,
    pub minimum_transaction_fee_usd: Usd,
    pub maximum_transaction_fee_usd: Usd,
    pub estimated_tps: f64,
    pub num_unique_active_addresses: u64,
    /// Only non-empty buckets appear.
    pub transaction_size_category_counts: BTreeMap<SizeCategory, u64>,
}

impl NetworkThroughputMetrics {
    pub fn compute(
        blocks: &[Block],
        transactions: &[Transaction],
        inputs: &[InputRecord],
        outputs: &[OutputRecord],
    ) -> Self {
        let output_totals: Vec<f64> = transactions.iter().map(|tx| tx.output_total).collect();
        let output_totals_usd: Vec<Usd> =
            transactions.iter().map(|tx| tx.output_total_usd).collect();
        let fees = fee_series(transactions);

        Self {
            total_zec_transferred: stats::sum(&output_totals) / ZATOSHI_PER_ZEC,
            total_usd_transferred: stats::sum(&output_totals_usd),
            average_transaction_fee_usd: stats::mean(&fees),
            median_transaction_fee_usd: stats::median(&fees),
            minimum_transaction_fee_usd: stats::min(&fees),
            maximum_transaction_fee_usd: stats::max(&fees),
            estimated_tps: estimated_tps(transactions.len(), blocks),
            num_unique_active_addresses: unique_active_addresses(inputs, outputs),
            transaction_size_category_counts: size_category_counts(transactions),
        }
    }
}

/// Fees of every transaction that reports one.
pub fn fee_series(transactions: &[Transaction]) -> Vec<Usd> {
    transactions.iter().filter_map(|tx| tx.fee_usd).collect()
}

/// Span between the earliest and latest block, in seconds.
pub fn block_span_seconds(blocks: &[Block]) -> f64 {
    let first = blocks.iter().map(|b| b.time).min();
    let last = blocks.iter().map(|b| b.time).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_milliseconds() as f64 / 1000.0,
        _ => 0.0,
    }
}

/// Transactions per second over the block span; 0 when the span is not positive.
pub fn estimated_tps(total_transactions: usize, blocks: &[Block]) -> f64 {
    let span = block_span_seconds(blocks);
    if span > 0.0 {
        total_transactions as f64 / span
    } else {
        0.0
    }
}

/// Distinct recipients across spends and receives. Blank identifiers are
/// not addresses and are skipped.
pub fn unique_active_addresses(inputs: &[InputRecord], outputs: &[OutputRecord]) -> u64 {
    inputs
        .iter()
        .map(|r| r.recipient.as_str())
        .chain(outputs.iter().map(|r| r.recipient.as_str()))
        .filter(|r| !r.trim().is_empty())
        .collect::<HashSet<_>>()
        .len() as u64
}

pub fn size_category_counts(transactions: &[Transaction]) -> BTreeMap<SizeCategory, u64> {
    let mut counts = BTreeMap::new();
    for tx in transactions {
        *counts
            .entry(SizeCategory::from_usd(tx.output_total_usd))
            .or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_timestamp;

    fn block(time: &str, tx_count: i64) -> Block {
        Block {
            time: parse_timestamp(time).unwrap(),
            difficulty: Some(1.0),
            transaction_count: Some(tx_count),
            fee_total: Some(0.0),
            size: Some(1000.0),
            guessed_miner: None,
        }
    }

    fn tx(usd: Usd, fee: Option<Usd>) -> Transaction {
        Transaction {
            shielded_value_delta: 0,
            fee_usd: fee,
            output_total: 0.0,
            output_total_usd: usd,
        }
    }

    #[test]
    fn categorizes_by_inclusive_upper_bound() {
        let cats: Vec<_> = [50.0, 500.0, 5_000.0, 50_000.0]
            .into_iter()
            .map(SizeCategory::from_usd)
            .collect();
        assert_eq!(
            cats,
            vec![
                SizeCategory::Small,
                SizeCategory::Medium,
                SizeCategory::Large,
                SizeCategory::Whale
            ]
        );
        assert_eq!(SizeCategory::from_usd(100.0), SizeCategory::Small);
        assert_eq!(SizeCategory::from_usd(1_000.0), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_usd(10_000.0), SizeCategory::Large);
        assert_eq!(SizeCategory::from_usd(10_000.01), SizeCategory::Whale);
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let counts = size_category_counts(&[tx(10.0, None), tx(20.0, None), tx(20_000.0, None)]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&SizeCategory::Small], 2);
        assert_eq!(counts[&SizeCategory::Whale], 1);
        assert!(!counts.contains_key(&SizeCategory::Medium));
    }

    #[test]
    fn tps_is_zero_for_identical_timestamps() {
        let blocks = vec![
            block("2024-01-01 12:00:00", 3),
            block("2024-01-01 12:00:00", 4),
        ];
        assert_eq!(estimated_tps(10, &blocks), 0.0);
        assert_eq!(estimated_tps(10, &[]), 0.0);
    }

    #[test]
    fn tps_spans_earliest_to_latest_block() {
        let blocks = vec![
            block("2024-01-01 00:01:40", 1),
            block("2024-01-01 00:00:00", 1),
            block("2024-01-01 00:00:50", 1),
        ];
        assert_eq!(block_span_seconds(&blocks), 100.0);
        assert_eq!(estimated_tps(50, &blocks), 0.5);
    }

    #[test]
    fn active_addresses_union_inputs_and_outputs() {
        let inputs = vec![
            InputRecord { recipient: "t1a".into() },
            InputRecord { recipient: "t1b".into() },
        ];
        let outputs = vec![
            OutputRecord { recipient: "t1b".into(), value: Some(1), value_usd: Some(0.0) },
            OutputRecord { recipient: "t1c".into(), value: Some(1), value_usd: Some(0.0) },
            OutputRecord { recipient: "".into(), value: Some(1), value_usd: Some(0.0) },
        ];
        assert_eq!(unique_active_addresses(&inputs, &outputs), 3);
    }

    #[test]
    fn fee_statistics_skip_missing_fees() {
        let txs = vec![tx(0.0, Some(0.02)), tx(0.0, None), tx(0.0, Some(0.04)), tx(0.0, Some(0.03))];
        let m = NetworkThroughputMetrics::compute(&[], &txs, &[], &[]);
        assert_eq!(m.minimum_transaction_fee_usd, 0.02);
        assert_eq!(m.maximum_transaction_fee_usd, 0.04);
        assert_eq!(m.median_transaction_fee_usd, 0.03);
        assert_eq!(m.estimated_tps, 0.0);
    }
}
