//! Extended daily insights: whale movements, IQR anomalies, block and miner
//! statistics.
//!
//! These are computed on every successful run and logged, but are not part
//! of the `metrics_<date>.json` report shape.

use crate::{
    config::{
        MINER_DOMINANCE_MAJORITY_PCT, MINER_DOMINANCE_WARN_PCT, TOP_WHALE_TRANSFERS,
        WHALE_OUTPUT_THRESHOLDS_USD,
    },
    privacy::{absolute_shielded_deltas, to_zec},
    stats::{self, IqrFence},
    table::{Block, DailyTables, OutputRecord, Transaction},
    types::{Usd, Zec},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMovement {
    pub recipient: String,
    pub value_zec: Option<Zec>,
    pub value_usd: Option<Usd>,
}

impl From<&OutputRecord> for OutputMovement {
    fn from(o: &OutputRecord) -> Self {
        Self {
            recipient: o.recipient.clone(),
            value_zec: o.value.map(to_zec),
            value_usd: o.value_usd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleActivity {
    pub outputs_over_10k_usd: u64,
    pub outputs_over_100k_usd: u64,
    pub outputs_over_1m_usd: u64,
    pub largest_zec_movement: Option<OutputMovement>,
    pub largest_usd_movement: Option<OutputMovement>,
    pub top_whale_transfers: Vec<OutputMovement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientActivity {
    pub recipient: String,
    pub output_count: u64,
    pub total_value_usd: Usd,
}

/// Rows flagged by the upper IQR fence. `rows` are 0-based positions in the
/// source relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlaggedRows {
    pub fence: IqrFence,
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub high_fee_transactions: FlaggedRows,
    pub high_transaction_count_blocks: FlaggedRows,
    pub shielded_value_spikes: FlaggedRows,
    pub output_count_threshold: f64,
    pub high_output_count_recipients: Vec<RecipientActivity>,
    pub total_value_threshold_usd: Usd,
    pub high_value_recipients: Vec<RecipientActivity>,
}

impl AnomalyReport {
    pub fn total_flagged(&self) -> usize {
        self.high_fee_transactions.rows.len()
            + self.high_transaction_count_blocks.rows.len()
            + self.shielded_value_spikes.rows.len()
            + self.high_output_count_recipients.len()
            + self.high_value_recipients.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStatistics {
    pub total_blocks_mined: u64,
    /// Seconds between consecutive blocks; absent with fewer than two blocks.
    pub min_block_interval_secs: Option<f64>,
    pub max_block_interval_secs: Option<f64>,
    pub average_block_difficulty: f64,
    pub average_transactions_per_block: f64,
    pub total_miner_fees: f64,
    pub average_block_size: f64,
    /// Percent of attributed blocks per miner.
    pub miner_share_pct: BTreeMap<String, f64>,
    pub miners_above_40_pct: Vec<String>,
    pub miners_above_50_pct: Vec<String>,
    /// Blocks carrying only the coinbase transaction.
    pub near_empty_blocks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInsights {
    pub whales: WhaleActivity,
    pub anomalies: AnomalyReport,
    pub blocks: BlockStatistics,
}

impl DailyInsights {
    pub fn compute(tables: &DailyTables) -> Self {
        Self {
            whales: whale_activity(&tables.outputs),
            anomalies: anomalies(&tables.blocks, &tables.transactions, &tables.outputs),
            blocks: block_statistics(&tables.blocks),
        }
    }
}

// ── Whale activity ───────────────────────────────────────────────────────────

pub fn whale_activity(outputs: &[OutputRecord]) -> WhaleActivity {
    let over = |threshold: Usd| outputs.iter().filter(|o| o.value_usd.is_some_and(|v| v > threshold)).count() as u64;
    let [t10k, t100k, t1m] = WHALE_OUTPUT_THRESHOLDS_USD;

    WhaleActivity {
        outputs_over_10k_usd: over(t10k),
        outputs_over_100k_usd: over(t100k),
        outputs_over_1m_usd: over(t1m),
        largest_zec_movement: first_max_by(outputs, |o| o.value.map(|v| v as f64)).map(OutputMovement::from),
        largest_usd_movement: first_max_by(outputs, |o| o.value_usd).map(OutputMovement::from),
        top_whale_transfers: top_by_usd(outputs, TOP_WHALE_TRANSFERS),
    }
}

/// First row holding the maximum key. Rows without a key are skipped.
fn first_max_by<T, F: Fn(&T) -> Option<f64>>(rows: &[T], key: F) -> Option<&T> {
    let mut best: Option<(&T, f64)> = None;
    for row in rows {
        let Some(value) = key(row) else { continue };
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((row, value)),
        }
    }
    best.map(|(row, _)| row)
}

/// Highest quote-currency outputs, descending. Ties keep file order;
/// outputs without a quote value are not ranked.
fn top_by_usd(outputs: &[OutputRecord], n: usize) -> Vec<OutputMovement> {
    let mut ranked: Vec<(&OutputRecord, Usd)> = outputs
        .iter()
        .filter_map(|o| o.value_usd.map(|usd| (o, usd)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(n)
        .map(|(o, _)| OutputMovement::from(o))
        .collect()
}

// ── Anomalies ────────────────────────────────────────────────────────────────

pub fn anomalies(
    blocks: &[Block],
    transactions: &[Transaction],
    outputs: &[OutputRecord],
) -> AnomalyReport {
    let fees: Vec<f64> = transactions
        .iter()
        .map(|tx| tx.fee_usd.unwrap_or(f64::NAN))
        .collect();
    let tx_counts: Vec<f64> = blocks
        .iter()
        .map(|b| b.transaction_count.map_or(f64::NAN, |n| n as f64))
        .collect();

    let recipients = recipient_activity(outputs);
    let (count_fence, by_count) = stats::outliers(&recipients, |r| r.output_count as f64);
    let (value_fence, by_value) = stats::outliers(&recipients, |r| r.total_value_usd);

    AnomalyReport {
        high_fee_transactions: flag_present(&fees),
        high_transaction_count_blocks: flag_present(&tx_counts),
        shielded_value_spikes: shielded_spikes(transactions),
        output_count_threshold: count_fence.threshold,
        high_output_count_recipients: by_count.into_iter().cloned().collect(),
        total_value_threshold_usd: value_fence.threshold,
        high_value_recipients: by_value.into_iter().cloned().collect(),
    }
}

/// Fence over the present (non-NaN) values; positions still refer to the
/// full series. NaN never exceeds a threshold.
fn flag_present(values: &[f64]) -> FlaggedRows {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let fence = IqrFence::from_values(&present);
    let rows = values
        .iter()
        .enumerate()
        .filter(|(_, v)| fence.exceeds(**v))
        .map(|(i, _)| i)
        .collect();
    FlaggedRows { fence, rows }
}

/// Fence over absolute shielded deltas, applied to every transaction.
fn shielded_spikes(transactions: &[Transaction]) -> FlaggedRows {
    let deltas = absolute_shielded_deltas(transactions);
    if deltas.is_empty() {
        return FlaggedRows::default();
    }
    let fence = IqrFence::from_values(&deltas);
    let rows = transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| fence.exceeds(to_zec(tx.shielded_value_delta.abs())))
        .map(|(i, _)| i)
        .collect();
    FlaggedRows { fence, rows }
}

/// Outputs grouped by recipient, ordered by recipient. Every output counts;
/// blank quote values add nothing to the total.
pub fn recipient_activity(outputs: &[OutputRecord]) -> Vec<RecipientActivity> {
    let mut grouped: BTreeMap<&str, (u64, Usd)> = BTreeMap::new();
    for o in outputs {
        let entry = grouped.entry(o.recipient.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += o.value_usd.unwrap_or(0.0);
    }
    grouped
        .into_iter()
        .map(|(recipient, (output_count, total_value_usd))| RecipientActivity {
            recipient: recipient.to_string(),
            output_count,
            total_value_usd,
        })
        .collect()
}

// ── Blocks and miners ────────────────────────────────────────────────────────

pub fn block_statistics(blocks: &[Block]) -> BlockStatistics {
    let mut times: Vec<_> = blocks.iter().map(|b| b.time).collect();
    times.sort();
    let intervals: Vec<f64> = times
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 1000.0)
        .collect();

    // Blank cells are skipped.
    let column = |f: fn(&Block) -> Option<f64>| {
        blocks.iter().filter_map(f).collect::<Vec<f64>>()
    };

    let miner_share_pct = miner_shares(blocks);
    let dominant = |level: f64| {
        miner_share_pct
            .iter()
            .filter(|(_, pct)| **pct > level)
            .map(|(miner, _)| miner.clone())
            .collect::<Vec<_>>()
    };
    let miners_above_40_pct = dominant(MINER_DOMINANCE_WARN_PCT);
    let miners_above_50_pct = dominant(MINER_DOMINANCE_MAJORITY_PCT);

    BlockStatistics {
        total_blocks_mined: blocks.len() as u64,
        min_block_interval_secs: intervals.iter().copied().reduce(f64::min),
        max_block_interval_secs: intervals.iter().copied().reduce(f64::max),
        average_block_difficulty: stats::mean(&column(|b| b.difficulty)),
        average_transactions_per_block: stats::mean(&column(|b| {
            b.transaction_count.map(|n| n as f64)
        })),
        total_miner_fees: stats::sum(&column(|b| b.fee_total)),
        average_block_size: stats::mean(&column(|b| b.size)),
        miner_share_pct,
        miners_above_40_pct,
        miners_above_50_pct,
        near_empty_blocks: blocks.iter().filter(|b| b.transaction_count == Some(1)).count() as u64,
    }
}

/// Share of attributed blocks per miner, in percent. Blocks without a
/// guessed miner are left out of the denominator.
fn miner_shares(blocks: &[Block]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for miner in blocks.iter().filter_map(|b| b.guessed_miner.as_deref()) {
        *counts.entry(miner.to_string()).or_insert(0) += 1;
    }
    let attributed: u64 = counts.values().sum();
    counts
        .into_iter()
        .map(|(miner, n)| (miner, n as f64 / attributed as f64 * 100.0))
        .collect()
}
