//! Run configuration and the fixed constants every metric depends on.

use crate::types::{DateToken, Usd};
use std::path::{Path, PathBuf};

/// Smallest units per display unit (1 ZEC = 10^8 zatoshi).
pub const ZATOSHI_PER_ZEC: f64 = 1e8;

/// Multiplier applied to the interquartile range above Q3.
pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

// ── Transaction size buckets (upper bounds are inclusive) ───────────────────

pub const SMALL_TX_MAX_USD: Usd = 100.0;
pub const MEDIUM_TX_MAX_USD: Usd = 1_000.0;
pub const LARGE_TX_MAX_USD: Usd = 10_000.0;

// ── Whale outputs (strictly above) ──────────────────────────────────────────

pub const WHALE_OUTPUT_THRESHOLDS_USD: [Usd; 3] = [10_000.0, 100_000.0, 1_000_000.0];
pub const TOP_WHALE_TRANSFERS: usize = 10;

// ── Miner dominance (percent share, strictly above) ─────────────────────────

pub const MINER_DOMINANCE_WARN_PCT: f64 = 40.0;
pub const MINER_DOMINANCE_MAJORITY_PCT: f64 = 50.0;

pub const DEFAULT_INPUT_PREFIX: &str = "blockchair_zcash";

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Directory holding the daily TSV exports. Empty = working directory.
    pub data_dir: PathBuf,
    /// Directory the report is written to. Empty = working directory.
    pub output_dir: PathBuf,
    pub input_prefix: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            input_prefix: DEFAULT_INPUT_PREFIX.to_string(),
        }
    }
}

impl MetricsConfig {
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn report_file_name(date: &DateToken) -> String {
        format!("metrics_{date}.json")
    }

    pub fn report_path(&self, date: &DateToken) -> PathBuf {
        self.output_dir.join(Self::report_file_name(date))
    }
}

/// The four daily exports a run needs, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    pub blocks: PathBuf,
    pub transactions: PathBuf,
    pub inputs: PathBuf,
    pub outputs: PathBuf,
}

impl InputFiles {
    pub fn for_date(config: &MetricsConfig, date: &DateToken) -> Self {
        let path = |relation: &str| {
            config
                .data_dir
                .join(format!("{}_{relation}_{date}.tsv", config.input_prefix))
        };
        Self {
            blocks: path("blocks"),
            transactions: path("transactions"),
            inputs: path("inputs"),
            outputs: path("outputs"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [
            self.blocks.as_path(),
            self.transactions.as_path(),
            self.inputs.as_path(),
            self.outputs.as_path(),
        ]
        .into_iter()
    }

    /// First path that does not exist on disk, if any. Nothing is opened.
    pub fn first_missing(&self) -> Option<&Path> {
        self.iter().find(|p| !p.exists())
    }
}
