//! In-memory tables for one day of ledger exports.
//!
//! Each relation is a tab-separated file with a header row. Rows are
//! deserialized by column name; columns the pipeline does not use are
//! ignored, a missing required column fails the load. Blank cells in
//! columns that only feed aggregates load as `None` and are skipped.

use crate::{
    config::InputFiles,
    error::{MetricsError, MetricsResult},
    types::{Usd, Zatoshi},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(deserialize_with = "de_timestamp")]
    pub time: DateTime<Utc>,
    pub difficulty: Option<f64>,
    pub transaction_count: Option<i64>,
    pub fee_total: Option<f64>,
    pub size: Option<f64>,
    pub guessed_miner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub shielded_value_delta: Zatoshi,
    pub fee_usd: Option<Usd>,
    #[serde(deserialize_with = "de_coerced_f64")]
    pub output_total: f64,
    #[serde(deserialize_with = "de_coerced_f64")]
    pub output_total_usd: Usd,
}

/// A spend record.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    pub recipient: String,
}

/// A receive record.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputRecord {
    pub recipient: String,
    pub value: Option<Zatoshi>,
    pub value_usd: Option<Usd>,
}

#[derive(Debug, Clone, Default)]
pub struct DailyTables {
    pub blocks: Vec<Block>,
    pub transactions: Vec<Transaction>,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<OutputRecord>,
}

impl DailyTables {
    /// Load all four relations fully into memory.
    pub fn load(files: &InputFiles) -> MetricsResult<Self> {
        let tables = Self {
            blocks: read_tsv(&files.blocks)?,
            transactions: read_tsv(&files.transactions)?,
            inputs: read_tsv(&files.inputs)?,
            outputs: read_tsv(&files.outputs)?,
        };
        log::debug!(
            "loaded blocks={} transactions={} inputs={} outputs={}",
            tables.blocks.len(),
            tables.transactions.len(),
            tables.inputs.len(),
            tables.outputs.len()
        );
        Ok(tables)
    }
}

pub fn read_tsv<T: DeserializeOwned>(path: &Path) -> MetricsResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| read_error(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| read_error(path, e))
}

fn read_error(path: &Path, err: csv::Error) -> MetricsError {
    MetricsError::InputRead(format!("{}: {err}", path.display()))
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
/// Naive timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// Empty, non-numeric and non-finite cells become 0.
fn de_coerced_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(coerce_numeric(&raw))
}

pub fn coerce_numeric(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
