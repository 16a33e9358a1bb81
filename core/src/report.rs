//! The `metrics_<date>.json` artifact.
//!
//! A report is either a single `error` message or both metric groups,
//! never a mix of the two.

use crate::{
    error::{MetricsError, MetricsResult},
    privacy::PrivacyMetrics,
    table::DailyTables,
    throughput::NetworkThroughputMetrics,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricsReport {
    Error {
        error: String,
    },
    Success {
        privacy_metrics: PrivacyMetrics,
        network_throughput_metrics: NetworkThroughputMetrics,
    },
}

impl MetricsReport {
    pub fn from_tables(tables: &DailyTables) -> Self {
        MetricsReport::Success {
            privacy_metrics: PrivacyMetrics::compute(&tables.transactions),
            network_throughput_metrics: NetworkThroughputMetrics::compute(
                &tables.blocks,
                &tables.transactions,
                &tables.inputs,
                &tables.outputs,
            ),
        }
    }

    pub fn from_error(err: &MetricsError) -> Self {
        MetricsReport::Error {
            error: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MetricsReport::Error { .. })
    }

    /// Two-space indented JSON.
    pub fn to_pretty_json(&self) -> MetricsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the report, replacing any previous file at `path`.
pub fn write_report(path: &Path, report: &MetricsReport) -> MetricsResult<()> {
    std::fs::write(path, report.to_pretty_json()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Transaction;
    use serde_json::Value;

    #[test]
    fn error_report_has_only_the_error_key() {
        let report = MetricsReport::from_error(&MetricsError::MissingInputFile {
            path: "blockchair_zcash_blocks_20240101.tsv".into(),
        });
        let json = report.to_pretty_json().unwrap();
        assert_eq!(
            json,
            "{\n  \"error\": \"File not found: blockchair_zcash_blocks_20240101.tsv\"\n}"
        );
    }

    #[test]
    fn success_report_carries_both_groups_and_named_categories() {
        let tables = DailyTables {
            transactions: vec![
                Transaction {
                    shielded_value_delta: 500_000_000,
                    fee_usd: Some(0.01),
                    output_total: 100_000_000.0,
                    output_total_usd: 50.0,
                },
                Transaction {
                    shielded_value_delta: 0,
                    fee_usd: Some(0.03),
                    output_total: 0.0,
                    output_total_usd: 50_000.0,
                },
            ],
            ..Default::default()
        };
        let report = MetricsReport::from_tables(&tables);
        assert!(!report.is_error());

        let value: Value = serde_json::from_str(&report.to_pretty_json().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["privacy_metrics"].as_object().unwrap().len(), 8);

        let throughput = obj["network_throughput_metrics"].as_object().unwrap();
        assert_eq!(throughput.len(), 9);
        assert_eq!(throughput["total_zec_transferred"], 1.0);
        assert_eq!(throughput["num_unique_active_addresses"], 0);
        let categories = throughput["transaction_size_category_counts"].as_object().unwrap();
        assert_eq!(categories["Small"], 1);
        assert_eq!(categories["Whale"], 1);
        assert!(categories.get("Medium").is_none());
    }
}
