//! Daily Zcash ledger metrics.
//!
//! Reads one day of block, transaction, input and output exports and
//! produces the `metrics_<date>.json` report.

pub mod calculator;
pub mod config;
pub mod error;
pub mod insights;
pub mod privacy;
pub mod report;
pub mod stats;
pub mod table;
pub mod throughput;
pub mod types;

pub use calculator::{Analysis, MetricsCalculator, RunOutcome};
pub use config::{InputFiles, MetricsConfig, ZATOSHI_PER_ZEC};
pub use error::{MetricsError, MetricsResult};
pub use report::MetricsReport;
