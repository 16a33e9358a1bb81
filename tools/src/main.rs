//! metrics-runner: daily Zcash ledger metrics.
//!
//! Usage:
//!   metrics-runner 20240101
//!
//! Reads `blockchair_zcash_{blocks,transactions,inputs,outputs}_<date>.tsv`
//! from the working directory and writes `metrics_<date>.json` next to them.
//! Set `RUST_LOG=info` to see the extended daily insights.

use anyhow::Result;
use chrono::NaiveDate;
use std::env;
use std::process;
use zecmetrics_core::{MetricsCalculator, MetricsConfig};

const USAGE: &str = "Usage: metrics-runner YYYYMMDD";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(date) = date_token(&args) else {
        println!("{USAGE}");
        process::exit(1);
    };

    if !is_calendar_date(date) {
        log::warn!("date token '{date}' is not a YYYYMMDD calendar date; using it verbatim");
    }

    let calculator = MetricsCalculator::new(MetricsConfig::default());
    let outcome = calculator.run(date)?;

    if outcome.analysis.report.is_error() {
        println!("{}", outcome.analysis.report.to_pretty_json()?);
    } else {
        println!("Successfully created {}", outcome.report_path.display());
    }
    Ok(())
}

/// The single positional argument. Anything after it is ignored.
fn date_token(args: &[String]) -> Option<&str> {
    args.get(1).map(String::as_str)
}

fn is_calendar_date(token: &str) -> bool {
    NaiveDate::parse_from_str(token, "%Y%m%d").is_ok()
}
