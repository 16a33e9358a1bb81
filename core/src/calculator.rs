//! The daily metrics pipeline.
//!
//! ORDER (fixed):
//!   1. Derive the four input paths from the date token.
//!   2. Check that every input exists. Nothing is opened if one is missing.
//!   3. Load all four relations fully into memory.
//!   4. Compute the report groups and the extended insights.
//!   5. Write `metrics_<date>.json`, replacing any previous report.
//!
//! Steps 2 and 3 never fail the run: their errors become an error report.

use crate::{
    config::{InputFiles, MetricsConfig},
    error::{MetricsError, MetricsResult},
    insights::DailyInsights,
    report::{write_report, MetricsReport},
    table::DailyTables,
    types::DateToken,
};
use std::path::PathBuf;

/// Result of the in-memory part of a run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: MetricsReport,
    /// Absent when the inputs could not be loaded.
    pub insights: Option<DailyInsights>,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub analysis: Analysis,
    pub report_path: PathBuf,
}

pub struct MetricsCalculator {
    config: MetricsConfig,
}

impl MetricsCalculator {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Load and compute without touching the output directory.
    pub fn analyze(&self, date: &DateToken) -> Analysis {
        log::info!("date={date} metrics: starting run");

        let tables = match self.load(date) {
            Ok(tables) => tables,
            Err(err) => {
                log::warn!("date={date} metrics: {err}");
                return Analysis {
                    report: MetricsReport::from_error(&err),
                    insights: None,
                };
            }
        };

        let report = MetricsReport::from_tables(&tables);
        let insights = DailyInsights::compute(&tables);
        log_insights(date, &insights);

        Analysis {
            report,
            insights: Some(insights),
        }
    }

    /// Analyze and write the report. Only a failed report write is an error.
    pub fn run(&self, date: &DateToken) -> MetricsResult<RunOutcome> {
        let analysis = self.analyze(date);
        let report_path = self.config.report_path(date);
        write_report(&report_path, &analysis.report)?;
        log::info!(
            "date={date} metrics: wrote {} ({})",
            report_path.display(),
            if analysis.report.is_error() { "error" } else { "ok" }
        );
        Ok(RunOutcome {
            analysis,
            report_path,
        })
    }

    fn load(&self, date: &DateToken) -> MetricsResult<DailyTables> {
        let files = InputFiles::for_date(&self.config, date);
        if let Some(missing) = files.first_missing() {
            return Err(MetricsError::MissingInputFile {
                path: missing.display().to_string(),
            });
        }
        DailyTables::load(&files)
    }
}

fn log_insights(date: &DateToken, insights: &DailyInsights) {
    let whales = &insights.whales;
    let blocks = &insights.blocks;
    log::info!(
        "date={date} insights: outputs >10k/100k/1M usd = {}/{}/{}, anomalies flagged = {}, near-empty blocks = {}",
        whales.outputs_over_10k_usd,
        whales.outputs_over_100k_usd,
        whales.outputs_over_1m_usd,
        insights.anomalies.total_flagged(),
        blocks.near_empty_blocks
    );
    if !blocks.miners_above_50_pct.is_empty() {
        log::warn!(
            "date={date} insights: majority miner share: {}",
            blocks.miners_above_50_pct.join(", ")
        );
    } else if !blocks.miners_above_40_pct.is_empty() {
        log::info!(
            "date={date} insights: dominant miner share: {}",
            blocks.miners_above_40_pct.join(", ")
        );
    }
    log::debug!(
        "date={date} insights: block interval min={:?}s max={:?}s",
        blocks.min_block_interval_secs,
        blocks.max_block_interval_secs
    );
}
