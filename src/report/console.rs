use async_trait::async_trait;
use log::{error, info, warn};

use super::ReportSink;
use crate::arb::scanner::{ScanError, ScanOutcome};
use crate::arb::triangle_quote::Evaluation;

/// Reports scan findings through the logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl ReportSink for ConsoleSink {
    async fn opportunity(&self, evaluation: &Evaluation) {
        info!(
            "Arbitrage opportunity: {} | {:.6} {} in, {:.6} out | profit {:.6} ({:.4}%)",
            evaluation.triangle(),
            evaluation.initial_amount(),
            evaluation.triangle().start_asset(),
            evaluation.final_amount(),
            evaluation.profit(),
            evaluation.profit_percentage()
        );
    }

    async fn finished(&self, outcome: &ScanOutcome) {
        match outcome {
            ScanOutcome::Stopped(evaluation) => info!(
                "Stopping on {}: profit {:.6} {} ({:.4}%) clears the configured thresholds",
                evaluation.triangle(),
                evaluation.profit(),
                evaluation.triangle().start_asset(),
                evaluation.profit_percentage()
            ),
            ScanOutcome::Exhausted(stats) => info!(
                "No arbitrage found: {} candidates, {} evaluated, {} skipped, {} reported",
                stats.candidates, stats.evaluated, stats.skipped, stats.reported
            ),
            ScanOutcome::NoPairsAvailable => warn!("No valid trading pairs found"),
            ScanOutcome::Cancelled(stats) => {
                info!("Scan cancelled after {} candidates", stats.candidates);
            }
        }
    }

    async fn failed(&self, error: &ScanError) {
        error!("Scan failed: {error}");
    }
}
