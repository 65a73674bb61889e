use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use log::error;
use serde::Serialize;
use serde_json::json;

use super::ReportSink;
use crate::arb::scanner::{ScanError, ScanOutcome};
use crate::arb::triangle_quote::Evaluation;

/// One opportunity, flattened for machine consumption.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityReport {
    /// First leg pair identifier
    pair1: String,
    /// Second leg pair identifier
    pair2: String,
    /// Third leg pair identifier
    pair3: String,
    /// The start asset the amounts are denominated in
    start_asset: String,
    /// Amount traded in
    initial_amount: f64,
    /// Amount held after the last leg
    final_amount: f64,
    /// Signed profit in start-asset units
    profit: f64,
    /// Profit percentage, floored at zero for losses
    profit_percentage: f64,
}

impl From<&Evaluation> for OpportunityReport {
    fn from(evaluation: &Evaluation) -> Self {
        let [first, second, third] = evaluation.triangle().legs();
        Self {
            pair1: first.symbol().to_string(),
            pair2: second.symbol().to_string(),
            pair3: third.symbol().to_string(),
            start_asset: evaluation.triangle().start_asset().to_owned(),
            initial_amount: evaluation.initial_amount(),
            final_amount: evaluation.final_amount(),
            profit: evaluation.profit(),
            profit_percentage: evaluation.profit_percentage(),
        }
    }
}

/// Writes scan findings as one JSON object per line.
#[derive(Debug)]
pub struct JsonSink<W: Write + Send> {
    /// The shared output stream
    writer: Mutex<W>,
}

impl JsonSink<io::Stdout> {
    /// Creates a sink writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes one event line. Delivery failures are logged, never raised.
    fn write_event(&self, event: &serde_json::Value) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(writer, "{event}") {
            error!("json sink: failed to write event: {err}");
        }
    }
}

#[async_trait]
impl<W: Write + Send> ReportSink for JsonSink<W> {
    async fn opportunity(&self, evaluation: &Evaluation) {
        self.write_event(&json!({
            "event": "opportunity",
            "report": OpportunityReport::from(evaluation),
        }));
    }

    async fn finished(&self, outcome: &ScanOutcome) {
        let event = match outcome {
            ScanOutcome::Stopped(evaluation) => json!({
                "event": "finished",
                "outcome": "stopped",
                "report": OpportunityReport::from(evaluation),
            }),
            ScanOutcome::Exhausted(stats) => json!({
                "event": "finished",
                "outcome": "exhausted",
                "stats": stats,
            }),
            ScanOutcome::NoPairsAvailable => json!({
                "event": "finished",
                "outcome": "no_pairs_available",
            }),
            ScanOutcome::Cancelled(stats) => json!({
                "event": "finished",
                "outcome": "cancelled",
                "stats": stats,
            }),
        };
        self.write_event(&event);
    }

    async fn failed(&self, error: &ScanError) {
        self.write_event(&json!({
            "event": "failed",
            "error": error.to_string(),
        }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::scanner::ScanStats;
    use crate::arb::test_helpers::*;
    use crate::arb::triangle_quote::TriangleQuote;

    fn emitted_lines_from(sink: JsonSink<Vec<u8>>) -> Vec<serde_json::Value> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_emits_opportunity_line() {
        let evaluation = TriangleQuote::new(
            triangle("AAABBB", "AAACCC", "CCCBBB"),
            [price(2.0), price(1.5), price(1.5)],
        )
        .evaluate(100.0);

        let sink = JsonSink::new(Vec::new());
        sink.opportunity(&evaluation).await;
        let lines = emitted_lines_from(sink);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], "opportunity");
        assert_eq!(lines[0]["report"]["pair1"], "AAABBB");
        assert_eq!(lines[0]["report"]["start_asset"], "BBB");
        assert_eq!(lines[0]["report"]["final_amount"], 112.5);
        assert_eq!(lines[0]["report"]["profit_percentage"], 12.5);
    }

    #[tokio::test]
    async fn test_emits_outcome_lines() {
        let sink = JsonSink::new(Vec::new());
        sink.finished(&ScanOutcome::Exhausted(ScanStats {
            candidates: 4,
            evaluated: 3,
            skipped: 1,
            reported: 0,
        }))
        .await;
        sink.finished(&ScanOutcome::NoPairsAvailable).await;
        let lines = emitted_lines_from(sink);

        assert_eq!(lines[0]["outcome"], "exhausted");
        assert_eq!(lines[0]["stats"]["skipped"], 1);
        assert_eq!(lines[1]["outcome"], "no_pairs_available");
    }
}
