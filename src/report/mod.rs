//! # Report Sinks
//!
//! Where scan findings go. The scanner pushes every profitable evaluation
//! and the final outcome into a [`ReportSink`], so the same scan can print
//! a log line, emit a JSON stream or feed a test recorder.

/// Human-readable log sink
pub mod console;
/// Line-delimited JSON sink
pub mod json;

use async_trait::async_trait;

use crate::arb::scanner::{ScanError, ScanOutcome};
use crate::arb::triangle_quote::Evaluation;

/// Receives scan findings as they happen.
///
/// Sinks observe the scan, they never steer it, so every method is
/// infallible from the scanner's point of view. A sink that cannot deliver
/// logs the problem and drops the event.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Called for every profitable evaluation, in discovery order.
    async fn opportunity(&self, evaluation: &Evaluation);

    /// Called exactly once when the scan ends normally.
    async fn finished(&self, outcome: &ScanOutcome);

    /// Called exactly once when the scan dies on a fatal error.
    async fn failed(&self, error: &ScanError);
}

#[async_trait]
impl ReportSink for Box<dyn ReportSink> {
    async fn opportunity(&self, evaluation: &Evaluation) {
        self.as_ref().opportunity(evaluation).await;
    }

    async fn finished(&self, outcome: &ScanOutcome) {
        self.as_ref().finished(outcome).await;
    }

    async fn failed(&self, error: &ScanError) {
        self.as_ref().failed(error).await;
    }
}
