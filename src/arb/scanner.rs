use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::price::PriceQuote;
use super::symbol::AssetSplitter;
use super::triangle::Triangle;
use super::triangle_quote::{Evaluation, TriangleQuote};
use super::universe::Universe;
use crate::config::{ConfigError, ScanConfig};
use crate::gateway::{GatewayError, PriceGateway, UniverseGateway};
use crate::report::ReportSink;

/// Asks a running scan to stop at the next candidate boundary.
///
/// Clones share one flag, so the handle given to a signal handler cancels
/// the scan holding the other clone. Cancellation is cooperative: a price
/// fetch already in flight finishes before the scan notices.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that has not been tripped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the flag has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters describing how far a scan got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Candidates pulled from the enumerator
    pub candidates: u64,
    /// Candidates with a full price snapshot that were evaluated
    pub evaluated: u64,
    /// Candidates dropped because a leg price was unavailable
    pub skipped: u64,
    /// Profitable evaluations pushed into the sink
    pub reported: u64,
}

/// How a scan pass ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A candidate cleared both profit thresholds; this is its evaluation
    Stopped(Evaluation),
    /// Every candidate was examined without clearing the thresholds
    Exhausted(ScanStats),
    /// The gateway listed no usable pairs, so there was nothing to scan
    NoPairsAvailable,
    /// The cancel flag was tripped mid-scan
    Cancelled(ScanStats),
}

/// Fatal scan failures.
///
/// A missing price is not here on purpose: single-pair failures skip one
/// candidate and the scan keeps going.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The pair listing could not be fetched, so no universe exists to scan
    #[error("universe unavailable: {0}")]
    UniverseUnavailable(GatewayError),
}

/// Drives one scan pass: enumerate candidates, price them, evaluate them,
/// and report through the sink.
///
/// The scanner owns its gateways and sink but borrows nothing mutable, so
/// one instance can run pass after pass.
pub struct Scanner<U, P, S> {
    /// Lists the tradable pairs
    universe_gateway: U,
    /// Serves one price per leg
    price_gateway: P,
    /// Receives findings
    sink: S,
    /// Decomposes pair identifiers into assets
    splitter: Box<dyn AssetSplitter>,
    /// Validated tunables
    config: ScanConfig,
}

impl<U, P, S> Scanner<U, P, S>
where
    U: UniverseGateway,
    P: PriceGateway,
    S: ReportSink,
{
    /// Creates a scanner after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any tunable is out of range. Nothing
    /// is fetched until [`Scanner::scan`] runs.
    pub fn new(
        universe_gateway: U,
        price_gateway: P,
        sink: S,
        splitter: Box<dyn AssetSplitter>,
        config: ScanConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            universe_gateway,
            price_gateway,
            sink,
            splitter,
            config,
        })
    }

    /// Returns the tunables this scanner runs with.
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Runs one pass over the current universe.
    ///
    /// Fetches the pair listing, enumerates every closed triangle in
    /// deterministic order and evaluates each against the configured
    /// thresholds. The first evaluation clearing both thresholds stops the
    /// pass. The sink always hears how the pass ended.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::UniverseUnavailable`] when the pair listing
    /// cannot be fetched. Single-pair price failures are not errors.
    pub async fn scan(&self, cancel: &CancelFlag) -> Result<ScanOutcome, ScanError> {
        let symbols = match self.universe_gateway.list_tradable_pairs().await {
            Ok(symbols) => symbols,
            Err(err) => {
                let err = ScanError::UniverseUnavailable(err);
                self.sink.failed(&err).await;
                return Err(err);
            }
        };

        let universe = Universe::from_symbols(symbols, self.splitter.as_ref());
        if universe.is_empty() {
            let outcome = ScanOutcome::NoPairsAvailable;
            self.sink.finished(&outcome).await;
            return Ok(outcome);
        }

        info!(
            "Scanning {} pairs for triangular arbitrage, trading {} in",
            universe.len(),
            self.config.initial_amount
        );
        let outcome = self.drive(&universe, cancel).await;
        self.sink.finished(&outcome).await;
        Ok(outcome)
    }

    /// Walks the candidate sequence until a stop, cancellation or
    /// exhaustion.
    ///
    /// Prices for upcoming candidates are prefetched `config.prefetch` deep,
    /// but candidates are consumed strictly in enumeration order, so the
    /// first match is the same whatever the prefetch depth.
    async fn drive(&self, universe: &Universe, cancel: &CancelFlag) -> ScanOutcome {
        let mut stats = ScanStats::default();
        if cancel.is_cancelled() {
            return ScanOutcome::Cancelled(stats);
        }

        let mut quotes = futures::stream::iter(universe.candidates())
            .map(|triangle| self.quote(triangle))
            .buffered(self.config.prefetch.get());

        while let Some((triangle, fetched)) = quotes.next().await {
            if cancel.is_cancelled() {
                return ScanOutcome::Cancelled(stats);
            }
            stats.candidates += 1;

            let prices = match fetched {
                Ok(prices) => prices,
                Err(err) => {
                    stats.skipped += 1;
                    warn!("Skipping {triangle}: {err}");
                    continue;
                }
            };

            let evaluation =
                TriangleQuote::new(triangle, prices).evaluate(self.config.initial_amount);
            stats.evaluated += 1;
            debug!(
                "{}: {:.6} in, {:.6} out",
                evaluation.triangle(),
                evaluation.initial_amount(),
                evaluation.final_amount()
            );

            if evaluation.is_profitable() {
                stats.reported += 1;
                self.sink.opportunity(&evaluation).await;

                if self.clears_thresholds(&evaluation) {
                    info!(
                        "Profit {:.6} ({:.4}%) clears the thresholds, stopping",
                        evaluation.profit(),
                        evaluation.profit_percentage()
                    );
                    return ScanOutcome::Stopped(evaluation);
                }
            }
        }

        ScanOutcome::Exhausted(stats)
    }

    /// Prices one candidate, keeping the triangle attached to the result.
    async fn quote(&self, triangle: Triangle) -> (Triangle, Result<[PriceQuote; 3], GatewayError>) {
        let prices = self.snapshot(&triangle).await;
        (triangle, prices)
    }

    /// Fetches the three leg prices, giving up on the first failure.
    async fn snapshot(&self, triangle: &Triangle) -> Result<[PriceQuote; 3], GatewayError> {
        let [first, second, third] = triangle.legs();
        Ok([
            self.price_gateway.price(first.symbol()).await?,
            self.price_gateway.price(second.symbol()).await?,
            self.price_gateway.price(third.symbol()).await?,
        ])
    }

    /// Whether an evaluation satisfies both stop thresholds.
    fn clears_thresholds(&self, evaluation: &Evaluation) -> bool {
        evaluation.profit() >= self.config.min_profit_threshold
            && evaluation.profit_percentage() >= self.config.min_profit_percentage
    }
}

impl<U, P, S> Debug for Scanner<U, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
