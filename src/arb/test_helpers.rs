use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::price::PriceQuote;
use super::scanner::{ScanError, ScanOutcome};
use super::symbol::{FixedWidthSplitter, MarketPair, Symbol, VocabularySplitter};
use super::triangle::Triangle;
use super::triangle_quote::Evaluation;
use super::universe::Universe;
use crate::config::ScanConfig;
use crate::gateway::{GatewayError, PriceGateway, UniverseGateway};
use crate::report::ReportSink;

#[allow(dead_code)]
pub fn sym(symbol: &str) -> Symbol {
    Symbol::from(symbol)
}

#[allow(dead_code)]
pub fn pair(symbol: &str) -> MarketPair {
    MarketPair::new(Symbol::from(symbol), &FixedWidthSplitter::default()).unwrap()
}

#[allow(dead_code)]
pub fn triangle(first: &str, second: &str, third: &str) -> Triangle {
    Triangle::new([pair(first), pair(second), pair(third)]).unwrap()
}

#[allow(dead_code)]
pub fn universe(symbols: &[&str]) -> Universe {
    Universe::from_symbols(
        symbols.iter().map(|symbol| Symbol::from(*symbol)),
        &FixedWidthSplitter::default(),
    )
}

#[allow(dead_code)]
pub fn vocabulary(assets: &[&str]) -> VocabularySplitter {
    VocabularySplitter::new(
        assets
            .iter()
            .map(|asset| (*asset).to_owned())
            .collect::<BTreeSet<_>>(),
    )
}

#[allow(dead_code)]
pub fn price(value: f64) -> PriceQuote {
    PriceQuote::new(value).unwrap()
}

#[allow(dead_code)]
pub fn scan_config(
    initial_amount: f64,
    min_profit_threshold: f64,
    min_profit_percentage: f64,
) -> ScanConfig {
    ScanConfig {
        initial_amount,
        min_profit_threshold,
        min_profit_percentage,
        ..ScanConfig::default()
    }
}

/// A pair listing served from memory, counting fetches.
#[allow(dead_code)]
#[derive(Clone)]
pub struct StaticUniverse {
    symbols: Arc<Vec<Symbol>>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl StaticUniverse {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            symbols: Arc::new(symbols.iter().map(|symbol| Symbol::from(*symbol)).collect()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UniverseGateway for StaticUniverse {
    async fn list_tradable_pairs(&self) -> Result<Vec<Symbol>, GatewayError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.symbols.as_ref().clone())
    }
}

/// A pair listing that is always unreachable.
#[allow(dead_code)]
pub struct FailingUniverse;

#[async_trait]
impl UniverseGateway for FailingUniverse {
    async fn list_tradable_pairs(&self) -> Result<Vec<Symbol>, GatewayError> {
        Err(GatewayError::Malformed {
            endpoint: "test",
            detail: "listing unavailable".to_owned(),
        })
    }
}

/// A price book served from memory, counting fetches, with selectable
/// failures.
#[allow(dead_code)]
#[derive(Clone)]
pub struct StaticPrices {
    prices: Arc<HashMap<Symbol, f64>>,
    failing: Arc<HashSet<Symbol>>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl StaticPrices {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: Arc::new(
                prices
                    .iter()
                    .map(|(symbol, value)| (Symbol::from(*symbol), *value))
                    .collect(),
            ),
            failing: Arc::new(HashSet::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_on(mut self, symbol: &str) -> Self {
        Arc::make_mut(&mut self.failing).insert(Symbol::from(symbol));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PriceGateway for StaticPrices {
    async fn price(&self, symbol: &Symbol) -> Result<PriceQuote, GatewayError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(symbol) {
            return Err(GatewayError::Malformed {
                endpoint: "test",
                detail: format!("price withheld for {symbol}"),
            });
        }
        match self.prices.get(symbol) {
            Some(value) => {
                PriceQuote::new(*value).map_err(|source| GatewayError::RejectedQuote {
                    symbol: symbol.clone(),
                    source,
                })
            }
            None => Err(GatewayError::Malformed {
                endpoint: "test",
                detail: format!("no price for {symbol}"),
            }),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Opportunity(Evaluation),
    Finished(ScanOutcome),
    Failed(String),
}

/// A sink that records every event it hears, in order.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ReportSink for RecordingSink {
    async fn opportunity(&self, evaluation: &Evaluation) {
        self.record(SinkEvent::Opportunity(evaluation.clone()));
    }

    async fn finished(&self, outcome: &ScanOutcome) {
        self.record(SinkEvent::Finished(outcome.clone()));
    }

    async fn failed(&self, error: &ScanError) {
        self.record(SinkEvent::Failed(error.to_string()));
    }
}
