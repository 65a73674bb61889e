//! # Exchange Gateway
//!
//! Traits the scanner talks to the exchange through, plus the Binance REST
//! implementation. The scanner only depends on the traits, so tests swap in
//! canned gateways and never touch the network.

/// Binance REST gateway
pub mod binance;

use async_trait::async_trait;
use thiserror::Error;

use crate::arb::price::{PriceError, PriceQuote};
use crate::arb::symbol::Symbol;

/// Errors surfaced while talking to the exchange.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request itself failed: connectivity, timeout, HTTP status or an
    /// undecodable body
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint path could not be joined onto the configured base URL
    #[error("cannot build endpoint for {path}: {source}")]
    Endpoint {
        /// The path that failed to join
        path: String,
        /// The underlying URL parse failure
        #[source]
        source: url::ParseError,
    },

    /// The response decoded but did not say what it was supposed to
    #[error("malformed {endpoint} response: {detail}")]
    Malformed {
        /// The endpoint that answered
        endpoint: &'static str,
        /// What was wrong with the answer
        detail: String,
    },

    /// The exchange answered with a price the engine refuses to trade on
    #[error("unusable quote for {symbol}: {source}")]
    RejectedQuote {
        /// The pair the quote was for
        symbol: Symbol,
        /// Why the price was rejected
        #[source]
        source: PriceError,
    },
}

/// Lists the pair identifiers currently open for trading.
#[async_trait]
pub trait UniverseGateway: Send + Sync {
    /// Fetches every tradable pair identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the listing cannot be fetched or
    /// decoded. The scan treats this as fatal.
    async fn list_tradable_pairs(&self) -> Result<Vec<Symbol>, GatewayError>;
}

/// Serves the current market price for a single pair.
#[async_trait]
pub trait PriceGateway: Send + Sync {
    /// Fetches the current price for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the price cannot be fetched, decoded
    /// or validated. The scan skips the candidate and keeps going.
    async fn price(&self, symbol: &Symbol) -> Result<PriceQuote, GatewayError>;
}
