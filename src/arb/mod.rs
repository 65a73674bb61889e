//! # Arbitrage Module
//!
//! Core triangular arbitrage detection logic. It provides the pieces one
//! scan pass is assembled from: pair decomposition, candidate enumeration,
//! profit evaluation and the scanner driving them against live prices.

/// Validated market prices
pub mod price;
/// Scan orchestration and outcomes
pub mod scanner;
/// Pair identifiers and asset decomposition
pub mod symbol;
/// Test helpers and utilities
pub(crate) mod test_helpers;
/// Closed three-pair loops
pub mod triangle;
/// Profit evaluation of priced triangles
pub mod triangle_quote;
/// The deduplicated pair universe and its candidate enumerator
pub mod universe;
