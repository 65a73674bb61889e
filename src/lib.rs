/*!
 * # Tricycle - Triangular Arbitrage Scanner
 *
 * Tricycle is a Rust-based engine for detecting triangular arbitrage
 * opportunities across the trading pairs of a centralized exchange.
 *
 * ## Core Features
 *
 * - **Candidate Enumeration**: Finds every closed three-pair loop in the
 *   tradable universe, in a deterministic order
 * - **Profit Evaluation**: Simulates trading a configured amount around
 *   each loop at current prices
 * - **Threshold Stop**: Stops at the first loop clearing the configured
 *   profit thresholds, reporting smaller finds along the way
 * - **Pluggable Reporting**: Findings stream to the console or as
 *   line-delimited JSON
 *
 * ## Module Structure
 *
 * - `arb`: Core arbitrage detection logic
 * - `config`: Configuration management for the system
 * - `gateway`: Exchange access for pair listings and prices
 * - `report`: Sinks that receive scan findings
 * - `utils`: Utility functions and helpers
 */

/// Arbitrage detection logic
pub mod arb;
/// Configuration management for the system
pub mod config;
/// Exchange access for pair listings and prices
pub mod gateway;
/// Sinks that receive scan findings
pub mod report;
/// Utility functions and helpers
pub mod utils;
