use std::collections::BTreeSet;
use std::fmt::{self, Debug};

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;

/// Errors produced when decomposing a pair identifier into its assets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// The identifier is too short to contain two non-empty asset codes
    #[error("pair identifier {0} is too short to split into base and quote")]
    TooShort(Symbol),
    /// The fixed split point does not fall on a character boundary
    #[error("pair identifier {0} cannot be split at a fixed width")]
    InvalidBoundary(Symbol),
    /// No split point yields two known asset codes
    #[error("pair identifier {0} does not decompose into known asset codes")]
    UnknownAssets(Symbol),
}

/// An opaque exchange trading-pair identifier, e.g. `BTCUSDT`.
///
/// Two asset codes concatenated in base-then-quote order with no separator.
/// The identifier itself does not say where one code ends and the other
/// begins; that is what [`AssetSplitter`] is for.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
pub struct Symbol(String);

impl Symbol {
    /// The raw identifier as published by the exchange.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decomposes a pair identifier into its base and quote asset codes.
///
/// The split rule is a policy, injected wherever pairs are decomposed:
/// fixed-width slicing is the simple default, vocabulary lookup is exact.
pub trait AssetSplitter: Send + Sync {
    /// Split `symbol` into `(base, quote)`.
    ///
    /// # Errors
    ///
    /// Returns a [`SplitError`] when the identifier cannot be decomposed
    /// into two non-empty asset codes.
    fn split<'a>(&self, symbol: &'a Symbol) -> Result<(&'a str, &'a str), SplitError>;
}

/// Splits a symbol at a fixed base-asset width, 3 characters by default.
///
/// This mis-parses assets whose codes are not exactly the fixed width
/// (`DOGEUSDT` becomes `DOG`/`EUSDT`). Use [`VocabularySplitter`] when the
/// exchange's asset list is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthSplitter {
    /// Number of characters taken as the base asset code
    base_width: usize,
}

impl FixedWidthSplitter {
    /// A splitter taking the first `base_width` characters as the base.
    #[must_use]
    pub const fn new(base_width: usize) -> Self {
        Self { base_width }
    }
}

impl Default for FixedWidthSplitter {
    fn default() -> Self {
        Self::new(3)
    }
}

impl AssetSplitter for FixedWidthSplitter {
    fn split<'a>(&self, symbol: &'a Symbol) -> Result<(&'a str, &'a str), SplitError> {
        let raw = symbol.as_str();
        if self.base_width == 0 || raw.len() <= self.base_width {
            return Err(SplitError::TooShort(symbol.clone()));
        }
        if !raw.is_char_boundary(self.base_width) {
            return Err(SplitError::InvalidBoundary(symbol.clone()));
        }
        Ok(raw.split_at(self.base_width))
    }
}

/// Splits a symbol against a vocabulary of known asset codes.
///
/// Every split point is tried from the longest possible base down; the first
/// where both halves are known codes wins. Ambiguous identifiers therefore
/// resolve to the longest base, deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularySplitter {
    /// Known asset codes, as published by the exchange
    assets: BTreeSet<String>,
}

impl VocabularySplitter {
    /// A splitter recognizing exactly `assets`.
    #[must_use]
    pub const fn new(assets: BTreeSet<String>) -> Self {
        Self { assets }
    }

    /// Number of known asset codes.
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

impl AssetSplitter for VocabularySplitter {
    fn split<'a>(&self, symbol: &'a Symbol) -> Result<(&'a str, &'a str), SplitError> {
        let raw = symbol.as_str();
        if raw.len() < 2 {
            return Err(SplitError::TooShort(symbol.clone()));
        }
        for split_at in (1..raw.len()).rev() {
            if !raw.is_char_boundary(split_at) {
                continue;
            }
            let (base, quote) = raw.split_at(split_at);
            if self.assets.contains(base) && self.assets.contains(quote) {
                return Ok((base, quote));
            }
        }
        Err(SplitError::UnknownAssets(symbol.clone()))
    }
}

/// A tradable pair whose identifier has been decomposed into its assets.
///
/// The price of one unit of `base` is expressed in units of `quote`.
/// Immutable once built; ordering follows the symbol so sorted collections
/// enumerate deterministically.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarketPair {
    /// The exchange identifier for the pair
    symbol: Symbol,
    /// The asset being priced
    base: String,
    /// The asset the price is quoted in
    quote: String,
}

impl MarketPair {
    /// Decompose `symbol` with `splitter`.
    ///
    /// # Errors
    ///
    /// Returns a [`SplitError`] when the identifier cannot be decomposed.
    pub fn new(symbol: Symbol, splitter: &dyn AssetSplitter) -> Result<Self, SplitError> {
        let (base, quote) = splitter.split(&symbol)?;
        let (base, quote) = (base.to_owned(), quote.to_owned());
        Ok(Self {
            symbol,
            base,
            quote,
        })
    }

    /// The exchange identifier for the pair.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// The asset being priced.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The asset the price is quoted in.
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl Debug for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}/{})", self.symbol, self.base, self.quote)
    }
}

impl fmt::Display for MarketPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_fixed_split() {
        for (symbol, base, quote) in &[
            ("BTCUSDT", "BTC", "USDT"),
            ("ETHBTC", "ETH", "BTC"),
            ("XRPEUR", "XRP", "EUR"),
        ] {
            let symbol = Symbol::from(*symbol);
            let split = FixedWidthSplitter::default().split(&symbol).unwrap();
            assert_eq!(split, (*base, *quote));
        }
    }

    #[test]
    fn test_fixed_split_too_short() {
        for symbol in &["", "BT", "BTC"] {
            let symbol = Symbol::from(*symbol);
            let split = FixedWidthSplitter::default().split(&symbol);
            assert!(matches!(split, Err(SplitError::TooShort(_))));
        }
    }

    #[test]
    fn test_fixed_split_misparses_long_codes() {
        // The known limitation of fixed-width slicing
        let symbol = Symbol::from("DOGEUSDT");
        let split = FixedWidthSplitter::default().split(&symbol).unwrap();
        assert_eq!(split, ("DOG", "EUSDT"));
    }

    #[test]
    fn test_fixed_split_off_char_boundary() {
        // 'é' is two bytes, so byte 3 lands inside the euro sign
        let symbol = Symbol::from("é€USDT");
        let split = FixedWidthSplitter::default().split(&symbol);
        assert!(matches!(split, Err(SplitError::InvalidBoundary(_))));
    }

    #[test]
    fn test_vocabulary_split() {
        let splitter = vocabulary(&["BTC", "ETH", "USDT", "DOGE", "USD"]);
        for (symbol, base, quote) in &[
            ("BTCUSDT", "BTC", "USDT"),
            ("DOGEUSDT", "DOGE", "USDT"),
            ("DOGEBTC", "DOGE", "BTC"),
            ("ETHUSD", "ETH", "USD"),
        ] {
            let symbol = Symbol::from(*symbol);
            let split = splitter.split(&symbol).unwrap();
            assert_eq!(split, (*base, *quote));
        }
    }

    #[test]
    fn test_vocabulary_prefers_longest_base() {
        // Both USDT/USD and USD/TUSD are valid decompositions
        let splitter = vocabulary(&["USD", "USDT", "TUSD"]);
        let symbol = Symbol::from("USDTUSD");
        let split = splitter.split(&symbol).unwrap();
        assert_eq!(split, ("USDT", "USD"));
    }

    #[test]
    fn test_vocabulary_unknown_assets() {
        let splitter = vocabulary(&["BTC", "USDT"]);
        let symbol = Symbol::from("XRPUSDT");
        let split = splitter.split(&symbol);
        assert!(matches!(split, Err(SplitError::UnknownAssets(_))));
    }

    #[test]
    fn test_vocabulary_too_short() {
        let splitter = vocabulary(&["B", "T"]);
        assert_eq!(splitter.split(&Symbol::from("BT")).unwrap(), ("B", "T"));
        assert!(matches!(
            splitter.split(&Symbol::from("B")),
            Err(SplitError::TooShort(_))
        ));
    }

    #[test]
    fn test_market_pair() {
        let pair = pair("ETHBTC");
        assert_eq!(pair.symbol().as_str(), "ETHBTC");
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "BTC");
        assert_eq!(format!("{pair}"), "ETH/BTC");
        assert_eq!(format!("{pair:?}"), "ETHBTC(ETH/BTC)");
    }

    #[test]
    fn test_market_pair_rejects_malformed() {
        let result = MarketPair::new(Symbol::from("BTC"), &FixedWidthSplitter::default());
        assert_eq!(
            result.err().unwrap().to_string(),
            "pair identifier BTC is too short to split into base and quote"
        );
    }

    #[test]
    fn test_symbol_display_and_order() {
        let mut symbols = vec![
            Symbol::from("ETHUSDT"),
            Symbol::from("BTCUSDT"),
            Symbol::from("ETHBTC"),
        ];
        symbols.sort();
        assert_eq!(format!("{}", symbols[0]), "BTCUSDT");
        assert_eq!(format!("{:?}", symbols[2]), "ETHUSDT");
    }
}
