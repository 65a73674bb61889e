use std::fmt::{self, Debug, Display};

use thiserror::Error;

use super::symbol::MarketPair;

/// Errors produced when validating a candidate cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriangleError {
    /// The same pair appears more than once in the triple
    #[error("triangle contains duplicate pairs")]
    DuplicatePairs,
    /// Two legs do not share the asset the loop requires at that point
    #[error("leg {left} asset ({left_asset}) does not match leg {right} asset ({right_asset})")]
    BrokenChain {
        /// Index of the leg providing the asset
        left: usize,
        /// The asset that leg provides
        left_asset: String,
        /// Index of the leg expected to continue with it
        right: usize,
        /// The asset that leg actually starts from
        right_asset: String,
    },
}

/// Three trading pairs whose assets chain into a closed conversion loop.
///
/// The loop starts and ends at the first leg's quote asset: leg 1 buys its
/// base with the start asset, leg 2 sells that base into its own quote, and
/// leg 3 sells that quote back into the start asset. Closure requires
/// `base1 == base2`, `quote2 == base3`, `quote3 == quote1`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Triangle {
    /// The three legs in traversal order
    legs: [MarketPair; 3],
}

impl Triangle {
    /// Validate `legs` as a closed conversion loop.
    ///
    /// # Errors
    ///
    /// Returns a [`TriangleError`] when a pair repeats or the assets do not
    /// chain.
    pub fn new(legs: [MarketPair; 3]) -> Result<Self, TriangleError> {
        for i in 0..legs.len() {
            if legs[i].symbol() == legs[(i + 1) % legs.len()].symbol() {
                return Err(TriangleError::DuplicatePairs);
            }
        }

        if legs[0].base() != legs[1].base() {
            return Err(Self::broken(0, legs[0].base(), 1, legs[1].base()));
        }
        if legs[1].quote() != legs[2].base() {
            return Err(Self::broken(1, legs[1].quote(), 2, legs[2].base()));
        }
        if legs[2].quote() != legs[0].quote() {
            return Err(Self::broken(2, legs[2].quote(), 0, legs[0].quote()));
        }

        Ok(Self { legs })
    }

    /// The closure condition over three decomposed pairs, in leg order.
    ///
    /// This is the cheap predicate the enumerator applies before cloning
    /// pairs into a [`Triangle`].
    #[must_use]
    pub fn chains(first: &MarketPair, second: &MarketPair, third: &MarketPair) -> bool {
        first.base() == second.base()
            && second.quote() == third.base()
            && third.quote() == first.quote()
    }

    /// The three legs in traversal order.
    #[must_use]
    pub const fn legs(&self) -> &[MarketPair; 3] {
        &self.legs
    }

    /// The asset the loop starts and ends with.
    #[must_use]
    pub fn start_asset(&self) -> &str {
        self.legs[0].quote()
    }

    /// A chain error for the pair of legs that failed to connect.
    fn broken(left: usize, left_asset: &str, right: usize, right_asset: &str) -> TriangleError {
        TriangleError::BrokenChain {
            left,
            left_asset: left_asset.to_owned(),
            right,
            right_asset: right_asset.to_owned(),
        }
    }
}

impl Debug for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Triangle({:?}, {:?}, {:?})",
            self.legs[0], self.legs[1], self.legs[2]
        )
    }
}

impl Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} -> {}",
            self.legs[0].symbol(),
            self.legs[1].symbol(),
            self.legs[2].symbol()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_new_valid() {
        let triangle = triangle("ETHUSDT", "ETHBTC", "BTCUSDT");
        assert_eq!(triangle.start_asset(), "USDT");
        assert_eq!(triangle.legs()[1].symbol().as_str(), "ETHBTC");
    }

    #[test]
    fn test_new_duplicate_pairs() {
        let result = Triangle::new([pair("ETHUSDT"), pair("ETHUSDT"), pair("BTCUSDT")]);
        assert_eq!(
            result.err().unwrap().to_string(),
            "triangle contains duplicate pairs"
        );

        // The duplicate check also covers the first and last legs
        let result = Triangle::new([pair("ETHUSDT"), pair("ETHBTC"), pair("ETHUSDT")]);
        assert_eq!(
            result.err().unwrap().to_string(),
            "triangle contains duplicate pairs"
        );
    }

    #[test]
    fn test_new_broken_chain() {
        // Bases of the first two legs differ
        let result = Triangle::new([pair("BTCUSDT"), pair("ETHBTC"), pair("ETHUSDT")]);
        assert_eq!(
            result.err().unwrap().to_string(),
            "leg 0 asset (BTC) does not match leg 1 asset (ETH)"
        );

        // Middle quote does not feed the third leg
        let result = Triangle::new([pair("ETHUSDT"), pair("ETHBTC"), pair("XRPUSDT")]);
        assert_eq!(
            result.err().unwrap().to_string(),
            "leg 1 asset (BTC) does not match leg 2 asset (XRP)"
        );

        // Loop does not return to the start asset
        let result = Triangle::new([pair("ETHUSDT"), pair("ETHBTC"), pair("BTCEUR")]);
        assert_eq!(
            result.err().unwrap().to_string(),
            "leg 2 asset (EUR) does not match leg 0 asset (USDT)"
        );
    }

    #[test]
    fn test_chains() {
        for (first, second, third, expected) in &[
            ("ETHUSDT", "ETHBTC", "BTCUSDT", true),
            ("BTCUSDT", "ETHBTC", "ETHUSDT", false), // right pairs, wrong order
            ("ETHBTC", "ETHUSDT", "BTCUSDT", false),
            ("ETHUSDT", "ETHBTC", "BTCEUR", false),
            ("XRPEUR", "ETHBTC", "BTCUSDT", false),
        ] {
            assert_eq!(
                Triangle::chains(&pair(first), &pair(second), &pair(third)),
                *expected,
                "{first} {second} {third}"
            );
        }
    }

    #[test]
    fn test_display_and_debug() {
        let triangle = triangle("ETHUSDT", "ETHBTC", "BTCUSDT");
        assert_eq!(format!("{triangle}"), "ETHUSDT -> ETHBTC -> BTCUSDT");
        assert_eq!(
            format!("{triangle:?}"),
            "Triangle(ETHUSDT(ETH/USDT), ETHBTC(ETH/BTC), BTCUSDT(BTC/USDT))"
        );
    }
}
