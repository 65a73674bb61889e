use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;

use super::symbol::{AssetSplitter, MarketPair, Symbol};
use super::triangle::Triangle;

/// Leg orderings tested per combination, in a fixed order so the candidate
/// sequence is reproducible.
const LEG_ORDERINGS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// The deduplicated, decomposed pair universe for one scan pass.
///
/// Construction collapses duplicate identifiers, drops identifiers the
/// splitter rejects, and orders the rest lexicographically, so candidate
/// enumeration is a pure function of universe content no matter how the
/// gateway ordered its listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    /// Decomposed pairs, sorted by symbol
    pairs: Vec<MarketPair>,
}

impl Universe {
    /// Build a universe from raw gateway symbols.
    pub fn from_symbols(
        symbols: impl IntoIterator<Item = Symbol>,
        splitter: &dyn AssetSplitter,
    ) -> Self {
        let deduped: BTreeSet<Symbol> = symbols.into_iter().collect();
        let pairs = deduped
            .into_iter()
            .filter_map(|symbol| match MarketPair::new(symbol, splitter) {
                Ok(pair) => Some(pair),
                Err(err) => {
                    debug!("universe: dropping pair: {err}");
                    None
                }
            })
            .collect();
        Self { pairs }
    }

    /// Number of usable pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no usable pairs remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The decomposed pairs, sorted by symbol.
    #[must_use]
    pub fn pairs(&self) -> &[MarketPair] {
        &self.pairs
    }

    /// All closed three-pair loops, lazily, in a deterministic order.
    ///
    /// Combinations of three distinct pairs are generated index-ascending
    /// over the sorted universe. The closure condition depends on traversal
    /// order, and the order that chains is almost never the sorted one, so
    /// each combination's leg orderings are tested and every ordering that
    /// chains is yielded. Fewer than three pairs yield nothing.
    ///
    /// Re-invoking on the same universe reproduces the same sequence.
    pub fn candidates(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.pairs.iter().combinations(3).flat_map(|combo| {
            LEG_ORDERINGS.into_iter().filter_map(move |[first, second, third]| {
                let (a, b, c) = (combo[first], combo[second], combo[third]);
                Triangle::chains(a, b, c)
                    .then(|| Triangle::new([a.clone(), b.clone(), c.clone()]))?
                    .ok()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::arb::symbol::FixedWidthSplitter;
    use crate::arb::test_helpers::*;

    #[test]
    fn test_small_universe_yields_nothing() {
        for symbols in &[&[][..], &["BTCUSDT"][..], &["BTCUSDT", "ETHBTC"][..]] {
            assert_eq!(universe(symbols).candidates().count(), 0);
        }
    }

    #[test]
    fn test_finds_closed_triple() {
        let candidates: Vec<_> = universe(&["BTCUSDT", "ETHBTC", "ETHUSDT"])
            .candidates()
            .collect();
        assert_eq!(candidates, vec![triangle("ETHUSDT", "ETHBTC", "BTCUSDT")]);
    }

    #[test]
    fn test_filters_non_closed_triples() {
        assert_eq!(
            universe(&["BTCUSDT", "ETHBTC", "XRPEUR"]).candidates().count(),
            0
        );
    }

    #[test]
    fn test_deduplicates_input() {
        let deduped = universe(&["BTCUSDT", "ETHBTC", "ETHUSDT"]);
        let duplicated = universe(&[
            "BTCUSDT", "BTCUSDT", "ETHBTC", "ETHUSDT", "ETHUSDT", "ETHUSDT",
        ]);
        assert_eq!(duplicated.len(), 3);
        assert_eq!(
            duplicated.candidates().collect::<Vec<_>>(),
            deduped.candidates().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_drops_malformed_identifiers() {
        let universe = universe(&["BTCUSDT", "ETHBTC", "ETHUSDT", "BTC", ""]);
        assert_eq!(universe.len(), 3);
        assert_eq!(universe.candidates().count(), 1);
    }

    #[test]
    fn test_enumeration_order_is_stable() {
        // Two disjoint loops; the lexicographically earlier combination
        // must come out first, and re-enumeration must repeat the sequence.
        let universe = universe(&[
            "DDDFFF", "DDDEEE", "EEEFFF", "AAACCC", "AAABBB", "BBBCCC",
        ]);
        let first: Vec<_> = universe.candidates().collect();
        assert_eq!(
            first,
            vec![
                triangle("AAACCC", "AAABBB", "BBBCCC"),
                triangle("DDDFFF", "DDDEEE", "EEEFFF"),
            ]
        );
        assert_eq!(universe.candidates().collect::<Vec<_>>(), first);
    }

    #[test]
    fn test_legs_come_from_one_combination() {
        // Four pairs over shared assets; no candidate may mix pairs that do
        // not themselves chain
        let universe = universe(&["AAABBB", "AAACCC", "BBBCCC", "CCCBBB"]);
        for candidate in universe.candidates() {
            let [a, b, c] = candidate.legs();
            assert!(Triangle::chains(a, b, c), "{candidate}");
        }
    }

    proptest! {
        #[test]
        fn prop_candidates_satisfy_closure(symbols in arb_symbols()) {
            let universe = Universe::from_symbols(symbols, &FixedWidthSplitter::default());
            for candidate in universe.candidates() {
                let [a, b, c] = candidate.legs();
                prop_assert!(Triangle::chains(a, b, c));
                prop_assert!(a.symbol() != b.symbol());
                prop_assert!(b.symbol() != c.symbol());
                prop_assert!(a.symbol() != c.symbol());
            }
        }

        #[test]
        fn prop_input_order_irrelevant(symbols in arb_symbols()) {
            let mut sorted = symbols.clone();
            sorted.sort();
            let original: Vec<_> = Universe::from_symbols(symbols, &FixedWidthSplitter::default())
                .candidates()
                .collect();
            let canonical: Vec<_> = Universe::from_symbols(sorted, &FixedWidthSplitter::default())
                .candidates()
                .collect();
            prop_assert_eq!(original, canonical);
        }
    }

    /// Symbols over a tiny asset alphabet so closed triples actually occur.
    fn arb_symbols() -> impl Strategy<Value = Vec<Symbol>> {
        const ASSETS: [&str; 4] = ["AAA", "BBB", "CCC", "DDD"];
        let symbol = (0..ASSETS.len(), 0..ASSETS.len())
            .prop_map(|(base, quote)| Symbol::from(format!("{}{}", ASSETS[base], ASSETS[quote])));
        prop::collection::vec(symbol, 0..12)
    }
}
