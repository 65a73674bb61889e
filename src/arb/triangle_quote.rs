use crate::arb::price::PriceQuote;
use crate::arb::triangle::Triangle;

/// A triangle paired with one market price per leg.
///
/// A `TriangleQuote` freezes the prices a triangle was observed at, so the
/// same snapshot can be evaluated for any initial amount. All prices are
/// quoted as quote-asset units per one base-asset unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleQuote {
    /// The triangle these prices belong to
    triangle: Triangle,
    /// One price per leg, in leg order
    prices: [PriceQuote; 3],
}

impl TriangleQuote {
    /// Creates a new quote from a triangle and one price per leg.
    #[must_use]
    pub const fn new(triangle: Triangle, prices: [PriceQuote; 3]) -> Self {
        Self { triangle, prices }
    }

    /// Returns the quoted triangle.
    #[must_use]
    pub const fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// Returns the leg prices, in leg order.
    #[must_use]
    pub const fn prices(&self) -> &[PriceQuote; 3] {
        &self.prices
    }

    /// Simulates trading `initial_amount` of the start asset around the
    /// triangle.
    ///
    /// The first leg buys its base asset, so the amount is divided by the
    /// price. The remaining legs sell the asset carried in, so the amount
    /// is multiplied. No fees or slippage are applied.
    ///
    /// # Arguments
    ///
    /// * `initial_amount` - The amount of the start asset to trade in
    ///
    /// # Returns
    ///
    /// An [`Evaluation`] holding the amount held after each leg
    #[must_use]
    pub fn evaluate(&self, initial_amount: f64) -> Evaluation {
        let bought = initial_amount / self.prices[0].value();
        let swapped = bought * self.prices[1].value();
        let returned = swapped * self.prices[2].value();

        Evaluation {
            triangle: self.triangle.clone(),
            initial_amount,
            amounts: [bought, swapped, returned],
        }
    }
}

/// The outcome of simulating one triangle at one price snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The triangle that was evaluated
    triangle: Triangle,
    /// The amount of the start asset traded in
    initial_amount: f64,
    /// The amount held after each leg, ending in the start asset
    amounts: [f64; 3],
}

impl Evaluation {
    /// Returns the evaluated triangle.
    #[must_use]
    pub const fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// Returns the amount of the start asset traded in.
    #[must_use]
    pub const fn initial_amount(&self) -> f64 {
        self.initial_amount
    }

    /// Returns the amount held after each leg, in leg order.
    #[must_use]
    pub const fn amounts(&self) -> &[f64; 3] {
        &self.amounts
    }

    /// Returns the amount of the start asset held after the last leg.
    #[must_use]
    pub const fn final_amount(&self) -> f64 {
        self.amounts[2]
    }

    /// Calculates the profit in start-asset units (negative for a loss).
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.final_amount() - self.initial_amount
    }

    /// Calculates the profit as a percentage of the initial amount.
    ///
    /// Losses are reported as `0.0` rather than as a negative percentage;
    /// the signed figure is [`Evaluation::profit`].
    #[must_use]
    pub fn profit_percentage(&self) -> f64 {
        if self.final_amount() > self.initial_amount {
            self.profit() / self.initial_amount * 100.0
        } else {
            0.0
        }
    }

    /// Determines whether the evaluation ends with more of the start asset
    /// than it began with.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.profit() > 0.0
    }
}
