use derive_more::Display;
use thiserror::Error;

/// Errors produced when validating a raw price value.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PriceError {
    /// The value was zero or negative
    #[error("price {0} is not positive")]
    NotPositive(f64),
    /// The value was NaN or infinite
    #[error("price {0} is not finite")]
    NotFinite(f64),
}

/// A validated price for one trading pair at the instant of retrieval.
///
/// Always strictly positive and finite, so the conversion arithmetic
/// downstream has no failure path. The three quotes for one candidate are
/// fetched back to back rather than atomically; staleness between legs is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
pub struct PriceQuote(f64);

impl PriceQuote {
    /// Validate `value` as a usable quote-per-base price.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when `value` is not finite or not strictly
    /// positive.
    pub fn new(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::NotFinite(value));
        }
        if value <= 0.0 {
            return Err(PriceError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// The price as quote units per base unit.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive_finite() {
        for value in &[0.000_000_01, 0.07, 1.0, 3600.0, 50_000.0] {
            let quote = PriceQuote::new(*value).unwrap();
            assert!((quote.value() - value).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_rejects_non_positive() {
        for value in &[0.0, -0.000_01, -50_000.0] {
            let quote = PriceQuote::new(*value);
            assert!(matches!(quote, Err(PriceError::NotPositive(_))));
        }
    }

    #[test]
    fn test_rejects_non_finite() {
        for value in &[f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let quote = PriceQuote::new(*value);
            assert!(matches!(quote, Err(PriceError::NotFinite(_))));
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PriceQuote::new(0.0).err().unwrap().to_string(),
            "price 0 is not positive"
        );
        assert_eq!(
            PriceQuote::new(f64::NAN).err().unwrap().to_string(),
            "price NaN is not finite"
        );
    }
}
