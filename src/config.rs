//! # Configuration
//!
//! Scan tunables and exchange endpoint settings, with the defaults applied
//! when neither the command line nor the environment overrides them.

use std::env;
use std::num::NonZeroUsize;

use thiserror::Error;
use url::Url;

/// Default amount of the start asset traded into the first leg
pub const DEFAULT_INITIAL_AMOUNT: f64 = 30.0;
/// Default absolute profit required before the scan stops
pub const DEFAULT_MIN_PROFIT_THRESHOLD: f64 = 0.3;
/// Default profit percentage required before the scan stops
pub const DEFAULT_MIN_PROFIT_PERCENTAGE: f64 = 0.5;
/// Default exchange REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
/// Environment variable overriding the exchange REST endpoint
pub const BASE_URL_VAR: &str = "BINANCE_BASE_URL";
/// Environment variable holding the optional API key
pub const API_KEY_VAR: &str = "BINANCE_API_KEY";

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The trade-in amount was zero, negative or not finite
    #[error("initial amount must be positive and finite, got {0}")]
    InvalidInitialAmount(f64),

    /// The absolute profit threshold was negative or not finite
    #[error("minimum profit threshold must be non-negative and finite, got {0}")]
    InvalidProfitThreshold(f64),

    /// The profit percentage threshold was negative or not finite
    #[error("minimum profit percentage must be non-negative and finite, got {0}")]
    InvalidProfitPercentage(f64),

    /// The base URL did not parse
    #[error("invalid base URL {raw:?}: {source}")]
    InvalidBaseUrl {
        /// The rejected input
        raw: String,
        /// The underlying parse failure
        #[source]
        source: url::ParseError,
    },

    /// The base URL parsed but cannot carry endpoint paths
    #[error("base URL {0} cannot carry endpoint paths")]
    CannotBeABase(Url),
}

/// Tunables for one scan pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Amount of the start asset traded into the first leg
    pub initial_amount: f64,
    /// Absolute profit, in start-asset units, required to stop the scan
    pub min_profit_threshold: f64,
    /// Profit percentage also required to stop the scan
    pub min_profit_percentage: f64,
    /// How many candidates may have prices in flight at once
    pub prefetch: NonZeroUsize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            initial_amount: DEFAULT_INITIAL_AMOUNT,
            min_profit_threshold: DEFAULT_MIN_PROFIT_THRESHOLD,
            min_profit_percentage: DEFAULT_MIN_PROFIT_PERCENTAGE,
            prefetch: NonZeroUsize::MIN,
        }
    }
}

impl ScanConfig {
    /// Checks every field against its allowed range.
    ///
    /// The thresholds may be zero. A zero percentage makes the absolute
    /// threshold alone decide when to stop.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] for the first field out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_amount.is_finite() || self.initial_amount <= 0.0 {
            return Err(ConfigError::InvalidInitialAmount(self.initial_amount));
        }
        if !self.min_profit_threshold.is_finite() || self.min_profit_threshold < 0.0 {
            return Err(ConfigError::InvalidProfitThreshold(
                self.min_profit_threshold,
            ));
        }
        if !self.min_profit_percentage.is_finite() || self.min_profit_percentage < 0.0 {
            return Err(ConfigError::InvalidProfitPercentage(
                self.min_profit_percentage,
            ));
        }
        Ok(())
    }
}

/// Where and how to reach the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeConfig {
    /// Endpoint paths are joined onto this URL
    base_url: Url,
    /// Optional API key, sent as a request header when present
    api_key: Option<String>,
}

impl ExchangeConfig {
    /// Creates a config from an explicit base URL and optional API key.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the URL does not parse or cannot serve
    /// as a base for endpoint paths.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            raw: base_url.to_owned(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase(url));
        }

        Ok(Self {
            base_url: url,
            api_key,
        })
    }

    /// Reads the config from the environment, falling back to the public
    /// Binance endpoint. An empty API key counts as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configured base URL is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let api_key = env::var(API_KEY_VAR).ok().filter(|key| !key.is_empty());
        Self::new(&base_url, api_key)
    }

    /// Returns the base URL endpoint paths are joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the API key, when one is configured.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScanConfig::default();

        config.validate().unwrap();
        assert!((config.initial_amount - 30.0).abs() < f64::EPSILON);
        assert!((config.min_profit_threshold - 0.3).abs() < f64::EPSILON);
        assert!((config.min_profit_percentage - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.prefetch.get(), 1);
    }

    #[test]
    fn test_zero_thresholds_are_valid() {
        // With both thresholds at zero, any profitable candidate stops the
        // scan
        let config = ScanConfig {
            min_profit_threshold: 0.0,
            min_profit_percentage: 0.0,
            ..ScanConfig::default()
        };

        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_initial_amounts() {
        for amount in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let config = ScanConfig {
                initial_amount: amount,
                ..ScanConfig::default()
            };
            assert!(matches!(
                config.validate().unwrap_err(),
                ConfigError::InvalidInitialAmount(_)
            ));
        }
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        for threshold in [-0.1, f64::NAN] {
            let config = ScanConfig {
                min_profit_threshold: threshold,
                ..ScanConfig::default()
            };
            assert!(matches!(
                config.validate().unwrap_err(),
                ConfigError::InvalidProfitThreshold(_)
            ));

            let config = ScanConfig {
                min_profit_percentage: threshold,
                ..ScanConfig::default()
            };
            assert!(matches!(
                config.validate().unwrap_err(),
                ConfigError::InvalidProfitPercentage(_)
            ));
        }
    }

    #[test]
    fn test_accepts_explicit_base_url() {
        let config = ExchangeConfig::new("https://testnet.binance.vision", None).unwrap();

        assert_eq!(config.base_url().as_str(), "https://testnet.binance.vision/");
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_carries_api_key() {
        let config =
            ExchangeConfig::new("https://api.binance.com", Some("abc123".to_owned())).unwrap();

        assert_eq!(config.api_key(), Some("abc123"));
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        assert!(matches!(
            ExchangeConfig::new("not a url", None).unwrap_err(),
            ConfigError::InvalidBaseUrl { .. }
        ));
    }

    #[test]
    fn test_rejects_baseless_url() {
        assert!(matches!(
            ExchangeConfig::new("mailto:arb@example.com", None).unwrap_err(),
            ConfigError::CannotBeABase(_)
        ));
    }
}
