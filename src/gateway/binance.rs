use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Url};
use serde::Deserialize;

use super::{GatewayError, PriceGateway, UniverseGateway};
use crate::arb::price::PriceQuote;
use crate::arb::symbol::Symbol;
use crate::config::ExchangeConfig;

/// Exchange metadata endpoint, relative to the base URL
const EXCHANGE_INFO_PATH: &str = "api/v3/exchangeInfo";
/// Single-symbol price endpoint, relative to the base URL
const TICKER_PATH: &str = "api/v3/ticker/price";
/// Connectivity check endpoint, relative to the base URL
const PING_PATH: &str = "api/v3/ping";
/// Status value marking a pair as currently tradable
const TRADING: &str = "TRADING";
/// Header carrying the optional API key
const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// One symbol entry from the exchange metadata listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    /// The pair identifier, e.g. `BTCUSDT`
    symbol: String,
    /// Trading status, e.g. `TRADING` or `BREAK`
    status: String,
    /// The asset being bought or sold
    base_asset: String,
    /// The asset it is priced in
    quote_asset: String,
}

/// The exchange metadata listing.
#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    /// Every symbol the exchange knows about, tradable or not
    symbols: Vec<SymbolInfo>,
}

/// One entry from the price ticker endpoint.
#[derive(Debug, Deserialize)]
struct SymbolTicker {
    /// The pair identifier the price belongs to
    symbol: String,
    /// The price, serialized as a decimal string
    price: String,
}

/// What the exchange currently trades: the pair identifiers plus the asset
/// vocabulary they are built from.
#[derive(Debug, Clone)]
pub struct ExchangeUniverse {
    /// Tradable pair identifiers, in listing order
    symbols: Vec<Symbol>,
    /// Every base and quote asset appearing in a tradable pair
    assets: BTreeSet<String>,
}

impl ExchangeUniverse {
    /// Returns the tradable pair identifiers.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Returns the asset vocabulary of the tradable pairs.
    #[must_use]
    pub const fn assets(&self) -> &BTreeSet<String> {
        &self.assets
    }

    /// Consumes the universe, keeping only the asset vocabulary.
    #[must_use]
    pub fn into_assets(self) -> BTreeSet<String> {
        self.assets
    }
}

/// REST gateway against the Binance spot API.
#[derive(Debug, Clone)]
pub struct BinanceGateway {
    /// The HTTP client
    client: Client,
    /// Base URL and credentials
    config: ExchangeConfig,
}

impl BinanceGateway {
    /// Creates a gateway with a timeout-bounded HTTP client.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::Transport`] if the client cannot be built.
    pub fn new(config: ExchangeConfig) -> Result<Self, GatewayError> {
        // Create a client with a timeout
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self { client, config })
    }

    /// Checks connectivity against the ping endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the exchange is unreachable or answers
    /// with an error status.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        self.request(self.endpoint(PING_PATH)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetches the exchange metadata and reduces it to the tradable
    /// universe.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the metadata cannot be fetched or
    /// decoded.
    pub async fn exchange_universe(&self) -> Result<ExchangeUniverse, GatewayError> {
        let info: ExchangeInfo = self
            .request(self.endpoint(EXCHANGE_INFO_PATH)?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(universe_from_info(info))
    }

    /// Joins an endpoint path onto the configured base URL.
    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.config
            .base_url()
            .join(path)
            .map_err(|source| GatewayError::Endpoint {
                path: path.to_owned(),
                source,
            })
    }

    /// Starts a GET request, attaching the API key header when configured.
    fn request(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match self.config.api_key() {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

#[async_trait]
impl UniverseGateway for BinanceGateway {
    async fn list_tradable_pairs(&self) -> Result<Vec<Symbol>, GatewayError> {
        Ok(self.exchange_universe().await?.symbols)
    }
}

#[async_trait]
impl PriceGateway for BinanceGateway {
    async fn price(&self, symbol: &Symbol) -> Result<PriceQuote, GatewayError> {
        let ticker: SymbolTicker = self
            .request(self.endpoint(TICKER_PATH)?)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if ticker.symbol != symbol.as_str() {
            return Err(GatewayError::Malformed {
                endpoint: TICKER_PATH,
                detail: format!("asked for {symbol}, answered for {}", ticker.symbol),
            });
        }

        parse_price(symbol, &ticker.price)
    }
}

/// Keeps the `TRADING` symbols and collects their asset vocabulary.
fn universe_from_info(info: ExchangeInfo) -> ExchangeUniverse {
    let listed = info.symbols.len();
    let mut symbols = Vec::new();
    let mut assets = BTreeSet::new();

    for entry in info.symbols {
        if entry.status != TRADING {
            continue;
        }
        symbols.push(Symbol::from(entry.symbol));
        assets.insert(entry.base_asset);
        assets.insert(entry.quote_asset);
    }

    debug!(
        "exchange universe: {} tradable of {listed} listed, {} assets",
        symbols.len(),
        assets.len()
    );
    ExchangeUniverse { symbols, assets }
}

/// Parses the ticker's decimal string into a validated price.
fn parse_price(symbol: &Symbol, raw: &str) -> Result<PriceQuote, GatewayError> {
    let value: f64 = raw.parse().map_err(|_| GatewayError::Malformed {
        endpoint: TICKER_PATH,
        detail: format!("unparseable price {raw:?} for {symbol}"),
    })?;

    PriceQuote::new(value).map_err(|source| GatewayError::RejectedQuote {
        symbol: symbol.clone(),
        source,
    })
}
