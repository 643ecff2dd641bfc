#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trinio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Intrinio data provider.
//!
//! This crate implements the trinio-core provider traits for the
//! [Intrinio](https://intrinio.com/) v2 API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trinio_intrinio::{IntrinioConfig, IntrinioProvider};
//! use trinio_core::{PriceProvider, StatementProvider, StatementKey, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = IntrinioProvider::new(IntrinioConfig::new("your_api_key"))?;
//!
//!     let key = StatementKey::new(
//!         Symbol::new("AAPL"),
//!         "income_statement".parse()?,
//!         "2019".parse()?,
//!         "Q1".parse()?,
//!     );
//!     let records = provider.fetch_reported_financials(&key).await?;
//!
//!     let prices = provider.fetch_stock_prices(&Symbol::new("AAPL"), None, None).await?;
//!
//!     Ok(())
//! }
//! ```

/// Client configuration.
pub mod config;

pub use config::IntrinioConfig;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument, warn};
use trinio_core::{
    BalanceType, DataError, DataProvider, LineItemRecord, PriceProvider, Result, StatementKey,
    StatementProvider, StockPrice, Symbol,
};

/// Provider name used in errors and logs.
const PROVIDER_NAME: &str = "Intrinio";

/// Intrinio data provider.
///
/// Provides access to:
/// - Reported financials (as-filed XBRL line items) per fundamental id
/// - Historical stock prices
#[derive(Clone)]
pub struct IntrinioProvider {
    client: Client,
    config: IntrinioConfig,
}

impl fmt::Debug for IntrinioProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrinioProvider")
            .field("config", &self.config)
            .finish()
    }
}

impl IntrinioProvider {
    /// Create a new Intrinio provider from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: IntrinioConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DataError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a new Intrinio provider with a custom HTTP client.
    #[must_use]
    pub const fn with_client(client: Client, config: IntrinioConfig) -> Self {
        Self { client, config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &IntrinioConfig {
        &self.config
    }

    /// Build a URL with the API key appended.
    fn url(&self, endpoint: &str) -> String {
        let base = self.config.base_url();
        let key = self.config.api_key();
        if endpoint.contains('?') {
            format!("{base}/{endpoint}&api_key={key}")
        } else {
            format!("{base}/{endpoint}?api_key={key}")
        }
    }

    /// Make a GET request and parse the JSON response.
    ///
    /// A 404 is reported as [`DataError::SymbolNotFound`] carrying the endpoint;
    /// callers refine it.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        debug!("Intrinio request: {}", endpoint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, endpoint, &text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.without_url().to_string()))?;

        serde_json::from_str(&text).map_err(|e| DataError::Parse(format!("{e}: {text}")))
    }

    /// Build the reported-financials endpoint for a key.
    fn reported_financials_endpoint(key: &StatementKey) -> String {
        format!("fundamentals/{}/reported_financials", key.fundamental_id())
    }

    /// Build the stock-prices endpoint for a symbol and optional date bounds.
    fn stock_prices_endpoint(
        &self,
        symbol: &Symbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> String {
        let mut params = format!("page_size={}", self.config.page_size());
        if let Some(s) = start {
            params.push_str(&format!("&start_date={s}"));
        }
        if let Some(e) = end {
            params.push_str(&format!("&end_date={e}"));
        }
        format!("securities/{}/prices?{params}", symbol.as_str())
    }
}

impl DataProvider for IntrinioProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Intrinio - Reported financials and stock prices API"
    }
}

#[async_trait]
impl StatementProvider for IntrinioProvider {
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch_reported_financials(&self, key: &StatementKey) -> Result<Vec<LineItemRecord>> {
        let endpoint = Self::reported_financials_endpoint(key);
        let response: ReportedFinancialsResponse = self
            .get(&endpoint)
            .await
            .map_err(|e| statement_error(key, e))?;

        let records = response.into_records(&key.fundamental_id())?;
        debug!(records = records.len(), "Fetched reported financials");
        Ok(records)
    }
}

#[async_trait]
impl PriceProvider for IntrinioProvider {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn fetch_stock_prices(
        &self,
        symbol: &Symbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<StockPrice>> {
        let endpoint = self.stock_prices_endpoint(symbol, start, end);
        let response: StockPricesResponse = self
            .get(&endpoint)
            .await
            .map_err(|e| price_error(symbol, e))?;

        check_truncation(
            symbol,
            response.next_page.as_deref(),
            start,
            end,
            self.config.page_size(),
        )?;

        let prices = response.into_prices()?;
        debug!(rows = prices.len(), "Fetched stock prices");
        Ok(prices)
    }
}

/// Names the missing statement when the vendor answers 404.
fn statement_error(key: &StatementKey, e: DataError) -> DataError {
    match e {
        DataError::SymbolNotFound(_) => DataError::StatementNotFound(key.fundamental_id()),
        other => other,
    }
}

/// Names the missing ticker when the vendor answers 404.
fn price_error(symbol: &Symbol, e: DataError) -> DataError {
    match e {
        DataError::SymbolNotFound(_) => DataError::SymbolNotFound(symbol.to_string()),
        other => other,
    }
}

/// Handles a price response that stopped at the page size.
///
/// Bars arrive newest first, so a cut drops the oldest ones. With a start
/// date the requested window is incomplete and the call fails with
/// [`DataError::DataNotAvailable`]; without one the most recent rows are the
/// expected result and the cut is only logged.
fn check_truncation(
    symbol: &Symbol,
    next_page: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    page_size: u32,
) -> Result<()> {
    if next_page.is_none() {
        return Ok(());
    }
    match start {
        Some(start) => Err(DataError::DataNotAvailable {
            symbol: symbol.to_string(),
            start: start.to_string(),
            end: end.map_or_else(|| "latest".to_string(), |e| e.to_string()),
        }),
        None => {
            warn!(page_size, "Price history truncated at page size");
            Ok(())
        }
    }
}

/// Map a non-success HTTP status to a [`DataError`].
fn status_error(status: StatusCode, endpoint: &str, body: &str) -> DataError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DataError::AuthenticationFailed(PROVIDER_NAME.to_string())
        }
        StatusCode::NOT_FOUND => DataError::SymbolNotFound(endpoint.to_string()),
        StatusCode::TOO_MANY_REQUESTS => DataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: None,
        },
        _ => DataError::Network(format!("HTTP {status}: {body}")),
    }
}

// ============================================================================
// Intrinio API Response Types
// ============================================================================

/// Reported financials response.
#[derive(Debug, Deserialize)]
struct ReportedFinancialsResponse {
    #[serde(default)]
    reported_financials: Vec<ReportedFinancial>,
}

impl ReportedFinancialsResponse {
    /// Convert vendor line items into records, keeping vendor order.
    fn into_records(self, fundamental_id: &str) -> Result<Vec<LineItemRecord>> {
        self.reported_financials
            .into_iter()
            .map(|item| item.into_record(fundamental_id))
            .collect()
    }
}

/// One reported line item.
#[derive(Debug, Deserialize)]
struct ReportedFinancial {
    xbrl_tag: Option<XbrlTag>,
    value: Option<f64>,
}

impl ReportedFinancial {
    fn into_record(self, fundamental_id: &str) -> Result<LineItemRecord> {
        let malformed = |field| DataError::MalformedRecord {
            key: fundamental_id.to_string(),
            field,
        };

        let xbrl_tag = self.xbrl_tag.ok_or_else(|| malformed("xbrl_tag"))?;
        let tag = xbrl_tag
            .tag
            .filter(|t| !t.is_empty())
            .ok_or_else(|| malformed("tag"))?;
        let value = self.value.ok_or_else(|| malformed("value"))?;
        let display_name = xbrl_tag.name.unwrap_or_else(|| tag.clone());

        Ok(LineItemRecord {
            balance_type: BalanceType::from_vendor(xbrl_tag.balance.as_deref()),
            tag,
            value,
            display_name,
        })
    }
}

/// XBRL tag metadata.
#[derive(Debug, Deserialize)]
struct XbrlTag {
    tag: Option<String>,
    name: Option<String>,
    balance: Option<String>,
}

/// Stock prices response.
#[derive(Debug, Deserialize)]
struct StockPricesResponse {
    #[serde(default)]
    stock_prices: Vec<IntrinioStockPrice>,
    next_page: Option<String>,
}

impl StockPricesResponse {
    fn into_prices(self) -> Result<Vec<StockPrice>> {
        self.stock_prices
            .into_iter()
            .map(IntrinioStockPrice::into_price)
            .collect()
    }
}

/// One stock price bar.
#[derive(Debug, Deserialize)]
struct IntrinioStockPrice {
    date: String,
    #[serde(default)]
    intraperiod: bool,
    frequency: Option<String>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    adj_open: Option<f64>,
    adj_high: Option<f64>,
    adj_low: Option<f64>,
    adj_close: Option<f64>,
    adj_volume: Option<f64>,
}

impl IntrinioStockPrice {
    fn into_price(self) -> Result<StockPrice> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid price date {:?}: {e}", self.date)))?;

        Ok(StockPrice {
            date,
            close: self.close,
            adj_close: self.adj_close,
            high: self.high,
            adj_high: self.adj_high,
            low: self.low,
            adj_low: self.adj_low,
            open: self.open,
            adj_open: self.adj_open,
            volume: self.volume,
            adj_volume: self.adj_volume,
            frequency: self.frequency.unwrap_or_else(|| "daily".to_string()),
            intraperiod: self.intraperiod,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use trinio_core::{FiscalPeriod, StatementKind};

    fn provider() -> IntrinioProvider {
        IntrinioProvider::new(IntrinioConfig::new("test_key")).unwrap()
    }

    fn key() -> StatementKey {
        StatementKey::new(
            Symbol::new("aapl"),
            StatementKind::IncomeStatement,
            "2019".parse().unwrap(),
            FiscalPeriod::Q1,
        )
    }

    #[test]
    fn test_url_building() {
        let provider = provider();
        assert_eq!(
            provider.url("securities/AAPL/prices?page_size=10"),
            "https://api-v2.intrinio.com/securities/AAPL/prices?page_size=10&api_key=test_key"
        );
        assert_eq!(
            provider.url(&IntrinioProvider::reported_financials_endpoint(&key())),
            "https://api-v2.intrinio.com/fundamentals/AAPL-income_statement-2019-Q1/reported_financials?api_key=test_key"
        );
    }

    #[test]
    fn test_stock_prices_endpoint() {
        let provider = provider();
        let symbol = Symbol::new("AAPL");
        let start = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 25).unwrap();

        assert_eq!(
            provider.stock_prices_endpoint(&symbol, Some(start), Some(end)),
            "securities/AAPL/prices?page_size=10000&start_date=2020-01-15&end_date=2020-01-25"
        );
        assert_eq!(
            provider.stock_prices_endpoint(&symbol, None, Some(end)),
            "securities/AAPL/prices?page_size=10000&end_date=2020-01-25"
        );
        assert_eq!(
            provider.stock_prices_endpoint(&symbol, None, None),
            "securities/AAPL/prices?page_size=10000"
        );
    }

    #[test]
    fn test_provider_metadata() {
        let provider = provider();
        assert_eq!(provider.name(), "Intrinio");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = IntrinioProvider::new(IntrinioConfig::new("secret_key_12345")).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "x", ""),
            DataError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "x", ""),
            DataError::SymbolNotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "x", ""),
            DataError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "x", "boom"),
            DataError::Network(msg) if msg.contains("boom")
        ));
    }

    #[test]
    fn test_not_found_names_statement_or_ticker() {
        let not_found = || status_error(StatusCode::NOT_FOUND, "some/endpoint", "");

        let err = statement_error(&key(), not_found());
        assert!(
            matches!(&err, DataError::StatementNotFound(id) if id == "AAPL-income_statement-2019-Q1")
        );
        assert!(err.to_string().contains("ticker, statement, year and period"));

        let err = price_error(&Symbol::new("csco"), not_found());
        assert!(matches!(&err, DataError::SymbolNotFound(s) if s == "CSCO"));
    }

    #[test]
    fn test_other_errors_pass_through_refinement() {
        let err = statement_error(
            &key(),
            status_error(StatusCode::UNAUTHORIZED, "some/endpoint", ""),
        );
        assert!(matches!(err, DataError::AuthenticationFailed(_)));

        let err = price_error(
            &Symbol::new("AAPL"),
            status_error(StatusCode::TOO_MANY_REQUESTS, "some/endpoint", ""),
        );
        assert!(matches!(err, DataError::RateLimited { .. }));
    }

    #[test]
    fn test_truncated_window_is_not_available() {
        let symbol = Symbol::new("AAPL");
        let start = NaiveDate::from_ymd_opt(1980, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();

        let err = check_truncation(&symbol, Some("abc"), Some(start), Some(end), 10_000)
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::DataNotAvailable { ref start, ref end, .. }
                if start == "1980-01-02" && end == "2020-01-02"
        ));

        assert!(check_truncation(&symbol, Some("abc"), None, Some(end), 10_000).is_ok());
        assert!(check_truncation(&symbol, None, Some(start), Some(end), 10_000).is_ok());
    }

    /// Serves one canned HTTP response on a local port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn local_provider(base_url: String) -> IntrinioProvider {
        let client = Client::builder().no_proxy().build().unwrap();
        IntrinioProvider::with_client(client, IntrinioConfig::new("k").with_base_url(base_url))
    }

    const NOT_FOUND: &str =
        "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

    #[tokio::test]
    async fn test_statement_404_is_statement_not_found() {
        let provider = local_provider(serve_once(NOT_FOUND).await);
        let err = provider.fetch_reported_financials(&key()).await.unwrap_err();
        assert!(
            matches!(&err, DataError::StatementNotFound(id) if id == "AAPL-income_statement-2019-Q1"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_prices_404_is_symbol_not_found() {
        let provider = local_provider(serve_once(NOT_FOUND).await);
        let err = provider
            .fetch_stock_prices(&Symbol::new("nope"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(&err, DataError::SymbolNotFound(s) if s == "NOPE"), "{err:?}");
    }

    #[test]
    fn test_parse_reported_financials() {
        let json = r#"{
            "reported_financials": [
                {
                    "xbrl_tag": {
                        "id": "tag_1",
                        "name": "Revenue from Contract with Customer",
                        "tag": "RevenueFromContractWithCustomerExcludingAssessedTax",
                        "balance": "credit",
                        "unit": "usd",
                        "abstract": false
                    },
                    "value": 84310000000.0,
                    "domains": []
                },
                {
                    "xbrl_tag": {
                        "name": "Earnings Per Share, Basic",
                        "tag": "EarningsPerShareBasic",
                        "balance": null
                    },
                    "value": 4.22
                },
                {
                    "xbrl_tag": {
                        "tag": "CostOfGoodsAndServicesSold",
                        "balance": "debit"
                    },
                    "value": 52279000000.0
                }
            ],
            "fundamental": {"id": "fun_1"},
            "next_page": null
        }"#;

        let response: ReportedFinancialsResponse = serde_json::from_str(json).unwrap();
        let records = response.into_records("AAPL-income_statement-2019-Q1").unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].tag,
            "RevenueFromContractWithCustomerExcludingAssessedTax"
        );
        assert_eq!(records[0].balance_type, BalanceType::Credit);
        assert_eq!(records[0].display_name, "Revenue from Contract with Customer");
        assert_eq!(records[1].balance_type, BalanceType::Debit);
        assert_eq!(records[1].value, 4.22);
        assert_eq!(records[2].display_name, "CostOfGoodsAndServicesSold");
    }

    #[test]
    fn test_malformed_reported_financial() {
        let missing_value = r#"{"reported_financials": [{"xbrl_tag": {"tag": "Revenues"}}]}"#;
        let response: ReportedFinancialsResponse = serde_json::from_str(missing_value).unwrap();
        assert!(matches!(
            response.into_records("id"),
            Err(DataError::MalformedRecord { field: "value", .. })
        ));

        let missing_tag = r#"{"reported_financials": [{"xbrl_tag": {"name": "x"}, "value": 1.0}]}"#;
        let response: ReportedFinancialsResponse = serde_json::from_str(missing_tag).unwrap();
        assert!(matches!(
            response.into_records("id"),
            Err(DataError::MalformedRecord { field: "tag", .. })
        ));
    }

    #[test]
    fn test_parse_stock_prices() {
        let json = r#"{
            "stock_prices": [
                {
                    "date": "2020-01-17",
                    "intraperiod": false,
                    "frequency": "daily",
                    "open": 316.27,
                    "high": 318.74,
                    "low": 315.0,
                    "close": 318.73,
                    "volume": 34454117.0,
                    "adj_open": 315.52116724578,
                    "adj_high": 317.98531902463,
                    "adj_low": 314.254174225885,
                    "adj_close": 317.975342701639,
                    "adj_volume": 34454117.0,
                    "factor": 1.0,
                    "dividend": 0.0
                },
                {
                    "date": "2020-01-16",
                    "close": 315.24,
                    "adj_close": null
                }
            ],
            "security": {"ticker": "AAPL"},
            "next_page": null
        }"#;

        let response: StockPricesResponse = serde_json::from_str(json).unwrap();
        assert!(response.next_page.is_none());
        let prices = response.into_prices().unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].date, NaiveDate::from_ymd_opt(2020, 1, 17).unwrap());
        assert_eq!(prices[0].adj_close, Some(317.975342701639));
        assert_eq!(prices[1].frequency, "daily");
        assert_eq!(prices[1].adj_close, None);
        assert!(!prices[1].intraperiod);
    }

    #[test]
    fn test_bad_price_date() {
        let json = r#"{"stock_prices": [{"date": "17/01/2020"}]}"#;
        let response: StockPricesResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.into_prices(), Err(DataError::Parse(_))));
    }
}
