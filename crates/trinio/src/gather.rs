//! High-level gather operations over a statement or price provider.
//!
//! Each operation validates its arguments before the first request, then
//! fetches one key at a time.

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info};

use trinio_core::{
    CompanyStatement, DataError, FiscalPeriod, FiscalYear, OutputFormat, PriceProvider, Result,
    StatementKey, StatementKind, StatementProvider, StockPriceSeries, StockReturn, Symbol,
    aggregate_one, compute_return, pivot, returns_to_dataframe, validate_date_range,
};

/// Result of a statement gather.
#[derive(Debug, Clone)]
pub enum StatementOutput {
    /// One aggregated statement per fetched key, in fetch order.
    Records(Vec<CompanyStatement>),
    /// The pivoted table (identity columns then one column per tag).
    Table(DataFrame),
}

impl StatementOutput {
    /// Returns the records, if this output holds records.
    #[must_use]
    pub fn into_records(self) -> Option<Vec<CompanyStatement>> {
        match self {
            Self::Records(r) => Some(r),
            Self::Table(_) => None,
        }
    }

    /// Returns the table, if this output holds a table.
    #[must_use]
    pub fn into_table(self) -> Option<DataFrame> {
        match self {
            Self::Table(df) => Some(df),
            Self::Records(_) => None,
        }
    }
}

/// Result of a price gather.
#[derive(Debug, Clone)]
pub enum PriceOutput {
    /// Dictionary-of-lists price history.
    Records(StockPriceSeries),
    /// The same history as a table.
    Table(DataFrame),
}

impl PriceOutput {
    /// Returns the series, if this output holds records.
    #[must_use]
    pub fn into_records(self) -> Option<StockPriceSeries> {
        match self {
            Self::Records(s) => Some(s),
            Self::Table(_) => None,
        }
    }

    /// Returns the table, if this output holds a table.
    #[must_use]
    pub fn into_table(self) -> Option<DataFrame> {
        match self {
            Self::Table(df) => Some(df),
            Self::Records(_) => None,
        }
    }
}

/// Gathers one company's statement across several years and periods.
///
/// Keys are fetched year by year, and within a year in the order of `periods`.
///
/// # Errors
///
/// Returns [`DataError::InvalidParameter`] if `years` or `periods` is empty,
/// or the first provider error encountered.
pub async fn gather_financial_statement_time_series<P>(
    provider: &P,
    ticker: &Symbol,
    statement: StatementKind,
    years: &[FiscalYear],
    periods: &[FiscalPeriod],
    format: OutputFormat,
) -> Result<StatementOutput>
where
    P: StatementProvider + ?Sized,
{
    require_non_empty(years, "years")?;
    require_non_empty(periods, "periods")?;

    let keys: Vec<StatementKey> = years
        .iter()
        .flat_map(|&year| {
            periods
                .iter()
                .map(move |&period| StatementKey::new(ticker.clone(), statement, year, period))
        })
        .collect();

    info!(
        provider = provider.name(),
        ticker = %ticker,
        statement = %statement,
        keys = keys.len(),
        "Gathering statement time series"
    );

    let statements = fetch_statements(provider, keys).await?;
    render_statements(statements, format)
}

/// Gathers one statement for several companies at the same year and period.
///
/// Records come back as a `Vec` in the order of `tickers`; each statement
/// carries its ticker in [`CompanyStatement::key`], so a per-ticker map can be
/// built from it without losing order.
///
/// # Errors
///
/// Returns [`DataError::InvalidParameter`] if `tickers` is empty, or the first
/// provider error encountered.
pub async fn gather_financial_statement_company_compare<P>(
    provider: &P,
    tickers: &[Symbol],
    statement: StatementKind,
    year: FiscalYear,
    period: FiscalPeriod,
    format: OutputFormat,
) -> Result<StatementOutput>
where
    P: StatementProvider + ?Sized,
{
    require_non_empty(tickers, "tickers")?;

    let keys: Vec<StatementKey> = tickers
        .iter()
        .map(|ticker| StatementKey::new(ticker.clone(), statement, year, period))
        .collect();

    info!(
        provider = provider.name(),
        statement = %statement,
        year = %year,
        period = %period,
        companies = keys.len(),
        "Gathering company comparison"
    );

    let statements = fetch_statements(provider, keys).await?;
    render_statements(statements, format)
}

/// Gathers the price history of one stock.
///
/// Both bounds are optional; without them the provider returns its most
/// recent rows up to its row cap. A bounded range larger than the row cap
/// is reported by the provider as [`DataError::DataNotAvailable`] rather
/// than silently cut.
///
/// # Errors
///
/// Returns [`DataError::InvalidParameter`] if `end` is earlier than `start`,
/// or the provider error.
pub async fn gather_stock_time_series<P>(
    provider: &P,
    ticker: &Symbol,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<PriceOutput>
where
    P: PriceProvider + ?Sized,
{
    validate_date_range(start, end, "start_date", "end_date")?;

    let prices = provider.fetch_stock_prices(ticker, start, end).await?;
    debug!(ticker = %ticker, rows = prices.len(), "Gathered stock prices");

    let series = StockPriceSeries::from_prices(&prices);
    match format {
        OutputFormat::Records => Ok(PriceOutput::Records(series)),
        OutputFormat::Table => Ok(PriceOutput::Table(series.to_dataframe()?)),
    }
}

/// Computes the return of each stock between `buy_date` and `sell_date`.
///
/// The result has one row per ticker, in input order, with columns `Stock`,
/// `Buy Date`, `Buy Price`, `Sell Date`, `Sell Price` and `Return (%)`.
///
/// # Errors
///
/// Returns [`DataError::InvalidParameter`] if `tickers` is empty or
/// `sell_date` is earlier than `buy_date`, and
/// [`DataError::DataNotAvailable`] if a stock has no priced bar in the range
/// or the provider cannot deliver the whole window (more bars than its row
/// cap), since a cut window would price the wrong buy bar.
pub async fn gather_stock_returns<P>(
    provider: &P,
    tickers: &[Symbol],
    buy_date: NaiveDate,
    sell_date: NaiveDate,
) -> Result<DataFrame>
where
    P: PriceProvider + ?Sized,
{
    require_non_empty(tickers, "tickers")?;
    validate_date_range(Some(buy_date), Some(sell_date), "buy_date", "sell_date")?;

    let mut returns: Vec<StockReturn> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let prices = provider
            .fetch_stock_prices(ticker, Some(buy_date), Some(sell_date))
            .await?;
        let r = compute_return(ticker, &prices, buy_date, sell_date)?;
        debug!(ticker = %ticker, return_pct = r.return_pct, "Computed return");
        returns.push(r);
    }

    returns_to_dataframe(&returns)
}

async fn fetch_statements<P>(provider: &P, keys: Vec<StatementKey>) -> Result<Vec<CompanyStatement>>
where
    P: StatementProvider + ?Sized,
{
    let mut statements = Vec::with_capacity(keys.len());
    for key in keys {
        let records = provider.fetch_reported_financials(&key).await?;
        debug!(key = %key, records = records.len(), "Aggregating statement");
        statements.push(aggregate_one(key, &records));
    }
    Ok(statements)
}

fn render_statements(
    statements: Vec<CompanyStatement>,
    format: OutputFormat,
) -> Result<StatementOutput> {
    match format {
        OutputFormat::Records => Ok(StatementOutput::Records(statements)),
        OutputFormat::Table => Ok(StatementOutput::Table(pivot(&statements).to_dataframe()?)),
    }
}

fn require_non_empty<T>(items: &[T], name: &str) -> Result<()> {
    if items.is_empty() {
        return Err(DataError::InvalidParameter(format!(
            "{name} must contain at least one value"
        )));
    }
    Ok(())
}
