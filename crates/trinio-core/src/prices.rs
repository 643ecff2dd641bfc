//! Stock price series and buy/sell returns.
//!
//! - [`StockPrice`] - One vendor price bar
//! - [`StockPriceSeries`] - Dictionary-of-lists view of a price history
//! - [`StockReturn`] - Profit/loss between a buy date and a sell date

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::types::Symbol;

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One price bar as reported by the vendor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub close: Option<f64>,
    /// Split/dividend adjusted closing price.
    pub adj_close: Option<f64>,
    /// Highest price.
    pub high: Option<f64>,
    /// Adjusted highest price.
    pub adj_high: Option<f64>,
    /// Lowest price.
    pub low: Option<f64>,
    /// Adjusted lowest price.
    pub adj_low: Option<f64>,
    /// Opening price.
    pub open: Option<f64>,
    /// Adjusted opening price.
    pub adj_open: Option<f64>,
    /// Traded volume.
    pub volume: Option<f64>,
    /// Adjusted volume.
    pub adj_volume: Option<f64>,
    /// Bar frequency (e.g. "daily").
    pub frequency: String,
    /// True if the bar is still forming.
    pub intraperiod: bool,
}

impl StockPrice {
    /// Creates a daily bar with only a close price set.
    #[must_use]
    pub fn daily(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: Some(close),
            adj_close: None,
            high: None,
            adj_high: None,
            low: None,
            adj_low: None,
            open: None,
            adj_open: None,
            volume: None,
            adj_volume: None,
            frequency: "daily".to_string(),
            intraperiod: false,
        }
    }

    /// Sets the adjusted close price.
    #[must_use]
    pub const fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }

    /// Adjusted close if reported, else close.
    #[must_use]
    pub fn adjusted_or_close(&self) -> Option<f64> {
        self.adj_close.or(self.close)
    }
}

/// Dictionary-of-lists view of a price history.
///
/// All columns have the same length and keep the vendor's row order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StockPriceSeries {
    /// Trading dates.
    pub date: Vec<NaiveDate>,
    /// Closing prices.
    pub close: Vec<Option<f64>>,
    /// Adjusted closing prices.
    pub adj_close: Vec<Option<f64>>,
    /// Highs.
    pub high: Vec<Option<f64>>,
    /// Adjusted highs.
    pub adj_high: Vec<Option<f64>>,
    /// Lows.
    pub low: Vec<Option<f64>>,
    /// Adjusted lows.
    pub adj_low: Vec<Option<f64>>,
    /// Opens.
    pub open: Vec<Option<f64>>,
    /// Adjusted opens.
    pub adj_open: Vec<Option<f64>>,
    /// Volumes.
    pub volume: Vec<Option<f64>>,
    /// Adjusted volumes.
    pub adj_volume: Vec<Option<f64>>,
    /// Bar frequencies.
    pub frequency: Vec<String>,
    /// Intraperiod flags.
    pub intraperiod: Vec<bool>,
}

impl StockPriceSeries {
    /// Flattens price bars into columns.
    #[must_use]
    pub fn from_prices(prices: &[StockPrice]) -> Self {
        let mut series = Self::default();
        for p in prices {
            series.date.push(p.date);
            series.close.push(p.close);
            series.adj_close.push(p.adj_close);
            series.high.push(p.high);
            series.adj_high.push(p.adj_high);
            series.low.push(p.low);
            series.adj_low.push(p.adj_low);
            series.open.push(p.open);
            series.adj_open.push(p.adj_open);
            series.volume.push(p.volume);
            series.adj_volume.push(p.adj_volume);
            series.frequency.push(p.frequency.clone());
            series.intraperiod.push(p.intraperiod);
        }
        series
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.date.len()
    }

    /// Returns true if there are no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    /// Converts the series into a [`DataFrame`] with a `Date`-typed `date` column.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let date_col = date_column("date", &self.date)?;

        let df = DataFrame::new(vec![
            date_col,
            Column::new("close".into(), self.close.clone()),
            Column::new("adj_close".into(), self.adj_close.clone()),
            Column::new("high".into(), self.high.clone()),
            Column::new("adj_high".into(), self.adj_high.clone()),
            Column::new("low".into(), self.low.clone()),
            Column::new("adj_low".into(), self.adj_low.clone()),
            Column::new("open".into(), self.open.clone()),
            Column::new("adj_open".into(), self.adj_open.clone()),
            Column::new("volume".into(), self.volume.clone()),
            Column::new("adj_volume".into(), self.adj_volume.clone()),
            Column::new("frequency".into(), self.frequency.clone()),
            Column::new("intraperiod".into(), self.intraperiod.clone()),
        ])?;

        Ok(df)
    }
}

/// Profit/loss of holding one stock between two dates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StockReturn {
    /// Stock symbol.
    pub ticker: Symbol,
    /// Date of the bar used as the buy price.
    pub buy_date: NaiveDate,
    /// Buy price (adjusted close).
    pub buy_price: f64,
    /// Date of the bar used as the sell price.
    pub sell_date: NaiveDate,
    /// Sell price (adjusted close).
    pub sell_price: f64,
    /// Return in percent, rounded to two decimals.
    pub return_pct: f64,
}

/// Computes the return between `buy_date` and `sell_date`.
///
/// The buy bar is the earliest bar on or after `buy_date`; the sell bar is the
/// latest bar on or before `sell_date`. Bars may be in any order.
pub fn compute_return(
    ticker: &Symbol,
    prices: &[StockPrice],
    buy_date: NaiveDate,
    sell_date: NaiveDate,
) -> Result<StockReturn> {
    validate_date_range(Some(buy_date), Some(sell_date), "buy_date", "sell_date")?;

    let priced = || {
        prices
            .iter()
            .filter(|p| p.date >= buy_date && p.date <= sell_date)
            .filter_map(|p| p.adjusted_or_close().map(|price| (p.date, price)))
    };

    let not_available = || DataError::DataNotAvailable {
        symbol: ticker.to_string(),
        start: buy_date.to_string(),
        end: sell_date.to_string(),
    };

    let (bought_on, buy_price) = priced().min_by_key(|(d, _)| *d).ok_or_else(not_available)?;
    let (sold_on, sell_price) = priced().max_by_key(|(d, _)| *d).ok_or_else(not_available)?;

    if buy_price == 0.0 {
        return Err(DataError::Parse(format!(
            "{ticker}: zero buy price on {bought_on}"
        )));
    }

    Ok(StockReturn {
        ticker: ticker.clone(),
        buy_date: bought_on,
        buy_price,
        sell_date: sold_on,
        sell_price,
        return_pct: round2((sell_price - buy_price) / buy_price * 100.0),
    })
}

/// Renders returns as a table with one row per ticker.
///
/// Columns: `Stock`, `Buy Date`, `Buy Price`, `Sell Date`, `Sell Price`, `Return (%)`.
pub fn returns_to_dataframe(returns: &[StockReturn]) -> Result<DataFrame> {
    let stocks: Vec<&str> = returns.iter().map(|r| r.ticker.as_str()).collect();
    let buy_dates: Vec<NaiveDate> = returns.iter().map(|r| r.buy_date).collect();
    let sell_dates: Vec<NaiveDate> = returns.iter().map(|r| r.sell_date).collect();

    let df = DataFrame::new(vec![
        Column::new("Stock".into(), stocks),
        date_column("Buy Date", &buy_dates)?,
        Column::new(
            "Buy Price".into(),
            returns.iter().map(|r| r.buy_price).collect::<Vec<_>>(),
        ),
        date_column("Sell Date", &sell_dates)?,
        Column::new(
            "Sell Price".into(),
            returns.iter().map(|r| r.sell_price).collect::<Vec<_>>(),
        ),
        Column::new(
            "Return (%)".into(),
            returns.iter().map(|r| r.return_pct).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(df)
}

/// Parses a `%Y-%m-%d` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        DataError::InvalidParameter(format!(
            "Invalid date format {s:?} - please input the date as a string with format %Y-%m-%d"
        ))
    })
}

/// Rejects a range whose end precedes its start.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    start_name: &str,
    end_name: &str,
) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(DataError::InvalidParameter(format!(
                "{end_name} ({end}) is earlier than {start_name} ({start})"
            )));
        }
    }
    Ok(())
}

fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column> {
    let days: Vec<i32> = dates
        .iter()
        .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    Ok(Column::new(name.into(), days).cast(&DataType::Date)?)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
