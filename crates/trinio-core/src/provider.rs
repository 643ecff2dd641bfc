//! Provider traits for fetching vendor data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`StatementProvider`] - Reported financial line items
//! - [`PriceProvider`] - Stock price history

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    error::Result,
    prices::StockPrice,
    types::{LineItemRecord, StatementKey, Symbol},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Intrinio").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for reported financial statements.
#[async_trait]
pub trait StatementProvider: DataProvider {
    /// Fetches the raw line items reported for one statement key, in vendor order.
    ///
    /// Repeated tags are returned as-is; aggregation is the caller's job.
    async fn fetch_reported_financials(&self, key: &StatementKey) -> Result<Vec<LineItemRecord>>;
}

/// Provider for stock prices.
#[async_trait]
pub trait PriceProvider: DataProvider {
    /// Fetches price bars for a symbol, optionally bounded by start/end dates.
    ///
    /// Bars are returned in vendor order.
    async fn fetch_stock_prices(
        &self,
        symbol: &Symbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<StockPrice>>;
}
