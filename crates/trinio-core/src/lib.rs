#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trinio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for trinio.
//!
//! This crate provides the vendor-independent pieces:
//!
//! - [`aggregate_one`](aggregate::aggregate_one) - Collapse repeated tags of one statement
//! - [`pivot`](pivot::pivot) - Cross-company column-per-tag table
//! - [`StockPriceSeries`](prices::StockPriceSeries) - Dictionary-of-lists price history
//! - [`StatementProvider`](provider::StatementProvider) - Reported financials source
//! - [`PriceProvider`](provider::PriceProvider) - Stock price source

/// Tag aggregation for a single statement.
pub mod aggregate;
/// Error types for data operations.
pub mod error;
/// Fiscal year and period definitions.
pub mod period;
/// Cross-company pivot.
pub mod pivot;
/// Stock prices, price series and returns.
pub mod prices;
/// Provider traits for fetching vendor data.
pub mod provider;
/// Core data types (Symbol, StatementKey, LineItemRecord, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use aggregate::aggregate_one;
pub use error::{DataError, Result};
pub use period::{FiscalPeriod, FiscalYear};
pub use pivot::{PivotTable, pivot};
pub use prices::{
    StockPrice, StockPriceSeries, StockReturn, compute_return, parse_date, returns_to_dataframe,
    validate_date_range,
};
pub use provider::{DataProvider, PriceProvider, StatementProvider};
pub use types::{
    BalanceType, CompanyStatement, LineItemRecord, OutputFormat, StatementKey, StatementKind,
    Symbol, TagValue, TagValues,
};
