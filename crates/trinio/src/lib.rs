#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trinio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Reported financial statements and stock prices as records or tables.
//!
//! This crate re-exports the core types and the Intrinio provider, and
//! provides the `gather_*` operations that fetch, aggregate and reshape
//! vendor data.
//!
//! # Features
//!
//! - `intrinio` - Intrinio provider (enabled by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use trinio::{
//!     FiscalPeriod, IntrinioConfig, IntrinioProvider, OutputFormat, StatementKind, Symbol,
//!     gather_financial_statement_company_compare,
//! };
//!
//! #[tokio::main]
//! async fn main() -> trinio::Result<()> {
//!     let provider = IntrinioProvider::new(IntrinioConfig::from_env()?)?;
//!
//!     let table = gather_financial_statement_company_compare(
//!         &provider,
//!         &[Symbol::new("AAPL"), Symbol::new("CSCO")],
//!         StatementKind::IncomeStatement,
//!         "2019".parse()?,
//!         FiscalPeriod::Q1,
//!         OutputFormat::Table,
//!     )
//!     .await?;
//!     println!("{:?}", table);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use trinio_core::*;

// Providers
#[cfg(feature = "intrinio")]
pub use trinio_intrinio::{IntrinioConfig, IntrinioProvider};

mod gather;
pub use gather::{
    PriceOutput, StatementOutput, gather_financial_statement_company_compare,
    gather_financial_statement_time_series, gather_stock_returns, gather_stock_time_series,
};
