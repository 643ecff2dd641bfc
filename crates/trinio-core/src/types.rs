//! Core data types for reported financials.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`StatementKind`] - Which financial statement to fetch
//! - [`StatementKey`] - The (ticker, statement, year, period) identity of a fetch
//! - [`BalanceType`] - Credit/debit classification of a tag
//! - [`LineItemRecord`] - One reported value for one tag
//! - [`CompanyStatement`] - Aggregated tag values for one key
//! - [`OutputFormat`] - Record or tabular output selection

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;
use crate::period::{FiscalPeriod, FiscalYear};

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Creates a symbol, rejecting empty or whitespace-only input.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let symbol = Self::new(s);
        if symbol.0.is_empty() {
            return Err(DataError::InvalidParameter(
                "Ticker must be a non-empty string, e.g. 'AAPL'".to_string(),
            ));
        }
        Ok(symbol)
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Financial statement selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Income statement.
    #[default]
    IncomeStatement,
    /// Balance sheet.
    BalanceSheetStatement,
    /// Cash flow statement.
    CashFlowStatement,
}

impl StatementKind {
    /// Returns the vendor code for this statement.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheetStatement => "balance_sheet_statement",
            Self::CashFlowStatement => "cash_flow_statement",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income_statement" => Ok(Self::IncomeStatement),
            "balance_sheet_statement" => Ok(Self::BalanceSheetStatement),
            "cash_flow_statement" => Ok(Self::CashFlowStatement),
            _ => Err(DataError::InvalidParameter(format!(
                "Unknown statement: {s}. Supported: income_statement, \
                 balance_sheet_statement, cash_flow_statement"
            ))),
        }
    }
}

/// Output representation for gathered data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Record-like structures (per-company records or dictionary-of-lists).
    #[default]
    Records,
    /// A [`polars::prelude::DataFrame`].
    Table,
}

impl FromStr for OutputFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "records" | "dict" => Ok(Self::Records),
            "table" | "pddf" => Ok(Self::Table),
            _ => Err(DataError::InvalidParameter(format!(
                "Unknown output format: {s}. Supported: records (dict), table (pddf)"
            ))),
        }
    }
}

/// Identity of one reported-financials fetch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementKey {
    /// Company ticker.
    pub ticker: Symbol,
    /// Statement kind.
    pub statement: StatementKind,
    /// Fiscal year.
    pub year: FiscalYear,
    /// Fiscal period.
    pub period: FiscalPeriod,
}

impl StatementKey {
    /// Names of the identifying fields, in column order.
    pub const FIELDS: [&'static str; 4] = ["ticker", "statement", "year", "period"];

    /// Creates a new statement key.
    #[must_use]
    pub const fn new(
        ticker: Symbol,
        statement: StatementKind,
        year: FiscalYear,
        period: FiscalPeriod,
    ) -> Self {
        Self {
            ticker,
            statement,
            year,
            period,
        }
    }

    /// Returns the vendor fundamental id, e.g. `AAPL-income_statement-2019-Q1`.
    #[must_use]
    pub fn fundamental_id(&self) -> String {
        self.to_string()
    }

    /// Returns the identifying field values in [`Self::FIELDS`] order.
    #[must_use]
    pub fn field_values(&self) -> [String; 4] {
        [
            self.ticker.to_string(),
            self.statement.to_string(),
            self.year.to_string(),
            self.period.to_string(),
        ]
    }
}

impl fmt::Display for StatementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.ticker, self.statement, self.year, self.period
        )
    }
}

/// Credit/debit classification of a tag.
///
/// Determines how repeated occurrences of the same tag are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Credit balance: repeated occurrences are subtracted.
    Credit,
    /// Debit balance: repeated occurrences are added.
    #[default]
    Debit,
}

impl BalanceType {
    /// Interprets a vendor balance string.
    ///
    /// Only the exact string `"credit"` yields [`BalanceType::Credit`].
    /// Anything else, including a missing value, is treated as
    /// [`BalanceType::Debit`].
    #[must_use]
    pub fn from_vendor(balance: Option<&str>) -> Self {
        match balance {
            Some("credit") => Self::Credit,
            Some("debit") => Self::Debit,
            Some(other) => {
                tracing::debug!(balance = other, "Unknown balance type, treating as debit");
                Self::Debit
            }
            None => Self::Debit,
        }
    }

    /// Combines a running value with a later occurrence.
    #[must_use]
    pub fn combine(self, running: f64, next: f64) -> f64 {
        match self {
            Self::Credit => running - next,
            Self::Debit => running + next,
        }
    }
}

/// One reported value for one tag within one fetched statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// XBRL tag, e.g. `NetIncomeLoss`. Not unique within a statement.
    pub tag: String,
    /// Reported value.
    pub value: f64,
    /// Balance type of the tag.
    pub balance_type: BalanceType,
    /// Human-readable label.
    pub display_name: String,
}

impl LineItemRecord {
    /// Creates a new line item.
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        value: f64,
        balance_type: BalanceType,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            value,
            balance_type,
            display_name: display_name.into(),
        }
    }
}

/// Aggregated value of one tag, with the metadata of its first occurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagValue {
    /// Aggregated value.
    pub value: f64,
    /// Balance type of the first occurrence.
    pub balance_type: BalanceType,
    /// Display name of the first occurrence.
    pub display_name: String,
}

/// Insertion-ordered mapping from tag to [`TagValue`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagValues(IndexMap<String, TagValue>);

impl TagValues {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&TagValue> {
        self.0.get(tag)
    }

    /// Returns a mutable reference to the value for a tag.
    pub fn get_mut(&mut self, tag: &str) -> Option<&mut TagValue> {
        self.0.get_mut(tag)
    }

    /// Inserts a tag. Returns false and leaves the mapping unchanged if the tag exists.
    pub fn insert(&mut self, tag: impl Into<String>, value: TagValue) -> bool {
        match self.0.entry(tag.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Returns true if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains_key(tag)
    }

    /// Returns the number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over tags in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.0.iter().map(|(t, v)| (t.as_str(), v))
    }
}

/// Aggregated statement for one (ticker, statement, year, period) key.
///
/// Identifying fields are kept apart from `tag_values`, so no vendor tag can
/// shadow them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompanyStatement {
    /// Identifying fields.
    #[serde(flatten)]
    pub key: StatementKey,
    /// One entry per distinct tag.
    pub tag_values: TagValues,
}

impl CompanyStatement {
    /// Creates an empty statement for a key.
    #[must_use]
    pub fn new(key: StatementKey) -> Self {
        Self {
            key,
            tag_values: TagValues::new(),
        }
    }

    /// Returns the aggregated value of a tag.
    #[must_use]
    pub fn value(&self, tag: &str) -> Option<f64> {
        self.tag_values.get(tag).map(|v| v.value)
    }
}
