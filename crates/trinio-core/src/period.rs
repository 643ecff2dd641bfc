//! Fiscal year and fiscal period definitions.
//!
//! This module defines [`FiscalYear`] and [`FiscalPeriod`], the two time
//! components of a reported-financials key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Fiscal period of a reported statement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiscalPeriod {
    /// First fiscal quarter.
    #[default]
    Q1,
    /// Second fiscal quarter.
    Q2,
    /// Third fiscal quarter.
    Q3,
    /// Fourth fiscal quarter.
    Q4,
    /// Full fiscal year.
    FY,
}

impl FiscalPeriod {
    /// All periods in fiscal order.
    pub const ALL: [Self; 5] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4, Self::FY];

    /// Returns the vendor code for this period (e.g. "Q1", "FY").
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::FY => "FY",
        }
    }

    /// Returns true if this is a quarterly period.
    #[must_use]
    pub const fn is_quarter(&self) -> bool {
        !matches!(self, Self::FY)
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FiscalPeriod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Self::Q1),
            "Q2" => Ok(Self::Q2),
            "Q3" => Ok(Self::Q3),
            "Q4" => Ok(Self::Q4),
            "FY" => Ok(Self::FY),
            _ => Err(DataError::InvalidParameter(format!(
                "Unknown period: {s}. Supported: Q1, Q2, Q3, Q4, FY"
            ))),
        }
    }
}

/// A four-digit fiscal year, displayed zero-padded (`0999`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear(u16);

impl FiscalYear {
    /// Creates a fiscal year, rejecting values with more than four digits.
    pub fn new(year: u16) -> crate::Result<Self> {
        if year <= 9999 {
            Ok(Self(year))
        } else {
            Err(DataError::InvalidParameter(format!(
                "Year must have at most four digits, got {year}"
            )))
        }
    }

    /// Returns the year as a number.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for FiscalYear {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::InvalidParameter(format!(
                "Year must be a four-digit string, got {s:?}"
            )));
        }
        let year: u16 = s
            .parse()
            .map_err(|_| DataError::InvalidParameter(format!("Invalid year: {s}")))?;
        Self::new(year)
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = DataError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FiscalYear> for String {
    fn from(year: FiscalYear) -> Self {
        year.to_string()
    }
}
