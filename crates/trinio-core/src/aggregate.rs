//! Tag aggregation for a single reported statement.
//!
//! A vendor statement can report the same XBRL tag several times (once per
//! context). [`aggregate_one`] collapses those occurrences into one value per
//! tag with a left fold: the balance type of the *first* occurrence decides
//! whether each later occurrence is subtracted (credit) or added (debit).
//!
//! ```
//! use trinio_core::{aggregate_one, BalanceType, LineItemRecord, StatementKey};
//! # use trinio_core::{FiscalPeriod, StatementKind, Symbol};
//! # let key = StatementKey::new(
//! #     Symbol::new("AAPL"),
//! #     StatementKind::IncomeStatement,
//! #     "2019".parse().unwrap(),
//! #     FiscalPeriod::Q1,
//! # );
//! let records = vec![
//!     LineItemRecord::new("Revenues", 100.0, BalanceType::Credit, "Revenue"),
//!     LineItemRecord::new("Revenues", 30.0, BalanceType::Credit, "Revenue"),
//! ];
//! let stmt = aggregate_one(key, &records);
//! assert_eq!(stmt.value("Revenues"), Some(70.0));
//! ```

use tracing::trace;

use crate::types::{CompanyStatement, LineItemRecord, StatementKey, TagValue};

/// Aggregates the line items of one statement key into a [`CompanyStatement`].
///
/// Records are processed in input order. A tag seen for the first time is
/// inserted as-is; each later occurrence is combined with the running value
/// using the first occurrence's balance type, whatever the balance type of
/// the later record. Order therefore matters once a tag occurs three or more
/// times.
#[must_use]
pub fn aggregate_one(key: StatementKey, records: &[LineItemRecord]) -> CompanyStatement {
    let mut statement = CompanyStatement::new(key);

    for record in records {
        match statement.tag_values.get_mut(&record.tag) {
            Some(existing) => {
                let combined = existing.balance_type.combine(existing.value, record.value);
                trace!(
                    tag = %record.tag,
                    running = existing.value,
                    next = record.value,
                    combined,
                    "Folding repeated tag"
                );
                existing.value = combined;
            }
            None => {
                statement.tag_values.insert(
                    record.tag.clone(),
                    TagValue {
                        value: record.value,
                        balance_type: record.balance_type,
                        display_name: record.display_name.clone(),
                    },
                );
            }
        }
    }

    statement
}
