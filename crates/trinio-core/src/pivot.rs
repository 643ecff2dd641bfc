//! Cross-company pivot of aggregated statements.
//!
//! [`pivot`] turns a row-per-statement sequence into a column-per-tag table.
//! Tags differ between companies (Cisco reports `SellingAndMarketingExpense`,
//! Apple does not), so each column is padded with nulls for the rows that
//! lack its tag. Every column always has one value per input statement.

use std::borrow::Cow;
use std::collections::HashSet;

use indexmap::IndexMap;
use polars::prelude::{Column, DataFrame, PlSmallStr};
use serde::Serialize;
use serde::ser::SerializeMap;

use crate::error::Result;
use crate::types::{CompanyStatement, StatementKey};

/// Column-per-tag view of a sequence of [`CompanyStatement`]s.
///
/// Identifying columns (`ticker`, `statement`, `year`, `period`) come first
/// and are always populated; tag columns follow in first-seen order and hold
/// `None` where a statement did not report the tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PivotTable {
    rows: usize,
    identity: [Vec<String>; 4],
    tags: IndexMap<String, Vec<Option<f64>>>,
}

impl PivotTable {
    /// Returns the number of rows (input statements).
    #[must_use]
    pub const fn height(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns, identifying fields included.
    #[must_use]
    pub fn width(&self) -> usize {
        StatementKey::FIELDS.len() + self.tags.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns all column names: identifying fields, then tags in first-seen order.
    ///
    /// Names are unique. A tag that collides with an identifying field is
    /// exposed as `tag:<name>`, with further `tag:` prefixes until the name
    /// matches no other column.
    #[must_use]
    pub fn column_names(&self) -> Vec<Cow<'_, str>> {
        StatementKey::FIELDS
            .iter()
            .map(|f| Cow::Borrowed(*f))
            .chain(self.tag_column_names())
            .collect()
    }

    /// Returns the values of an identifying column.
    #[must_use]
    pub fn identity_column(&self, field: &str) -> Option<&[String]> {
        StatementKey::FIELDS
            .iter()
            .position(|f| *f == field)
            .map(|i| self.identity[i].as_slice())
    }

    /// Returns the values of a tag column.
    #[must_use]
    pub fn tag_column(&self, tag: &str) -> Option<&[Option<f64>]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// Iterates over tag columns in first-seen order.
    pub fn tag_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.tags.iter().map(|(t, v)| (t.as_str(), v.as_slice()))
    }

    /// Converts the table into a [`DataFrame`].
    ///
    /// Identifying columns are strings; tag columns are nullable `f64`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.width());
        for (field, values) in StatementKey::FIELDS.iter().zip(&self.identity) {
            columns.push(Column::new((*field).into(), values.clone()));
        }
        for (name, values) in self.tag_column_names().into_iter().zip(self.tags.values()) {
            columns.push(Column::new(PlSmallStr::from(&*name), values.clone()));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Appends one value to a tag column, creating the column (back-filled
    /// with nulls for earlier rows) on first sight.
    fn push_tag(&mut self, tag: &str, value: f64) {
        let row = self.rows;
        self.tags
            .entry(tag.to_string())
            .or_insert_with(|| vec![None; row])
            .push(Some(value));
    }

    /// Closes the current row: every column shorter than the row count gets a null.
    fn finish_row(&mut self) {
        self.rows += 1;
        for values in self.tags.values_mut() {
            if values.len() < self.rows {
                values.push(None);
            }
        }
        debug_assert!(self.is_rectangular());
    }

    /// Returns true if every column has exactly one value per row.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.identity.iter().all(|c| c.len() == self.rows)
            && self.tags.values().all(|c| c.len() == self.rows)
    }

    /// Output names of the tag columns, in tag order.
    fn tag_column_names(&self) -> Vec<Cow<'_, str>> {
        let mut used: HashSet<Cow<'_, str>> = StatementKey::FIELDS
            .iter()
            .map(|f| Cow::Borrowed(*f))
            .collect();
        let mut names = Vec::with_capacity(self.tags.len());
        for tag in self.tags.keys() {
            let mut name = Cow::Borrowed(tag.as_str());
            while used.contains(&name)
                || (name.as_ref() != tag.as_str() && self.tags.contains_key(name.as_ref()))
            {
                name = Cow::Owned(format!("tag:{name}"));
            }
            used.insert(name.clone());
            names.push(name);
        }
        names
    }
}

impl Serialize for PivotTable {
    /// Serializes as a dictionary of equal-length lists.
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.width()))?;
        for (field, values) in StatementKey::FIELDS.iter().zip(&self.identity) {
            map.serialize_entry(field, values)?;
        }
        for (name, values) in self.tag_column_names().iter().zip(self.tags.values()) {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Pivots statements into a [`PivotTable`], one row per statement in input order.
///
/// Only `.value` of each tag is kept; balance type and display name are dropped.
#[must_use]
pub fn pivot(statements: &[CompanyStatement]) -> PivotTable {
    let mut table = PivotTable::default();

    for statement in statements {
        for (column, value) in table.identity.iter_mut().zip(statement.key.field_values()) {
            column.push(value);
        }
        for (tag, tag_value) in statement.tag_values.iter() {
            table.push_tag(tag, tag_value.value);
        }
        table.finish_row();
    }

    tracing::debug!(
        rows = table.height(),
        columns = table.width(),
        "Pivoted statements"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_one;
    use crate::period::FiscalPeriod;
    use crate::types::{BalanceType, LineItemRecord, StatementKind, Symbol};

    fn statement(ticker: &str, tags: &[(&str, f64)]) -> CompanyStatement {
        let key = StatementKey::new(
            Symbol::new(ticker),
            StatementKind::IncomeStatement,
            "2019".parse().unwrap(),
            FiscalPeriod::Q1,
        );
        let records: Vec<LineItemRecord> = tags
            .iter()
            .map(|(t, v)| LineItemRecord::new(*t, *v, BalanceType::Credit, *t))
            .collect();
        aggregate_one(key, &records)
    }

    #[test]
    fn test_end_to_end_two_companies() {
        let a = statement("A", &[("Revenue", 100.0)]);
        let b = statement("B", &[("Revenue", 50.0), ("RnD", 5.0)]);
        let table = pivot(&[a, b]);

        assert_eq!(
            table.column_names(),
            vec!["ticker", "statement", "year", "period", "Revenue", "RnD"]
        );
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.identity_column("ticker").unwrap(),
            &["A".to_string(), "B".to_string()]
        );
        assert_eq!(
            table.tag_column("Revenue").unwrap(),
            &[Some(100.0), Some(50.0)]
        );
        assert_eq!(table.tag_column("RnD").unwrap(), &[None, Some(5.0)]);
    }

    #[test]
    fn test_missing_tag_in_later_company_is_padded() {
        let a = statement("CSCO", &[("Revenue", 1.0), ("SellingAndMarketingExpense", 2.0)]);
        let b = statement("AAPL", &[("Revenue", 3.0)]);
        let table = pivot(&[a, b]);

        assert_eq!(
            table.tag_column("SellingAndMarketingExpense").unwrap(),
            &[Some(2.0), None]
        );
    }

    #[test]
    fn test_every_column_has_one_value_per_row() {
        let inputs = vec![
            statement("A", &[("X", 1.0)]),
            statement("B", &[]),
            statement("C", &[("Y", 2.0), ("X", 3.0)]),
            statement("D", &[("Z", 4.0)]),
            statement("E", &[("Y", 5.0)]),
        ];
        let table = pivot(&inputs);

        assert!(table.is_rectangular());
        for field in StatementKey::FIELDS {
            assert_eq!(table.identity_column(field).unwrap().len(), inputs.len());
        }
        for (_, values) in table.tag_columns() {
            assert_eq!(values.len(), inputs.len());
        }
        assert_eq!(
            table.tag_column("X").unwrap(),
            &[Some(1.0), None, Some(3.0), None, None]
        );
        assert_eq!(
            table.tag_column("Z").unwrap(),
            &[None, None, None, Some(4.0), None]
        );
    }

    #[test]
    fn test_row_order_matches_input() {
        let tickers = ["IBM", "AXP", "CAT", "AAPL", "CSCO"];
        let inputs: Vec<_> = tickers.iter().map(|t| statement(t, &[("R", 1.0)])).collect();
        let table = pivot(&inputs);

        let column = table.identity_column("ticker").unwrap();
        for (i, ticker) in tickers.iter().enumerate() {
            assert_eq!(column[i], *ticker);
            assert_eq!(
                table.identity_column("period").unwrap()[i],
                inputs[i].key.period.to_string()
            );
        }
    }

    #[test]
    fn test_tag_named_like_identity_gets_distinct_column() {
        let a = statement("A", &[("ticker", 7.0)]);
        let table = pivot(&[a]);

        assert_eq!(table.identity_column("ticker").unwrap(), &["A".to_string()]);
        assert_eq!(table.tag_column("ticker").unwrap(), &[Some(7.0)]);
        assert_eq!(table.column_names().last().unwrap(), "tag:ticker");
        assert_eq!(table.to_dataframe().unwrap().width(), 5);
    }

    #[test]
    fn test_renamed_tag_does_not_collide_with_literal_tag() {
        let a = statement("A", &[("ticker", 7.0), ("tag:ticker", 8.0)]);
        let b = statement("B", &[("tag:ticker", 9.0), ("ticker", 1.0)]);
        let table = pivot(&[a, b]);

        let names = table.column_names();
        let unique: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(names[4], "tag:tag:ticker");
        assert_eq!(names[5], "tag:ticker");

        let df = table.to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 6));
        let literal = df.column("tag:ticker").unwrap().f64().unwrap();
        assert_eq!(literal.get(0), Some(8.0));
        assert_eq!(literal.get(1), Some(9.0));
        let renamed = df.column("tag:tag:ticker").unwrap().f64().unwrap();
        assert_eq!(renamed.get(1), Some(1.0));

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 6);
        assert_eq!(json["tag:tag:ticker"], serde_json::json!([7.0, 1.0]));
    }

    #[test]
    fn test_empty_input() {
        let table = pivot(&[]);
        assert!(table.is_empty());
        assert_eq!(table.width(), 4);
        assert!(table.is_rectangular());
    }

    #[test]
    fn test_to_dataframe_nulls() {
        let a = statement("A", &[("Revenue", 100.0)]);
        let b = statement("B", &[("Revenue", 50.0), ("RnD", 5.0)]);
        let df = pivot(&[a, b]).to_dataframe().unwrap();

        assert_eq!(df.shape(), (2, 6));
        let rnd = df.column("RnD").unwrap();
        assert_eq!(rnd.null_count(), 1);
        let ticker = df.column("ticker").unwrap().str().unwrap();
        assert_eq!(ticker.get(1), Some("B"));
    }

    #[test]
    fn test_serialize_dictionary_of_lists() {
        let a = statement("A", &[("Revenue", 100.0)]);
        let b = statement("B", &[("RnD", 5.0)]);
        let json = serde_json::to_value(pivot(&[a, b])).unwrap();

        assert_eq!(json["ticker"], serde_json::json!(["A", "B"]));
        assert_eq!(json["Revenue"], serde_json::json!([100.0, null]));
        assert_eq!(json["RnD"], serde_json::json!([null, 5.0]));
    }
}
