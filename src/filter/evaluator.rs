//! Filter evaluation against rows and property bags

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};

use super::types::{Filter, FilterGroup};
use crate::schema::{Column, Row};
use crate::value::Value;

/// Evaluates persisted filters against rows
///
/// A filter's `field` is matched against column names first, then column
/// keys (`name + table`), then used as a raw row key.
pub struct RowFilter<'a> {
    columns: &'a [Column],
    properties: Option<&'a BTreeMap<String, Value>>,
    today: NaiveDate,
}

impl<'a> RowFilter<'a> {
    /// Create an evaluator over a column set
    pub fn new(columns: &'a [Column]) -> Self {
        Self {
            columns,
            properties: None,
            today: Local::now().date_naive(),
        }
    }

    /// Supply the property bag consulted by `fType: "property"` filters
    pub fn with_properties(mut self, properties: &'a BTreeMap<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Override the evaluation date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Checks if a row matches all filters (AND semantics)
    pub fn matches(&self, row: &Row, filters: &[Filter]) -> bool {
        filters.iter().all(|filter| self.matches_filter(row, filter))
    }

    /// Checks if a row matches a filter group
    pub fn matches_group(&self, row: &Row, group: &FilterGroup) -> bool {
        group.combine(|filter| self.matches_filter(row, filter))
    }

    /// Checks a single filter
    pub fn matches_filter(&self, row: &Row, filter: &Filter) -> bool {
        let operand = filter.operand(self.properties);
        filter
            .func
            .evaluate_on(row.lookup(self.columns, &filter.field), operand.as_deref(), self.today)
    }

    /// Rows passing every filter and every group, in input order
    pub fn filter_rows(&self, rows: &[Row], filters: &[Filter], groups: &[FilterGroup]) -> Vec<Row> {
        rows.iter()
            .filter(|row| {
                self.matches(row, filters) && groups.iter().all(|g| self.matches_group(row, g))
            })
            .cloned()
            .collect()
    }
}

/// Evaluates filter groups against a property bag
///
/// The bag supplies both the compared values (by `field`) and the
/// property operands.
pub struct PropertyFilter<'a> {
    properties: &'a BTreeMap<String, Value>,
    today: NaiveDate,
}

impl<'a> PropertyFilter<'a> {
    /// Create an evaluator over a property bag
    pub fn new(properties: &'a BTreeMap<String, Value>) -> Self {
        Self {
            properties,
            today: Local::now().date_naive(),
        }
    }

    /// Override the evaluation date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Checks a filter group
    pub fn matches_group(&self, group: &FilterGroup) -> bool {
        group.combine(|filter| self.matches_filter(filter))
    }

    /// Checks a single filter
    pub fn matches_filter(&self, filter: &Filter) -> bool {
        let value = self.properties.get(&filter.field).and_then(Value::to_text);
        let operand = filter.operand(Some(self.properties));
        filter
            .func
            .evaluate_on(value.as_deref(), operand.as_deref(), self.today)
    }
}
