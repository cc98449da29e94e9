//! Aggregate row evaluation

use std::collections::BTreeMap;

use super::registry::AggregateFn;
use crate::observability::{log_event, Event};
use crate::schema::{Column, Row, TypeTag};

/// Computes the per-column aggregate row of a view
pub struct Aggregator;

impl Aggregator {
    /// Evaluates `colsCalc` (column -> reducer name) over a row set.
    ///
    /// Unknown reducer names are skipped. A field with no matching column is
    /// read as raw text.
    pub fn calculate(
        rows: &[Row],
        columns: &[Column],
        cols_calc: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for (field, name) in cols_calc {
            let Some(func) = AggregateFn::from_name(name) else {
                log_event(Event::AggregateUnknown, &[("field", field.as_str()), ("fn", name.as_str())]);
                continue;
            };
            let fallback;
            let column = match Column::find(columns, field) {
                Some(column) => column,
                None => {
                    fallback = Column::new(field.clone(), TypeTag::Text);
                    &fallback
                }
            };
            out.insert(field.clone(), Self::column(func, column, rows, field));
        }
        out
    }

    /// Reduces one column across rows
    pub fn column(func: AggregateFn, column: &Column, rows: &[Row], field: &str) -> String {
        let columns = std::slice::from_ref(column);
        let values: Vec<Option<&str>> = rows.iter().map(|row| row.lookup(columns, field)).collect();
        func.reduce(column, &values)
    }
}
