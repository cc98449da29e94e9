//! Multi-key row sorting

use std::cmp::Ordering;

use super::registry::SortColumn;
use super::types::Sort;
use crate::schema::{Column, Row};

/// Sorts rows by a chain of sort keys
pub struct RowSorter;

impl RowSorter {
    /// Sorts rows in place.
    ///
    /// Keys are applied in order; later keys only break ties left by
    /// earlier ones. Rows equal under every key keep their input order.
    pub fn sort(rows: &mut [Row], sorts: &[Sort], columns: &[Column]) {
        if sorts.is_empty() {
            return;
        }
        let keys: Vec<(&Sort, Option<SortColumn>)> = sorts
            .iter()
            .map(|sort| (sort, Column::find(columns, &sort.field).map(SortColumn::new)))
            .collect();

        rows.sort_by(|a, b| {
            keys.iter().fold(Ordering::Equal, |ordering, (sort, column)| {
                ordering.then_with(|| {
                    sort.func.compare(
                        a.lookup(columns, &sort.field),
                        b.lookup(columns, &sort.field),
                        column.as_ref(),
                    )
                })
            })
        });
    }
}
