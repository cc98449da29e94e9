//! End-to-end view evaluation
//!
//! filter -> sort -> limit, then grouping and the aggregate row over the
//! rows that are actually displayed.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::types::Predicate;
use crate::aggregate::Aggregator;
use crate::filter::RowFilter;
use crate::observability::{log_event, Event, Timer};
use crate::schema::{Column, Row, TypeTag};
use crate::sort::RowSorter;
use crate::value::{parse_multi_string, Value};

/// One group-by bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewGroup {
    /// Group value ("" for rows with no value)
    pub key: String,
    pub rows: Vec<Row>,
}

/// Output of a view query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResult {
    /// Displayed rows, after the limit
    pub rows: Vec<Row>,

    /// Rows matching the filters, before the limit
    pub total: usize,

    /// Buckets of the first `groupBy` column, empty when not grouped
    pub groups: Vec<ViewGroup>,

    /// `colsCalc` results keyed by column
    pub aggregates: BTreeMap<String, String>,
}

/// Applies a predicate to a row set
pub struct ViewQuery<'a> {
    predicate: &'a Predicate,
    columns: &'a [Column],
    properties: Option<&'a BTreeMap<String, Value>>,
    today: Option<NaiveDate>,
}

impl<'a> ViewQuery<'a> {
    pub fn new(predicate: &'a Predicate, columns: &'a [Column]) -> Self {
        Self {
            predicate,
            columns,
            properties: None,
            today: None,
        }
    }

    /// Property bag for `fType: "property"` filters
    pub fn with_properties(mut self, properties: &'a BTreeMap<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Override the evaluation date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Runs the full pipeline. Input rows are never modified.
    pub fn run(&self, rows: &[Row]) -> ViewResult {
        let timer = Timer::new();

        let mut filter = RowFilter::new(self.columns);
        if let Some(properties) = self.properties {
            filter = filter.with_properties(properties);
        }
        if let Some(today) = self.today {
            filter = filter.with_today(today);
        }
        let mut matched = filter.filter_rows(rows, &self.predicate.filters, &self.predicate.filter_groups);
        let total = matched.len();

        RowSorter::sort(&mut matched, &self.predicate.sort, self.columns);

        if self.predicate.limit > 0 {
            matched.truncate(usize::try_from(self.predicate.limit).unwrap_or(usize::MAX));
        }

        let groups = self.group(&matched);
        let aggregates = Aggregator::calculate(&matched, self.columns, &self.predicate.cols_calc);

        log_event(
            Event::ViewQuery,
            &[
                ("displayed", matched.len().to_string().as_str()),
                ("duration_us", timer.elapsed_us().as_str()),
                ("input", rows.len().to_string().as_str()),
                ("matched", total.to_string().as_str()),
            ],
        );

        ViewResult {
            rows: matched,
            total,
            groups,
            aggregates,
        }
    }

    /// Buckets rows by the first `groupBy` field.
    ///
    /// Multi-valued columns put a row in every bucket it has a value for.
    /// Option columns order buckets by option order, anything else by
    /// first appearance.
    pub fn group(&self, rows: &[Row]) -> Vec<ViewGroup> {
        let Some(field) = self.predicate.group_by.first() else {
            return Vec::new();
        };
        let column = Column::find(self.columns, field);
        let multi = column.map(|c| c.type_tag.is_multi()).unwrap_or(false);

        let mut groups: Vec<ViewGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in rows {
            let raw = row.lookup(self.columns, field).unwrap_or_default();
            let mut keys = if multi {
                parse_multi_string(raw)
            } else {
                vec![raw.to_string()]
            };
            if keys.is_empty() {
                keys.push(String::new());
            }
            for key in keys {
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    groups.push(ViewGroup {
                        key,
                        rows: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[slot].rows.push(row.clone());
            }
        }

        if let Some(column) = column.filter(|c| c.type_tag.base() == TypeTag::Option) {
            let options = column.option_values();
            groups.sort_by_key(|g| options.iter().position(|o| *o == g.key).unwrap_or(usize::MAX));
        }
        groups
    }
}
