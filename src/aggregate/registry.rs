//! Aggregate reducer registry

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::NumberFormat;
use crate::schema::{Column, TypeTag};
use crate::value::{normalized_empty, parse_date_millis, parse_multi_string, parse_number, Value};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Aggregate reducers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateFn {
    Count,
    Empty,
    Filled,
    PercentageEmpty,
    PercentageFilled,
    Unique,
    Sum,
    Average,
    Median,
    Min,
    Max,
    Range,
    Earliest,
    Latest,
    DateRange,
    Checked,
    Unchecked,
    PercentageChecked,
}

impl AggregateFn {
    /// Every registered reducer, in menu order
    pub const ALL: [AggregateFn; 18] = [
        AggregateFn::Count,
        AggregateFn::Empty,
        AggregateFn::Filled,
        AggregateFn::PercentageEmpty,
        AggregateFn::PercentageFilled,
        AggregateFn::Unique,
        AggregateFn::Sum,
        AggregateFn::Average,
        AggregateFn::Median,
        AggregateFn::Min,
        AggregateFn::Max,
        AggregateFn::Range,
        AggregateFn::Earliest,
        AggregateFn::Latest,
        AggregateFn::DateRange,
        AggregateFn::Checked,
        AggregateFn::Unchecked,
        AggregateFn::PercentageChecked,
    ];

    /// Returns the persisted reducer name
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Empty => "empty",
            AggregateFn::Filled => "filled",
            AggregateFn::PercentageEmpty => "percentageEmpty",
            AggregateFn::PercentageFilled => "percentageFilled",
            AggregateFn::Unique => "unique",
            AggregateFn::Sum => "sum",
            AggregateFn::Average => "average",
            AggregateFn::Median => "median",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
            AggregateFn::Range => "range",
            AggregateFn::Earliest => "earliest",
            AggregateFn::Latest => "latest",
            AggregateFn::DateRange => "dateRange",
            AggregateFn::Checked => "checked",
            AggregateFn::Unchecked => "unchecked",
            AggregateFn::PercentageChecked => "percentageChecked",
        }
    }

    /// Looks up a reducer by persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            AggregateFn::Count => "Count All",
            AggregateFn::Empty => "Count Empty",
            AggregateFn::Filled => "Count Filled",
            AggregateFn::PercentageEmpty => "Percent Empty",
            AggregateFn::PercentageFilled => "Percent Filled",
            AggregateFn::Unique => "Count Unique",
            AggregateFn::Sum => "Sum",
            AggregateFn::Average => "Average",
            AggregateFn::Median => "Median",
            AggregateFn::Min => "Min",
            AggregateFn::Max => "Max",
            AggregateFn::Range => "Range",
            AggregateFn::Earliest => "Earliest",
            AggregateFn::Latest => "Latest",
            AggregateFn::DateRange => "Date Range",
            AggregateFn::Checked => "Checked",
            AggregateFn::Unchecked => "Unchecked",
            AggregateFn::PercentageChecked => "Percent Checked",
        }
    }

    /// Returns true if the reducer is offered for a column type
    pub fn applies_to(&self, tag: &TypeTag) -> bool {
        match self {
            AggregateFn::Count
            | AggregateFn::Empty
            | AggregateFn::Filled
            | AggregateFn::PercentageEmpty
            | AggregateFn::PercentageFilled
            | AggregateFn::Unique => true,
            AggregateFn::Sum
            | AggregateFn::Average
            | AggregateFn::Median
            | AggregateFn::Min
            | AggregateFn::Max
            | AggregateFn::Range => matches!(tag, TypeTag::Number),
            AggregateFn::Earliest | AggregateFn::Latest | AggregateFn::DateRange => {
                matches!(tag, TypeTag::Date)
            }
            AggregateFn::Checked | AggregateFn::Unchecked | AggregateFn::PercentageChecked => {
                matches!(tag, TypeTag::Boolean)
            }
        }
    }

    /// Reduces a column's values to a display string.
    ///
    /// Numeric results go through the column's number format when one is
    /// configured. Reducers over an empty numeric or date set yield "".
    pub fn reduce(&self, column: &Column, values: &[Option<&str>]) -> String {
        let total = values.len();
        let filled = values.iter().filter(|v| !normalized_empty(**v)).count();
        let checked = values.iter().filter(|v| **v == Some("true")).count();

        match self {
            AggregateFn::Count => total.to_string(),
            AggregateFn::Empty => (total - filled).to_string(),
            AggregateFn::Filled => filled.to_string(),
            AggregateFn::PercentageEmpty => percentage(total - filled, total),
            AggregateFn::PercentageFilled => percentage(filled, total),
            AggregateFn::Unique => unique(column, values).to_string(),
            AggregateFn::Checked => checked.to_string(),
            AggregateFn::Unchecked => (total - checked).to_string(),
            AggregateFn::PercentageChecked => percentage(checked, total),
            AggregateFn::Sum
            | AggregateFn::Average
            | AggregateFn::Median
            | AggregateFn::Min
            | AggregateFn::Max
            | AggregateFn::Range => {
                let mut numbers: Vec<f64> = values
                    .iter()
                    .flatten()
                    .map(|v| parse_number(v))
                    .filter(|n| n.is_finite())
                    .collect();
                numbers.sort_by(f64::total_cmp);
                self.reduce_numbers(&numbers)
                    .map(|n| format_numeric(column, n))
                    .unwrap_or_default()
            }
            AggregateFn::Earliest | AggregateFn::Latest | AggregateFn::DateRange => {
                let dates: Vec<i64> = values.iter().flatten().filter_map(|v| parse_date_millis(v)).collect();
                let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
                    return String::new();
                };
                match self {
                    AggregateFn::Earliest => format_date(*first),
                    AggregateFn::Latest => format_date(*last),
                    _ => last
                        .checked_sub(*first)
                        .map(|span| format!("{} days", span / MILLIS_PER_DAY))
                        .unwrap_or_default(),
                }
            }
        }
    }

    /// Numeric reduction over sorted finite values
    fn reduce_numbers(&self, sorted: &[f64]) -> Option<f64> {
        if sorted.is_empty() {
            return match self {
                AggregateFn::Sum => Some(0.0),
                _ => None,
            };
        }
        let sum: f64 = sorted.iter().sum();
        let len = sorted.len();
        let first = sorted[0];
        let last = sorted[len - 1];
        Some(match self {
            AggregateFn::Sum => sum,
            AggregateFn::Average => sum / len as f64,
            AggregateFn::Median if len % 2 == 0 => (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0,
            AggregateFn::Median => sorted[len / 2],
            AggregateFn::Min => first,
            AggregateFn::Max => last,
            _ => last - first,
        })
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reducers offered for a column type, in menu order
pub fn aggregate_fns_for_type(tag: &TypeTag) -> Vec<AggregateFn> {
    AggregateFn::ALL
        .into_iter()
        .filter(|f| f.applies_to(tag))
        .collect()
}

fn percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    let pct = (part as f64 / total as f64 * 10_000.0).round() / 100.0;
    format!("{}%", Value::Number(pct))
}

/// Distinct non-empty values; multi-valued columns count each item
fn unique(column: &Column, values: &[Option<&str>]) -> usize {
    let mut seen = BTreeSet::new();
    for value in values.iter().flatten().filter(|v| !v.is_empty()) {
        if column.type_tag.is_multi() {
            seen.extend(parse_multi_string(value));
        } else {
            seen.insert(value.to_string());
        }
    }
    seen.len()
}

fn format_numeric(column: &Column, n: f64) -> String {
    match column.number_format().as_deref().and_then(NumberFormat::parse) {
        Some(format) => format.apply(n),
        None => {
            let rounded = (n * 100.0).round() / 100.0;
            Value::Number(rounded).to_string()
        }
    }
}

fn format_date(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
