//! Filter operator registry
//!
//! Closed set of named predicate operators. Names are the persisted
//! strings; everything inside the engine works on [`FilterFn`].

use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::TypeTag;
use crate::value::{
    list_includes, normalized_empty, parse_date_millis, parse_number, string_equal,
    string_includes,
};

/// Kind of operand an operator expects, used to pick an operand editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// No operand
    None,
    /// Free text
    Text,
    /// Number
    Number,
    /// Date or epoch millis
    Date,
    /// Comma-separated list
    List,
}

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterFn {
    IsEmpty,
    IsNotEmpty,
    Include,
    NotInclude,
    Is,
    IsNot,
    Equal,
    IsGreatThan,
    IsLessThan,
    IsGreatThanOrEqual,
    IsLessThanOrEqual,
    DateBefore,
    DateAfter,
    IsSameDateAsToday,
    IsAnyInList,
    IsNoneInList,
    IsTrue,
    IsFalse,
}

impl FilterFn {
    /// Every registered operator, in menu order
    pub const ALL: [FilterFn; 18] = [
        FilterFn::IsEmpty,
        FilterFn::IsNotEmpty,
        FilterFn::Include,
        FilterFn::NotInclude,
        FilterFn::Is,
        FilterFn::IsNot,
        FilterFn::Equal,
        FilterFn::IsGreatThan,
        FilterFn::IsLessThan,
        FilterFn::IsGreatThanOrEqual,
        FilterFn::IsLessThanOrEqual,
        FilterFn::DateBefore,
        FilterFn::DateAfter,
        FilterFn::IsSameDateAsToday,
        FilterFn::IsAnyInList,
        FilterFn::IsNoneInList,
        FilterFn::IsTrue,
        FilterFn::IsFalse,
    ];

    /// Returns the persisted operator name
    pub fn name(&self) -> &'static str {
        match self {
            FilterFn::IsEmpty => "isEmpty",
            FilterFn::IsNotEmpty => "isNotEmpty",
            FilterFn::Include => "include",
            FilterFn::NotInclude => "notInclude",
            FilterFn::Is => "is",
            FilterFn::IsNot => "isNot",
            FilterFn::Equal => "equal",
            FilterFn::IsGreatThan => "isGreatThan",
            FilterFn::IsLessThan => "isLessThan",
            FilterFn::IsGreatThanOrEqual => "isGreatThanOrEqual",
            FilterFn::IsLessThanOrEqual => "isLessThanOrEqual",
            FilterFn::DateBefore => "dateBefore",
            FilterFn::DateAfter => "dateAfter",
            FilterFn::IsSameDateAsToday => "isSameDateAsToday",
            FilterFn::IsAnyInList => "isAnyInList",
            FilterFn::IsNoneInList => "isNoneInList",
            FilterFn::IsTrue => "isTrue",
            FilterFn::IsFalse => "isFalse",
        }
    }

    /// Looks up an operator by persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FilterFn::IsEmpty => "is empty",
            FilterFn::IsNotEmpty => "is not empty",
            FilterFn::Include => "contains",
            FilterFn::NotInclude => "does not contain",
            FilterFn::Is => "is",
            FilterFn::IsNot => "is not",
            FilterFn::Equal => "=",
            FilterFn::IsGreatThan => ">",
            FilterFn::IsLessThan => "<",
            FilterFn::IsGreatThanOrEqual => ">=",
            FilterFn::IsLessThanOrEqual => "<=",
            FilterFn::DateBefore => "is before",
            FilterFn::DateAfter => "is after",
            FilterFn::IsSameDateAsToday => "is today",
            FilterFn::IsAnyInList => "is any of",
            FilterFn::IsNoneInList => "is none of",
            FilterFn::IsTrue => "is checked",
            FilterFn::IsFalse => "is unchecked",
        }
    }

    /// Operand kind
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FilterFn::IsEmpty
            | FilterFn::IsNotEmpty
            | FilterFn::IsSameDateAsToday
            | FilterFn::IsTrue
            | FilterFn::IsFalse => ValueKind::None,
            FilterFn::Include | FilterFn::NotInclude | FilterFn::Is | FilterFn::IsNot => {
                ValueKind::Text
            }
            FilterFn::Equal
            | FilterFn::IsGreatThan
            | FilterFn::IsLessThan
            | FilterFn::IsGreatThanOrEqual
            | FilterFn::IsLessThanOrEqual => ValueKind::Number,
            FilterFn::DateBefore | FilterFn::DateAfter => ValueKind::Date,
            FilterFn::IsAnyInList | FilterFn::IsNoneInList => ValueKind::List,
        }
    }

    /// Returns true if the operator is offered for a column type.
    ///
    /// This only drives what a UI offers. A persisted filter is evaluated
    /// regardless of the column it points at.
    pub fn applies_to(&self, tag: &TypeTag) -> bool {
        let multi = tag.is_multi();
        let base = tag.base();
        match self {
            FilterFn::IsEmpty | FilterFn::IsNotEmpty => true,
            FilterFn::Include | FilterFn::NotInclude => matches!(
                base,
                TypeTag::Text
                    | TypeTag::Link
                    | TypeTag::File
                    | TypeTag::Fileprop
                    | TypeTag::Image
                    | TypeTag::Flex
                    | TypeTag::Tags
                    | TypeTag::Context
                    | TypeTag::Other(_)
            ),
            FilterFn::Is | FilterFn::IsNot => {
                !multi
                    && matches!(
                        base,
                        TypeTag::Text
                            | TypeTag::Option
                            | TypeTag::Link
                            | TypeTag::File
                            | TypeTag::Fileprop
                            | TypeTag::Context
                            | TypeTag::Tags
                            | TypeTag::Image
                            | TypeTag::Other(_)
                    )
            }
            FilterFn::Equal
            | FilterFn::IsGreatThan
            | FilterFn::IsLessThan
            | FilterFn::IsGreatThanOrEqual
            | FilterFn::IsLessThanOrEqual => matches!(base, TypeTag::Number),
            FilterFn::DateBefore | FilterFn::DateAfter | FilterFn::IsSameDateAsToday => {
                matches!(base, TypeTag::Date)
            }
            FilterFn::IsAnyInList | FilterFn::IsNoneInList => matches!(
                base,
                TypeTag::Option | TypeTag::Tags | TypeTag::Context | TypeTag::Link
            ) && (multi || !matches!(base, TypeTag::Link)),
            FilterFn::IsTrue | FilterFn::IsFalse => matches!(base, TypeTag::Boolean),
        }
    }

    /// Evaluates the operator against today's local date.
    pub fn evaluate(&self, value: Option<&str>, operand: Option<&str>) -> bool {
        self.evaluate_on(value, operand, Local::now().date_naive())
    }

    /// Evaluates the operator with an explicit "today".
    ///
    /// Total over all inputs: unparseable numbers and dates make the
    /// comparison false (except where an operator is defined as the
    /// negation of another).
    pub fn evaluate_on(&self, value: Option<&str>, operand: Option<&str>, today: NaiveDate) -> bool {
        match self {
            FilterFn::IsEmpty => normalized_empty(value),
            FilterFn::IsNotEmpty => !normalized_empty(value),
            FilterFn::Include => string_includes(value, operand),
            FilterFn::NotInclude => !string_includes(value, operand),
            FilterFn::Is => string_equal(value, operand),
            FilterFn::IsNot => !string_equal(value, operand),
            FilterFn::Equal => number(value) == number(operand),
            FilterFn::IsGreatThan => number(value) > number(operand),
            FilterFn::IsLessThan => number(value) < number(operand),
            FilterFn::IsGreatThanOrEqual => !FilterFn::IsLessThan.evaluate_on(value, operand, today),
            FilterFn::IsLessThanOrEqual => !FilterFn::IsGreatThan.evaluate_on(value, operand, today),
            FilterFn::DateBefore => match (date(value), date(operand)) {
                (Some(v), Some(o)) => v < o,
                _ => false,
            },
            FilterFn::DateAfter => match (date(value), date(operand)) {
                (Some(v), Some(o)) => v >= o,
                _ => false,
            },
            FilterFn::IsSameDateAsToday => date(value)
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|dt| dt.month() == today.month() && dt.day() == today.day())
                .unwrap_or(false),
            FilterFn::IsAnyInList => list_includes(value, operand),
            FilterFn::IsNoneInList => !list_includes(value, operand),
            FilterFn::IsTrue => value == Some("true"),
            FilterFn::IsFalse => value != Some("true"),
        }
    }
}

fn number(s: Option<&str>) -> f64 {
    parse_number(s.unwrap_or_default())
}

fn date(s: Option<&str>) -> Option<i64> {
    s.and_then(parse_date_millis)
}

impl fmt::Display for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Operators offered for a column type, in menu order
pub fn predicate_fns_for_type(tag: &TypeTag) -> Vec<FilterFn> {
    FilterFn::ALL
        .into_iter()
        .filter(|f| f.applies_to(tag))
        .collect()
}
