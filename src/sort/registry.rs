//! Sort comparator registry
//!
//! Each forward comparator has exactly one reverse twin. Reverse variants
//! only negate the forward comparison.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{Column, TypeTag};
use crate::value::{natural_cmp, parse_date_millis, parse_multi_string, parse_number, path_basename};

/// Sort comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortFn {
    Alphabetical,
    ReverseAlphabetical,
    Earliest,
    Latest,
    Ascending,
    Descending,
    Checked,
    Unchecked,
    ItemsAsc,
    ItemsDesc,
}

impl SortFn {
    /// Every registered comparator, in menu order
    pub const ALL: [SortFn; 10] = [
        SortFn::Alphabetical,
        SortFn::ReverseAlphabetical,
        SortFn::Earliest,
        SortFn::Latest,
        SortFn::Ascending,
        SortFn::Descending,
        SortFn::Checked,
        SortFn::Unchecked,
        SortFn::ItemsAsc,
        SortFn::ItemsDesc,
    ];

    /// Returns the persisted comparator name
    pub fn name(&self) -> &'static str {
        match self {
            SortFn::Alphabetical => "alphabetical",
            SortFn::ReverseAlphabetical => "reverseAlphabetical",
            SortFn::Earliest => "earliest",
            SortFn::Latest => "latest",
            SortFn::Ascending => "ascending",
            SortFn::Descending => "descending",
            SortFn::Checked => "checked",
            SortFn::Unchecked => "unchecked",
            SortFn::ItemsAsc => "itemsAsc",
            SortFn::ItemsDesc => "itemsDesc",
        }
    }

    /// Looks up a comparator by persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SortFn::Alphabetical => "A to Z",
            SortFn::ReverseAlphabetical => "Z to A",
            SortFn::Earliest => "Earliest first",
            SortFn::Latest => "Latest first",
            SortFn::Ascending => "1 to 9",
            SortFn::Descending => "9 to 1",
            SortFn::Checked => "Checked first",
            SortFn::Unchecked => "Unchecked first",
            SortFn::ItemsAsc => "Fewest items first",
            SortFn::ItemsDesc => "Most items first",
        }
    }

    /// Returns true for the negating half of a pair
    pub fn is_descending(&self) -> bool {
        matches!(
            self,
            SortFn::ReverseAlphabetical
                | SortFn::Latest
                | SortFn::Descending
                | SortFn::Unchecked
                | SortFn::ItemsDesc
        )
    }

    /// The forward comparator of this pair
    pub fn forward(&self) -> SortFn {
        match self {
            SortFn::ReverseAlphabetical => SortFn::Alphabetical,
            SortFn::Latest => SortFn::Earliest,
            SortFn::Descending => SortFn::Ascending,
            SortFn::Unchecked => SortFn::Checked,
            SortFn::ItemsDesc => SortFn::ItemsAsc,
            other => *other,
        }
    }

    /// Returns true if the comparator is offered for a column type
    pub fn applies_to(&self, tag: &TypeTag) -> bool {
        match self.forward() {
            SortFn::Alphabetical => !matches!(tag, TypeTag::Boolean),
            SortFn::Earliest => matches!(tag, TypeTag::Date),
            SortFn::Ascending => matches!(tag, TypeTag::Number),
            SortFn::Checked => matches!(tag, TypeTag::Boolean),
            SortFn::ItemsAsc => tag.is_multi(),
            _ => false,
        }
    }

    /// Compares two stored values.
    ///
    /// `column` supplies option order and decides how `alphabetical`
    /// reads the value. Consistent for a fixed column.
    pub fn compare(&self, a: Option<&str>, b: Option<&str>, column: Option<&SortColumn>) -> Ordering {
        let forward = self.forward();
        let ordering = forward.compare_forward(a.unwrap_or_default(), b.unwrap_or_default(), column);
        if self.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    }

    fn compare_forward(&self, a: &str, b: &str, column: Option<&SortColumn>) -> Ordering {
        match self {
            SortFn::Earliest => valid_first(parse_date_millis(a), parse_date_millis(b)),
            SortFn::Ascending => {
                let finite = |s: &str| Some(parse_number(s)).filter(|n| !n.is_nan());
                match (finite(a), finite(b)) {
                    (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                    (x, y) => valid_first(x.map(|_| ()), y.map(|_| ())),
                }
            }
            SortFn::Checked => (b == "true").cmp(&(a == "true")),
            SortFn::ItemsAsc => parse_multi_string(a).len().cmp(&parse_multi_string(b).len()),
            _ => compare_text(a, b, column),
        }
    }
}

impl fmt::Display for SortFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A column prepared for one sort pass.
///
/// Option order is read from the column config once, not per comparison.
#[derive(Debug, Clone)]
pub struct SortColumn<'a> {
    column: &'a Column,
    options: Vec<String>,
}

impl<'a> SortColumn<'a> {
    pub fn new(column: &'a Column) -> Self {
        let options = if column.type_tag.base() == TypeTag::Option {
            column.option_values()
        } else {
            Vec::new()
        };
        Self { column, options }
    }

    pub fn column(&self) -> &Column {
        self.column
    }

    /// Option values in definition order, empty for non-option columns
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// Comparators offered for a column type, in menu order
pub fn sort_fns_for_type(tag: &TypeTag) -> Vec<SortFn> {
    SortFn::ALL
        .into_iter()
        .filter(|f| f.applies_to(tag))
        .collect()
}

/// Parsed values in natural order, unparseable values last
fn valid_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_text(a: &str, b: &str, column: Option<&SortColumn>) -> Ordering {
    let Some(column) = column else {
        return natural_cmp(a, b);
    };
    match &column.column.type_tag {
        TypeTag::Option => option_order(a, b, &column.options),
        TypeTag::OptionMulti => option_order(&first_item(a), &first_item(b), &column.options),
        TypeTag::Link | TypeTag::File | TypeTag::Image => {
            natural_cmp(path_basename(a), path_basename(b))
        }
        TypeTag::LinkMulti => {
            let (a, b) = (first_item(a), first_item(b));
            natural_cmp(path_basename(&a), path_basename(&b))
        }
        _ => natural_cmp(a, b),
    }
}

/// Definition order for known options, known before unknown, then natural order
fn option_order(a: &str, b: &str, options: &[String]) -> Ordering {
    let index = |v: &str| options.iter().position(|o| o == v);
    match (index(a), index(b)) {
        (Some(ia), Some(ib)) => ia.cmp(&ib),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => natural_cmp(a, b),
    }
}

fn first_item(s: &str) -> String {
    parse_multi_string(s).into_iter().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn priority() -> Column {
        Column::new("priority", TypeTag::Option)
            .with_config(json!({"options": ["low", "med", "high"]}))
    }

    #[test]
    fn test_names_round_trip() {
        for f in SortFn::ALL {
            assert_eq!(SortFn::from_name(f.name()), Some(f));
            assert_eq!(serde_json::to_value(f).unwrap(), json!(f.name()));
        }
        assert_eq!(SortFn::from_name("shuffle"), None);
    }

    #[test]
    fn test_every_reverse_negates_its_forward() {
        let samples = [Some("b"), Some("a"), Some("10"), Some("2"), None, Some("true")];
        for f in SortFn::ALL.into_iter().filter(SortFn::is_descending) {
            for a in samples {
                for b in samples {
                    assert_eq!(f.compare(a, b, None), f.forward().compare(a, b, None).reverse());
                }
            }
        }
    }

    #[test]
    fn test_option_order() {
        let priority = priority();
        let column = SortColumn::new(&priority);
        let mut values = vec!["high", "low", "zzz", "med"];
        values.sort_by(|a, b| SortFn::Alphabetical.compare(Some(a), Some(b), Some(&column)));
        assert_eq!(values, vec!["low", "med", "high", "zzz"]);
    }

    #[test]
    fn test_option_multi_sorts_by_first_item() {
        let multi = Column::new("p", TypeTag::OptionMulti)
            .with_config(json!({"options": ["low", "med", "high"]}));
        let column = SortColumn::new(&multi);
        assert_eq!(
            SortFn::Alphabetical.compare(Some("high,low"), Some("med"), Some(&column)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_unknown_options_fall_back_to_natural_order() {
        let priority = priority();
        let column = SortColumn::new(&priority);
        assert_eq!(
            SortFn::Alphabetical.compare(Some("item 10"), Some("item 9"), Some(&column)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_links_sort_by_basename() {
        let link = Column::new("l", TypeTag::Link);
        let column = SortColumn::new(&link);
        assert_eq!(
            SortFn::Alphabetical.compare(Some("z/apple.md"), Some("a/banana.md"), Some(&column)),
            Ordering::Less
        );
    }

    #[test]
    fn test_numbers_and_dates_put_invalid_last() {
        assert_eq!(SortFn::Ascending.compare(Some("2"), Some("10"), None), Ordering::Less);
        assert_eq!(SortFn::Ascending.compare(Some("abc"), Some("10"), None), Ordering::Greater);
        assert_eq!(
            SortFn::Earliest.compare(Some("2024-01-02"), Some("2024-01-01"), None),
            Ordering::Greater
        );
        assert_eq!(SortFn::Earliest.compare(None, Some("2024-01-01"), None), Ordering::Greater);
    }

    #[test]
    fn test_checked_and_counts() {
        assert_eq!(SortFn::Checked.compare(Some("true"), Some("false"), None), Ordering::Less);
        assert_eq!(SortFn::ItemsAsc.compare(Some("a,b"), Some("c"), None), Ordering::Greater);
        assert_eq!(SortFn::ItemsDesc.compare(Some("a,b"), Some("c"), None), Ordering::Less);
        assert_eq!(SortFn::ItemsAsc.compare(Some("a,b"), Some("c,d"), None), Ordering::Equal);
    }

    #[test]
    fn test_fns_for_type() {
        assert_eq!(
            sort_fns_for_type(&TypeTag::Number),
            vec![
                SortFn::Alphabetical,
                SortFn::ReverseAlphabetical,
                SortFn::Ascending,
                SortFn::Descending
            ]
        );
        assert!(sort_fns_for_type(&TypeTag::TagsMulti).contains(&SortFn::ItemsDesc));
        assert!(!sort_fns_for_type(&TypeTag::Tags).contains(&SortFn::ItemsDesc));
    }

    #[test]
    fn test_sort_column_reads_options_once() {
        let priority = priority();
        let prepared = SortColumn::new(&priority);
        assert_eq!(prepared.options(), ["low", "med", "high"]);
        assert_eq!(prepared.column().name, "priority");

        let text = Column::new("t", TypeTag::Text).with_config(json!({"options": ["x"]}));
        assert!(SortColumn::new(&text).options().is_empty());
    }
}
