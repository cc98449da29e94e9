//! Filter Semantics Tests
//!
//! Operator behavior over string-encoded cell values:
//! - Empty needles and empty lists
//! - Inverted numeric comparisons
//! - Date parsing fallbacks
//! - Property operands and filter groups

use chrono::NaiveDate;
use rowkit::filter::{Filter, FilterFn, FilterGroup, PropertyFilter, RowFilter};
use rowkit::schema::{Column, Row, TypeTag};
use rowkit::value::{list_includes, string_equal, Value};
use std::collections::BTreeMap;

// =============================================================================
// Helper Functions
// =============================================================================

fn columns() -> Vec<Column> {
    vec![
        Column::new("title", TypeTag::Text),
        Column::new("score", TypeTag::Number),
        Column::new("due", TypeTag::Date),
        Column::new("tags", TypeTag::TagsMulti),
    ]
}

fn rows() -> Vec<Row> {
    vec![
        Row::from_pairs([("title", "Alpha"), ("score", "10"), ("due", "2024-03-01"), ("tags", "red,blue")]),
        Row::from_pairs([("title", "beta"), ("score", "3"), ("due", "2024-05-01"), ("tags", "green")]),
        Row::from_pairs([("title", ""), ("score", "n/a"), ("due", ""), ("tags", "")]),
    ]
}

fn titles(rows: &[Row]) -> Vec<&str> {
    rows.iter().map(|r| r.get_key("title").unwrap_or_default()).collect()
}

// =============================================================================
// Operator Tests
// =============================================================================

#[test]
fn test_string_equality_properties() {
    for s in ["", "a", "Mixed Case", " padded "] {
        assert!(string_equal(Some(s), Some(s)));
    }
    assert!(string_equal(None, None));
    assert!(!string_equal(None, Some("a")));
    assert!(!string_equal(Some("a"), Some("A")));
}

#[test]
fn test_include_empty_needle() {
    for s in ["", "x", "anything"] {
        assert!(FilterFn::Include.evaluate(Some(s), Some("")));
    }
    assert!(!FilterFn::Include.evaluate(Some(""), Some("a")));
    assert!(FilterFn::Include.evaluate(Some("Hello"), Some("hELL")));
}

#[test]
fn test_list_includes() {
    assert!(!list_includes(Some("a,b,c"), Some("d")));
    assert!(list_includes(Some("a,b,c"), Some("b,d")));
    assert!(!list_includes(Some(""), Some("a")));
}

#[test]
fn test_less_or_equal_is_not_greater() {
    let samples = ["1", "2", "2.5", "-1", "abc", "", "1e3"];
    for a in samples {
        for b in samples {
            assert_eq!(
                FilterFn::IsLessThanOrEqual.evaluate(Some(a), Some(b)),
                !FilterFn::IsGreatThan.evaluate(Some(a), Some(b)),
                "a={a:?} b={b:?}"
            );
        }
    }
}

#[test]
fn test_unparseable_numbers_compare_false() {
    assert!(!FilterFn::IsGreatThan.evaluate(Some("abc"), Some("1")));
    assert!(!FilterFn::IsLessThan.evaluate(Some("abc"), Some("1")));
    assert!(!FilterFn::Equal.evaluate(Some("abc"), Some("abc")));
}

#[test]
fn test_date_operators() {
    let millis = "1709251200000"; // 2024-03-01T00:00:00Z
    assert!(FilterFn::DateAfter.evaluate(Some("2024-03-01"), Some(millis)));
    assert!(!FilterFn::DateBefore.evaluate(Some("2024-03-01"), Some(millis)));
    assert!(FilterFn::DateBefore.evaluate(Some("2024-02-28"), Some("2024-03-01")));
    assert!(!FilterFn::DateBefore.evaluate(Some("soon"), Some("2024-03-01")));
}

#[test]
fn test_same_date_ignores_year() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    assert!(FilterFn::IsSameDateAsToday.evaluate_on(Some("2019-03-01"), None, today));
    assert!(!FilterFn::IsSameDateAsToday.evaluate_on(Some("2026-03-02"), None, today));
    assert!(!FilterFn::IsSameDateAsToday.evaluate_on(Some(""), None, today));
}

// =============================================================================
// Row Filtering Tests
// =============================================================================

#[test]
fn test_filters_are_conjunctive() {
    let columns = columns();
    let filters = vec![
        Filter::new("score", FilterFn::IsGreatThan, "1"),
        Filter::new("tags", FilterFn::IsAnyInList, "blue,yellow"),
    ];
    let out = RowFilter::new(&columns).filter_rows(&rows(), &filters, &[]);
    assert_eq!(titles(&out), vec!["Alpha"]);
}

#[test]
fn test_any_group() {
    let columns = columns();
    let group = FilterGroup::any(vec![
        Filter::new("title", FilterFn::IsEmpty, ""),
        Filter::new("title", FilterFn::Is, "beta"),
    ]);
    let out = RowFilter::new(&columns).filter_rows(&rows(), &[], &[group]);
    assert_eq!(titles(&out), vec!["beta", ""]);
}

#[test]
fn test_property_operand() {
    let columns = columns();
    let mut properties = BTreeMap::new();
    properties.insert("threshold".to_string(), Value::Number(5.0));
    let filters = vec![Filter::with_property("score", FilterFn::IsGreatThan, "threshold")];
    let out = RowFilter::new(&columns)
        .with_properties(&properties)
        .filter_rows(&rows(), &filters, &[]);
    assert_eq!(titles(&out), vec!["Alpha"]);
}

#[test]
fn test_property_filter_group() {
    let mut properties = BTreeMap::new();
    properties.insert("status".to_string(), Value::from("done"));
    let filter = PropertyFilter::new(&properties);

    assert!(filter.matches_group(&FilterGroup::all(vec![Filter::new("status", FilterFn::Is, "done")])));
    assert!(!filter.matches_group(&FilterGroup::all(vec![
        Filter::new("status", FilterFn::Is, "done"),
        Filter::new("owner", FilterFn::IsNotEmpty, ""),
    ])));
    assert!(filter.matches_group(&FilterGroup::any(Vec::new())));
}
