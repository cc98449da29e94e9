//! Predicate Validation Tests
//!
//! Persisted predicates are cleaned, never rejected:
//! - Unknown operators are dropped
//! - Malformed shapes are coerced to their empty form
//! - Unmodelled keys survive
//! - Schema decides the default

use rowkit::predicate::{default_predicate_for_schema, Predicate, PredicateValidator, ViewQuery};
use rowkit::schema::{Column, Row, SpaceSchema, TypeTag};
use serde_json::json;

#[test]
fn test_absent_returns_default() {
    let default = Predicate::list();
    assert_eq!(PredicateValidator::validate(None, &default), default);
    assert_eq!(PredicateValidator::validate(Some(&json!(null)), &default), default);
    assert_eq!(PredicateValidator::validate(Some(&json!("junk")), &default), default);
}

#[test]
fn test_unknown_filter_and_sort_dropped() {
    let persisted = json!({
        "filters": [
            {"field": "a", "fn": "include", "value": "x"},
            {"field": "a", "fn": "fromTheFuture", "value": "x"},
            "not an object"
        ],
        "sort": [
            {"field": "a", "fn": "alphabetical"},
            {"field": "a", "fn": "byVibes"}
        ]
    });
    let predicate = PredicateValidator::validate(Some(&persisted), &Predicate::table());
    assert_eq!(predicate.filters.len(), 1);
    assert_eq!(predicate.filters[0].field, "a");
    assert_eq!(predicate.sort.len(), 1);
}

#[test]
fn test_malformed_shapes_coerced() {
    let persisted = json!({
        "filters": "a string",
        "sort": {"field": "a"},
        "groupBy": 3,
        "colsOrder": null,
        "colsHidden": "x",
        "colsSize": [],
        "colsCalc": "sum",
        "limit": "ten"
    });
    let predicate = PredicateValidator::validate(Some(&persisted), &Predicate::table());
    assert!(predicate.filters.is_empty());
    assert!(predicate.sort.is_empty());
    assert!(predicate.group_by.is_empty());
    assert!(predicate.cols_order.is_empty());
    assert!(predicate.cols_hidden.is_empty());
    assert!(predicate.cols_size.is_empty());
    assert!(predicate.cols_calc.is_empty());
    assert_eq!(predicate.limit, 0);
}

#[test]
fn test_limit_coercion() {
    for (raw, expected) in [
        (json!(25), 25),
        (json!(5.0), 5),
        (json!(-1), 0),
        (json!(2.5), 0),
        (json!("7"), 0),
    ] {
        let predicate = PredicateValidator::validate(Some(&json!({"limit": raw})), &Predicate::table());
        assert_eq!(predicate.limit, expected, "limit {raw}");
    }
}

#[test]
fn test_unknown_keys_round_trip() {
    let persisted = json!({"view": "board", "boardProps": {"lanes": 3}});
    let predicate = PredicateValidator::validate(Some(&persisted), &Predicate::table());
    let out = serde_json::to_value(&predicate).unwrap();
    assert_eq!(out["view"], "board");
    assert_eq!(out["boardProps"], json!({"lanes": 3}));
}

#[test]
fn test_merge_keeps_untouched_fields() {
    let base = Predicate::list();
    let edited = base.merge(&json!({"limit": 10, "groupBy": ["status"]}));
    assert_eq!(edited.limit, 10);
    assert_eq!(edited.group_by, vec!["status".to_string()]);
    assert_eq!(edited.list_item, "listItem");
}

#[test]
fn test_default_for_schema() {
    let primary = SpaceSchema::new("space", "db").primary();
    let table = SpaceSchema::new("tasks", "db");
    assert_eq!(default_predicate_for_schema(&primary).view, "list");
    let table_default = default_predicate_for_schema(&table);
    assert_eq!(table_default.view, "table");
    assert_eq!(table_default.limit, 0);
}

#[test]
fn test_validated_predicate_drives_query() {
    let columns = vec![
        Column::new("name", TypeTag::Text),
        Column::new("status", TypeTag::Option)
            .with_config(json!({"options": ["todo", "doing", "done"]})),
        Column::new("points", TypeTag::Number),
    ];
    let rows = vec![
        Row::from_pairs([("name", "a"), ("status", "done"), ("points", "3")]),
        Row::from_pairs([("name", "b"), ("status", "todo"), ("points", "5")]),
        Row::from_pairs([("name", "c"), ("status", "done"), ("points", "1")]),
        Row::from_pairs([("name", "d"), ("status", "doing"), ("points", "8")]),
    ];
    let persisted = json!({
        "filters": [{"field": "points", "fn": "isLessThan", "value": "8"}],
        "sort": [{"field": "name", "fn": "reverseAlphabetical"}],
        "groupBy": ["status"],
        "colsCalc": {"points": "sum", "name": "notARealAggregate"}
    });
    let predicate = PredicateValidator::validate(Some(&persisted), &Predicate::table());
    let result = ViewQuery::new(&predicate, &columns).run(&rows);

    assert_eq!(result.total, 3);
    let names: Vec<&str> = result.rows.iter().map(|r| r.get_key("name").unwrap()).collect();
    assert_eq!(names, vec!["c", "b", "a"]);

    let keys: Vec<&str> = result.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["todo", "done"]);

    assert_eq!(result.aggregates.get("points").map(String::as_str), Some("9"));
    assert!(!result.aggregates.contains_key("name"));
}
