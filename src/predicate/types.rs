//! Persisted view predicate

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::filter::{lenient_filters, lenient_groups, Filter, FilterGroup};
use crate::observability::{log_event, Event};
use crate::sort::{lenient_sorts, Sort};

/// View configuration persisted per view
///
/// Every list field is always a list and every map field always a map.
/// Keys this type does not model (`listViewProps`, host extensions, ...)
/// are carried through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    #[serde(default)]
    pub view: String,

    #[serde(default)]
    pub list_view: String,

    #[serde(default)]
    pub list_item: String,

    #[serde(default)]
    pub list_group: String,

    #[serde(default, deserialize_with = "lenient_filters")]
    pub filters: Vec<Filter>,

    /// Additional filter groups, each combined with `all` or `any`
    #[serde(
        default,
        deserialize_with = "lenient_groups",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub filter_groups: Vec<FilterGroup>,

    #[serde(default, deserialize_with = "lenient_sorts")]
    pub sort: Vec<Sort>,

    #[serde(default, deserialize_with = "string_list")]
    pub group_by: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub cols_order: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub cols_hidden: Vec<String>,

    #[serde(default, deserialize_with = "object_map")]
    pub cols_size: BTreeMap<String, serde_json::Value>,

    /// Column -> aggregate reducer name
    #[serde(default, deserialize_with = "string_map")]
    pub cols_calc: BTreeMap<String, String>,

    /// Row cap, 0 for unbounded
    #[serde(default, deserialize_with = "row_limit")]
    pub limit: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Predicate {
    /// Empty predicate for a view type
    pub fn for_view(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            list_view: String::new(),
            list_item: String::new(),
            list_group: String::new(),
            filters: Vec::new(),
            filter_groups: Vec::new(),
            sort: Vec::new(),
            group_by: Vec::new(),
            cols_order: Vec::new(),
            cols_hidden: Vec::new(),
            cols_size: BTreeMap::new(),
            cols_calc: BTreeMap::new(),
            limit: 0,
            extra: BTreeMap::new(),
        }
    }

    /// Default for tables: table view, unbounded
    pub fn table() -> Self {
        Self::for_view("table")
    }

    /// Default for primary schemas: list view with its item and group
    /// renderers
    pub fn list() -> Self {
        Self {
            list_view: "list".to_string(),
            list_item: "listItem".to_string(),
            list_group: "listGroup".to_string(),
            ..Self::for_view("list")
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::table()
    }
}

/// Strings kept, everything else dropped; a non-array becomes empty
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let Some(items) = raw.as_array() else {
        coerced("list", &raw);
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect())
}

/// Any object is kept as-is; a non-object becomes empty
fn object_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    match raw {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => {
            coerced("map", &other);
            Ok(BTreeMap::new())
        }
    }
}

/// Object entries with string values; a non-object becomes empty
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let Some(map) = raw.as_object() else {
        coerced("map", &raw);
        return Ok(BTreeMap::new());
    };
    Ok(map
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect())
}

/// Non-negative integers only; anything else is 0
fn row_limit<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let limit = raw
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0)
        .map(|n| n as u64);
    if limit.is_none() {
        coerced("limit", &raw);
    }
    Ok(limit.unwrap_or(0))
}

fn coerced(expected: &str, raw: &serde_json::Value) {
    if !raw.is_null() {
        log_event(
            Event::PredicateFieldCoerced,
            &[("expected", expected), ("found", raw.to_string().as_str())],
        );
    }
}
