//! Persisted filter shapes
//!
//! Filters come from persisted JSON written by any version of the host.
//! Parsing is lenient per entry: one malformed or unknown filter is dropped
//! with a TRACE log and the rest survive.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::registry::FilterFn;
use crate::observability::{log_event, Event, Logger};
use crate::value::Value;

/// Where a filter's operand comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperandSource {
    /// `value` names an entry in the caller's property bag
    Property,
    /// `value` is the operand itself
    #[default]
    #[serde(other)]
    Literal,
}

/// A single persisted filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Column name (or raw row key) the filter reads
    pub field: String,

    /// Operator
    #[serde(rename = "fn")]
    pub func: FilterFn,

    /// Operand, or property name when `operand_source` is `Property`
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,

    #[serde(rename = "fType", default, skip_serializing_if = "Option::is_none")]
    pub operand_source: Option<OperandSource>,
}

impl Filter {
    /// Create a literal filter
    pub fn new(field: impl Into<String>, func: FilterFn, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            func,
            value: value.into(),
            operand_source: None,
        }
    }

    /// Read the operand from the property bag entry named `property`
    pub fn with_property(field: impl Into<String>, func: FilterFn, property: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            func,
            value: property.into(),
            operand_source: Some(OperandSource::Property),
        }
    }

    /// Resolves the operand.
    ///
    /// Property operands look up `properties[value]`; a missing bag or entry
    /// resolves to no operand.
    pub fn operand(&self, properties: Option<&BTreeMap<String, Value>>) -> Option<String> {
        match self.operand_source.unwrap_or_default() {
            OperandSource::Literal => Some(self.value.clone()),
            OperandSource::Property => properties
                .and_then(|props| props.get(&self.value))
                .and_then(Value::to_text),
        }
    }
}

/// How a group combines its filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Every filter must pass
    #[default]
    All,
    /// At least one filter must pass
    Any,
}

/// A group of filters combined with AND (`all`) or OR (`any`)
///
/// An empty group passes under both kinds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(rename = "type", default, deserialize_with = "lenient_group_kind")]
    pub kind: GroupKind,

    #[serde(default, deserialize_with = "lenient_filters")]
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    /// Group where every filter must pass
    pub fn all(filters: Vec<Filter>) -> Self {
        Self {
            kind: GroupKind::All,
            filters,
        }
    }

    /// Group where one passing filter is enough
    pub fn any(filters: Vec<Filter>) -> Self {
        Self {
            kind: GroupKind::Any,
            filters,
        }
    }

    /// Combine per-filter outcomes according to the group kind
    pub fn combine(&self, mut passes: impl FnMut(&Filter) -> bool) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.kind {
            GroupKind::All => self.filters.iter().all(&mut passes),
            GroupKind::Any => self.filters.iter().any(&mut passes),
        }
    }
}

/// Parses a JSON array entry by entry, dropping entries that fail.
///
/// A non-array yields an empty list.
pub(crate) fn lenient_list<T: DeserializeOwned>(raw: &serde_json::Value, event: Event) -> Vec<T> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                if Logger::enabled(event.severity()) {
                    let entry = item.to_string();
                    let reason = err.to_string();
                    log_event(event, &[("entry", entry.as_str()), ("reason", reason.as_str())]);
                }
                None
            }
        })
        .collect()
}

/// Filters list with unknown operators and malformed entries dropped
pub(crate) fn lenient_filters<'de, D>(deserializer: D) -> Result<Vec<Filter>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(lenient_list(&raw, Event::FilterDropped))
}

/// Filter groups list, each group cleaned like a filters list
pub(crate) fn lenient_groups<'de, D>(deserializer: D) -> Result<Vec<FilterGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(lenient_list(&raw, Event::FilterDropped))
}

fn lenient_group_kind<'de, D>(deserializer: D) -> Result<GroupKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw.as_str() {
        Some("any") => GroupKind::Any,
        _ => GroupKind::All,
    })
}

/// Scalars become their string form, null becomes empty
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => Value::from(other).to_text().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_json_shape() {
        let filter: Filter =
            serde_json::from_value(json!({"field": "done", "fn": "isTrue", "value": ""})).unwrap();
        assert_eq!(filter.func, FilterFn::IsTrue);
        assert_eq!(filter.operand_source, None);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"field": "done", "fn": "isTrue", "value": ""})
        );
    }

    #[test]
    fn test_scalar_operands_become_strings() {
        let filter: Filter =
            serde_json::from_value(json!({"field": "n", "fn": "equal", "value": 5})).unwrap();
        assert_eq!(filter.value, "5");
        let filter: Filter =
            serde_json::from_value(json!({"field": "n", "fn": "isEmpty"})).unwrap();
        assert_eq!(filter.value, "");
    }

    #[test]
    fn test_unknown_f_type_is_literal() {
        let filter: Filter = serde_json::from_value(
            json!({"field": "n", "fn": "is", "value": "x", "fType": "formula"}),
        )
        .unwrap();
        assert_eq!(filter.operand_source, Some(OperandSource::Literal));
    }

    #[test]
    fn test_lenient_list_drops_bad_entries() {
        let raw = json!([
            {"field": "a", "fn": "isEmpty", "value": ""},
            {"field": "b", "fn": "isSomething", "value": ""},
            "garbage",
            {"fn": "is", "value": "x"},
            {"field": "c", "fn": "include", "value": "q"}
        ]);
        let filters: Vec<Filter> = lenient_list(&raw, Event::FilterDropped);
        let fields: Vec<_> = filters.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "c"]);
        assert!(lenient_list::<Filter>(&json!("a,b"), Event::FilterDropped).is_empty());
    }

    #[test]
    fn test_property_operand() {
        let mut props = BTreeMap::new();
        props.insert("limit".to_string(), Value::Number(3.0));
        let filter = Filter::with_property("n", FilterFn::IsGreatThan, "limit");
        assert_eq!(filter.operand(Some(&props)), Some("3".to_string()));
        assert_eq!(filter.operand(None), None);
        let missing = Filter::with_property("n", FilterFn::IsGreatThan, "other");
        assert_eq!(missing.operand(Some(&props)), None);
    }

    #[test]
    fn test_group_parse_and_combine() {
        let group: FilterGroup = serde_json::from_value(json!({
            "type": "any",
            "filters": [{"field": "a", "fn": "nope"}, {"field": "b", "fn": "isEmpty"}]
        }))
        .unwrap();
        assert_eq!(group.kind, GroupKind::Any);
        assert_eq!(group.filters.len(), 1);

        let group: FilterGroup = serde_json::from_value(json!({"filters": "bad"})).unwrap();
        assert_eq!(group.kind, GroupKind::All);
        assert!(group.combine(|_| false));
    }

    #[test]
    fn test_group_kinds() {
        let filters = vec![
            Filter::new("a", FilterFn::IsEmpty, ""),
            Filter::new("b", FilterFn::IsEmpty, ""),
        ];
        let all = FilterGroup::all(filters.clone());
        let any = FilterGroup::any(filters);
        assert!(!all.combine(|f| f.field == "a"));
        assert!(any.combine(|f| f.field == "a"));
        assert!(!any.combine(|_| false));
    }
}
