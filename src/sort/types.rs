//! Persisted sort shape

use serde::{Deserialize, Deserializer, Serialize};

use super::registry::SortFn;
use crate::filter::lenient_list;
use crate::observability::Event;

/// A single persisted sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Column name (or raw row key)
    pub field: String,

    /// Comparator
    #[serde(rename = "fn")]
    pub func: SortFn,
}

impl Sort {
    pub fn new(field: impl Into<String>, func: SortFn) -> Self {
        Self {
            field: field.into(),
            func,
        }
    }
}

/// Sort list with unknown comparators and malformed entries dropped
pub(crate) fn lenient_sorts<'de, D>(deserializer: D) -> Result<Vec<Sort>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(lenient_list(&raw, Event::SortDropped))
}
