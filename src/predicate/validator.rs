//! Predicate validation and defaulting
//!
//! Persisted predicates may come from older or newer versions of the host
//! or be hand-edited. Validation never fails: drift is dropped and
//! malformed shapes are coerced to their empty form.

use serde_json::{Map, Value as Json};

use super::types::Predicate;
use crate::observability::{log_event, Event};
use crate::schema::SpaceSchema;

/// Fields copied verbatim when they are strings
const STRING_FIELDS: [&str; 4] = ["view", "listView", "listItem", "listGroup"];

/// Validates persisted predicates against a default
pub struct PredicateValidator;

impl PredicateValidator {
    /// Merges a persisted predicate over `default`.
    ///
    /// - absent, null or non-object input returns `default` unchanged
    /// - keys present in `persisted` replace the default's
    /// - filters/sort entries with unknown operators are dropped
    /// - non-list and non-map shapes become empty, bad limits become 0
    /// - unmodelled keys survive
    pub fn validate(persisted: Option<&Json>, default: &Predicate) -> Predicate {
        let Some(Json::Object(persisted)) = persisted else {
            return default.clone();
        };

        let mut merged = match serde_json::to_value(default) {
            Ok(Json::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in persisted {
            if STRING_FIELDS.contains(&key.as_str()) && !value.is_string() {
                log_event(
                    Event::PredicateFieldCoerced,
                    &[("expected", "string"), ("field", key.as_str())],
                );
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }

        match serde_json::from_value(Json::Object(merged)) {
            Ok(predicate) => predicate,
            Err(err) => {
                log_event(
                    Event::PredicateFieldCoerced,
                    &[("expected", "predicate"), ("reason", err.to_string().as_str())],
                );
                default.clone()
            }
        }
    }
}

impl Predicate {
    /// Applies a partial edit and re-validates.
    ///
    /// Keys in `partial` replace this predicate's; everything else is kept.
    pub fn merge(&self, partial: &Json) -> Predicate {
        PredicateValidator::validate(Some(partial), self)
    }
}

/// Default predicate for a schema's views
///
/// Primary schemas get the list view; every other schema gets an unbounded
/// table view.
pub fn default_predicate_for_schema(schema: &SpaceSchema) -> Predicate {
    if schema.is_primary() {
        Predicate::list()
    } else {
        Predicate::table()
    }
}
