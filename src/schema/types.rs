//! Column, row and schema definitions
//!
//! Column types come in base/multi pairs (`option` / `option-multi`).
//! The set is open: unknown tags are carried as [`TypeTag::Other`] so a
//! newer host can hand us columns we do not know yet.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const MULTI_SUFFIX: &str = "-multi";

/// Column type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    Text,
    Number,
    Date,
    Boolean,
    Option,
    OptionMulti,
    Link,
    LinkMulti,
    File,
    Image,
    Context,
    ContextMulti,
    Tags,
    TagsMulti,
    Fileprop,
    Flex,
    /// Unknown tag, kept verbatim.
    Other(String),
}

impl TypeTag {
    /// Returns the persisted tag string
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Text => "text",
            TypeTag::Number => "number",
            TypeTag::Date => "date",
            TypeTag::Boolean => "boolean",
            TypeTag::Option => "option",
            TypeTag::OptionMulti => "option-multi",
            TypeTag::Link => "link",
            TypeTag::LinkMulti => "link-multi",
            TypeTag::File => "file",
            TypeTag::Image => "image",
            TypeTag::Context => "context",
            TypeTag::ContextMulti => "context-multi",
            TypeTag::Tags => "tags",
            TypeTag::TagsMulti => "tags-multi",
            TypeTag::Fileprop => "fileprop",
            TypeTag::Flex => "flex",
            TypeTag::Other(s) => s,
        }
    }

    /// Parses a persisted tag string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "text" => TypeTag::Text,
            "number" => TypeTag::Number,
            "date" => TypeTag::Date,
            "boolean" => TypeTag::Boolean,
            "option" => TypeTag::Option,
            "option-multi" => TypeTag::OptionMulti,
            "link" => TypeTag::Link,
            "link-multi" => TypeTag::LinkMulti,
            "file" => TypeTag::File,
            "image" => TypeTag::Image,
            "context" => TypeTag::Context,
            "context-multi" => TypeTag::ContextMulti,
            "tags" => TypeTag::Tags,
            "tags-multi" => TypeTag::TagsMulti,
            "fileprop" => TypeTag::Fileprop,
            "flex" => TypeTag::Flex,
            other => TypeTag::Other(other.to_string()),
        }
    }

    /// Returns true for the multi-valued half of a base/multi pair
    pub fn is_multi(&self) -> bool {
        match self {
            TypeTag::OptionMulti
            | TypeTag::LinkMulti
            | TypeTag::ContextMulti
            | TypeTag::TagsMulti => true,
            TypeTag::Other(s) => s.ends_with(MULTI_SUFFIX),
            _ => false,
        }
    }

    /// Returns the base type of a base/multi pair
    pub fn base(&self) -> TypeTag {
        match self {
            TypeTag::OptionMulti => TypeTag::Option,
            TypeTag::LinkMulti => TypeTag::Link,
            TypeTag::ContextMulti => TypeTag::Context,
            TypeTag::TagsMulti => TypeTag::Tags,
            TypeTag::Other(s) => match s.strip_suffix(MULTI_SUFFIX) {
                Some(base) => TypeTag::parse(base),
                None => self.clone(),
            },
            other => other.clone(),
        }
    }

    /// Returns the multi-valued counterpart, or `None` for scalar-only types
    pub fn multi(&self) -> Option<TypeTag> {
        match self.base() {
            TypeTag::Option => Some(TypeTag::OptionMulti),
            TypeTag::Link => Some(TypeTag::LinkMulti),
            TypeTag::Context => Some(TypeTag::ContextMulti),
            TypeTag::Tags => Some(TypeTag::TagsMulti),
            _ => None,
        }
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        TypeTag::parse(&s)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column definition supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Column type
    #[serde(rename = "type")]
    pub type_tag: TypeTag,

    /// Owning table ("" for the primary table)
    #[serde(default)]
    pub table: String,

    /// JSON-encoded per-type configuration
    #[serde(default)]
    pub value: String,
}

impl Column {
    /// Create a column on the primary table with no configuration
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            table: String::new(),
            value: String::new(),
        }
    }

    /// Set the JSON configuration
    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.value = config.to_string();
        self
    }

    /// Set the owning table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Key under which rows store this column's value
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.table)
    }

    /// Finds the column a persisted `field` refers to, by name then by key
    pub fn find<'c>(columns: &'c [Column], field: &str) -> Option<&'c Column> {
        columns
            .iter()
            .find(|c| c.name == field)
            .or_else(|| columns.iter().find(|c| c.key() == field))
    }

    /// Parsed configuration, or an empty object when absent or malformed
    pub fn config(&self) -> serde_json::Value {
        serde_json::from_str(&self.value)
            .ok()
            .filter(serde_json::Value::is_object)
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()))
    }

    /// Option values in definition order.
    ///
    /// Accepts `{"options": [...]}` where each entry is either a string or
    /// an object with `value` (falling back to `name`).
    pub fn option_values(&self) -> Vec<String> {
        let config = self.config();
        let Some(options) = config.get("options").and_then(|o| o.as_array()) else {
            return Vec::new();
        };
        options
            .iter()
            .filter_map(|option| match option {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Object(map) => map
                    .get("value")
                    .or_else(|| map.get("name"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    }

    /// Numeric display format from `{"format": "..."}`
    pub fn number_format(&self) -> Option<String> {
        self.config()
            .get("format")
            .and_then(|f| f.as_str())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
    }
}

/// Immutable row snapshot keyed by `column name + table`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, String>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from key/value pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns a copy of this row with one value replaced
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = self.values.clone();
        values.insert(key.into(), value.into());
        Self { values }
    }

    /// Value stored for a column
    pub fn get(&self, column: &Column) -> Option<&str> {
        self.values.get(&column.key()).map(String::as_str)
    }

    /// Value stored under a raw key
    pub fn get_key(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for a persisted `field`: through its column when one matches,
    /// otherwise as a raw key
    pub fn lookup(&self, columns: &[Column], field: &str) -> Option<&str> {
        match Column::find(columns, field) {
            Some(column) => self.get(column),
            None => self.get_key(field),
        }
    }

    /// All stored values
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Schema of a view-bearing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceSchema {
    /// Schema identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Schema kind ("db", "list", ...)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// `"true"` for the primary schema of a space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
}

impl SpaceSchema {
    /// Create a non-primary schema
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: kind.into(),
            primary: None,
        }
    }

    /// Mark as the primary schema
    pub fn primary(mut self) -> Self {
        self.primary = Some("true".to_string());
        self
    }

    /// Returns true for the primary schema
    pub fn is_primary(&self) -> bool {
        self.primary.as_deref() == Some("true")
    }
}
