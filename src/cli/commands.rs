//! CLI command implementations
//!
//! Each command reads its JSON inputs, calls into the engine and returns
//! the `data` payload. [`run`] wraps it in the response envelope.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::action::parse_action_tree;
use crate::aggregate::aggregate_fns_for_type;
use crate::config::EngineConfig;
use crate::filter::predicate_fns_for_type;
use crate::predicate::{default_predicate_for_schema, Predicate, PredicateValidator, ViewQuery};
use crate::schema::{Column, Row, SpaceSchema, TypeTag};
use crate::sort::sort_fns_for_type;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_json, read_typed, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, runs the command and prints exactly one JSON object.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();

    let outcome = load_config(cli.config.as_deref()).and_then(|config| run_command(cli.command, &config));
    match outcome {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Loads and applies configuration, defaults when no path is given
fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    config.apply_logging()?;
    Ok(config)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, config: &EngineConfig) -> CliResult<Value> {
    match cmd {
        Command::Validate { predicate, schema } => validate(&predicate, schema.as_deref(), config),
        Command::Query {
            rows,
            columns,
            predicate,
        } => query(&rows, &columns, &predicate, config),
        Command::ParseAction { tree } => parse_action(&tree),
        Command::Operators { type_tag } => Ok(operators(&TypeTag::parse(&type_tag))),
    }
}

/// Default predicate when no schema is given
fn configured_default(config: &EngineConfig) -> Predicate {
    match config.default_view.as_str() {
        "list" => Predicate::list(),
        view => Predicate::for_view(view),
    }
}

fn to_data<T: serde::Serialize>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value).map_err(|e| CliError::io_error(format!("Failed to encode output: {}", e)))
}

/// Validate a persisted predicate
///
/// The default comes from the schema when one is given, otherwise from
/// the configured default view.
pub fn validate(predicate_path: &Path, schema_path: Option<&Path>, config: &EngineConfig) -> CliResult<Value> {
    let default = match schema_path {
        Some(path) => default_predicate_for_schema(&read_typed::<SpaceSchema>(path)?),
        None => configured_default(config),
    };
    let persisted = read_json(predicate_path)?;
    to_data(&PredicateValidator::validate(Some(&persisted), &default))
}

/// Run a persisted predicate over a row set
pub fn query(rows_path: &Path, columns_path: &Path, predicate_path: &Path, config: &EngineConfig) -> CliResult<Value> {
    let rows: Vec<Row> = read_typed(rows_path)?;
    let columns: Vec<Column> = read_typed(columns_path)?;
    let persisted = read_json(predicate_path)?;

    let predicate = PredicateValidator::validate(Some(&persisted), &configured_default(config));
    let result = ViewQuery::new(&predicate, &columns).run(&rows);
    to_data(&result)
}

/// Parse a stored action tree
///
/// Unparseable source yields `null`, the same as "no action configured".
pub fn parse_action(tree_path: &Path) -> CliResult<Value> {
    let source = fs::read_to_string(tree_path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", tree_path.display(), e)))?;
    match parse_action_tree(&source) {
        Some(tree) => to_data(&tree),
        None => Ok(Value::Null),
    }
}

/// Operators offered for a column type
pub fn operators(type_tag: &TypeTag) -> Value {
    let filters: Vec<Value> = predicate_fns_for_type(type_tag)
        .into_iter()
        .map(|f| json!({"fn": f.name(), "label": f.label(), "valueKind": f.value_kind()}))
        .collect();
    let sorts: Vec<Value> = sort_fns_for_type(type_tag)
        .into_iter()
        .map(|f| json!({"fn": f.name(), "label": f.label()}))
        .collect();
    let aggregates: Vec<Value> = aggregate_fns_for_type(type_tag)
        .into_iter()
        .map(|f| json!({"fn": f.name(), "label": f.label()}))
        .collect();

    json!({
        "type": type_tag.as_str(),
        "filters": filters,
        "sorts": sorts,
        "aggregates": aggregates,
    })
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_validate_drops_unknown_operators() {
        let dir = TempDir::new().unwrap();
        let predicate = write_file(
            &dir,
            "predicate.json",
            &json!({
                "view": "table",
                "filters": [
                    {"field": "a", "fn": "is", "value": "x"},
                    {"field": "b", "fn": "isSomethingNew", "value": "y"}
                ],
                "limit": -3,
                "custom": true
            })
            .to_string(),
        );

        let data = validate(&predicate, None, &EngineConfig::default()).unwrap();
        assert_eq!(data["filters"].as_array().unwrap().len(), 1);
        assert_eq!(data["limit"], 0);
        assert_eq!(data["custom"], true);
    }

    #[test]
    fn test_validate_uses_schema_default() {
        let dir = TempDir::new().unwrap();
        let predicate = write_file(&dir, "predicate.json", "{}");
        let schema = write_file(
            &dir,
            "schema.json",
            &json!({"id": "tasks", "type": "db", "primary": "true"}).to_string(),
        );

        let data = validate(&predicate, Some(&schema), &EngineConfig::default()).unwrap();
        assert_eq!(data["view"], "list");
        assert_eq!(data["listItem"], "listItem");
    }

    #[test]
    fn test_query_filters_and_limits() {
        let dir = TempDir::new().unwrap();
        let rows = write_file(
            &dir,
            "rows.json",
            &json!([
                {"name": "b", "score": "2"},
                {"name": "a", "score": "5"},
                {"name": "c", "score": "9"}
            ])
            .to_string(),
        );
        let columns = write_file(
            &dir,
            "columns.json",
            &json!([
                {"name": "name", "type": "text"},
                {"name": "score", "type": "number"}
            ])
            .to_string(),
        );
        let predicate = write_file(
            &dir,
            "predicate.json",
            &json!({
                "filters": [{"field": "score", "fn": "isGreatThan", "value": "3"}],
                "sort": [{"field": "score", "fn": "descending"}],
                "limit": 1,
                "colsCalc": {"score": "count"}
            })
            .to_string(),
        );

        let data = query(&rows, &columns, &predicate, &EngineConfig::default()).unwrap();
        assert_eq!(data["total"], 2);
        assert_eq!(data["rows"], json!([{"name": "c", "score": "9"}]));
    }

    #[test]
    fn test_query_rejects_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let rows = write_file(&dir, "rows.json", "{\"not\": \"a list\"}");
        let columns = write_file(&dir, "columns.json", "[]");
        let predicate = write_file(&dir, "predicate.json", "{}");

        let err = query(&rows, &columns, &predicate, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidInput);
    }

    #[test]
    fn test_parse_action_null_on_garbage() {
        let dir = TempDir::new().unwrap();
        let bad = write_file(&dir, "bad.json", "{action:");
        assert_eq!(parse_action(&bad).unwrap(), Value::Null);

        let good = write_file(
            &dir,
            "good.json",
            r#"{"action":"loop","children":[{"action":"log","props":{"msg":"hi"}}]}"#,
        );
        let data = parse_action(&good).unwrap();
        assert_eq!(data["action"], "loop");
        assert_eq!(data["children"][0]["props"]["msg"], "hi");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = parse_action(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::IoError);
    }

    #[test]
    fn test_operators_for_number() {
        let data = operators(&TypeTag::Number);
        assert_eq!(data["type"], "number");
        let filters: Vec<&str> = data["filters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["fn"].as_str().unwrap())
            .collect();
        assert!(filters.contains(&"isGreatThan"));
        assert!(!filters.contains(&"isTrue"));
    }

    #[test]
    fn test_config_error_code() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "rowkit.json", "{\"max_steps\": 0}");
        let err = load_config(Some(&path)).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
