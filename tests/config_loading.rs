//! Configuration Tests
//!
//! A config file on disk drives the engine:
//! - Defaults fill missing fields
//! - The step budget reaches the interpreter
//! - Invalid values are rejected at load

use rowkit::action::{ActionError, ActionInstance, ActionInterpreter, ActionTree, CommandRegistry};
use rowkit::config::{ConfigError, EngineConfig};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_config(dir: &TempDir, value: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("rowkit.json");
    fs::write(&path, value.to_string()).unwrap();
    path
}

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::load(&write_config(&dir, json!({"max_steps": 50}))).unwrap();
    assert_eq!(config.max_steps, 50);
    assert_eq!(config.default_view, "table");
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_empty_default_view_rejected() {
    let dir = TempDir::new().unwrap();
    let result = EngineConfig::load(&write_config(&dir, json!({"default_view": ""})));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[tokio::test]
async fn test_budget_from_file() {
    let dir = TempDir::new().unwrap();
    let config = EngineConfig::load(&write_config(&dir, json!({"max_steps": 1}))).unwrap();
    let interpreter = ActionInterpreter::from_config(Arc::new(CommandRegistry::with_control_nodes()), &config);

    // Three unresolved nodes in a chain: the third is over budget
    let tree = ActionTree::new("a").with_child(ActionTree::new("b").with_child(ActionTree::new("c")));
    let err = interpreter.evaluate(&tree, ActionInstance::new()).await.unwrap_err();
    assert_eq!(
        err,
        ActionError::BudgetExceeded {
            iterations: 2,
            max_steps: 1
        }
    );
}
