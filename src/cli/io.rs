//! JSON I/O handling for CLI
//!
//! - Input: JSON files named on the command line
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a JSON document from a file
pub fn read_json(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    read_json_str(&content, path)
}

/// Read a file as a typed JSON document
pub fn read_typed<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    serde_json::from_value(read_json(path)?).map_err(|e| {
        CliError::invalid_input(format!("Invalid {}: {}", path.display(), e))
    })
}

fn read_json_str(content: &str, path: &Path) -> CliResult<Value> {
    if content.trim().is_empty() {
        return Err(CliError::invalid_input(format!("Empty input: {}", path.display())));
    }
    serde_json::from_str(content)
        .map_err(|e| CliError::invalid_input(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
