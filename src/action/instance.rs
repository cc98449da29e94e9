//! Per-evaluation state

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{ActionError, ActionResult};
use crate::value::Value;

/// Input handed to a command
///
/// Derived fresh for every node. `iterations` is the step count at the
/// moment the node was entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInstance {
    pub props: BTreeMap<String, Value>,
    pub instance_props: BTreeMap<String, Value>,
    /// Prior result
    pub result: Value,
    pub iterations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a prior result
    pub fn with_result(mut self, result: impl Into<Value>) -> Self {
        self.result = result.into();
        self
    }

    /// Seed an instance property
    pub fn with_instance_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instance_props.insert(name.into(), value.into());
        self
    }

    /// Prop by name, null when absent
    pub fn prop(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.props.get(name).unwrap_or(&NULL)
    }
}

/// Shared state of one evaluation: the step counter and contained errors
#[derive(Debug, Clone)]
pub struct EvalContext {
    iterations: u64,
    max_steps: u64,
    errors: Vec<ActionError>,
}

impl EvalContext {
    pub fn new(max_steps: u64) -> Self {
        Self {
            iterations: 0,
            max_steps,
            errors: Vec::new(),
        }
    }

    /// Accounts for entering one node.
    ///
    /// Fails once the count has passed `max_steps`; otherwise returns the
    /// count before this step.
    pub fn step(&mut self) -> ActionResult<u64> {
        if self.iterations > self.max_steps {
            return Err(ActionError::BudgetExceeded {
                iterations: self.iterations,
                max_steps: self.max_steps,
            });
        }
        let current = self.iterations;
        self.iterations += 1;
        Ok(current)
    }

    /// Record a contained failure
    pub fn record(&mut self, error: ActionError) {
        self.errors.push(error);
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn errors(&self) -> &[ActionError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ActionError> {
        self.errors
    }
}
