//! # Action Errors

use thiserror::Error;

/// Result type for action operations
pub type ActionResult<T> = Result<T, ActionError>;

/// Action tree errors
///
/// Only `BudgetExceeded` aborts an evaluation. Every other variant is
/// contained at the node that raised it and recorded in the run report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("Step budget exceeded: {iterations} steps, limit {max_steps}")]
    BudgetExceeded { iterations: u64, max_steps: u64 },

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command already registered: {0}")]
    CommandExists(String),

    #[error("API function not found: {0}")]
    ApiNotFound(String),

    #[error("Command {action} failed: {message}")]
    CommandFailed { action: String, message: String },

    #[error("Command {action} panicked: {message}")]
    CommandPanicked { action: String, message: String },

    #[error("Action tree parse error: {0}")]
    TreeParse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Shorthand for a command failure
    pub fn failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        ActionError::CommandFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::BudgetExceeded { .. } => "ROWKIT_ACTION_BUDGET_EXCEEDED",
            ActionError::CommandNotFound(_) => "ROWKIT_ACTION_COMMAND_NOT_FOUND",
            ActionError::CommandExists(_) => "ROWKIT_ACTION_COMMAND_EXISTS",
            ActionError::ApiNotFound(_) => "ROWKIT_ACTION_API_NOT_FOUND",
            ActionError::CommandFailed { .. } => "ROWKIT_ACTION_COMMAND_FAILED",
            ActionError::CommandPanicked { .. } => "ROWKIT_ACTION_COMMAND_PANICKED",
            ActionError::TreeParse(_) => "ROWKIT_ACTION_TREE_PARSE",
            ActionError::Internal(_) => "ROWKIT_ACTION_INTERNAL",
        }
    }

    /// Returns true if this error stops the whole evaluation
    pub fn aborts_run(&self) -> bool {
        matches!(self, ActionError::BudgetExceeded { .. })
    }
}
