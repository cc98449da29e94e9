//! Action tree interpreter
//!
//! An action tree is a JSON tree of command invocations. Evaluation walks
//! it depth first, threading an [`ActionInstance`] from parent to child:
//!
//! - each node derives its props from static values, linked instance
//!   properties and the prior result
//! - `loop` and `filter` nodes are control flow handled by the interpreter
//! - every other command is resolved and run through a [`CommandHost`],
//!   or an [`ApiSurface`] for `api` commands
//! - a node's result is its last child's result
//!
//! Command failures never abort a run. The step budget does.

mod command;
mod errors;
mod instance;
mod interpreter;
mod tree;

pub use command::{
    ApiFunction, ApiSurface, ApiTable, Command, CommandHandler, CommandHost, CommandRegistry,
    CommandSchema, CommandType, ControlNode, PropertyDef, FILTER_COMMAND, LOOP_COMMAND,
};
pub use errors::{ActionError, ActionResult};
pub use instance::{ActionInstance, EvalContext};
pub use interpreter::{ActionInterpreter, ActionRun};
pub use tree::{parse_action_tree, ActionTree};
