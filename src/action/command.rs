//! Commands and the collaborators that resolve and run them
//!
//! The interpreter never builds commands. It asks a [`CommandHost`] to
//! resolve an action name and to run it, and an [`ApiSurface`] to call
//! `api` commands. [`CommandRegistry`] and [`ApiTable`] are in-memory
//! implementations for hosts that register handlers up front.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::errors::{ActionError, ActionResult};
use super::instance::ActionInstance;
use crate::schema::TypeTag;
use crate::value::Value;

/// Schema id of the loop control node
pub const LOOP_COMMAND: &str = "loop";

/// Schema id of the filter control node
pub const FILTER_COMMAND: &str = "filter";

/// Command origin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandType {
    /// Provided by the engine or host
    Builtin,
    /// Dispatched to the API surface as `namespace.method`
    Api,
    /// User-defined kind, kept verbatim
    User(String),
}

impl CommandType {
    pub fn as_str(&self) -> &str {
        match self {
            CommandType::Builtin => "builtin",
            CommandType::Api => "api",
            CommandType::User(s) => s,
        }
    }
}

impl From<String> for CommandType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "builtin" => CommandType::Builtin,
            "api" => CommandType::Api,
            _ => CommandType::User(s),
        }
    }
}

impl From<CommandType> for String {
    fn from(kind: CommandType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Command identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSchema {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CommandType,
    #[serde(default)]
    pub name: String,
}

/// Declared command parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(rename = "type", default = "text_type")]
    pub type_tag: TypeTag,
    /// JSON-encoded per-type configuration
    #[serde(default)]
    pub value: String,
}

fn text_type() -> TypeTag {
    TypeTag::Text
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            value: String::new(),
        }
    }
}

/// A resolved command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub schema: CommandSchema,
    /// Parameters in positional order
    #[serde(default)]
    pub fields: Vec<PropertyDef>,
    #[serde(default)]
    pub code: String,
}

/// Control nodes handled by the interpreter itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlNode {
    Loop,
    Filter,
}

impl Command {
    pub fn new(id: impl Into<String>, kind: CommandType) -> Self {
        let id = id.into();
        Self {
            schema: CommandSchema {
                name: id.clone(),
                id,
                kind,
            },
            fields: Vec::new(),
            code: String::new(),
        }
    }

    /// Builtin command
    pub fn builtin(id: impl Into<String>) -> Self {
        Self::new(id, CommandType::Builtin)
    }

    /// API command with id `namespace.method`
    pub fn api(id: impl Into<String>) -> Self {
        Self::new(id, CommandType::Api)
    }

    /// Add a positional parameter
    pub fn with_field(mut self, field: PropertyDef) -> Self {
        self.fields.push(field);
        self
    }

    /// The loop control command
    pub fn loop_node() -> Self {
        Self::builtin(LOOP_COMMAND)
    }

    /// The filter control command
    pub fn filter_node() -> Self {
        Self::builtin(FILTER_COMMAND)
            .with_field(PropertyDef::new(FILTER_COMMAND, TypeTag::Other("filter".to_string())))
    }

    /// Control node this command stands for, by schema id
    pub fn control(&self) -> Option<ControlNode> {
        match self.schema.id.as_str() {
            LOOP_COMMAND => Some(ControlNode::Loop),
            FILTER_COMMAND => Some(ControlNode::Filter),
            _ => None,
        }
    }

    /// `(namespace, method)` of an API command id
    pub fn api_path(&self) -> Option<(&str, &str)> {
        self.schema
            .id
            .split_once('.')
            .filter(|(ns, method)| !ns.is_empty() && !method.is_empty())
    }
}

/// Resolves and runs commands by action name
#[async_trait]
pub trait CommandHost: Send + Sync {
    /// Command an action name refers to
    fn command_for_action(&self, action: &str) -> Option<Command>;

    /// Runs a non-API command
    async fn run_command(&self, action: &str, instance: &ActionInstance) -> ActionResult<Value>;
}

/// Functions reachable by `api` commands
#[async_trait]
pub trait ApiSurface: Send + Sync {
    /// Calls `namespace.method` with positional arguments
    async fn call(&self, namespace: &str, method: &str, args: Vec<Value>) -> ActionResult<Value>;
}

/// Boxed command handler
pub type CommandHandler =
    Arc<dyn Fn(ActionInstance) -> BoxFuture<'static, ActionResult<Value>> + Send + Sync>;

/// Boxed API function
pub type ApiFunction = Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, ActionResult<Value>> + Send + Sync>;

#[derive(Clone)]
struct RegisteredCommand {
    command: Command,
    handler: Option<CommandHandler>,
}

/// In-memory command host
///
/// Commands are keyed by schema id. Control nodes are registered without a
/// handler.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, RegisteredCommand>>,
}

impl CommandRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `loop` and `filter` control nodes
    pub fn with_control_nodes() -> Self {
        let mut commands = HashMap::new();
        for command in [Command::loop_node(), Command::filter_node()] {
            commands.insert(
                command.schema.id.clone(),
                RegisteredCommand {
                    command,
                    handler: None,
                },
            );
        }
        Self {
            commands: RwLock::new(commands),
        }
    }

    /// Register a command with its handler
    pub fn register<F, Fut>(&self, command: Command, run: F) -> ActionResult<()>
    where
        F: Fn(ActionInstance) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult<Value>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(
            move |instance: ActionInstance| -> BoxFuture<'static, ActionResult<Value>> {
                Box::pin(run(instance))
            },
        );
        self.insert(command, Some(handler))
    }

    /// Register a command resolved here but run elsewhere (API commands)
    pub fn register_declared(&self, command: Command) -> ActionResult<()> {
        self.insert(command, None)
    }

    fn insert(&self, command: Command, handler: Option<CommandHandler>) -> ActionResult<()> {
        let mut commands = self
            .commands
            .write()
            .map_err(|_| ActionError::Internal("Lock poisoned".into()))?;
        let id = command.schema.id.clone();
        if commands.contains_key(&id) {
            return Err(ActionError::CommandExists(id));
        }
        commands.insert(id, RegisteredCommand { command, handler });
        Ok(())
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CommandHost for CommandRegistry {
    fn command_for_action(&self, action: &str) -> Option<Command> {
        self.commands
            .read()
            .ok()?
            .get(action)
            .map(|registered| registered.command.clone())
    }

    async fn run_command(&self, action: &str, instance: &ActionInstance) -> ActionResult<Value> {
        let handler = {
            let commands = self
                .commands
                .read()
                .map_err(|_| ActionError::Internal("Lock poisoned".into()))?;
            commands
                .get(action)
                .ok_or_else(|| ActionError::CommandNotFound(action.to_string()))?
                .handler
                .clone()
        };
        match handler {
            Some(handler) => handler(instance.clone()).await,
            None => Err(ActionError::failed(action, "command has no handler")),
        }
    }
}

/// In-memory API surface keyed by `namespace.method`
#[derive(Default)]
pub struct ApiTable {
    functions: RwLock<HashMap<String, ApiFunction>>,
}

impl ApiTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `namespace.method`
    pub fn register<F, Fut>(&self, path: impl Into<String>, call: F) -> ActionResult<()>
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult<Value>> + Send + 'static,
    {
        let function: ApiFunction = Arc::new(
            move |args: Vec<Value>| -> BoxFuture<'static, ActionResult<Value>> {
                Box::pin(call(args))
            },
        );
        self.functions
            .write()
            .map_err(|_| ActionError::Internal("Lock poisoned".into()))?
            .insert(path.into(), function);
        Ok(())
    }
}

#[async_trait]
impl ApiSurface for ApiTable {
    async fn call(&self, namespace: &str, method: &str, args: Vec<Value>) -> ActionResult<Value> {
        let path = format!("{}.{}", namespace, method);
        let function = self
            .functions
            .read()
            .map_err(|_| ActionError::Internal("Lock poisoned".into()))?
            .get(&path)
            .cloned()
            .ok_or(ActionError::ApiNotFound(path))?;
        function(args).await
    }
}
