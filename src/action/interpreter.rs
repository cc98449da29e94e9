//! Action tree interpreter
//!
//! Recursive descent over an [`ActionTree`]. Per node:
//!
//! 1. budget check against the shared step counter
//! 2. instance derivation (static props, linked props, result slot)
//! 3. command resolution through the [`CommandHost`]
//! 4. control nodes (`loop`, `filter`) are handled here
//! 5. other commands run on the host or the [`ApiSurface`]; failures and
//!    panics become a null result
//! 6. children run in order on this node's result; the last child's
//!    result is the node's result
//!
//! Children and loop elements are awaited one after another, so the step
//! counter and instance threading are deterministic.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use uuid::Uuid;

use super::command::{ApiSurface, Command, CommandHost, CommandType, ControlNode, FILTER_COMMAND};
use super::errors::{ActionError, ActionResult};
use super::instance::{ActionInstance, EvalContext};
use super::tree::{parse_action_tree, ActionTree};
use crate::config::EngineConfig;
use crate::filter::{FilterGroup, PropertyFilter};
use crate::observability::{log_event, Event, ObservationScope};
use crate::value::Value;

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRun {
    /// Result of the root node
    pub result: Value,
    /// Nodes visited
    pub iterations: u64,
    /// Contained failures, in the order they happened
    pub errors: Vec<ActionError>,
}

/// Evaluates action trees against a command host
pub struct ActionInterpreter {
    host: Arc<dyn CommandHost>,
    api: Option<Arc<dyn ApiSurface>>,
    max_steps: u64,
}

impl ActionInterpreter {
    /// Create an interpreter with the default step budget
    pub fn new(host: Arc<dyn CommandHost>) -> Self {
        Self {
            host,
            api: None,
            max_steps: EngineConfig::default().max_steps,
        }
    }

    /// Create an interpreter from configuration
    pub fn from_config(host: Arc<dyn CommandHost>, config: &EngineConfig) -> Self {
        Self::new(host).with_max_steps(config.max_steps)
    }

    /// Attach the surface `api` commands are called on
    pub fn with_api(mut self, api: Arc<dyn ApiSurface>) -> Self {
        self.api = Some(api);
        self
    }

    /// Override the step budget
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Evaluates a tree from a seed instance.
    ///
    /// Only a step-budget overrun is an error. Every other failure is
    /// contained at its node and listed in [`ActionRun::errors`].
    pub async fn evaluate(&self, tree: &ActionTree, seed: ActionInstance) -> ActionResult<ActionRun> {
        let run_id = Uuid::new_v4().to_string();
        let scope = ObservationScope::with_fields(
            "ACTION_RUN",
            Event::ActionRunBegin.severity(),
            &[("action", tree.action.as_str()), ("run_id", run_id.as_str())],
        );
        let mut ctx = EvalContext::new(self.max_steps);

        match self.eval_node(tree, &seed, &mut ctx).await {
            Ok(result) => {
                scope.complete_with_fields(&[
                    ("errors", ctx.errors().len().to_string().as_str()),
                    ("iterations", ctx.iterations().to_string().as_str()),
                ]);
                Ok(ActionRun {
                    result,
                    iterations: ctx.iterations(),
                    errors: ctx.into_errors(),
                })
            }
            Err(err) => {
                scope.abort(
                    Event::ActionBudgetExceeded,
                    &[
                        ("iterations", ctx.iterations().to_string().as_str()),
                        ("max_steps", ctx.max_steps().to_string().as_str()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Parses and evaluates stored tree source.
    ///
    /// Unparseable source means no action is configured: `Ok(None)`.
    pub async fn run_source(&self, source: &str, seed: ActionInstance) -> ActionResult<Option<ActionRun>> {
        match parse_action_tree(source) {
            Some(tree) => self.evaluate(&tree, seed).await.map(Some),
            None => Ok(None),
        }
    }

    /// Evaluates one node. `parent` carries the prior result and the
    /// instance properties visible to this node.
    fn eval_node<'a>(
        &'a self,
        node: &'a ActionTree,
        parent: &'a ActionInstance,
        ctx: &'a mut EvalContext,
    ) -> BoxFuture<'a, ActionResult<Value>> {
        Box::pin(async move {
            let iterations = ctx.step()?;
            log_event(
                Event::ActionNodeStart,
                &[
                    ("action", node.action.as_str()),
                    ("iterations", iterations.to_string().as_str()),
                ],
            );

            let mut instance = derive_instance(node, parent, iterations);

            let result = match self.host.command_for_action(&node.action) {
                None => {
                    log_event(Event::ActionCommandUnresolved, &[("action", node.action.as_str())]);
                    ctx.record(ActionError::CommandNotFound(node.action.clone()));
                    Value::Null
                }
                Some(command) => match command.control() {
                    Some(ControlNode::Loop) => return self.eval_loop(node, &instance, ctx).await,
                    Some(ControlNode::Filter) => {
                        if !passes_filter(&instance) {
                            log_event(Event::ActionFilterBlocked, &[("action", node.action.as_str())]);
                            return Ok(Value::Null);
                        }
                        instance.result.clone()
                    }
                    None => match self.execute(node, &command, &instance).await {
                        Ok(value) => value,
                        Err(err) if err.aborts_run() => return Err(err),
                        Err(err) => {
                            let message = err.to_string();
                            log_event(
                                Event::ActionCommandFailed,
                                &[("action", node.action.as_str()), ("error", message.as_str())],
                            );
                            instance.error = Some(message);
                            ctx.record(err);
                            Value::Null
                        }
                    },
                },
            };

            if node.children.is_empty() {
                return Ok(result);
            }
            instance.result = result;
            let mut last = Value::Null;
            for child in &node.children {
                last = self.eval_node(child, &instance, &mut *ctx).await?;
            }
            Ok(last)
        })
    }

    /// Runs every child once per element of the prior result.
    ///
    /// The result is the last child's result for the last element.
    async fn eval_loop(
        &self,
        node: &ActionTree,
        instance: &ActionInstance,
        ctx: &mut EvalContext,
    ) -> ActionResult<Value> {
        let Value::List(items) = &instance.result else {
            log_event(
                Event::ActionLoopSkipped,
                &[("action", node.action.as_str()), ("found", instance.result.type_name())],
            );
            return Ok(Value::Null);
        };

        let mut last = Value::Null;
        for item in items {
            let element = ActionInstance {
                result: item.clone(),
                ..instance.clone()
            };
            for child in &node.children {
                last = self.eval_node(child, &element, &mut *ctx).await?;
            }
        }
        Ok(last)
    }

    /// Runs a resolved non-control command, containing panics
    async fn execute(
        &self,
        node: &ActionTree,
        command: &Command,
        instance: &ActionInstance,
    ) -> ActionResult<Value> {
        let run = async {
            match command.schema.kind {
                CommandType::Api => self.call_api(command, instance).await,
                _ => self.host.run_command(&node.action, instance).await,
            }
        };
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(ActionError::CommandPanicked {
                action: node.action.clone(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    /// Calls `namespace.method` with args in the command's field order
    async fn call_api(&self, command: &Command, instance: &ActionInstance) -> ActionResult<Value> {
        let not_found = || ActionError::ApiNotFound(command.schema.id.clone());
        let (namespace, method) = command.api_path().ok_or_else(not_found)?;
        let api = self.api.as_ref().ok_or_else(not_found)?;
        let args = command
            .fields
            .iter()
            .map(|field| instance.prop(&field.name).clone())
            .collect();
        api.call(namespace, method, args).await
    }
}

/// Props precedence, lowest first: static props, linked instance
/// properties, then the result slot binding.
fn derive_instance(node: &ActionTree, parent: &ActionInstance, iterations: u64) -> ActionInstance {
    let mut props = node.props.clone();
    for (prop, target) in &node.linked {
        let bound = parent.instance_props.get(target).cloned().unwrap_or_default();
        props.insert(prop.clone(), bound);
    }

    let mut instance_props = parent.instance_props.clone();
    if let Some(slot) = &node.result {
        instance_props.insert(slot.clone(), parent.result.clone());
    }

    ActionInstance {
        props,
        instance_props,
        result: parent.result.clone(),
        iterations,
        error: None,
    }
}

/// Evaluates the `filter` prop against the instance properties.
///
/// No configured group passes; a group that cannot be read blocks.
fn passes_filter(instance: &ActionInstance) -> bool {
    let Some(raw) = instance.props.get(FILTER_COMMAND) else {
        return true;
    };
    let json = serde_json::Value::from(raw.clone());
    let json = match json {
        serde_json::Value::String(s) => match serde_json::from_str(&s) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        },
        other => other,
    };
    if json.is_null() {
        return true;
    }
    match serde_json::from_value::<FilterGroup>(json) {
        Ok(group) => PropertyFilter::new(&instance.instance_props).matches_group(&group),
        Err(_) => false,
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
