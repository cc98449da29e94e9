//! Serialized action trees
//!
//! Trees are authored by an editor, stored as JSON and parsed on demand.
//! Edits never mutate a tree in place: [`ActionTree::replace_at`] returns a
//! new tree with one subtree swapped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{ActionError, ActionResult};
use crate::observability::{log_event, Event};
use crate::value::Value;

/// A node of an action tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTree {
    /// Command name, resolved by the host
    pub action: String,

    /// Instance property that receives the prior result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Prop name -> instance property it is bound to
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub linked: BTreeMap<String, String>,

    /// Static props
    #[serde(default)]
    pub props: BTreeMap<String, Value>,

    /// Editor-side values for props, carried but not evaluated
    #[serde(default)]
    pub props_value: BTreeMap<String, Value>,

    #[serde(default)]
    pub children: Vec<ActionTree>,
}

impl ActionTree {
    /// Leaf node invoking `action`
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Set a static prop
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Bind a prop to an instance property
    pub fn with_link(mut self, prop: impl Into<String>, target: impl Into<String>) -> Self {
        self.linked.insert(prop.into(), target.into());
        self
    }

    /// Store the prior result under an instance property
    pub fn with_result(mut self, slot: impl Into<String>) -> Self {
        self.result = Some(slot.into());
        self
    }

    /// Append a child
    pub fn with_child(mut self, child: ActionTree) -> Self {
        self.children.push(child);
        self
    }

    /// Parses a stored tree
    pub fn parse(source: &str) -> ActionResult<Self> {
        serde_json::from_str(source).map_err(|e| ActionError::TreeParse(e.to_string()))
    }

    /// Serializes the tree for storage
    pub fn to_json_string(&self) -> ActionResult<String> {
        serde_json::to_string(self).map_err(|e| ActionError::TreeParse(e.to_string()))
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ActionTree::node_count).sum::<usize>()
    }

    /// Node at a child-index path, `[]` being the root
    pub fn node_at(&self, path: &[usize]) -> Option<&ActionTree> {
        match path.split_first() {
            None => Some(self),
            Some((i, rest)) => self.children.get(*i)?.node_at(rest),
        }
    }

    /// Returns a copy with the node at `path` replaced.
    ///
    /// `None` if the path does not exist.
    pub fn replace_at(&self, path: &[usize], subtree: ActionTree) -> Option<ActionTree> {
        let Some((i, rest)) = path.split_first() else {
            return Some(subtree);
        };
        let child = self.children.get(*i)?.replace_at(rest, subtree)?;
        let mut tree = self.clone();
        tree.children[*i] = child;
        Some(tree)
    }
}

/// Parses a stored tree, or `None` if there is no usable tree.
///
/// A parse failure means "no action configured", never a partial tree.
pub fn parse_action_tree(source: &str) -> Option<ActionTree> {
    match ActionTree::parse(source) {
        Ok(tree) => Some(tree),
        Err(err) => {
            log_event(Event::ActionTreeParseFailed, &[("reason", err.to_string().as_str())]);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActionTree {
        ActionTree::new("root")
            .with_prop("n", 2.0)
            .with_child(
                ActionTree::new("a")
                    .with_result("prev")
                    .with_child(ActionTree::new("b").with_link("input", "prev")),
            )
            .with_child(ActionTree::new("c"))
    }

    #[test]
    fn test_json_field_names() {
        let json: serde_json::Value =
            serde_json::from_str(&sample().to_json_string().unwrap()).unwrap();
        assert_eq!(json["action"], "root");
        assert_eq!(json["props"]["n"], 2);
        assert!(json["propsValue"].is_object());
        assert_eq!(json["children"][0]["result"], "prev");
        assert_eq!(json["children"][0]["children"][0]["linked"]["input"], "prev");
    }

    #[test]
    fn test_parse_minimal() {
        let tree = parse_action_tree(r#"{"action": "x"}"#).unwrap();
        assert_eq!(tree, ActionTree::new("x"));
    }

    #[test]
    fn test_parse_failure_is_none() {
        assert_eq!(parse_action_tree("{not json"), None);
        assert_eq!(parse_action_tree(r#"{"props": {}}"#), None);
        assert_eq!(parse_action_tree(r#"{"action": "x", "children": [{"props": 1}]}"#), None);
        assert_eq!(parse_action_tree(""), None);
    }

    #[test]
    fn test_node_count_and_lookup() {
        let tree = sample();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.node_at(&[0, 0]).map(|n| n.action.as_str()), Some("b"));
        assert!(tree.node_at(&[5]).is_none());
    }

    #[test]
    fn test_replace_at_is_immutable() {
        let tree = sample();
        let edited = tree.replace_at(&[0, 0], ActionTree::new("z")).unwrap();
        assert_eq!(edited.node_at(&[0, 0]).unwrap().action, "z");
        assert_eq!(tree.node_at(&[0, 0]).unwrap().action, "b");
        assert_eq!(edited.children[1], tree.children[1]);
        assert!(tree.replace_at(&[3], ActionTree::new("z")).is_none());
        assert_eq!(tree.replace_at(&[], ActionTree::new("r")), Some(ActionTree::new("r")));
    }
}
