//! Wire form of a scenario formula node.
//!
//! An [`AstNode`] is what gets persisted and what the validation service
//! receives: an operator/function name, ordered positional children, named
//! children and an optional literal constant.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Name carried by an empty operand slot.
pub const UNDEFINED_NODE_NAME: &str = "Undefined";

/// Literal payload of a constant node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    StringList(Vec<String>),
    NumberList(Vec<f64>),
    BoolList(Vec<bool>),
}

impl ConstantValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstantValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            ConstantValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    /// Display text without quoting; `Display` quotes strings.
    pub fn label(&self) -> String {
        match self {
            ConstantValue::String(s) => s.clone(),
            ConstantValue::StringList(items) => items.join(", "),
            other => other.to_string(),
        }
    }

    /// Short type tag used in descriptions and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstantValue::Null => "null",
            ConstantValue::Bool(_) => "bool",
            ConstantValue::Number(_) => "number",
            ConstantValue::String(_) => "string",
            ConstantValue::StringList(_) => "string[]",
            ConstantValue::NumberList(_) => "number[]",
            ConstantValue::BoolList(_) => "bool[]",
        }
    }
}

impl std::fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(b) => write!(f, "{b}"),
            ConstantValue::Number(n) => write!(f, "{n}"),
            ConstantValue::String(s) => write!(f, "\"{s}\""),
            ConstantValue::StringList(items) => {
                let parts: Vec<String> = items.iter().map(|s| format!("\"{s}\"")).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            ConstantValue::NumberList(items) => {
                let parts: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            ConstantValue::BoolList(items) => {
                let parts: Vec<String> = items.iter().map(|b| b.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        ConstantValue::String(value.to_string())
    }
}

impl From<String> for ConstantValue {
    fn from(value: String) -> Self {
        ConstantValue::String(value)
    }
}

impl From<f64> for ConstantValue {
    fn from(value: f64) -> Self {
        ConstantValue::Number(value)
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Bool(value)
    }
}

impl From<Vec<String>> for ConstantValue {
    fn from(value: Vec<String>) -> Self {
        ConstantValue::StringList(value)
    }
}

/// Persisted/wire node of a scenario formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    /// Operator or function name, empty for plain constants.
    #[serde(default)]
    pub name: String,
    /// `Some(ConstantValue::Null)` when the wire carries `constant: null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub constant: Option<ConstantValue>,
    #[serde(default)]
    pub children: Vec<AstNode>,
    #[serde(default)]
    pub named_children: IndexMap<String, AstNode>,
}

/// A present key always yields `Some`, so `null` stays distinguishable from absent.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<ConstantValue>, D::Error>
where
    D: Deserializer<'de>,
{
    ConstantValue::deserialize(deserializer).map(Some)
}

impl AstNode {
    /// Leaf constant node.
    pub fn constant(value: impl Into<ConstantValue>) -> Self {
        Self {
            name: String::new(),
            constant: Some(value.into()),
            children: Vec::new(),
            named_children: IndexMap::new(),
        }
    }

    /// Operator/function node with no children yet.
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constant: None,
            children: Vec::new(),
            named_children: IndexMap::new(),
        }
    }

    /// Parse the JSON wire form.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Empty operand slot waiting to be filled.
    pub fn undefined() -> Self {
        Self::function(UNDEFINED_NODE_NAME)
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_named_child(mut self, key: impl Into<String>, child: AstNode) -> Self {
        self.named_children.insert(key.into(), child);
        self
    }

    pub fn is_constant(&self) -> bool {
        self.name.is_empty() && self.constant.is_some()
    }

    pub fn is_undefined(&self) -> bool {
        self.name == UNDEFINED_NODE_NAME || (self.name.is_empty() && self.constant.is_none())
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(AstNode::size).sum::<usize>()
            + self.named_children.values().map(AstNode::size).sum::<usize>()
    }

    /// Constant string stored in a named child, if any.
    pub fn named_str(&self, key: &str) -> Option<&str> {
        self.named_children
            .get(key)
            .and_then(|n| n.constant.as_ref())
            .and_then(ConstantValue::as_str)
    }

    /// True when `other` has the same positional counts and named key sets at every level.
    pub fn same_shape(&self, other: &AstNode) -> bool {
        self.children.len() == other.children.len()
            && self.named_children.len() == other.named_children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
            && self.named_children.iter().all(|(key, a)| {
                other
                    .named_children
                    .get(key)
                    .map(|b| a.same_shape(b))
                    .unwrap_or(false)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_wire_shape() {
        let json = r#"{
            "name": "=",
            "children": [
                {"name": "Payload", "children": [{"constant": "status"}], "namedChildren": {}},
                {"constant": "open", "children": [], "namedChildren": {}}
            ],
            "namedChildren": {}
        }"#;
        let node: AstNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.name, "=");
        assert_eq!(node.children.len(), 2);
        assert!(node.children[1].is_constant());
        assert_eq!(node.children[1].constant, Some(ConstantValue::from("open")));
        assert_eq!(node.size(), 4);
    }

    #[test]
    fn null_constant_differs_from_absent() {
        let with_null: AstNode =
            serde_json::from_str(r#"{"name": "", "constant": null}"#).unwrap();
        let absent: AstNode = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(with_null.constant, Some(ConstantValue::Null));
        assert!(with_null.is_constant());
        assert_eq!(absent.constant, None);
        assert!(absent.is_undefined());
    }

    #[test]
    fn serialize_uses_camel_case_and_skips_absent_constant() {
        let node = AstNode::function("And").with_named_child("label", AstNode::constant("x"));
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("namedChildren").is_some());
        assert!(value.get("constant").is_none());
    }

    #[test]
    fn list_constants_round_trip() {
        let node = AstNode::constant(ConstantValue::NumberList(vec![1.0, 2.5]));
        let json = serde_json::to_string(&node).unwrap();
        let back: AstNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn json_helpers_report_serialize_errors() {
        let node = AstNode::function("Not").with_child(AstNode::constant(false));
        let back = AstNode::from_json(&node.to_json().unwrap()).unwrap();
        assert_eq!(back, node);
        assert!(matches!(
            AstNode::from_json("{\"name\": 3}"),
            Err(crate::ScenarioError::Serialize(_))
        ));
    }

    #[test]
    fn label_leaves_strings_unquoted() {
        assert_eq!(ConstantValue::from("open").label(), "open");
        assert_eq!(ConstantValue::from("open").to_string(), "\"open\"");
        assert_eq!(ConstantValue::Number(2.5).label(), "2.5");
        let list = ConstantValue::StringList(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.label(), "a, b");
    }

    #[test]
    fn same_shape_compares_structure_only() {
        let a = AstNode::function("=")
            .with_child(AstNode::constant(1.0))
            .with_child(AstNode::constant(2.0));
        let b = AstNode::function(">")
            .with_child(AstNode::constant("x"))
            .with_child(AstNode::undefined());
        let c = AstNode::function("=").with_child(AstNode::constant(1.0));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }
}
