//! Validation/evaluation results mirrored onto a submitted [`AstNode`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::{AstNode, ConstantValue};

/// Error vocabulary shared with the validation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationErrorCode {
    UndefinedFunction,
    WrongNumberOfArguments,
    MissingOperand,
    UnknownField,
    UnknownTable,
    UnknownLink,
    UnknownCustomList,
    InvalidConstant,
    Unexpected,
}

impl std::fmt::Display for EvaluationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EvaluationErrorCode::UndefinedFunction => "UNDEFINED_FUNCTION",
            EvaluationErrorCode::WrongNumberOfArguments => "WRONG_NUMBER_OF_ARGUMENTS",
            EvaluationErrorCode::MissingOperand => "MISSING_OPERAND",
            EvaluationErrorCode::UnknownField => "UNKNOWN_FIELD",
            EvaluationErrorCode::UnknownTable => "UNKNOWN_TABLE",
            EvaluationErrorCode::UnknownLink => "UNKNOWN_LINK",
            EvaluationErrorCode::UnknownCustomList => "UNKNOWN_CUSTOM_LIST",
            EvaluationErrorCode::InvalidConstant => "INVALID_CONSTANT",
            EvaluationErrorCode::Unexpected => "UNEXPECTED",
        };
        f.write_str(s)
    }
}

/// One validation error attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationError {
    pub code: EvaluationErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_name: Option<String>,
}

impl EvaluationError {
    pub fn new(code: EvaluationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            argument_index: None,
            argument_name: None,
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.argument_index = Some(index);
        self
    }

    pub fn at_name(mut self, name: impl Into<String>) -> Self {
        self.argument_name = Some(name.into());
        self
    }
}

/// Shape-mirrored evaluation tree for a submitted [`AstNode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEvaluation {
    #[serde(default)]
    pub errors: Vec<EvaluationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<ConstantValue>,
    #[serde(default)]
    pub children: Vec<NodeEvaluation>,
    #[serde(default)]
    pub named_children: IndexMap<String, NodeEvaluation>,
}

impl NodeEvaluation {
    /// An error-free evaluation with the same shape as `node`.
    pub fn clean_for(node: &AstNode) -> Self {
        Self {
            errors: Vec::new(),
            return_value: None,
            children: node.children.iter().map(Self::clean_for).collect(),
            named_children: node
                .named_children
                .iter()
                .map(|(k, v)| (k.clone(), Self::clean_for(v)))
                .collect(),
        }
    }

    /// True when this tree mirrors `node` exactly (counts and key sets at every level).
    pub fn matches_shape(&self, node: &AstNode) -> bool {
        self.children.len() == node.children.len()
            && self.named_children.len() == node.named_children.len()
            && self
                .children
                .iter()
                .zip(&node.children)
                .all(|(e, n)| e.matches_shape(n))
            && self.named_children.iter().all(|(key, e)| {
                node.named_children
                    .get(key)
                    .map(|n| e.matches_shape(n))
                    .unwrap_or(false)
            })
    }

    /// True when any node in the tree carries an error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
            || self.children.iter().any(NodeEvaluation::has_errors)
            || self.named_children.values().any(NodeEvaluation::has_errors)
    }

    /// Total number of errors in the tree.
    pub fn error_count(&self) -> usize {
        self.errors.len()
            + self.children.iter().map(NodeEvaluation::error_count).sum::<usize>()
            + self
                .named_children
                .values()
                .map(NodeEvaluation::error_count)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison() -> AstNode {
        AstNode::function("=")
            .with_child(AstNode::constant(1.0))
            .with_child(AstNode::function("Payload").with_child(AstNode::constant("amount")))
    }

    #[test]
    fn clean_evaluation_mirrors_shape() {
        let node = comparison();
        let eval = NodeEvaluation::clean_for(&node);
        assert!(eval.matches_shape(&node));
        assert!(!eval.has_errors());
    }

    #[test]
    fn missing_child_breaks_shape() {
        let node = comparison();
        let mut eval = NodeEvaluation::clean_for(&node);
        eval.children.pop();
        assert!(!eval.matches_shape(&node));
    }

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let err = EvaluationError::new(EvaluationErrorCode::UnknownField, "no field 'x'").at_index(1);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "UNKNOWN_FIELD");
        assert_eq!(value["argumentIndex"], 1);
        assert!(value.get("argumentName").is_none());
    }

    #[test]
    fn nested_errors_are_counted() {
        let node = comparison();
        let mut eval = NodeEvaluation::clean_for(&node);
        eval.children[1]
            .errors
            .push(EvaluationError::new(EvaluationErrorCode::UnknownField, "x"));
        assert!(eval.has_errors());
        assert_eq!(eval.error_count(), 1);
    }
}
