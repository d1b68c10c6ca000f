//! Uniform describe/edit surface over the node variants a user edits directly.
//!
//! [`EditableNode`] wraps one of eight adapters (constant, database access,
//! payload access, custom list, aggregator, fuzzy match, time add, time now).
//! Callers use the [`EditableAstNode`] contract without branching on the
//! variant; operator nodes and empty slots have no adapter.

mod adapters;

use scenario_core::{AstNode, ConstantValue, DataType};
use serde::Serialize;

use crate::context::SchemaContext;
use crate::node::NodeKind;

pub use adapters::*;

/// Category an operand belongs to, shared with the operand resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandKind {
    Constant,
    Field,
    CustomList,
    Function,
    Enum,
}

/// Representative icon of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeIcon {
    Constant,
    Field,
    Link,
    List,
    Aggregation,
    FuzzyMatch,
    Clock,
}

/// One user-editable scalar of a node and its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditableField {
    pub name: &'static str,
    pub value: ConstantValue,
}

/// Presentation summary of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescription {
    pub label: String,
    pub icon: NodeIcon,
    pub operand_kind: OperandKind,
    pub data_type: DataType,
    pub fields: Vec<EditableField>,
}

impl NodeDescription {
    pub fn field(&self, name: &str) -> Option<&ConstantValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

/// Errors returned by [`EditableAstNode::edit`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("{kind} node has no editable field '{field}'")]
    UnknownField { kind: &'static str, field: String },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Describe, edit and unwrap contract implemented by every adapter.
pub trait EditableAstNode {
    fn describe(&self) -> NodeDescription;

    /// Set one editable field.
    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError>;

    /// Rebuild the wire node, including any edits.
    fn to_ast_node(&self) -> AstNode;
}

/// Closed set of editable adapters.
#[derive(Debug, Clone)]
pub enum EditableNode<'a> {
    Constant(ConstantAdapter<'a>),
    DatabaseAccess(DatabaseAccessAdapter<'a>),
    PayloadAccess(PayloadAccessAdapter<'a>),
    CustomList(CustomListAdapter<'a>),
    Aggregator(AggregatorAdapter<'a>),
    FuzzyMatch(FuzzyMatchAdapter<'a>),
    TimeAdd(TimeAddAdapter<'a>),
    TimeNow(TimeNowAdapter<'a>),
}

impl<'a> EditableNode<'a> {
    /// Wrap `node`, or `None` for operators, generic functions and empty slots.
    pub fn from_ast(node: &AstNode, ctx: SchemaContext<'a>) -> Option<Self> {
        let editable = match NodeKind::of(node) {
            NodeKind::Constant(value) => EditableNode::Constant(ConstantAdapter::new(ctx, value.clone())),
            NodeKind::Payload { field } => {
                EditableNode::PayloadAccess(PayloadAccessAdapter::new(ctx, field))
            }
            NodeKind::DatabaseAccess {
                table_name,
                path,
                field_name,
            } => EditableNode::DatabaseAccess(DatabaseAccessAdapter::new(ctx, table_name, path, field_name)),
            NodeKind::CustomListAccess { list_id } => {
                EditableNode::CustomList(CustomListAdapter::new(ctx, list_id))
            }
            NodeKind::Aggregation { .. } => EditableNode::Aggregator(AggregatorAdapter::new(ctx, node)?),
            NodeKind::FuzzyMatch {
                any_of,
                algorithm,
                operands,
            } => EditableNode::FuzzyMatch(FuzzyMatchAdapter::new(ctx, any_of, algorithm, operands)),
            NodeKind::TimeAdd {
                timestamp,
                sign,
                duration,
            } => EditableNode::TimeAdd(TimeAddAdapter::new(ctx, timestamp, sign, duration)),
            NodeKind::TimeNow => EditableNode::TimeNow(TimeNowAdapter::new(ctx)),
            NodeKind::Undefined | NodeKind::Function { .. } => return None,
        };
        Some(editable)
    }

    fn inner(&self) -> &dyn EditableAstNode {
        match self {
            EditableNode::Constant(a) => a,
            EditableNode::DatabaseAccess(a) => a,
            EditableNode::PayloadAccess(a) => a,
            EditableNode::CustomList(a) => a,
            EditableNode::Aggregator(a) => a,
            EditableNode::FuzzyMatch(a) => a,
            EditableNode::TimeAdd(a) => a,
            EditableNode::TimeNow(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EditableAstNode {
        match self {
            EditableNode::Constant(a) => a,
            EditableNode::DatabaseAccess(a) => a,
            EditableNode::PayloadAccess(a) => a,
            EditableNode::CustomList(a) => a,
            EditableNode::Aggregator(a) => a,
            EditableNode::FuzzyMatch(a) => a,
            EditableNode::TimeAdd(a) => a,
            EditableNode::TimeNow(a) => a,
        }
    }
}

impl EditableAstNode for EditableNode<'_> {
    fn describe(&self) -> NodeDescription {
        self.inner().describe()
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        self.inner_mut().edit(field, value)
    }

    fn to_ast_node(&self) -> AstNode {
        self.inner().to_ast_node()
    }
}
