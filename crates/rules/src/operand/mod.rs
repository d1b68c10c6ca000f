//! Ranked fill-in candidates for an operand slot.
//!
//! Candidates come in a fixed order: payload fields of the trigger table,
//! database fields reachable through links, custom-list lookups, function
//! templates (aggregations, fuzzy match, time functions) and finally enum
//! constants inferred from the sibling of an `=` comparison.

mod enum_inference;

use scenario_core::{AstNode, ConstantValue, DataType};
use serde::Serialize;
use tracing::debug;

use crate::context::SchemaContext;
use crate::editable::{EditableAstNode, EditableNode};
use crate::node::*;
use crate::tree::{NodeId, Result, ViewTree};

pub use crate::editable::OperandKind;
pub use enum_inference::enum_suggestions;

/// Everything the resolver may offer, passed explicitly per call.
#[derive(Debug, Clone, Copy)]
pub struct OperandContext<'a> {
    pub schema: SchemaContext<'a>,
    pub payload_accessors: &'a [AstNode],
    pub database_accessors: &'a [AstNode],
}

impl<'a> OperandContext<'a> {
    pub fn new(
        schema: SchemaContext<'a>,
        payload_accessors: &'a [AstNode],
        database_accessors: &'a [AstNode],
    ) -> Self {
        Self {
            schema,
            payload_accessors,
            database_accessors,
        }
    }
}

/// One candidate the user can drop into the slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperandOption {
    pub node: AstNode,
    pub kind: OperandKind,
    pub data_type: DataType,
    pub display_name: String,
}

/// Function shapes offered in the fourth category.
#[derive(Debug, Clone, Copy)]
enum FunctionTemplate {
    Aggregation(Aggregator),
    FuzzyMatch { any_of: bool },
    TimeAdd,
    TimeNow,
}

impl FunctionTemplate {
    fn all() -> impl Iterator<Item = FunctionTemplate> {
        Aggregator::ALL
            .into_iter()
            .map(FunctionTemplate::Aggregation)
            .chain([
                FunctionTemplate::FuzzyMatch { any_of: false },
                FunctionTemplate::FuzzyMatch { any_of: true },
                FunctionTemplate::TimeAdd,
                FunctionTemplate::TimeNow,
            ])
    }

    fn option(self, schema: &SchemaContext<'_>) -> OperandOption {
        let (node, display_name) = match self {
            FunctionTemplate::Aggregation(agg) => (
                aggregation(agg, schema.trigger_table, "", ""),
                agg.label().to_string(),
            ),
            FunctionTemplate::FuzzyMatch { any_of: false } => (fuzzy_match(false), "Fuzzy match".to_string()),
            FunctionTemplate::FuzzyMatch { any_of: true } => (fuzzy_match(true), "Fuzzy match any of".to_string()),
            FunctionTemplate::TimeAdd => (time_add(), "Time add".to_string()),
            FunctionTemplate::TimeNow => (time_now(), "Now".to_string()),
        };
        OperandOption {
            data_type: schema.data_type_of(&node),
            node,
            kind: OperandKind::Function,
            display_name,
        }
    }
}

/// Candidates for one slot. Enum suggestions are computed up front; every
/// other category is produced lazily by [`iter`](Self::iter).
#[derive(Debug, Clone)]
pub struct OperandOptions<'a> {
    ctx: OperandContext<'a>,
    enum_values: Vec<ConstantValue>,
}

impl<'a> OperandOptions<'a> {
    /// Resolve candidates for the node `id` of `tree`.
    pub fn resolve(tree: &ViewTree, id: NodeId, ctx: OperandContext<'a>) -> Result<Self> {
        tree.node(id)?;
        let enum_values = enum_suggestions(tree, id, &ctx.schema);
        debug!(
            node_id = %id,
            enum_values = enum_values.len(),
            payload = ctx.payload_accessors.len(),
            database = ctx.database_accessors.len(),
            "resolved operand options"
        );
        Ok(Self { ctx, enum_values })
    }

    pub fn enum_values(&self) -> &[ConstantValue] {
        &self.enum_values
    }

    /// Fresh pass over every candidate, in category order.
    pub fn iter(&self) -> impl Iterator<Item = OperandOption> + '_ {
        let schema = self.ctx.schema;
        let accessor = move |node: &AstNode| OperandOption {
            node: node.clone(),
            kind: OperandKind::Field,
            data_type: schema.data_type_of(node),
            display_name: display_name(node, schema),
        };

        let payload = self.ctx.payload_accessors.iter().map(accessor);
        let database = self.ctx.database_accessors.iter().map(accessor);
        let lists = schema.custom_lists.iter().map(|list| OperandOption {
            node: custom_list_access(&list.id),
            kind: OperandKind::CustomList,
            data_type: DataType::Unknown,
            display_name: list.name.clone(),
        });
        let functions = FunctionTemplate::all().map(move |t| t.option(&schema));
        let enums = self.enum_values.iter().map(|value| OperandOption {
            node: AstNode::constant(value.clone()),
            kind: OperandKind::Enum,
            data_type: DataType::of_constant(value),
            display_name: value.label(),
        });

        payload.chain(database).chain(lists).chain(functions).chain(enums)
    }

    /// Candidates whose display name contains `query`, ignoring case.
    pub fn search<'q>(&'q self, query: &'q str) -> impl Iterator<Item = OperandOption> + 'q {
        let needle = query.to_lowercase();
        self.iter()
            .filter(move |o| o.display_name.to_lowercase().contains(&needle))
    }
}

fn display_name(node: &AstNode, schema: SchemaContext<'_>) -> String {
    EditableNode::from_ast(node, schema)
        .map(|e| e.describe().label)
        .unwrap_or_else(|| node.name.clone())
}

#[cfg(test)]
mod tests;
