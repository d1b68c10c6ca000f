//! Explicit per-session schema context threaded into the resolver and facade.

use scenario_core::{AstNode, CustomList, DataModel, DataType};

use crate::node::{operator_function, Aggregator, NodeKind};

/// Read-only lookups available while editing one scenario.
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    pub data_model: &'a DataModel,
    /// Table the scenario is triggered on; payload accessors read its fields.
    pub trigger_table: &'a str,
    pub custom_lists: &'a [CustomList],
}

impl<'a> SchemaContext<'a> {
    pub fn new(data_model: &'a DataModel, trigger_table: &'a str, custom_lists: &'a [CustomList]) -> Self {
        Self {
            data_model,
            trigger_table,
            custom_lists,
        }
    }

    pub fn custom_list(&self, id: &str) -> Option<&'a CustomList> {
        self.custom_lists.iter().find(|l| l.id == id)
    }

    /// Best-effort result type of `node`; `Unknown` when it cannot be resolved.
    pub fn data_type_of(&self, node: &AstNode) -> DataType {
        match NodeKind::of(node) {
            NodeKind::Constant(value) => DataType::of_constant(value),
            NodeKind::Undefined => DataType::Unknown,
            NodeKind::Payload { field } => self
                .data_model
                .find_field(self.trigger_table, field)
                .map(|f| f.data_type)
                .unwrap_or(DataType::Unknown),
            NodeKind::DatabaseAccess {
                table_name,
                path,
                field_name,
            } => self
                .data_model
                .resolve_field(table_name, path, field_name)
                .map(|f| f.data_type)
                .unwrap_or(DataType::Unknown),
            NodeKind::CustomListAccess { .. } => DataType::Unknown,
            NodeKind::Aggregation { aggregator, .. } => match aggregator {
                Aggregator::Count | Aggregator::CountDistinct => DataType::Int,
                Aggregator::Avg | Aggregator::Max | Aggregator::Min | Aggregator::Sum => DataType::Float,
            },
            NodeKind::FuzzyMatch { .. } => DataType::Int,
            NodeKind::TimeAdd { .. } | NodeKind::TimeNow => DataType::Timestamp,
            NodeKind::Function { name } => match name {
                "+" | "-" | "*" | "/" => DataType::Float,
                _ if operator_function(name).is_some() => DataType::Bool,
                _ => DataType::Unknown,
            },
        }
    }
}
