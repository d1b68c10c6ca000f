//! Enum suggestions for the free side of an equality comparison.

use scenario_core::ConstantValue;

use crate::context::SchemaContext;
use crate::node::NodeKind;
use crate::tree::{NodeId, ViewTree};

const EQUALITY_OPERATOR: &str = "=";

/// Enum values of the field compared against `id`, if any.
///
/// Only looks at the direct parent and the other positional child. The
/// parent must be `=` and the sibling a payload or database accessor to an
/// enumerated field; anything else yields nothing.
pub fn enum_suggestions(tree: &ViewTree, id: NodeId, schema: &SchemaContext<'_>) -> Vec<ConstantValue> {
    let Some(parent) = tree.parent_of(id) else {
        return Vec::new();
    };
    if parent.name != EQUALITY_OPERATOR || !parent.children.contains(&id) {
        return Vec::new();
    }
    let Some(sibling) = parent.children.iter().find(|c| **c != id) else {
        return Vec::new();
    };
    let Ok(sibling) = tree.subtree_to_ast(*sibling) else {
        return Vec::new();
    };

    let field = match NodeKind::of(&sibling) {
        NodeKind::Payload { field } => schema.data_model.find_field(schema.trigger_table, field),
        NodeKind::DatabaseAccess {
            table_name,
            path,
            field_name,
        } => schema.data_model.resolve_field(table_name, path, field_name).ok(),
        NodeKind::Constant(_)
        | NodeKind::Undefined
        | NodeKind::CustomListAccess { .. }
        | NodeKind::Aggregation { .. }
        | NodeKind::FuzzyMatch { .. }
        | NodeKind::TimeAdd { .. }
        | NodeKind::TimeNow
        | NodeKind::Function { .. } => None,
    };

    field.map(|f| f.enum_values().to_vec()).unwrap_or_default()
}
