//! Constructors for the function shapes the editor inserts into operand slots.

use scenario_core::{AstNode, ConstantValue};

use super::kind::*;

pub fn custom_list_access(list_id: &str) -> AstNode {
    AstNode::function(CUSTOM_LIST_ACCESS_NODE_NAME)
        .with_named_child("customListId", AstNode::constant(list_id))
}

/// Aggregation over `table_name.field_name` with an empty filter list.
pub fn aggregation(aggregator: Aggregator, table_name: &str, field_name: &str, label: &str) -> AstNode {
    AstNode::function(AGGREGATOR_NODE_NAME)
        .with_named_child("aggregator", AstNode::constant(aggregator.as_str()))
        .with_named_child("tableName", AstNode::constant(table_name))
        .with_named_child("fieldName", AstNode::constant(field_name))
        .with_named_child("label", AstNode::constant(label))
        .with_named_child("filters", AstNode::function(LIST_NODE_NAME))
}

/// One aggregation filter: `tableName.fieldName <operator> value`.
pub fn aggregation_filter(table_name: &str, field_name: &str, operator: &str, value: AstNode) -> AstNode {
    AstNode::function(FILTER_NODE_NAME)
        .with_named_child("tableName", AstNode::constant(table_name))
        .with_named_child("fieldName", AstNode::constant(field_name))
        .with_named_child("operator", AstNode::constant(operator))
        .with_named_child("value", value)
}

/// Fuzzy match between two empty operands using the default algorithm.
pub fn fuzzy_match(any_of: bool) -> AstNode {
    let name = if any_of {
        FUZZY_MATCH_ANY_OF_NODE_NAME
    } else {
        FUZZY_MATCH_NODE_NAME
    };
    AstNode::function(name)
        .with_child(AstNode::undefined())
        .with_child(AstNode::undefined())
        .with_named_child("algorithm", AstNode::constant(FuzzyAlgorithm::Ratio.as_str()))
}

/// `now + PT0S` style offset with an empty timestamp operand.
pub fn time_add() -> AstNode {
    AstNode::function(TIME_ADD_NODE_NAME)
        .with_named_child("timestampField", AstNode::undefined())
        .with_named_child("sign", AstNode::constant(TimeSign::Plus.as_str()))
        .with_named_child("duration", AstNode::constant("PT0S"))
}

pub fn time_now() -> AstNode {
    AstNode::function(TIME_NOW_NODE_NAME)
}

/// Binary operator node with both operands.
pub fn binary(operator: &str, left: AstNode, right: AstNode) -> AstNode {
    AstNode::function(operator).with_child(left).with_child(right)
}

/// Constant string-list node, used by list-membership operands.
pub fn string_list(items: &[&str]) -> AstNode {
    AstNode::constant(ConstantValue::StringList(
        items.iter().map(|s| s.to_string()).collect(),
    ))
}
