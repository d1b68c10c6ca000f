//! Schema-aware evaluation of a formula, mirrored node by node.

use async_trait::async_trait;
use scenario_core::{
    AstNode, CustomList, DataModel, EvaluationError, EvaluationErrorCode, NodeEvaluation, SchemaError,
};

use crate::node::*;
use crate::session::{ServiceError, ValidationService};

use super::fuzzy::with_suggestion;

/// In-process validator producing the same evaluation trees the remote
/// validation service would.
#[derive(Debug, Clone)]
pub struct LocalValidator {
    data_model: DataModel,
    trigger_table: String,
    custom_lists: Vec<CustomList>,
}

impl LocalValidator {
    pub fn new(data_model: DataModel, trigger_table: impl Into<String>, custom_lists: Vec<CustomList>) -> Self {
        Self {
            data_model,
            trigger_table: trigger_table.into(),
            custom_lists,
        }
    }

    /// Evaluation tree with exactly the shape of `node`.
    pub fn evaluate(&self, node: &AstNode) -> NodeEvaluation {
        NodeEvaluation {
            errors: self.check_node(node),
            return_value: None,
            children: node.children.iter().map(|c| self.evaluate(c)).collect(),
            named_children: node
                .named_children
                .iter()
                .map(|(k, c)| (k.clone(), self.evaluate(c)))
                .collect(),
        }
    }

    fn check_node(&self, node: &AstNode) -> Vec<EvaluationError> {
        let mut errors = Vec::new();
        match NodeKind::of(node) {
            NodeKind::Constant(_) | NodeKind::TimeNow => {}
            NodeKind::Undefined => errors.push(EvaluationError::new(
                EvaluationErrorCode::MissingOperand,
                "operand is empty",
            )),
            NodeKind::Payload { field } => {
                if let Err(e) = self.data_model.resolve_field::<&str>(&self.trigger_table, &[], field) {
                    errors.push(self.schema_error(e).at_index(0));
                }
            }
            NodeKind::DatabaseAccess {
                table_name,
                path,
                field_name,
            } => {
                if let Err(e) = self.data_model.resolve_field(table_name, path, field_name) {
                    let arg = match e {
                        SchemaError::UnknownField { .. } => "fieldName",
                        SchemaError::UnknownLink { .. } => "path",
                        SchemaError::UnknownTable(_) if path.is_empty() => "tableName",
                        SchemaError::UnknownTable(_) => "path",
                    };
                    errors.push(self.schema_error(e).at_name(arg));
                }
            }
            NodeKind::CustomListAccess { list_id } => {
                if !self.custom_lists.iter().any(|l| l.id == list_id) {
                    let message = with_suggestion(
                        format!("unknown custom list '{list_id}'"),
                        list_id,
                        self.custom_lists.iter().map(|l| l.id.as_str()),
                    );
                    errors.push(
                        EvaluationError::new(EvaluationErrorCode::UnknownCustomList, message).at_name("customListId"),
                    );
                }
            }
            NodeKind::Aggregation {
                table_name,
                field_name,
                ..
            } => {
                if field_name.is_empty() {
                    errors.push(
                        EvaluationError::new(EvaluationErrorCode::MissingOperand, "aggregation has no field")
                            .at_name("fieldName"),
                    );
                } else if let Err(e) = self.data_model.resolve_field::<&str>(table_name, &[], field_name) {
                    let arg = match e {
                        SchemaError::UnknownField { .. } => "fieldName",
                        _ => "tableName",
                    };
                    errors.push(self.schema_error(e).at_name(arg));
                }
            }
            NodeKind::FuzzyMatch { operands, .. } => {
                if operands.len() != 2 {
                    errors.push(EvaluationError::new(
                        EvaluationErrorCode::WrongNumberOfArguments,
                        format!("{} expects 2 arguments, got {}", node.name, operands.len()),
                    ));
                }
            }
            NodeKind::TimeAdd { duration, .. } => {
                if !is_iso_duration(duration) {
                    errors.push(
                        EvaluationError::new(
                            EvaluationErrorCode::InvalidConstant,
                            format!("'{duration}' is not an ISO-8601 duration"),
                        )
                        .at_name("duration"),
                    );
                }
            }
            NodeKind::Function { name } => self.check_function(name, node, &mut errors),
        }
        errors
    }

    fn check_function(&self, name: &str, node: &AstNode, errors: &mut Vec<EvaluationError>) {
        if let Some(op) = operator_function(name) {
            if !op.arity.accepts(node.children.len()) {
                errors.push(EvaluationError::new(
                    EvaluationErrorCode::WrongNumberOfArguments,
                    format!("{} expects {} arguments, got {}", name, op.arity, node.children.len()),
                ));
            }
            return;
        }
        match name {
            LIST_NODE_NAME | FILTER_NODE_NAME => {}
            _ if FUNCTION_NAMES.contains(&name) => errors.push(EvaluationError::new(
                EvaluationErrorCode::Unexpected,
                format!("malformed {name} node"),
            )),
            _ => errors.push(EvaluationError::new(
                EvaluationErrorCode::UndefinedFunction,
                with_suggestion(format!("unknown function '{name}'"), name, known_names()),
            )),
        }
    }

    fn schema_error(&self, error: SchemaError) -> EvaluationError {
        match error {
            SchemaError::UnknownTable(table) => EvaluationError::new(
                EvaluationErrorCode::UnknownTable,
                with_suggestion(
                    format!("unknown table '{table}'"),
                    &table,
                    self.data_model.list_tables().iter().map(|t| t.name.as_str()),
                ),
            ),
            SchemaError::UnknownLink { table, link } => EvaluationError::new(
                EvaluationErrorCode::UnknownLink,
                with_suggestion(
                    format!("table '{table}' has no link '{link}'"),
                    &link,
                    self.data_model.links_from(&table).map(|l| l.name.as_str()),
                ),
            ),
            SchemaError::UnknownField { table, field } => {
                let candidates: Vec<&str> = self
                    .data_model
                    .find_table(&table)
                    .map(|t| t.fields.iter().map(|f| f.name.as_str()).collect())
                    .unwrap_or_default();
                EvaluationError::new(
                    EvaluationErrorCode::UnknownField,
                    with_suggestion(format!("table '{table}' has no field '{field}'"), &field, candidates),
                )
            }
        }
    }
}

#[async_trait]
impl ValidationService for LocalValidator {
    async fn validate(&self, node: &AstNode) -> Result<NodeEvaluation, ServiceError> {
        Ok(self.evaluate(node))
    }
}
