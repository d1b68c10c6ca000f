//! The eight variant adapters behind [`EditableNode`](super::EditableNode).

use scenario_core::{database_accessor, payload_accessor, AstNode, ConstantValue, DataType};

use crate::context::SchemaContext;
use crate::node::*;

use super::{
    EditError, EditableAstNode, EditableField, EditableNode, NodeDescription, NodeIcon, OperandKind,
};

fn expect_string(field: &str, value: ConstantValue) -> Result<String, EditError> {
    match value {
        ConstantValue::String(s) if !s.is_empty() => Ok(s),
        other => Err(EditError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a non-empty string, got {}", other.type_name()),
        }),
    }
}

fn parse_value<T: std::str::FromStr<Err = String>>(field: &str, value: ConstantValue) -> Result<T, EditError> {
    let raw = expect_string(field, value)?;
    raw.parse().map_err(|reason| EditError::InvalidValue {
        field: field.to_string(),
        reason,
    })
}

fn unknown(kind: &'static str, field: &str) -> EditError {
    EditError::UnknownField {
        kind,
        field: field.to_string(),
    }
}

// ── Constant ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConstantAdapter<'a> {
    ctx: SchemaContext<'a>,
    value: ConstantValue,
}

impl<'a> ConstantAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>, value: ConstantValue) -> Self {
        Self { ctx, value }
    }
}

impl EditableAstNode for ConstantAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        NodeDescription {
            label: self.value.to_string(),
            icon: NodeIcon::Constant,
            operand_kind: OperandKind::Constant,
            data_type: self.ctx.data_type_of(&self.to_ast_node()),
            fields: vec![EditableField {
                name: "value",
                value: self.value.clone(),
            }],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "value" => {
                self.value = value;
                Ok(())
            }
            other => Err(unknown("constant", other)),
        }
    }

    fn to_ast_node(&self) -> AstNode {
        AstNode::constant(self.value.clone())
    }
}

// ── Payload access ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PayloadAccessAdapter<'a> {
    ctx: SchemaContext<'a>,
    field: String,
}

impl<'a> PayloadAccessAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>, field: &str) -> Self {
        Self {
            ctx,
            field: field.to_string(),
        }
    }
}

impl EditableAstNode for PayloadAccessAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        NodeDescription {
            label: self.field.clone(),
            icon: NodeIcon::Field,
            operand_kind: OperandKind::Field,
            data_type: self.ctx.data_type_of(&self.to_ast_node()),
            fields: vec![EditableField {
                name: "field",
                value: ConstantValue::String(self.field.clone()),
            }],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "field" => {
                self.field = expect_string(field, value)?;
                Ok(())
            }
            other => Err(unknown("payload", other)),
        }
    }

    fn to_ast_node(&self) -> AstNode {
        payload_accessor(&self.field)
    }
}

// ── Database access ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DatabaseAccessAdapter<'a> {
    ctx: SchemaContext<'a>,
    table_name: String,
    path: Vec<String>,
    field_name: String,
}

impl<'a> DatabaseAccessAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>, table_name: &str, path: &[String], field_name: &str) -> Self {
        Self {
            ctx,
            table_name: table_name.to_string(),
            path: path.to_vec(),
            field_name: field_name.to_string(),
        }
    }
}

impl EditableAstNode for DatabaseAccessAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        let mut segments = self.path.clone();
        segments.push(self.field_name.clone());
        NodeDescription {
            label: segments.join("."),
            icon: if self.path.is_empty() {
                NodeIcon::Field
            } else {
                NodeIcon::Link
            },
            operand_kind: OperandKind::Field,
            data_type: self.ctx.data_type_of(&self.to_ast_node()),
            fields: vec![
                EditableField {
                    name: "tableName",
                    value: ConstantValue::String(self.table_name.clone()),
                },
                EditableField {
                    name: "path",
                    value: ConstantValue::StringList(self.path.clone()),
                },
                EditableField {
                    name: "fieldName",
                    value: ConstantValue::String(self.field_name.clone()),
                },
            ],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "tableName" => self.table_name = expect_string(field, value)?,
            "fieldName" => self.field_name = expect_string(field, value)?,
            "path" => match value {
                ConstantValue::StringList(items) => self.path = items,
                other => {
                    return Err(EditError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("expected a string list, got {}", other.type_name()),
                    })
                }
            },
            other => return Err(unknown("database_access", other)),
        }
        Ok(())
    }

    fn to_ast_node(&self) -> AstNode {
        database_accessor(&self.table_name, &self.path, &self.field_name)
    }
}

// ── Custom list ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CustomListAdapter<'a> {
    ctx: SchemaContext<'a>,
    list_id: String,
}

impl<'a> CustomListAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>, list_id: &str) -> Self {
        Self {
            ctx,
            list_id: list_id.to_string(),
        }
    }
}

impl EditableAstNode for CustomListAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        let label = self
            .ctx
            .custom_list(&self.list_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| self.list_id.clone());
        NodeDescription {
            label,
            icon: NodeIcon::List,
            operand_kind: OperandKind::CustomList,
            data_type: DataType::Unknown,
            fields: vec![EditableField {
                name: "customListId",
                value: ConstantValue::String(self.list_id.clone()),
            }],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "customListId" => {
                self.list_id = expect_string(field, value)?;
                Ok(())
            }
            other => Err(unknown("custom_list_access", other)),
        }
    }

    fn to_ast_node(&self) -> AstNode {
        custom_list_access(&self.list_id)
    }
}

// ── Aggregator ──────────────────────────────────────────────────────

/// Keeps the original node so filters survive edits untouched.
#[derive(Debug, Clone)]
pub struct AggregatorAdapter<'a> {
    ctx: SchemaContext<'a>,
    node: AstNode,
    aggregator: Aggregator,
}

impl<'a> AggregatorAdapter<'a> {
    /// `None` when `node` is not a well-formed aggregation.
    pub fn new(ctx: SchemaContext<'a>, node: &AstNode) -> Option<Self> {
        match NodeKind::of(node) {
            NodeKind::Aggregation { aggregator, .. } => Some(Self {
                ctx,
                node: node.clone(),
                aggregator,
            }),
            _ => None,
        }
    }

    fn set_named(&mut self, key: &str, value: String) {
        self.node
            .named_children
            .insert(key.to_string(), AstNode::constant(value));
    }
}

impl EditableAstNode for AggregatorAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        let table = self.node.named_str("tableName").unwrap_or("");
        let field = self.node.named_str("fieldName").unwrap_or("");
        let label = match self.node.named_str("label") {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => format!("{}({}.{})", self.aggregator.label(), table, field),
        };
        let filter_count = self
            .node
            .named_children
            .get("filters")
            .map(|f| f.children.len())
            .unwrap_or(0);
        NodeDescription {
            label,
            icon: NodeIcon::Aggregation,
            operand_kind: OperandKind::Function,
            data_type: self.ctx.data_type_of(&self.node),
            fields: vec![
                EditableField {
                    name: "aggregator",
                    value: ConstantValue::from(self.aggregator.as_str()),
                },
                EditableField {
                    name: "tableName",
                    value: ConstantValue::from(table),
                },
                EditableField {
                    name: "fieldName",
                    value: ConstantValue::from(field),
                },
                EditableField {
                    name: "label",
                    value: ConstantValue::from(self.node.named_str("label").unwrap_or("")),
                },
                EditableField {
                    name: "filterCount",
                    value: ConstantValue::Number(filter_count as f64),
                },
            ],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "aggregator" => {
                let aggregator: Aggregator = parse_value(field, value)?;
                self.aggregator = aggregator;
                self.set_named("aggregator", aggregator.as_str().to_string());
            }
            "tableName" | "fieldName" => {
                let v = expect_string(field, value)?;
                self.set_named(field, v);
            }
            "label" => match value {
                ConstantValue::String(v) => self.set_named("label", v),
                other => {
                    return Err(EditError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("expected a string, got {}", other.type_name()),
                    })
                }
            },
            other => return Err(unknown("aggregation", other)),
        }
        Ok(())
    }

    fn to_ast_node(&self) -> AstNode {
        self.node.clone()
    }
}

// ── Fuzzy match ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FuzzyMatchAdapter<'a> {
    ctx: SchemaContext<'a>,
    any_of: bool,
    algorithm: FuzzyAlgorithm,
    operands: Vec<AstNode>,
}

impl<'a> FuzzyMatchAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>, any_of: bool, algorithm: FuzzyAlgorithm, operands: &[AstNode]) -> Self {
        Self {
            ctx,
            any_of,
            algorithm,
            operands: operands.to_vec(),
        }
    }
}

impl EditableAstNode for FuzzyMatchAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        let label = if self.any_of {
            "Fuzzy match any of"
        } else {
            "Fuzzy match"
        };
        NodeDescription {
            label: label.to_string(),
            icon: NodeIcon::FuzzyMatch,
            operand_kind: OperandKind::Function,
            data_type: self.ctx.data_type_of(&self.to_ast_node()),
            fields: vec![EditableField {
                name: "algorithm",
                value: ConstantValue::from(self.algorithm.as_str()),
            }],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "algorithm" => {
                self.algorithm = parse_value(field, value)?;
                Ok(())
            }
            other => Err(unknown("fuzzy_match", other)),
        }
    }

    fn to_ast_node(&self) -> AstNode {
        let name = if self.any_of {
            FUZZY_MATCH_ANY_OF_NODE_NAME
        } else {
            FUZZY_MATCH_NODE_NAME
        };
        AstNode::function(name)
            .with_children(self.operands.iter().cloned())
            .with_named_child("algorithm", AstNode::constant(self.algorithm.as_str()))
    }
}

// ── Time add ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TimeAddAdapter<'a> {
    ctx: SchemaContext<'a>,
    timestamp: AstNode,
    sign: TimeSign,
    duration: String,
}

impl<'a> TimeAddAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>, timestamp: &AstNode, sign: TimeSign, duration: &str) -> Self {
        Self {
            ctx,
            timestamp: timestamp.clone(),
            sign,
            duration: duration.to_string(),
        }
    }
}

impl EditableAstNode for TimeAddAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        let base = EditableNode::from_ast(&self.timestamp, self.ctx)
            .map(|e| e.describe().label)
            .unwrap_or_else(|| "…".to_string());
        NodeDescription {
            label: format!("{} {} {}", base, self.sign.as_str(), self.duration),
            icon: NodeIcon::Clock,
            operand_kind: OperandKind::Function,
            data_type: DataType::Timestamp,
            fields: vec![
                EditableField {
                    name: "sign",
                    value: ConstantValue::from(self.sign.as_str()),
                },
                EditableField {
                    name: "duration",
                    value: ConstantValue::from(self.duration.as_str()),
                },
            ],
        }
    }

    fn edit(&mut self, field: &str, value: ConstantValue) -> Result<(), EditError> {
        match field {
            "sign" => self.sign = parse_value(field, value)?,
            "duration" => {
                let duration = expect_string(field, value)?;
                if !is_iso_duration(&duration) {
                    return Err(EditError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("'{}' is not an ISO-8601 duration", duration),
                    });
                }
                self.duration = duration;
            }
            other => return Err(unknown("time_add", other)),
        }
        Ok(())
    }

    fn to_ast_node(&self) -> AstNode {
        AstNode::function(TIME_ADD_NODE_NAME)
            .with_named_child("timestampField", self.timestamp.clone())
            .with_named_child("sign", AstNode::constant(self.sign.as_str()))
            .with_named_child("duration", AstNode::constant(self.duration.as_str()))
    }
}

// ── Time now ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TimeNowAdapter<'a> {
    ctx: SchemaContext<'a>,
}

impl<'a> TimeNowAdapter<'a> {
    pub fn new(ctx: SchemaContext<'a>) -> Self {
        Self { ctx }
    }
}

impl EditableAstNode for TimeNowAdapter<'_> {
    fn describe(&self) -> NodeDescription {
        NodeDescription {
            label: "Now".to_string(),
            icon: NodeIcon::Clock,
            operand_kind: OperandKind::Function,
            data_type: self.ctx.data_type_of(&self.to_ast_node()),
            fields: Vec::new(),
        }
    }

    fn edit(&mut self, field: &str, _value: ConstantValue) -> Result<(), EditError> {
        Err(unknown("time_now", field))
    }

    fn to_ast_node(&self) -> AstNode {
        time_now()
    }
}
