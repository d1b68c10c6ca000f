//! Read-only schema graph: tables, typed fields and directed links.
//!
//! The graph is loaded once per editing session and never mutated. Link
//! paths are resolved left-to-right starting from a base table, which is how
//! database accessors reach fields on related tables.

use serde::{Deserialize, Serialize};

use crate::ast::{AstNode, ConstantValue};

/// Node name of a trigger-object field accessor.
pub const PAYLOAD_NODE_NAME: &str = "Payload";
/// Node name of a linked-table field accessor.
pub const DATABASE_ACCESS_NODE_NAME: &str = "DatabaseAccess";

/// Errors raised while walking the schema graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error("table '{table}' has no link named '{link}'")]
    UnknownLink { table: String, link: String },

    #[error("table '{table}' has no field named '{field}'")]
    UnknownField { table: String, field: String },
}

/// Scalar type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DataType {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Bool => write!(f, "Bool"),
            DataType::Int => write!(f, "Int"),
            DataType::Float => write!(f, "Float"),
            DataType::String => write!(f, "String"),
            DataType::Timestamp => write!(f, "Timestamp"),
            DataType::Unknown => write!(f, "Unknown"),
        }
    }
}

impl DataType {
    /// Type of a literal constant.
    pub fn of_constant(value: &ConstantValue) -> Self {
        match value {
            ConstantValue::Bool(_) => DataType::Bool,
            ConstantValue::Number(n) if n.fract() == 0.0 => DataType::Int,
            ConstantValue::Number(_) => DataType::Float,
            ConstantValue::String(_) => DataType::String,
            _ => DataType::Unknown,
        }
    }
}

/// A typed column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub is_enum: bool,
    /// Finite value set, only meaningful when `is_enum` is set.
    #[serde(default)]
    pub values: Vec<ConstantValue>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Field {
    /// Enumerated values, or an empty slice when the field is not an enum.
    pub fn enum_values(&self) -> &[ConstantValue] {
        if self.is_enum {
            &self.values
        } else {
            &[]
        }
    }
}

/// A table and its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

impl Table {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Directed link `from -> to`, addressed by `name` as one path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub name: String,
    pub from: String,
    pub to: String,
}

/// A user-maintained list usable in membership checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The schema graph for one organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataModel {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl DataModel {
    pub fn list_tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn find_field(&self, table: &str, name: &str) -> Option<&Field> {
        self.find_table(table).and_then(|t| t.field(name))
    }

    /// Links originating at `table`, in declaration order.
    pub fn links_from<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.from == table)
    }

    /// Walk `path` link by link starting at `base` and return the table reached.
    pub fn resolve_link_path<S: AsRef<str>>(
        &self,
        base: &str,
        path: &[S],
    ) -> Result<&Table, SchemaError> {
        let mut current = self
            .find_table(base)
            .ok_or_else(|| SchemaError::UnknownTable(base.to_string()))?;

        for segment in path {
            let segment = segment.as_ref();
            let link = self
                .links_from(&current.name)
                .find(|l| l.name == segment)
                .ok_or_else(|| SchemaError::UnknownLink {
                    table: current.name.clone(),
                    link: segment.to_string(),
                })?;
            current = self
                .find_table(&link.to)
                .ok_or_else(|| SchemaError::UnknownTable(link.to.clone()))?;
        }

        Ok(current)
    }

    /// Resolve a field on the table reached by `path` from `base`.
    pub fn resolve_field<S: AsRef<str>>(
        &self,
        base: &str,
        path: &[S],
        field: &str,
    ) -> Result<&Field, SchemaError> {
        let table = self.resolve_link_path(base, path)?;
        table.field(field).ok_or_else(|| SchemaError::UnknownField {
            table: table.name.clone(),
            field: field.to_string(),
        })
    }

    /// One `Payload` accessor per field of the trigger table.
    pub fn payload_accessors(&self, trigger_table: &str) -> Vec<AstNode> {
        self.find_table(trigger_table)
            .map(|t| {
                t.fields
                    .iter()
                    .map(|f| payload_accessor(&f.name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `DatabaseAccess` accessors for every field reachable through a link
    /// path of length `1..=max_depth` from the trigger table.
    ///
    /// Traversal is depth-first in link declaration order; a table already
    /// on the current path is never entered again.
    pub fn database_accessors(&self, trigger_table: &str, max_depth: usize) -> Vec<AstNode> {
        let mut out = Vec::new();
        if self.find_table(trigger_table).is_none() {
            return out;
        }
        let mut visited = vec![trigger_table.to_string()];
        let mut path = Vec::new();
        self.collect_accessors(trigger_table, trigger_table, max_depth, &mut path, &mut visited, &mut out);
        out
    }

    fn collect_accessors(
        &self,
        trigger_table: &str,
        current: &str,
        remaining: usize,
        path: &mut Vec<String>,
        visited: &mut Vec<String>,
        out: &mut Vec<AstNode>,
    ) {
        if remaining == 0 {
            return;
        }
        for link in self.links_from(current) {
            if visited.iter().any(|t| t == &link.to) {
                continue;
            }
            let Some(target) = self.find_table(&link.to) else {
                continue;
            };
            path.push(link.name.clone());
            visited.push(target.name.clone());

            for field in &target.fields {
                out.push(database_accessor(trigger_table, path, &field.name));
            }
            self.collect_accessors(trigger_table, &target.name, remaining - 1, path, visited, out);

            visited.pop();
            path.pop();
        }
    }
}

/// `Payload(field)` accessor node.
pub fn payload_accessor(field: &str) -> AstNode {
    AstNode::function(PAYLOAD_NODE_NAME).with_child(AstNode::constant(field))
}

/// `DatabaseAccess` accessor node rooted at `table_name` following `path`.
pub fn database_accessor(table_name: &str, path: &[String], field: &str) -> AstNode {
    AstNode::function(DATABASE_ACCESS_NODE_NAME)
        .with_named_child("tableName", AstNode::constant(table_name))
        .with_named_child("fieldName", AstNode::constant(field))
        .with_named_child("path", AstNode::constant(ConstantValue::StringList(path.to_vec())))
}
