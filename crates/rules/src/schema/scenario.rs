//! Scenario documents: one formula evaluated against a trigger table.

use scenario_core::AstNode;
use serde::{Deserialize, Serialize};

use super::{CommonMetadata, DocumentKind, API_VERSION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: ScenarioSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    /// Table whose rows trigger the scenario; payload accessors read it.
    pub trigger_table: String,
    /// Id of the `DataModel` document to validate against, if not the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model: Option<String>,
    /// Rule formula. A missing formula is an empty operand slot.
    #[serde(default = "AstNode::undefined")]
    pub formula: AstNode,
}

impl ScenarioDocument {
    pub fn new(metadata: CommonMetadata, trigger_table: impl Into<String>, formula: AstNode) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: DocumentKind::Scenario.to_string(),
            metadata,
            spec: ScenarioSpec {
                trigger_table: trigger_table.into(),
                data_model: None,
                formula,
            },
        }
    }
}
