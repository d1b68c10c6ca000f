//! Multi-kind document container and accessors.

use super::{CommonMetadata, DataModelDocument, DocumentKind, ScenarioDocument};

/// A fully deserialized document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Scenario(ScenarioDocument),
    DataModel(DataModelDocument),
}

impl Document {
    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            Document::Scenario(doc) => &doc.metadata,
            Document::DataModel(doc) => &doc.metadata,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Scenario(_) => DocumentKind::Scenario,
            Document::DataModel(_) => DocumentKind::DataModel,
        }
    }

    pub fn as_scenario(&self) -> Option<&ScenarioDocument> {
        match self {
            Document::Scenario(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_data_model(&self) -> Option<&DataModelDocument> {
        match self {
            Document::DataModel(doc) => Some(doc),
            _ => None,
        }
    }

    /// Serialize this document to JSON, delegating to the inner type.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Document::Scenario(d) => serde_json::to_value(d),
            Document::DataModel(d) => serde_json::to_value(d),
        }
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        match self {
            Document::Scenario(d) => serde_yaml::to_string(d),
            Document::DataModel(d) => serde_yaml::to_string(d),
        }
    }
}
