//! Data model documents: the schema graph and custom lists scenarios use.

use scenario_core::{CustomList, DataModel, Link, Table};
use serde::{Deserialize, Serialize};

use super::CommonMetadata;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataModelDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: DataModelSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataModelSpec {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub custom_lists: Vec<CustomList>,
}

impl DataModelDocument {
    /// Schema graph described by this document.
    pub fn data_model(&self) -> DataModel {
        DataModel {
            tables: self.spec.tables.clone(),
            links: self.spec.links.clone(),
        }
    }

    pub fn custom_lists(&self) -> &[CustomList] {
        &self.spec.custom_lists
    }
}
