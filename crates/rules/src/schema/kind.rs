//! Document kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Scenario,
    DataModel,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Scenario => write!(f, "Scenario"),
            DocumentKind::DataModel => write!(f, "DataModel"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Scenario" => Ok(DocumentKind::Scenario),
            "DataModel" => Ok(DocumentKind::DataModel),
            other => Err(format!("unknown document kind: '{}'", other)),
        }
    }
}
