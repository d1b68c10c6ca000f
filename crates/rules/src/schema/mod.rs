//! YAML document types with serde deserialization.
//!
//! Every document carries the same header:
//! - `DocumentEnvelope`: lightweight first-pass header (apiVersion, kind, metadata)
//! - `Document`: enum dispatching to kind-specific types
//! - `ScenarioDocument`: a scenario formula bound to its trigger table
//! - `DataModelDocument`: tables, links and custom lists the formulas refer to

mod data_model;
mod document;
mod envelope;
mod kind;
mod metadata;
mod scenario;

pub use data_model::*;
pub use document::*;
pub use envelope::*;
pub use kind::*;
pub use metadata::*;
pub use scenario::*;

/// The only supported `apiVersion`.
pub const API_VERSION: &str = "v1";
