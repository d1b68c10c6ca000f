//! Scenario formula rule-expression engine.
//!
//! This crate provides:
//! - Typed classification of formula nodes and operator metadata
//! - An id-addressed, structurally shared view model with pure mutations
//! - Merging of shape-mirrored validation results back onto the view model
//! - Schema-aware operand suggestions, including enum inference for `=`
//! - A uniform describe/edit facade over the editable node variants
//! - Edit sessions with an async validation worker and stale-result discarding
//! - YAML scenario and data model documents with a filesystem store

pub mod context;
pub mod editable;
pub mod loader;
pub mod node;
pub mod operand;
pub mod schema;
pub mod session;
pub mod tree;
pub mod validation;

pub use context::SchemaContext;
