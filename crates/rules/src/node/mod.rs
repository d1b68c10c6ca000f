//! Typed view over wire [`AstNode`](scenario_core::AstNode)s.
//!
//! - `NodeKind`: closed classification of a node (constant, accessor, function, ...)
//! - builders for every accessor and function shape the editor can insert
//! - `OperatorFunction`: presentation/arity metadata for operators

mod builders;
mod kind;
mod operators;

pub use builders::*;
pub use kind::*;
pub use operators::*;
