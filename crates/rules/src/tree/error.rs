//! Errors raised by tree mutation and evaluation merging.

use super::NodeId;

/// Errors that can occur while rewriting or merging a [`ViewTree`](super::ViewTree).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The target id is not in the tree. The tree is left untouched.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The root cannot be deleted; a tree always has one.
    #[error("cannot remove root node {0}")]
    RootRemoval(NodeId),

    /// The evaluation tree does not mirror the view model.
    ///
    /// This is an internal-consistency violation (typically a stale
    /// evaluation merged against a since-mutated tree), never user error.
    #[error("evaluation shape mismatch at node {node}: {detail}")]
    ShapeMismatch { node: NodeId, detail: String },

    /// A dotted node path does not resolve.
    #[error("invalid node path '{0}'")]
    InvalidPath(String),
}

/// Result alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
