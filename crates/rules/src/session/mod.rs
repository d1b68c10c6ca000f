//! One user's editing session over a scenario formula.
//!
//! Every successful mutation bumps the session revision and submits the new
//! formula for validation without waiting. Responses are merged back only
//! when they belong to the current revision, so a slow answer for an older
//! tree never lands on a newer one.

mod worker;


use scenario_core::{AstNode, ConstantValue, NodeEvaluation};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::context::SchemaContext;
use crate::editable::{EditError, EditableAstNode, EditableNode};
use crate::tree::{NodeId, TreeError, ViewTree};

pub use worker::{ServiceError, ValidationHandle, ValidationService, ValidationWorker};

/// Formula submitted for validation at a given revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub revision: u64,
    pub node: AstNode,
}

/// Evaluation tree for the formula submitted at `revision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub revision: u64,
    pub evaluation: NodeEvaluation,
}

/// Fire-and-forget destination for validation requests.
pub trait ValidationSink: Send + Sync {
    fn submit(&self, request: ValidationRequest);
}

impl ValidationSink for UnboundedSender<ValidationRequest> {
    fn submit(&self, request: ValidationRequest) {
        let revision = request.revision;
        if self.send(request).is_err() {
            warn!(revision, "validation channel closed, request dropped");
        }
    }
}

/// What [`EditSession::apply_evaluation`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// The response was for an older revision and was dropped.
    Stale,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("node {0} has no editable fields")]
    NotEditable(NodeId),
}

pub type Result<T> = std::result::Result<T, SessionError>;

pub struct EditSession<S> {
    tree: ViewTree,
    revision: u64,
    sink: S,
}

impl<S: ValidationSink> EditSession<S> {
    /// Open a session on `formula` and submit it for a first validation.
    pub fn open(formula: &AstNode, sink: S) -> Self {
        let session = Self {
            tree: ViewTree::from_ast(formula),
            revision: 0,
            sink,
        };
        session.submit();
        session
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_constant(&mut self, id: NodeId, value: ConstantValue) -> Result<()> {
        let next = self.tree.set_constant(id, value)?;
        self.commit(next);
        Ok(())
    }

    pub fn set_operand(&mut self, id: NodeId, node: AstNode) -> Result<()> {
        let next = self.tree.set_operand(id, node)?;
        self.commit(next);
        Ok(())
    }

    pub fn set_operator(&mut self, id: NodeId, name: &str) -> Result<()> {
        let next = self.tree.set_operator(id, name)?;
        self.commit(next);
        Ok(())
    }

    pub fn append_child(&mut self, id: NodeId, child: AstNode) -> Result<()> {
        let next = self.tree.append_child(id, child)?;
        self.commit(next);
        Ok(())
    }

    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let next = self.tree.remove(id)?;
        self.commit(next);
        Ok(())
    }

    /// Edit one field of the node at `id` through its editable adapter.
    ///
    /// Constants keep their id; any other node is replaced by the rebuilt one.
    pub fn edit_field(
        &mut self,
        id: NodeId,
        field: &str,
        value: ConstantValue,
        schema: SchemaContext<'_>,
    ) -> Result<()> {
        let current = self.tree.subtree_to_ast(id)?;
        let mut editable = EditableNode::from_ast(&current, schema).ok_or(SessionError::NotEditable(id))?;
        editable.edit(field, value)?;
        let rebuilt = editable.to_ast_node();

        let keeps_id = matches!(editable, EditableNode::Constant(_));
        let next = match rebuilt.constant {
            Some(constant) if keeps_id => self.tree.set_constant(id, constant)?,
            _ => self.tree.set_operand(id, rebuilt)?,
        };
        self.commit(next);
        Ok(())
    }

    /// Merge a validation response if it matches the current revision.
    pub fn apply_evaluation(&mut self, response: &ValidationResponse) -> Result<MergeOutcome> {
        if response.revision != self.revision {
            debug!(
                revision = response.revision,
                current = self.revision,
                "dropping stale evaluation"
            );
            return Ok(MergeOutcome::Stale);
        }
        self.tree = self.tree.merge_evaluation(&response.evaluation)?;
        debug!(
            revision = self.revision,
            errors = response.evaluation.error_count(),
            "merged evaluation"
        );
        Ok(MergeOutcome::Merged)
    }

    /// Wire form of the current formula, for persistence.
    pub fn save(&self) -> AstNode {
        self.tree.to_ast()
    }

    fn commit(&mut self, next: ViewTree) {
        self.tree = next;
        self.revision += 1;
        self.submit();
    }

    fn submit(&self) {
        debug!(revision = self.revision, nodes = self.tree.len(), "submitting formula for validation");
        self.sink.submit(ValidationRequest {
            revision: self.revision,
            node: self.tree.to_ast(),
        });
    }
}
