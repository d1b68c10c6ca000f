//! Structural merge of an evaluation tree onto the view model.

use std::sync::Arc;

use scenario_core::NodeEvaluation;

use super::{Arena, NodeId, Result, TreeError, ViewTree};

impl ViewTree {
    /// Copy each evaluation node's errors onto the view node at the same
    /// position (positional children by index, named children by key).
    ///
    /// The two trees must have identical shape. A mismatch is reported as
    /// [`TreeError::ShapeMismatch`] and no partially merged tree escapes;
    /// callers are expected to have discarded stale evaluations beforehand.
    pub fn merge_evaluation(&self, evaluation: &NodeEvaluation) -> Result<ViewTree> {
        let mut nodes = self.nodes.clone();
        self.zip_node(self.root, evaluation, &mut nodes)?;
        Ok(ViewTree {
            root: self.root,
            nodes,
        })
    }

    fn zip_node(&self, id: NodeId, evaluation: &NodeEvaluation, out: &mut Arena) -> Result<()> {
        let node = self.arena_node(id);

        if node.children.len() != evaluation.children.len() {
            return Err(TreeError::ShapeMismatch {
                node: id,
                detail: format!(
                    "{} positional children, evaluation has {}",
                    node.children.len(),
                    evaluation.children.len()
                ),
            });
        }
        if node.named_children.len() != evaluation.named_children.len()
            || node
                .named_children
                .keys()
                .any(|k| !evaluation.named_children.contains_key(k))
        {
            let ours: Vec<&str> = node.named_children.keys().map(String::as_str).collect();
            let theirs: Vec<&str> = evaluation.named_children.keys().map(String::as_str).collect();
            return Err(TreeError::ShapeMismatch {
                node: id,
                detail: format!("named children {:?}, evaluation has {:?}", ours, theirs),
            });
        }

        if node.errors != evaluation.errors {
            let mut merged = node.clone();
            merged.errors = evaluation.errors.clone();
            out.insert(id, Arc::new(merged));
        }

        for (child, child_eval) in node.children.iter().zip(&evaluation.children) {
            self.zip_node(*child, child_eval, out)?;
        }
        for (key, child) in &node.named_children {
            // Key presence was checked above.
            if let Some(child_eval) = evaluation.named_children.get(key) {
                self.zip_node(*child, child_eval, out)?;
            }
        }

        Ok(())
    }
}
