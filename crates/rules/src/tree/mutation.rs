//! Id-addressed mutations built on one bottom-up search-and-rewrite pass.

use std::sync::Arc;

use indexmap::IndexMap;
use scenario_core::{AstNode, ConstantValue};
use tracing::debug;

use crate::node::operator_function;

use super::{graft, Arena, NodeId, Result, TreeError, ViewNode, ViewTree};

/// What the transform decided for the target node.
enum Rewrite {
    /// Keep the node (same id) with updated content.
    Update(ViewNode),
    /// Replace the whole subtree with a freshly converted one.
    Replace(AstNode),
    /// Delete the node from its parent.
    Remove,
}

/// Result of rewriting one subtree, as seen by its parent.
enum Outcome {
    Unchanged,
    Rebuilt(NodeId),
    Removed,
}

impl ViewTree {
    /// Replace the constant payload of `id`; name and children are kept.
    pub fn set_constant(&self, id: NodeId, value: ConstantValue) -> Result<ViewTree> {
        self.rewrite(id, "set_constant", |mut node, _| {
            node.constant = Some(value);
            Rewrite::Update(node)
        })
    }

    /// Replace the subtree rooted at `id` with `node`; new nodes get fresh ids.
    pub fn set_operand(&self, id: NodeId, node: AstNode) -> Result<ViewTree> {
        self.rewrite(id, "set_operand", move |_, _| Rewrite::Replace(node))
    }

    /// Rename the operator of `id`, keeping positional and named children.
    ///
    /// Arity is not repaired here; a mismatch is only logged and surfaces as
    /// a validation error on the next round-trip.
    pub fn set_operator(&self, id: NodeId, name: &str) -> Result<ViewTree> {
        self.rewrite(id, "set_operator", |mut node, _| {
            if let Some(op) = operator_function(name) {
                if !op.arity.accepts(node.children.len()) {
                    debug!(
                        node_id = %node.id,
                        operator = name,
                        children = node.children.len(),
                        expected = %op.arity,
                        "operator arity does not match children"
                    );
                }
            }
            node.name = name.to_string();
            Rewrite::Update(node)
        })
    }

    /// Append `child` to the positional children of `id`.
    pub fn append_child(&self, id: NodeId, child: AstNode) -> Result<ViewTree> {
        self.rewrite(id, "append_child", move |mut node, arena| {
            let child_id = graft(arena, &child, Some(node.id));
            node.children.push(child_id);
            Rewrite::Update(node)
        })
    }

    /// Delete `id` from its parent's positional or named children.
    pub fn remove(&self, id: NodeId) -> Result<ViewTree> {
        if id == self.root {
            return Err(TreeError::RootRemoval(id));
        }
        self.rewrite(id, "remove", |_, _| Rewrite::Remove)
    }

    /// Shared traversal: recurse into every child first, then apply
    /// `transform` to the target once its children are rewritten.
    fn rewrite<F>(&self, target: NodeId, op: &'static str, transform: F) -> Result<ViewTree>
    where
        F: FnOnce(ViewNode, &mut Arena) -> Rewrite,
    {
        if !self.contains(target) {
            return Err(TreeError::NodeNotFound(target));
        }

        let mut nodes = self.nodes.clone();
        let mut transform = Some(transform);
        let root = match self.rewrite_node(self.root, None, target, &mut transform, &mut nodes) {
            Outcome::Unchanged => self.root,
            Outcome::Rebuilt(id) => id,
            Outcome::Removed => return Err(TreeError::RootRemoval(self.root)),
        };

        debug!(node_id = %target, op, nodes = nodes.len(), "rewrote tree");
        Ok(ViewTree { root, nodes })
    }

    fn rewrite_node<F>(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        target: NodeId,
        transform: &mut Option<F>,
        out: &mut Arena,
    ) -> Outcome
    where
        F: FnOnce(ViewNode, &mut Arena) -> Rewrite,
    {
        let node = self.arena_node(id);

        let mut changed = false;
        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            match self.rewrite_node(child, Some(id), target, transform, out) {
                Outcome::Unchanged => children.push(child),
                Outcome::Rebuilt(new_id) => {
                    changed |= new_id != child;
                    children.push(new_id);
                }
                Outcome::Removed => changed = true,
            }
        }

        let mut named_children = IndexMap::with_capacity(node.named_children.len());
        for (key, &child) in &node.named_children {
            match self.rewrite_node(child, Some(id), target, transform, out) {
                Outcome::Unchanged => {
                    named_children.insert(key.clone(), child);
                }
                Outcome::Rebuilt(new_id) => {
                    changed |= new_id != child;
                    named_children.insert(key.clone(), new_id);
                }
                Outcome::Removed => changed = true,
            }
        }

        if id == target {
            if let Some(transform) = transform.take() {
                let mut current = node.clone();
                current.children = children;
                current.named_children = named_children;
                return match transform(current, out) {
                    Rewrite::Update(mut updated) => {
                        updated.id = id;
                        updated.parent = parent;
                        out.insert(id, Arc::new(updated));
                        Outcome::Rebuilt(id)
                    }
                    Rewrite::Replace(replacement) => {
                        remove_subtree(out, id);
                        Outcome::Rebuilt(graft(out, &replacement, parent))
                    }
                    Rewrite::Remove => {
                        remove_subtree(out, id);
                        Outcome::Removed
                    }
                };
            }
        }

        if changed {
            let mut rebuilt = node.clone();
            rebuilt.children = children;
            rebuilt.named_children = named_children;
            out.insert(id, Arc::new(rebuilt));
            return Outcome::Rebuilt(id);
        }

        Outcome::Unchanged
    }
}

/// Drop `id` and all of its descendants from the arena.
fn remove_subtree(arena: &mut Arena, id: NodeId) {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if let Some(node) = arena.remove(&current) {
            stack.extend(node.children.iter());
            stack.extend(node.named_children.values());
        }
    }
}
