//! Id-addressed view model of a scenario formula.
//!
//! Nodes live in a flat arena keyed by [`NodeId`]; a node refers to its
//! children and its parent by id only, so there are no ownership cycles.
//! Every mutation returns a new [`ViewTree`]. Arena entries are `Arc`-shared
//! between versions, so nodes a mutation did not touch stay pointer-equal.

mod error;
mod mutation;
mod zipper;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use scenario_core::{AstNode, ConstantValue, EvaluationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::error::{Result, TreeError};

/// Stable node identifier, minted once and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        NodeId(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One editable node. Children and parent are arena ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub id: NodeId,
    pub name: String,
    pub constant: Option<ConstantValue>,
    pub children: Vec<NodeId>,
    pub named_children: IndexMap<String, NodeId>,
    /// Navigation only; `None` for the root.
    pub parent: Option<NodeId>,
    /// Errors attached by the most recent evaluation merge.
    pub errors: Vec<EvaluationError>,
}

pub(crate) type Arena = HashMap<NodeId, Arc<ViewNode>>;

/// Immutable view-model tree.
#[derive(Debug, Clone)]
pub struct ViewTree {
    root: NodeId,
    nodes: Arena,
}

impl ViewTree {
    /// Build a view model from a wire node, minting a fresh id for every node.
    pub fn from_ast(node: &AstNode) -> Self {
        let mut nodes = Arena::with_capacity(node.size());
        let root = graft(&mut nodes, node, None);
        Self { root, nodes }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &ViewNode {
        self.arena_node(self.root)
    }

    pub fn get(&self, id: NodeId) -> Option<&ViewNode> {
        self.nodes.get(&id).map(Arc::as_ref)
    }

    /// Like [`get`](Self::get) but reports a missing id as [`TreeError::NodeNotFound`].
    pub fn node(&self, id: NodeId) -> Result<&ViewNode> {
        self.get(id).ok_or(TreeError::NodeNotFound(id))
    }

    /// Shared handle to a node, for pointer-identity checks across versions.
    pub fn shared(&self, id: NodeId) -> Option<&Arc<ViewNode>> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has a root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&ViewNode> {
        self.get(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.get(p))
    }

    /// Number of nodes in the subtree rooted at `id` (0 if absent).
    pub fn subtree_size(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .chain(node.named_children.values())
                    .map(|c| self.subtree_size(*c))
                    .sum::<usize>()
            }
            None => 0,
        }
    }

    /// Node ids in pre-order: node, positional children, then named children.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let node = self.arena_node(id);
            let named = node.named_children.values().rev();
            stack.extend(named);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Strip ids, parents and errors back to the wire form.
    pub fn to_ast(&self) -> AstNode {
        self.build_ast(self.root)
    }

    pub fn subtree_to_ast(&self, id: NodeId) -> Result<AstNode> {
        self.node(id)?;
        Ok(self.build_ast(id))
    }

    fn build_ast(&self, id: NodeId) -> AstNode {
        let node = self.arena_node(id);
        AstNode {
            name: node.name.clone(),
            constant: node.constant.clone(),
            children: node.children.iter().map(|c| self.build_ast(*c)).collect(),
            named_children: node
                .named_children
                .iter()
                .map(|(k, c)| (k.clone(), self.build_ast(*c)))
                .collect(),
        }
    }

    /// Resolve a dotted path: numeric segments index positional children,
    /// other segments are named-child keys. The empty path is the root.
    pub fn find_by_path(&self, path: &str) -> Result<NodeId> {
        let mut current = self.root;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            let node = self.arena_node(current);
            let next = match segment.parse::<usize>() {
                Ok(index) => node.children.get(index).copied(),
                Err(_) => node.named_children.get(segment).copied(),
            };
            current = next.ok_or_else(|| TreeError::InvalidPath(path.to_string()))?;
        }
        Ok(current)
    }

    /// Inverse of [`find_by_path`](Self::find_by_path).
    pub fn path_of(&self, id: NodeId) -> Result<String> {
        let mut segments = Vec::new();
        let mut current = self.node(id)?;
        while let Some(parent_id) = current.parent {
            let parent = self.arena_node(parent_id);
            let segment = match parent.children.iter().position(|c| *c == current.id) {
                Some(index) => index.to_string(),
                None => parent
                    .named_children
                    .iter()
                    .find(|(_, c)| **c == current.id)
                    .map(|(k, _)| k.clone())
                    .unwrap_or_default(),
            };
            segments.push(segment);
            current = parent;
        }
        segments.reverse();
        Ok(segments.join("."))
    }

    fn arena_node(&self, id: NodeId) -> &ViewNode {
        &self.nodes[&id]
    }
}

/// Insert a fresh copy of `node` (and its subtree) into the arena.
///
/// The id is minted before recursing so children get their parent pointer
/// on the way down.
pub(crate) fn graft(nodes: &mut Arena, node: &AstNode, parent: Option<NodeId>) -> NodeId {
    let id = NodeId::new();
    let children = node
        .children
        .iter()
        .map(|c| graft(nodes, c, Some(id)))
        .collect();
    let named_children = node
        .named_children
        .iter()
        .map(|(k, c)| (k.clone(), graft(nodes, c, Some(id))))
        .collect();
    nodes.insert(
        id,
        Arc::new(ViewNode {
            id,
            name: node.name.clone(),
            constant: node.constant.clone(),
            children,
            named_children,
            parent,
            errors: Vec::new(),
        }),
    );
    id
}
