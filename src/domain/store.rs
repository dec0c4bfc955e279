//! Node Store
//!
//! Owns the forest as a flat arena. Parent/child links are [`NodeId`]
//! indices, so there are no reference cycles and removing a subtree is a
//! matter of clearing its slots. The store performs no I/O.

use thiserror::Error;

use super::node::{Ancestor, ChildState, Node, NodeId, NodeKind, NodeRef, NodeSpec};

/// Structural mutation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Parent id does not refer to a live node
    #[error("invalid parent {0}: node is not in the store")]
    InvalidParent(NodeId),

    /// Node id does not refer to a live node
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

#[derive(Debug, Default)]
pub struct NodeStore {
    slots: Vec<Option<Node>>,
    roots: Vec<NodeId>,
    /// Vacated slots, reused before the arena grows
    free: Vec<NodeId>,
    live: usize,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole forest. All previously issued ids become invalid.
    pub fn set_roots(&mut self, specs: Vec<NodeSpec>) -> Vec<NodeId> {
        self.slots.clear();
        self.roots.clear();
        self.free.clear();
        self.live = 0;
        for spec in specs {
            let id = self.insert(Node::from_spec(spec));
            self.roots.push(id);
        }
        self.roots.clone()
    }

    /// Attach `spec` as the last child of `parent`.
    ///
    /// A parent that was never loaded, or whose load failed, counts as
    /// loaded once it has children of its own. A parent mid-load keeps its
    /// state until the load finishes.
    pub fn add_child(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, StoreError> {
        let parent_depth = self
            .get(parent)
            .map(Node::depth)
            .ok_or(StoreError::InvalidParent(parent))?;

        let mut node = Node::from_spec(spec);
        node.parent = Some(parent);
        node.depth = parent_depth + 1;
        let id = self.insert(node);

        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
            if matches!(p.child_state, ChildState::NotLoaded | ChildState::Failed) {
                p.child_state = ChildState::Loaded;
            }
        }
        Ok(id)
    }

    /// Drop every child subtree of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<(), StoreError> {
        let children = match self.get_mut(parent) {
            Some(p) => std::mem::take(&mut p.children),
            None => return Err(StoreError::UnknownNode(parent)),
        };
        for child in children {
            self.remove_subtree(child);
        }
        Ok(())
    }

    /// Replace the children of `parent` with `specs`, preserving their order.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        specs: Vec<NodeSpec>,
    ) -> Result<Vec<NodeId>, StoreError> {
        self.clear_children(parent)?;
        specs
            .into_iter()
            .map(|spec| self.add_child(parent, spec))
            .collect()
    }

    /// Replace the children of `parent` and record how its load ended.
    pub fn finish_load(
        &mut self,
        parent: NodeId,
        specs: Vec<NodeSpec>,
        state: ChildState,
    ) -> Result<Vec<NodeId>, StoreError> {
        let ids = self.replace_children(parent, specs)?;
        self.set_child_state(parent, state)?;
        Ok(ids)
    }

    /// Flip `expanded`. Never loads children. Returns the new value.
    pub fn toggle_expansion(&mut self, id: NodeId) -> Result<bool, StoreError> {
        let node = self.get_mut(id).ok_or(StoreError::UnknownNode(id))?;
        node.expanded = !node.expanded;
        Ok(node.expanded)
    }

    pub fn set_child_state(&mut self, id: NodeId, state: ChildState) -> Result<(), StoreError> {
        let node = self.get_mut(id).ok_or(StoreError::UnknownNode(id))?;
        node.child_state = state;
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    /// All nodes of `kind`, in pre-order.
    pub fn find_by_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if node.kind == kind {
                found.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    /// Walk upward from `from` (exclusive) and return the nearest expanded
    /// ancestor of `kind`.
    pub fn find_first_expanded_ancestor_of_kind(
        &self,
        from: NodeId,
        kind: NodeKind,
    ) -> Option<NodeId> {
        self.ancestors(from).into_iter().find(|id| {
            self.get(*id)
                .map(|n| n.kind == kind && n.expanded)
                .unwrap_or(false)
        })
    }

    /// Nearest ancestor of `kind`, regardless of expansion. Includes `from`.
    pub fn ancestor_or_self_of_kind(&self, from: NodeId, kind: NodeKind) -> Option<&Node> {
        std::iter::once(from)
            .chain(self.ancestors(from))
            .filter_map(|id| self.get(id))
            .find(|n| n.kind == kind)
    }

    /// Copy the identity and ancestor context of `id` for background work.
    pub fn node_ref(&self, id: NodeId) -> Option<NodeRef> {
        let node = self.get(id)?;
        let ancestors = self
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.get(a))
            .map(|a| Ancestor {
                id: a.id.clone(),
                kind: a.kind,
                label: a.label.clone(),
                payload: a.payload.clone(),
            })
            .collect();
        Some(NodeRef {
            id: node.id.clone(),
            kind: node.kind,
            label: node.label.clone(),
            payload: node.payload.clone(),
            ancestors,
        })
    }

    /// Ancestor ids from the parent up to the root.
    pub fn ancestors(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(from).and_then(Node::parent);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.get(id).and_then(Node::parent);
        }
        out
    }

    fn insert(&mut self, node: Node) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.slots.get_mut(current.0).and_then(Option::take) {
                self.live -= 1;
                self.free.push(current);
                stack.extend(node.children);
            }
        }
    }

    /// Check the structural invariants: parent links, depth and the
    /// children-vs-load-state rules.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut stack: Vec<(NodeId, Option<NodeId>, usize)> =
            self.roots.iter().map(|r| (*r, None, 0)).collect();
        let mut seen = std::collections::HashSet::new();
        while let Some((id, parent, depth)) = stack.pop() {
            assert!(seen.insert(id), "node {id} reachable twice");
            let node = self.get(id).expect("reachable node is live");
            assert_eq!(node.parent, parent, "parent link of {id}");
            assert_eq!(node.depth, depth, "depth of {id}");
            match node.child_state {
                ChildState::NotLoaded => assert!(node.children.is_empty()),
                ChildState::Failed => {
                    assert_eq!(node.children.len(), 1);
                    let child = self.get(node.children[0]).expect("error child");
                    assert_eq!(child.kind, NodeKind::Error);
                }
                ChildState::Loading | ChildState::Loaded => {}
            }
            for child in &node.children {
                stack.push((*child, Some(id), depth + 1));
            }
        }
    }
}
