//! Selection Controller and Lazy Loader state machine
//!
//! [`Navigator`] owns the [`NodeStore`] plus the selection index and scroll
//! offset. It is driven only from the UI loop. Expanding an unloaded node
//! returns a [`LoadRequest`] for the caller to run in the background; the
//! result comes back through [`Navigator::apply_load`].
//!
//! Per node: `NotLoaded -> Loading -> {Loaded, Failed}`, and
//! `Failed -> Loading` on the next explicit expand.

use super::loader::{Generation, LoadApplied, LoadCompletion, LoadRequest, RootsCompletion};
use super::node::{ChildState, Node, NodeId, NodeKind, NodeSpec};
use super::store::NodeStore;
use super::viewport::{flatten_visible, visible_window};

/// Render input for one visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub depth: usize,
    pub kind: NodeKind,
    pub label: String,
    pub status_text: String,
    pub last_activity_text: String,
    pub child_state: ChildState,
    pub expanded: bool,
    pub expandable: bool,
    pub selected: bool,
}

#[derive(Debug, Default)]
pub struct Navigator {
    store: NodeStore,
    flat: Vec<NodeId>,
    selected: usize,
    scroll: usize,
    generation: Generation,
    error_seq: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// Current flattened list, in display order.
    pub fn flattened(&self) -> &[NodeId] {
        &self.flat
    }

    pub fn selected_id(&self) -> Option<NodeId> {
        self.flat.get(self.selected).copied()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected_id().and_then(|id| self.store.get(id))
    }

    /// Replace the forest and reset selection and scroll to the top.
    pub fn set_roots(&mut self, specs: Vec<NodeSpec>) {
        self.store.set_roots(specs);
        self.selected = 0;
        self.scroll = 0;
        self.flat = flatten_visible(&self.store);
    }

    /// Start a full refresh: discard the forest and bump the generation so
    /// that every in-flight load is dropped when it lands.
    pub fn begin_refresh(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.set_roots(Vec::new());
        self.generation
    }

    /// Install the root listing for the current generation.
    pub fn apply_roots(&mut self, completion: RootsCompletion) -> LoadApplied {
        if completion.generation != self.generation {
            return LoadApplied::Discarded;
        }
        match completion.result {
            Ok(specs) => {
                let count = specs.len();
                self.set_roots(specs);
                LoadApplied::Loaded(count)
            }
            Err(err) => {
                let message = err.to_string();
                let spec = self.error_spec(&message);
                self.set_roots(vec![spec]);
                LoadApplied::Failed(message)
            }
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.flat.len() {
            self.selected += 1;
        }
    }

    pub fn page_up(&mut self, rows: usize) {
        self.selected = self.selected.saturating_sub(rows.max(1));
    }

    pub fn page_down(&mut self, rows: usize) {
        let last = self.flat.len().saturating_sub(1);
        self.selected = (self.selected + rows.max(1)).min(last);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.flat.len().saturating_sub(1);
    }

    /// Toggle the selected node. Returns a load to run when the node was
    /// expanded without loaded children.
    pub fn toggle_expand(&mut self) -> Option<LoadRequest> {
        let id = self.selected_id()?;
        self.toggle_node(id)
    }

    /// Expand the selected node if it is collapsed.
    pub fn expand(&mut self) -> Option<LoadRequest> {
        let id = self.selected_id()?;
        if self.store.get(id)?.is_expanded() {
            return None;
        }
        self.toggle_node(id)
    }

    /// Collapse the selected node, or move to its parent when there is
    /// nothing to collapse.
    pub fn collapse(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some(node) = self.store.get(id) else {
            return;
        };
        let (expanded, parent) = (node.is_expanded(), node.parent());
        if expanded {
            self.toggle_node(id);
        } else if let Some(parent) = parent {
            if let Some(index) = self.flat.iter().position(|n| *n == parent) {
                self.selected = index;
            }
        }
    }

    /// Toggle expansion of `id`.
    ///
    /// Collapsing keeps loaded children cached. Expanding a `NotLoaded` or
    /// `Failed` node moves it to `Loading` and returns the request; a node
    /// that is already `Loading` never gets a second request.
    pub fn toggle_node(&mut self, id: NodeId) -> Option<LoadRequest> {
        let node = self.store.get(id)?;
        if !node.is_expandable() {
            return None;
        }
        let was_expanded = node.is_expanded();
        let state = node.child_state();

        self.store.toggle_expansion(id).ok()?;

        let request = if was_expanded {
            None
        } else {
            match state {
                ChildState::NotLoaded | ChildState::Failed => self.start_load(id),
                ChildState::Loading | ChildState::Loaded => None,
            }
        };

        self.rebuild(Some(id));
        request
    }

    /// Merge a finished load into the tree.
    pub fn apply_load(&mut self, completion: LoadCompletion) -> LoadApplied {
        if completion.generation != self.generation {
            return LoadApplied::Discarded;
        }
        match self.store.get(completion.node) {
            Some(node) if node.child_state() == ChildState::Loading => {}
            _ => return LoadApplied::Discarded,
        }

        let keep = self.selected_id();
        let (specs, state, applied) = match completion.result {
            Ok(specs) => {
                let count = specs.len();
                (specs, ChildState::Loaded, LoadApplied::Loaded(count))
            }
            Err(err) => {
                let message = err.to_string();
                let spec = self.error_spec(&message);
                (vec![spec], ChildState::Failed, LoadApplied::Failed(message))
            }
        };
        if self.store.finish_load(completion.node, specs, state).is_err() {
            return LoadApplied::Discarded;
        }
        self.rebuild(keep);
        applied
    }

    /// Rows currently inside the viewport. Updates the stored scroll offset.
    pub fn visible_rows(&mut self, max_rows: usize) -> Vec<VisibleRow> {
        let (window, offset) = visible_window(&self.flat, self.selected, self.scroll, max_rows);
        let rows = window
            .iter()
            .enumerate()
            .filter_map(|(i, id)| {
                let node = self.store.get(*id)?;
                Some(VisibleRow {
                    id: *id,
                    depth: node.depth(),
                    kind: node.kind,
                    label: node.label.clone(),
                    status_text: node.status_text.clone(),
                    last_activity_text: node.last_activity_text.clone(),
                    child_state: node.child_state(),
                    expanded: node.is_expanded(),
                    expandable: node.is_expandable(),
                    selected: offset + i == self.selected,
                })
            })
            .collect();
        self.scroll = offset;
        rows
    }

    /// Labels from the root down to the selected node.
    pub fn breadcrumb(&self) -> Vec<String> {
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let mut chain: Vec<String> = self
            .store
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.store.get(a))
            .map(|n| n.label.clone())
            .collect();
        chain.reverse();
        if let Some(node) = self.store.get(id) {
            chain.push(node.label.clone());
        }
        chain
    }

    /// Nearest expanded ancestor of the selection whose kind is one of
    /// `kinds`, tried in order.
    pub fn scope(&self, kinds: &[NodeKind]) -> Option<&Node> {
        let id = self.selected_id()?;
        kinds
            .iter()
            .find_map(|kind| self.store.find_first_expanded_ancestor_of_kind(id, *kind))
            .and_then(|scope| self.store.get(scope))
    }

    /// Error rows anywhere in the forest, including collapsed subtrees.
    pub fn failed_listings(&self) -> usize {
        self.store.find_by_kind(NodeKind::Error).len()
    }

    fn start_load(&mut self, id: NodeId) -> Option<LoadRequest> {
        // A stale error child is dropped before the retry; the next outcome
        // installs either real children or a fresh error.
        self.store.clear_children(id).ok()?;
        self.store.set_child_state(id, ChildState::Loading).ok()?;
        let target = self.store.node_ref(id)?;
        Some(LoadRequest {
            node: id,
            generation: self.generation,
            target,
        })
    }

    fn error_spec(&mut self, message: &str) -> NodeSpec {
        self.error_seq += 1;
        NodeSpec::new(NodeKind::Error, format!("error-{}", self.error_seq), message)
    }

    fn rebuild(&mut self, keep: Option<NodeId>) {
        self.flat = flatten_visible(&self.store);
        if let Some(index) = keep.and_then(|id| self.flat.iter().position(|n| *n == id)) {
            self.selected = index;
        } else if self.selected >= self.flat.len() {
            self.selected = self.flat.len().saturating_sub(1);
        }
    }
}
