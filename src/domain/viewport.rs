//! Flattener / Viewport
//!
//! Both functions are pure: the visible rows and the scroll window are
//! re-derived from the store and `(selected, scroll, max_rows)` alone.

use super::store::NodeStore;
use super::node::NodeId;

/// Pre-order, expansion-aware linearization of the forest.
///
/// A collapsed node hides its entire subtree regardless of the descendants'
/// own `expanded` flags, so collapsing remembers inner expansion state.
pub fn flatten_visible(store: &NodeStore) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = store.roots().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(node) = store.get(id) else { continue };
        out.push(id);
        if node.is_expanded() {
            stack.extend(node.children().iter().rev().copied());
        }
    }
    out
}

/// Compute the scroll window into `flat`.
///
/// Returns the visible slice and the adjusted scroll offset. The slice is
/// shorter than `max_rows` only near the end of the list.
pub fn visible_window<T>(
    flat: &[T],
    selected: usize,
    scroll_offset: usize,
    max_rows: usize,
) -> (&[T], usize) {
    if max_rows == 0 {
        return (&flat[..0], 0);
    }

    let mut offset = scroll_offset;
    if selected < offset {
        offset = selected;
    } else if selected >= offset + max_rows {
        offset = selected - max_rows + 1;
    }
    offset = offset.min(flat.len().saturating_sub(max_rows));

    let end = (offset + max_rows).min(flat.len());
    (&flat[offset..end], offset)
}
