//! Property tests for the scroll window.

use proptest::prelude::*;

use cloudscope::domain::visible_window;

proptest! {
    /// PROPERTY: The window is full unless the list is shorter, and always
    /// contains the selected index.
    #[test]
    fn property_visible_window_keeps_selection(
        len in 1usize..200,
        selected_seed in 0usize..200,
        scroll in 0usize..250,
        max_rows in 1usize..40,
    ) {
        let flat: Vec<usize> = (0..len).collect();
        let selected = selected_seed % len;

        let (window, offset) = visible_window(&flat, selected, scroll, max_rows);

        prop_assert_eq!(window.len(), max_rows.min(len));
        prop_assert!(window.contains(&selected));
        prop_assert_eq!(window.first().copied(), Some(offset));
    }

    /// PROPERTY: With the selection already in view, the window does not move.
    #[test]
    fn property_visible_window_is_stable(
        len in 1usize..200,
        max_rows in 1usize..40,
        offset_seed in 0usize..200,
        pick in 0usize..40,
    ) {
        let flat: Vec<usize> = (0..len).collect();
        let offset = offset_seed % len.saturating_sub(max_rows).max(1);
        let offset = offset.min(len.saturating_sub(max_rows));
        let selected = (offset + pick % max_rows).min(len - 1);

        let (_, new_offset) = visible_window(&flat, selected, offset, max_rows);
        prop_assert_eq!(new_offset, offset);
    }

    /// PROPERTY: Zero rows means an empty window.
    #[test]
    fn property_zero_rows_is_empty(len in 0usize..50, selected in 0usize..50) {
        let flat: Vec<usize> = (0..len).collect();
        let (window, offset) = visible_window(&flat, selected, 0, 0);
        prop_assert!(window.is_empty());
        prop_assert_eq!(offset, 0);
    }
}
