//! Property tests for the navigator state machine.

use proptest::prelude::*;

use cloudscope::domain::{
    Generation, LoadApplied, LoadCompletion, LoadError, Navigator, NodeId, NodeKind, NodeSpec,
    NodeStore,
};

#[derive(Debug, Clone)]
enum Op {
    Up,
    Down,
    PageUp(usize),
    PageDown(usize),
    First,
    Last,
    /// Toggle the selection; a resulting load completes with this many
    /// children, or fails when `None`.
    Toggle(Option<usize>),
    Collapse,
    Render(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Up),
        3 => Just(Op::Down),
        1 => (1usize..8).prop_map(Op::PageUp),
        1 => (1usize..8).prop_map(Op::PageDown),
        1 => Just(Op::First),
        1 => Just(Op::Last),
        4 => proptest::option::weighted(0.85, 0usize..5).prop_map(Op::Toggle),
        1 => Just(Op::Collapse),
        2 => (0usize..12).prop_map(Op::Render),
    ]
}

/// Children alternate between expandable projects and leaf runs.
fn children(count: usize) -> Vec<NodeSpec> {
    (0..count)
        .map(|i| {
            let kind = if i % 2 == 0 { NodeKind::Project } else { NodeKind::Run };
            NodeSpec::new(kind, format!("n{i}"), format!("node {i}"))
        })
        .collect()
}

/// Independent pre-order walk of the expanded tree.
fn expected_visible(store: &NodeStore) -> Vec<NodeId> {
    fn walk(store: &NodeStore, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        let Some(node) = store.get(id) else { return };
        if node.is_expanded() {
            for child in node.children() {
                walk(store, *child, out);
            }
        }
    }
    let mut out = Vec::new();
    for root in store.roots() {
        walk(store, *root, &mut out);
    }
    out
}

fn apply(nav: &mut Navigator, op: &Op) {
    match op {
        Op::Up => nav.move_up(),
        Op::Down => nav.move_down(),
        Op::PageUp(n) => nav.page_up(*n),
        Op::PageDown(n) => nav.page_down(*n),
        Op::First => nav.select_first(),
        Op::Last => nav.select_last(),
        Op::Toggle(outcome) => {
            if let Some(request) = nav.toggle_expand() {
                let result = match outcome {
                    Some(count) => Ok(children(*count)),
                    None => Err(LoadError::CommandFailed("403 Forbidden".to_string())),
                };
                nav.apply_load(LoadCompletion::for_request(&request, result));
            }
        }
        Op::Collapse => nav.collapse(),
        Op::Render(rows) => {
            nav.visible_rows(*rows);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The flattened list is exactly the expanded tree, in pre-order.
    #[test]
    fn property_flattened_matches_expanded_tree(
        roots in 0usize..5,
        ops in proptest::collection::vec(op(), 0..60),
    ) {
        let mut nav = Navigator::new();
        nav.set_roots(children(roots));
        for op in &ops {
            apply(&mut nav, op);
            let expected = expected_visible(nav.store());
            prop_assert_eq!(nav.flattened(), expected.as_slice());
        }
    }

    /// PROPERTY: Selection is always a valid index (or 0 on an empty tree).
    #[test]
    fn property_selection_stays_in_bounds(
        roots in 0usize..5,
        ops in proptest::collection::vec(op(), 0..60),
    ) {
        let mut nav = Navigator::new();
        nav.set_roots(children(roots));
        for op in &ops {
            apply(&mut nav, op);
            let len = nav.flattened().len();
            if len == 0 {
                prop_assert_eq!(nav.selected_index(), 0);
                prop_assert!(nav.selected_id().is_none());
            } else {
                prop_assert!(nav.selected_index() < len);
            }
        }
    }

    /// PROPERTY: The rendered window always contains the selected row.
    #[test]
    fn property_window_contains_selection(
        roots in 1usize..5,
        ops in proptest::collection::vec(op(), 0..60),
        max_rows in 1usize..10,
    ) {
        let mut nav = Navigator::new();
        nav.set_roots(children(roots));
        for op in &ops {
            apply(&mut nav, op);
            let rows = nav.visible_rows(max_rows);
            let len = nav.flattened().len();
            prop_assert_eq!(rows.len(), max_rows.min(len));
            prop_assert_eq!(rows.iter().filter(|r| r.selected).count(), 1);
            let offset = nav.scroll_offset();
            prop_assert!(offset <= nav.selected_index());
            prop_assert!(nav.selected_index() < offset + max_rows);
        }
    }

    /// PROPERTY: Children are always one level below their parent.
    #[test]
    fn property_child_depth_is_parent_plus_one(
        roots in 1usize..4,
        ops in proptest::collection::vec(op(), 0..40),
    ) {
        let mut nav = Navigator::new();
        nav.set_roots(children(roots));
        for op in &ops {
            apply(&mut nav, op);
        }
        for id in nav.flattened() {
            let node = nav.store().get(*id).unwrap();
            let expected = node
                .parent()
                .and_then(|p| nav.store().get(p))
                .map(|p| p.depth() + 1)
                .unwrap_or(0);
            prop_assert_eq!(node.depth(), expected);
        }
    }

    /// PROPERTY: A completion from before a refresh never changes the tree.
    #[test]
    fn property_stale_completion_is_discarded(
        roots in 1usize..5,
        count in 0usize..5,
    ) {
        let mut nav = Navigator::new();
        nav.set_roots(children(roots));
        let request = nav.toggle_expand().unwrap();
        prop_assert_eq!(request.generation, Generation::default());

        nav.begin_refresh();
        nav.set_roots(children(roots));
        let before = nav.flattened().to_vec();

        let applied = nav.apply_load(LoadCompletion::for_request(&request, Ok(children(count))));
        prop_assert_eq!(applied, LoadApplied::Discarded);
        prop_assert_eq!(nav.flattened(), before.as_slice());
    }
}
