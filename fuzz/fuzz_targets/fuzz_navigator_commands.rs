#![no_main]

use libfuzzer_sys::fuzz_target;

use cloudscope::domain::{LoadCompletion, LoadError, Navigator, NodeKind, NodeSpec};

fn children(count: u8) -> Vec<NodeSpec> {
    (0..count % 6)
        .map(|i| {
            let kind = if i % 2 == 0 { NodeKind::Project } else { NodeKind::Run };
            NodeSpec::new(kind, format!("n{i}"), format!("node {i}"))
        })
        .collect()
}

// Each byte is one command; the navigator must never panic and the
// selection must stay inside the flattened list.
fuzz_target!(|data: &[u8]| {
    let mut nav = Navigator::new();
    nav.set_roots(children(data.first().copied().unwrap_or(3)));
    let mut pending = Vec::new();

    for byte in data.iter().skip(1) {
        match byte % 10 {
            0 => nav.move_up(),
            1 => nav.move_down(),
            2 => nav.page_up((byte / 10) as usize),
            3 => nav.page_down((byte / 10) as usize),
            4 => nav.collapse(),
            5 => pending.extend(nav.toggle_expand()),
            6 => {
                if let Some(request) = pending.pop() {
                    nav.apply_load(LoadCompletion::for_request(&request, Ok(children(*byte))));
                }
            }
            7 => {
                if let Some(request) = pending.pop() {
                    let err = LoadError::CommandFailed("failed".to_string());
                    nav.apply_load(LoadCompletion::for_request(&request, Err(err)));
                }
            }
            8 => {
                nav.begin_refresh();
                nav.set_roots(children(*byte));
            }
            _ => {
                nav.visible_rows((byte / 10) as usize);
            }
        }
        let len = nav.flattened().len();
        assert!(len == 0 || nav.selected_index() < len);
    }
});
