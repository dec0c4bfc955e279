//! Scenario: Browsing a DevOps organization
//!
//! Journey: A user opens the dashboard, drills into an organization,
//! collapses it again, and retries a listing that was forbidden.
//!
//! Success Criteria:
//! - Children appear one level deeper than their parent
//! - Collapsed subtrees are cached, not fetched again
//! - Failures show up inline and can be retried by expanding again

use std::sync::Arc;

use cloudscope::application::Command;
use cloudscope::domain::{ChildState, NodeKind};

use crate::common::*;

fn contoso_provider() -> ScriptedProvider {
    ScriptedProvider::new().respond(
        "contoso",
        vec![project("web"), project("infra"), project("data")],
    )
}

/// SCENARIO: Expand, collapse and re-expand an organization
#[test]
fn scenario_expand_collapse_uses_cached_children() {
    let roots = ScriptedRoots::ok(vec![org("contoso"), org("fabrikam")]);
    let provider = Arc::new(contoso_provider());
    let mut h = DashboardHarness::start(domain_with(roots.clone(), provider.clone()));

    assert_eq!(
        h.outline(),
        vec![(0, "contoso".to_string()), (0, "fabrikam".to_string())]
    );

    h.run(&[Command::ToggleExpand]);
    assert_eq!(
        h.outline(),
        vec![
            (0, "contoso".to_string()),
            (1, "web".to_string()),
            (1, "infra".to_string()),
            (1, "data".to_string()),
            (0, "fabrikam".to_string()),
        ]
    );
    assert_eq!(provider.calls(), 1);

    h.run(&[Command::ToggleExpand]);
    assert_eq!(h.outline().len(), 2);

    h.run(&[Command::ToggleExpand]);
    assert_eq!(h.outline().len(), 5, "cached children are shown again");
    assert_eq!(provider.calls(), 1, "re-expanding must not fetch again");
    assert_eq!(roots.calls(), 1);
}

/// SCENARIO: A forbidden listing becomes an error row, then a retry succeeds
#[test]
fn scenario_failed_listing_is_retried_on_expand() {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let provider = Arc::new(
        ScriptedProvider::new()
            .fail("contoso", "403 Forbidden")
            .respond("contoso", vec![project("web")]),
    );
    let mut h = DashboardHarness::start(domain_with(roots, provider.clone()));

    h.run(&[Command::Expand]);
    let rows = h.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].child_state, ChildState::Failed);
    assert_eq!(rows[1].kind, NodeKind::Error);
    assert_eq!(rows[1].label, "403 Forbidden");
    assert_eq!(rows[1].depth, 1);
    assert_eq!(h.status_text().as_deref(), Some("403 Forbidden"));
    assert_eq!(h.dashboard.failed_listings(), 1);

    // Collapse and expand again: the failed listing is re-issued.
    h.run(&[Command::Collapse, Command::Expand]);
    assert_eq!(provider.calls(), 2);
    assert_eq!(
        h.outline(),
        vec![(0, "contoso".to_string()), (1, "web".to_string())]
    );
    assert_eq!(h.rows()[0].child_state, ChildState::Loaded);
    assert_eq!(h.dashboard.failed_listings(), 0);
}

/// SCENARIO: An empty listing is loaded, not an error
#[test]
fn scenario_empty_listing_is_loaded_and_empty() {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let provider = Arc::new(ScriptedProvider::new());
    let mut h = DashboardHarness::start(domain_with(roots, provider.clone()));

    h.run(&[Command::Expand]);
    let rows = h.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].child_state, ChildState::Loaded);
    assert!(rows[0].expanded);

    h.run(&[Command::Collapse, Command::Expand]);
    assert_eq!(provider.calls(), 1);
}

/// SCENARIO: Root listing fails (e.g. not logged in)
#[test]
fn scenario_root_failure_shows_error_row() {
    let roots = ScriptedRoots::failing("Please run 'az login' to setup account.");
    let mut h = DashboardHarness::start(domain_with(roots, Arc::new(ScriptedProvider::new())));

    let rows = h.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, NodeKind::Error);
    assert_eq!(rows[0].label, "Please run 'az login' to setup account.");
    assert_eq!(
        h.status_text().as_deref(),
        Some("Please run 'az login' to setup account.")
    );
}

/// SCENARIO: Navigating down the tree and back up with Collapse
#[test]
fn scenario_collapse_on_child_selects_parent() {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let provider = Arc::new(
        contoso_provider().respond("web", vec![pipeline(7, "ci"), pipeline(9, "nightly")]),
    );
    let mut h = DashboardHarness::start(domain_with(roots, provider));

    h.run(&[Command::Expand]);
    h.select("web");
    h.run(&[Command::Expand]);
    h.select("nightly");
    assert_eq!(h.dashboard.breadcrumb(), vec!["contoso", "web", "nightly"]);

    // Pipeline children were never requested, so Collapse moves to the parent.
    h.run(&[Command::Collapse]);
    assert_eq!(h.dashboard.breadcrumb(), vec!["contoso", "web"]);

    h.run(&[Command::Collapse]);
    assert_eq!(h.outline().len(), 4, "web subtree hidden");
    assert_eq!(h.dashboard.breadcrumb(), vec!["contoso", "web"]);
}

/// SCENARIO: Enter on a leaf shows its details
#[test]
fn scenario_activate_leaf_shows_details() {
    let roots = ScriptedRoots::ok(vec![resource_group("rg-app")]);
    let provider = Arc::new(ScriptedProvider::new().respond("rg-app", vec![vm("rg-app", "vm1")]));
    let mut h = DashboardHarness::start(domain_with(roots, provider));

    h.run(&[Command::Activate]);
    assert_eq!(h.outline().len(), 2, "Enter expands an expandable node");

    h.select("vm1");
    h.run(&[Command::Activate]);
    assert_eq!(
        h.status_text().as_deref(),
        Some("virtual_machine: vm1 · VM running")
    );
}
