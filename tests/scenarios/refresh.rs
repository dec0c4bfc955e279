//! Scenario: Refreshing while work is in flight
//!
//! Journey: A user expands a slow organization and hits refresh before the
//! listing comes back. Later, a listing exceeds its time budget.
//!
//! Success Criteria:
//! - Results issued before a refresh never land in the new tree
//! - A timed-out listing becomes an error row like any other failure

use std::sync::Arc;
use std::time::Duration;

use cloudscope::application::Command;
use cloudscope::config::TimeoutsConfig;
use cloudscope::domain::{ChildState, NodeKind};

use crate::common::*;

/// SCENARIO: Refresh discards a listing that was still loading
#[test]
fn scenario_refresh_discards_stale_listing() {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_delay(Duration::from_millis(300))
            .respond("contoso", vec![project("web"), project("infra")]),
    );
    let mut h = DashboardHarness::start(domain_with(roots.clone(), provider.clone()));

    h.dashboard.handle(Command::Expand);
    assert_eq!(h.rows()[0].child_state, ChildState::Loading);
    assert!(h.dashboard.is_busy());

    h.dashboard.handle(Command::Refresh);
    assert!(h.dashboard.wait_idle(WAIT));

    assert_eq!(roots.calls(), 2);
    assert_eq!(provider.calls(), 1);
    let rows = h.rows();
    assert_eq!(rows.len(), 1, "stale children must not be attached");
    assert_eq!(rows[0].label, "contoso");
    assert_eq!(rows[0].child_state, ChildState::NotLoaded);
    assert!(!rows[0].expanded);
}

/// SCENARIO: Refresh drops cached children and starts from the top
#[test]
fn scenario_refresh_resets_tree_and_selection() {
    let roots = ScriptedRoots::ok(vec![org("contoso"), org("fabrikam")]);
    let provider = Arc::new(ScriptedProvider::new().respond("contoso", vec![project("web")]));
    let mut h = DashboardHarness::start(domain_with(roots, provider.clone()));

    h.run(&[Command::Expand, Command::Last]);
    assert_eq!(h.dashboard.breadcrumb(), vec!["fabrikam"]);

    h.run(&[Command::Refresh]);
    assert_eq!(h.outline().len(), 2);
    assert_eq!(h.dashboard.navigator().selected_index(), 0);

    h.run(&[Command::Expand]);
    assert_eq!(provider.calls(), 2, "children are fetched again after refresh");
}

/// SCENARIO: A listing that outlives its budget becomes an error row
#[test]
fn scenario_slow_listing_times_out() {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_delay(Duration::from_secs(5))
            .respond("contoso", vec![project("web")]),
    );
    let timeouts = TimeoutsConfig {
        load_secs: 1,
        action_secs: 1,
    };
    let mut h = DashboardHarness::start_with(domain_with(roots, provider), timeouts);

    h.run(&[Command::Expand]);
    let rows = h.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].child_state, ChildState::Failed);
    assert_eq!(rows[1].kind, NodeKind::Error);
    assert_eq!(rows[1].label, "timed out after 1s");
}

/// SCENARIO: A kind with no registered provider fails inline
#[test]
fn scenario_missing_provider_reports_error_row() {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let domain = cloudscope::application::BrowseDomain::new(
        "Bare",
        cloudscope::application::ProviderRegistry::new(roots),
    );
    let mut h = DashboardHarness::start(domain);

    h.run(&[Command::Expand]);
    let rows = h.rows();
    assert_eq!(rows[1].label, "no provider for organization");
    assert!(!h.dashboard.is_busy());
}
