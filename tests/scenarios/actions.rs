//! Scenario: Running actions from the tree
//!
//! Journey: A user selects a pipeline and queues a run, tries keys that do
//! nothing for the selected kind, and starts a VM whose resource group has
//! to come from configuration.
//!
//! Success Criteria:
//! - Unbound keys and missing parameters are rejected without I/O
//! - Results land in the status line, output in the output pane
//! - Results issued before a refresh are dropped

use std::sync::Arc;
use std::time::Duration;

use cloudscope::application::{BrowseDomain, Command, Tone};
use cloudscope::config::TimeoutsConfig;
use cloudscope::domain::{ActionRouter, ActionSpec, NodeKind, NodeSpec};

use crate::common::*;

const RUN: ActionSpec = ActionSpec::new("run_pipeline", 'r', "Run pipeline").requires(&["branch"]);
const START: ActionSpec = ActionSpec::new("start", 's', "Start VM").in_resource_group();

fn devops(spy: Arc<SpyExecutor>) -> BrowseDomain {
    let roots = ScriptedRoots::ok(vec![org("contoso")]);
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond("contoso", vec![project("web")])
            .respond("web", vec![pipeline(7, "ci")]),
    );
    let mut actions = ActionRouter::new();
    actions.register(NodeKind::Pipeline, RUN, spy);
    domain_with(roots, provider).with_actions(actions)
}

/// Expand down to the `ci` pipeline and select it.
fn open_pipeline(h: &mut DashboardHarness) {
    h.run(&[Command::Expand]);
    h.select("web");
    h.run(&[Command::Expand]);
    h.select("ci");
}

/// SCENARIO: A key with no action for the selected kind
#[test]
fn scenario_unbound_key_is_unsupported() {
    let spy = SpyExecutor::succeeding("queued");
    let mut h = DashboardHarness::start(devops(spy.clone()));
    open_pipeline(&mut h);

    h.run(&[Command::InvokeAction('z')]);
    assert_eq!(h.status_text().as_deref(), Some("unsupported action"));
    assert_eq!(h.dashboard.status().map(|s| s.tone), Some(Tone::Error));

    // 'r' is bound for pipelines only.
    h.select("web");
    h.run(&[Command::InvokeAction('r')]);
    assert_eq!(h.status_text().as_deref(), Some("unsupported action"));

    assert_eq!(spy.calls(), 0);
    assert!(!h.dashboard.is_busy());
}

/// SCENARIO: Queueing a run without a branch
#[test]
fn scenario_missing_parameter_is_rejected() {
    let spy = SpyExecutor::succeeding("queued");
    let mut h = DashboardHarness::start(devops(spy.clone()));
    open_pipeline(&mut h);

    assert_eq!(h.dashboard.available_actions(), &[RUN]);
    h.run(&[Command::InvokeAction('r')]);
    assert_eq!(
        h.status_text().as_deref(),
        Some("missing required parameter 'branch'")
    );
    assert_eq!(spy.calls(), 0);
}

/// SCENARIO: Queueing a run with the configured default branch
#[test]
fn scenario_action_succeeds_with_default_param() {
    let spy = SpyExecutor::with_output("Queued run 20240501.4", "id: 4711");
    let domain = devops(spy.clone()).with_default_param("branch", "main");
    let mut h = DashboardHarness::start(domain);
    open_pipeline(&mut h);

    h.dashboard.handle(Command::InvokeAction('r'));
    assert_eq!(h.status_text().as_deref(), Some("Run pipeline ci in web…"));
    assert!(h.dashboard.wait_idle(WAIT));

    assert_eq!(spy.calls(), 1);
    let status = h.dashboard.status().unwrap();
    assert_eq!(status.text, "Queued run 20240501.4");
    assert_eq!(status.tone, Tone::Success);
    assert_eq!(h.dashboard.output(), Some("id: 4711"));

    let request = spy.last_request().unwrap();
    assert_eq!(request.param("branch"), Some("main"));
    assert_eq!(request.target.label, "ci");
    assert_eq!(
        request
            .target
            .ancestor(NodeKind::Organization)
            .map(|a| a.id.as_str()),
        Some("contoso")
    );
}

/// SCENARIO: The executor reports failure
#[test]
fn scenario_action_failure_is_reported() {
    let spy = SpyExecutor::failing("TF401019: pipeline not found");
    let mut h = DashboardHarness::start(devops(spy.clone()).with_default_param("branch", "main"));
    open_pipeline(&mut h);

    h.run(&[Command::InvokeAction('r')]);
    let status = h.dashboard.status().unwrap();
    assert_eq!(status.text, "TF401019: pipeline not found");
    assert_eq!(status.tone, Tone::Error);
    assert_eq!(h.dashboard.output(), None);
}

/// SCENARIO: An action result that lands after a refresh is dropped
#[test]
fn scenario_action_result_after_refresh_is_dropped() {
    let spy = SpyExecutor::slow("queued", Duration::from_millis(300));
    let mut h = DashboardHarness::start(devops(spy.clone()).with_default_param("branch", "main"));
    open_pipeline(&mut h);

    h.dashboard.handle(Command::InvokeAction('r'));
    h.dashboard.handle(Command::Refresh);
    assert!(h.dashboard.wait_idle(WAIT));

    assert_eq!(spy.calls(), 1);
    assert_eq!(h.status_text(), None);
    assert_eq!(h.outline(), vec![(0, "contoso".to_string())]);
}

/// SCENARIO: An executor that outlives the action budget
#[test]
fn scenario_slow_action_times_out() {
    let spy = SpyExecutor::slow("queued", Duration::from_secs(3));
    let timeouts = TimeoutsConfig {
        load_secs: 1,
        action_secs: 1,
    };
    let domain = devops(spy.clone()).with_default_param("branch", "main");
    let mut h = DashboardHarness::start_with(domain, timeouts);
    open_pipeline(&mut h);

    h.run(&[Command::InvokeAction('r')]);
    assert_eq!(spy.calls(), 1);
    let status = h.dashboard.status().unwrap();
    assert_eq!(status.text, "timed out after 1s");
    assert_eq!(status.tone, Tone::Error);
    assert_eq!(h.dashboard.output(), None);
}

fn resources(
    spy: Arc<SpyExecutor>,
    roots: Vec<NodeSpec>,
    machines: Vec<NodeSpec>,
) -> BrowseDomain {
    let roots = ScriptedRoots::ok(roots);
    let provider = Arc::new(ScriptedProvider::new().respond("rg-app", machines));
    let mut actions = ActionRouter::new();
    actions.register(NodeKind::VirtualMachine, START, spy);
    domain_with(roots, provider).with_actions(actions)
}

/// SCENARIO: Resource group comes from the node's payload
#[test]
fn scenario_vm_action_uses_payload_resource_group() {
    let spy = SpyExecutor::succeeding("Started vm1");
    let mut h = DashboardHarness::start(resources(
        spy.clone(),
        vec![resource_group("rg-app")],
        vec![vm("rg-app", "vm1")],
    ));

    h.run(&[Command::Expand]);
    h.select("vm1");
    h.run(&[Command::InvokeAction('s')]);

    assert_eq!(h.status_text().as_deref(), Some("Started vm1"));
    let request = spy.last_request().unwrap();
    assert_eq!(request.resource_group.as_deref(), Some("rg-app"));
}

/// SCENARIO: Resource group comes from the enclosing group node
#[test]
fn scenario_vm_action_uses_ancestor_resource_group() {
    let spy = SpyExecutor::succeeding("Started");
    let bare = NodeSpec::new(NodeKind::VirtualMachine, "vm2", "vm2");
    let mut h = DashboardHarness::start(resources(
        spy.clone(),
        vec![resource_group("rg-batch")],
        vec![bare],
    ));

    h.run(&[Command::Expand]);
    h.select("vm2");
    h.run(&[Command::InvokeAction('s')]);
    assert_eq!(
        spy.last_request().unwrap().resource_group.as_deref(),
        Some("rg-batch")
    );
}

/// SCENARIO: No resource group anywhere, then a configured fallback
#[test]
fn scenario_vm_action_needs_resource_group() {
    let orphan = NodeSpec::new(NodeKind::VirtualMachine, "vm-orphan", "vm-orphan");

    let spy = SpyExecutor::succeeding("Started");
    let mut h = DashboardHarness::start(resources(spy.clone(), vec![orphan.clone()], Vec::new()));
    h.select("vm-orphan");
    h.run(&[Command::InvokeAction('s')]);
    assert_eq!(
        h.status_text().as_deref(),
        Some("no resource group for vm-orphan")
    );
    assert_eq!(spy.calls(), 0);

    let spy = SpyExecutor::succeeding("Started");
    let domain = resources(spy.clone(), vec![orphan], Vec::new())
        .with_fallback_resource_group(Some("rg-default".to_string()));
    let mut h = DashboardHarness::start(domain);
    h.select("vm-orphan");
    h.run(&[Command::InvokeAction('s')]);
    assert_eq!(spy.calls(), 1);
    assert_eq!(
        spy.last_request().unwrap().resource_group.as_deref(),
        Some("rg-default")
    );
}
