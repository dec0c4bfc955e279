//! Common test utilities for Cloudscope scenario tests.
//!
//! This module provides:
//! - `ScriptedRoots` / `ScriptedProvider`: fake listings with call counters
//! - `SpyExecutor`: records action invocations
//! - `DashboardHarness`: a started dashboard plus helpers to drive it

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use cloudscope::application::{BrowseDomain, Command, Dashboard, ProviderRegistry, Worker};
use cloudscope::config::TimeoutsConfig;
use cloudscope::domain::{
    ActionError, ActionExecutor, ActionOutput, ActionRequest, LoadError, NodeKind, NodeRef,
    NodeSpec, Payload, ResourceProvider, RootSource, VisibleRow,
};

/// Upper bound for waiting on the worker in tests.
pub const WAIT: Duration = Duration::from_secs(10);

type Listing = Result<Vec<NodeSpec>, LoadError>;

/// Root listing with a fixed answer.
pub struct ScriptedRoots {
    result: Listing,
    calls: AtomicUsize,
}

impl ScriptedRoots {
    pub fn ok(specs: Vec<NodeSpec>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(specs),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(LoadError::CommandFailed(message.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RootSource for ScriptedRoots {
    async fn roots(&self) -> Result<Vec<NodeSpec>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Child listings scripted per parent id.
///
/// Responses for a parent are consumed in order; the last one repeats.
/// Unscripted parents list no children.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<HashMap<String, VecDeque<Listing>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn respond(self, parent_id: &str, specs: Vec<NodeSpec>) -> Self {
        self.push(parent_id, Ok(specs))
    }

    pub fn fail(self, parent_id: &str, message: &str) -> Self {
        self.push(parent_id, Err(LoadError::CommandFailed(message.to_string())))
    }

    fn push(self, parent_id: &str, listing: Listing) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(parent_id.to_string())
            .or_default()
            .push_back(listing);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self, parent_id: &str) -> Listing {
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(parent_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| Ok(Vec::new())),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl ResourceProvider for ScriptedProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next(&parent.id)
    }
}

/// Executor that records every request it receives.
pub struct SpyExecutor {
    reply: Result<ActionOutput, ActionError>,
    delay: Duration,
    calls: AtomicUsize,
    last: Mutex<Option<ActionRequest>>,
}

impl SpyExecutor {
    pub fn succeeding(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(ActionOutput::new(message)),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn with_output(message: &str, output: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(ActionOutput::new(message).with_output(output)),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(ActionError::CommandFailed(message.to_string())),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    /// Succeeds after sleeping for `delay`.
    pub fn slow(message: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(ActionOutput::new(message)),
            delay,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ActionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionExecutor for SpyExecutor {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}

// Node builders

pub fn org(name: &str) -> NodeSpec {
    NodeSpec::new(NodeKind::Organization, name, name).with_payload(Payload::Organization {
        url: format!("https://dev.azure.com/{name}"),
    })
}

pub fn project(name: &str) -> NodeSpec {
    NodeSpec::new(NodeKind::Project, name, name)
}

pub fn pipeline(id: u64, name: &str) -> NodeSpec {
    NodeSpec::new(NodeKind::Pipeline, format!("pipeline-{id}"), name).with_payload(
        Payload::Pipeline {
            pipeline_id: id,
            folder: None,
        },
    )
}

pub fn resource_group(name: &str) -> NodeSpec {
    NodeSpec::new(NodeKind::ResourceGroup, name, name)
}

pub fn vm(group: &str, name: &str) -> NodeSpec {
    NodeSpec::new(NodeKind::VirtualMachine, format!("{group}/{name}"), name)
        .with_status("VM running")
        .with_payload(Payload::Arm {
            resource_id: format!(
                "/resourceGroups/{group}/providers/Microsoft.Compute/virtualMachines/{name}"
            ),
            resource_group: group.to_string(),
            resource_type: "Microsoft.Compute/virtualMachines".to_string(),
        })
}

/// Domain with one provider serving every expandable kind.
pub fn domain_with(roots: Arc<ScriptedRoots>, provider: Arc<ScriptedProvider>) -> BrowseDomain {
    let mut registry = ProviderRegistry::new(roots);
    for kind in [
        NodeKind::Organization,
        NodeKind::Project,
        NodeKind::PipelineCategory,
        NodeKind::Pipeline,
        NodeKind::ResourceGroup,
        NodeKind::StorageAccount,
        NodeKind::Container,
    ] {
        let provider: Arc<dyn ResourceProvider> = provider.clone();
        registry = registry.with_provider(kind, provider);
    }
    BrowseDomain::new("Test", registry)
}

/// A dashboard whose first root listing has landed.
pub struct DashboardHarness {
    pub dashboard: Dashboard,
}

impl DashboardHarness {
    pub fn start(domain: BrowseDomain) -> Self {
        Self::start_with(domain, TimeoutsConfig::default())
    }

    pub fn start_with(domain: BrowseDomain, timeouts: TimeoutsConfig) -> Self {
        let worker = Worker::new().expect("worker runtime");
        let mut dashboard = Dashboard::new(domain, worker, &timeouts);
        dashboard.refresh();
        assert!(dashboard.wait_idle(WAIT), "root listing did not finish");
        Self { dashboard }
    }

    /// Apply commands, then wait for any work they started.
    pub fn run(&mut self, commands: &[Command]) {
        for command in commands {
            self.dashboard.handle(*command);
        }
        assert!(self.dashboard.wait_idle(WAIT), "worker did not go idle");
    }

    pub fn rows(&mut self) -> Vec<VisibleRow> {
        self.dashboard.visible_rows(100)
    }

    /// `(depth, label)` for every visible row.
    pub fn outline(&mut self) -> Vec<(usize, String)> {
        self.rows()
            .into_iter()
            .map(|row| (row.depth, row.label))
            .collect()
    }

    pub fn status_text(&self) -> Option<String> {
        self.dashboard.status().map(|s| s.text.clone())
    }

    /// Move the selection to the first row labelled `label`.
    pub fn select(&mut self, label: &str) {
        self.dashboard.handle(Command::First);
        let rows = self.rows();
        let index = rows
            .iter()
            .position(|row| row.label == label)
            .unwrap_or_else(|| panic!("no row labelled {label}"));
        for _ in 0..index {
            self.dashboard.handle(Command::MoveDown);
        }
    }
}
