//! Dashboard
//!
//! The single-threaded owner of the tree. It turns [`Command`]s into
//! navigator mutations, hands loads and actions to the [`Worker`], and
//! merges worker events back in when the UI loop drains them.

use std::time::{Duration, Instant};

use crate::config::TimeoutsConfig;
use crate::domain::{
    ActionRequest, ActionResult, ActionSpec, LoadApplied, LoadRequest, Navigator, NodeKind,
    VisibleRow,
};
use crate::error::CloudscopeResult;

use super::registry::BrowseDomain;
use super::worker::{ActionCompletion, Worker, WorkerEvent};

/// Commands exposed to the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    First,
    Last,
    ToggleExpand,
    Expand,
    Collapse,
    Activate,
    InvokeAction(char),
    Refresh,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// Latest status text for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

impl From<&ActionResult> for StatusLine {
    fn from(result: &ActionResult) -> Self {
        let tone = if result.success { Tone::Success } else { Tone::Error };
        StatusLine::new(result.message.clone(), tone)
    }
}

/// Containers named in the status line while an action runs.
const SCOPE_KINDS: [NodeKind; 4] = [
    NodeKind::Project,
    NodeKind::ResourceGroup,
    NodeKind::StorageAccount,
    NodeKind::Organization,
];

pub struct Dashboard {
    navigator: Navigator,
    domain: BrowseDomain,
    worker: Worker,
    load_budget: Duration,
    action_budget: Duration,
    page_rows: usize,
    status: Option<StatusLine>,
    output: Option<String>,
}

impl Dashboard {
    pub fn new(domain: BrowseDomain, worker: Worker, timeouts: &TimeoutsConfig) -> Self {
        Self {
            navigator: Navigator::new(),
            domain,
            worker,
            load_budget: timeouts.load(),
            action_budget: timeouts.action(),
            page_rows: 10,
            status: None,
            output: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.domain.title
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Output of the last successful action, if it produced any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.worker.in_flight() > 0
    }

    /// Actions offered for the selected node.
    pub fn available_actions(&self) -> &[ActionSpec] {
        match self.navigator.selected_node() {
            Some(node) => self.domain.actions.available_actions(node.kind),
            None => &[],
        }
    }

    pub fn breadcrumb(&self) -> Vec<String> {
        self.navigator.breadcrumb()
    }

    /// Listings that ended in an error row, visible or not.
    pub fn failed_listings(&self) -> usize {
        self.navigator.failed_listings()
    }

    /// Rows for a viewport of `max_rows`; also sets the page size used by
    /// `PageUp`/`PageDown`.
    pub fn visible_rows(&mut self, max_rows: usize) -> Vec<VisibleRow> {
        self.page_rows = max_rows.max(1);
        self.navigator.visible_rows(max_rows)
    }

    /// Apply one command. Returns `true` when the host should quit.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::MoveUp => self.navigator.move_up(),
            Command::MoveDown => self.navigator.move_down(),
            Command::PageUp => self.navigator.page_up(self.page_rows),
            Command::PageDown => self.navigator.page_down(self.page_rows),
            Command::First => self.navigator.select_first(),
            Command::Last => self.navigator.select_last(),
            Command::ToggleExpand => {
                let request = self.navigator.toggle_expand();
                self.issue_load(request);
            }
            Command::Expand => {
                let request = self.navigator.expand();
                self.issue_load(request);
            }
            Command::Collapse => self.navigator.collapse(),
            Command::Activate => self.activate(),
            Command::InvokeAction(key) => self.invoke_action(key),
            Command::Refresh => self.refresh(),
            Command::Quit => return true,
        }
        false
    }

    /// Discard the forest and list roots again under a new generation.
    pub fn refresh(&mut self) {
        let generation = self.navigator.begin_refresh();
        tracing::info!(%generation, domain = %self.domain.title, "refreshing tree");
        self.status = Some(StatusLine::new("Loading…", Tone::Info));
        self.output = None;
        self.worker
            .spawn_roots(generation, self.domain.providers.roots(), self.load_budget);
    }

    /// Merge every event that has arrived. Never blocks.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.worker.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Block until no work is in flight or `timeout` elapses. Returns
    /// whether the worker went idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.worker.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(event) = self.worker.recv_timeout(remaining) {
                self.apply(event);
            }
        }
        true
    }

    fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Roots(completion) => {
                let generation = completion.generation;
                match self.navigator.apply_roots(completion) {
                    LoadApplied::Loaded(count) => {
                        tracing::info!(%generation, count, "roots loaded");
                        self.status = None;
                    }
                    LoadApplied::Failed(message) => {
                        tracing::warn!(%generation, error = %message, "root listing failed");
                        self.status = Some(StatusLine::new(message, Tone::Error));
                    }
                    LoadApplied::Discarded => {
                        tracing::debug!(%generation, "stale root listing discarded");
                    }
                }
            }
            WorkerEvent::Load(completion) => {
                let node = completion.node;
                let generation = completion.generation;
                match self.navigator.apply_load(completion) {
                    LoadApplied::Loaded(count) => {
                        tracing::debug!(%node, %generation, count, "children loaded");
                    }
                    LoadApplied::Failed(message) => {
                        tracing::warn!(%node, %generation, error = %message, "load failed");
                        self.status = Some(StatusLine::new(message, Tone::Error));
                    }
                    LoadApplied::Discarded => {
                        tracing::debug!(%node, %generation, "stale load discarded");
                    }
                }
            }
            WorkerEvent::Action(completion) => self.apply_action(completion),
        }
    }

    fn apply_action(&mut self, completion: ActionCompletion) {
        if completion.generation != self.navigator.generation() {
            tracing::debug!(action = completion.action, "stale action result discarded");
            return;
        }
        let result = completion.result;
        if result.success {
            tracing::info!(
                action = completion.action,
                target = %completion.target,
                "action succeeded"
            );
            self.output = Some(result.output.clone()).filter(|o| !o.trim().is_empty());
        } else {
            tracing::warn!(
                action = completion.action,
                target = %completion.target,
                error = %result.message,
                "action failed"
            );
        }
        self.status = Some(StatusLine::from(&result));
    }

    fn issue_load(&mut self, request: Option<LoadRequest>) {
        let Some(request) = request else { return };
        let provider = self.domain.providers.provider(request.target.kind);
        self.worker.spawn_load(request, provider, self.load_budget);
    }

    fn activate(&mut self) {
        let Some(node) = self.navigator.selected_node() else {
            return;
        };
        if node.is_expandable() {
            let request = self.navigator.toggle_expand();
            self.issue_load(request);
            return;
        }

        let mut parts = vec![format!("{}: {}", node.kind, node.label)];
        parts.extend(
            [&node.status_text, &node.last_activity_text]
                .into_iter()
                .filter(|s| !s.is_empty())
                .cloned(),
        );
        let tone = if node.kind == NodeKind::Error { Tone::Error } else { Tone::Info };
        self.status = Some(StatusLine::new(parts.join(" · "), tone));
    }

    /// Resolve `key` against the selected node's actions, validate, and
    /// hand the action to the worker. Rejections are reported synchronously.
    fn invoke_action(&mut self, key: char) {
        let Some(id) = self.navigator.selected_id() else {
            return;
        };
        let Some(target) = self.navigator.store().node_ref(id) else {
            return;
        };
        let kind = target.kind;

        let Some(spec) = self.domain.actions.action_for_key(kind, key).copied() else {
            tracing::debug!(%kind, %key, "no action bound to key");
            self.status = Some(StatusLine::from(&ActionResult::unsupported()));
            return;
        };

        let mut request = ActionRequest::new(target);
        if request.resource_group.is_none() {
            request.resource_group = self.domain.fallback_resource_group.clone();
        }
        for (name, value) in &self.domain.param_defaults {
            request
                .params
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }

        match self.domain.actions.prepare(kind, spec.name, request) {
            Ok(prepared) => {
                let mut text = format!("{} {}", spec.description, prepared.request.target.label);
                if let Some(scope) = self.navigator.scope(&SCOPE_KINDS) {
                    text.push_str(" in ");
                    text.push_str(&scope.label);
                }
                text.push('…');
                self.status = Some(StatusLine::new(text, Tone::Info));
                let generation = self.navigator.generation();
                self.worker.spawn_action(generation, prepared, self.action_budget);
            }
            Err(rejected) => {
                tracing::info!(
                    action = spec.name,
                    %kind,
                    reason = %rejected.message,
                    "action rejected"
                );
                self.status = Some(StatusLine::from(&rejected));
            }
        }
    }
}

/// Build a dashboard and start the first root listing.
pub fn start(domain: BrowseDomain, timeouts: &TimeoutsConfig) -> CloudscopeResult<Dashboard> {
    let worker = Worker::new()?;
    let mut dashboard = Dashboard::new(domain, worker, timeouts);
    dashboard.refresh();
    Ok(dashboard)
}
