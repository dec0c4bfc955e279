//! Action Router
//!
//! Table keyed by exact `(NodeKind, action name)`. Validation is
//! synchronous and happens before any executor is touched; an unknown pair
//! or a missing parameter is answered locally with a failed
//! [`ActionResult`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::node::{NodeKind, NodeRef};
use super::ports::ActionExecutor;

/// Named string parameters for an action.
pub type ActionParams = BTreeMap<String, String>;

const UNSUPPORTED: &str = "unsupported action";

/// Uniform outcome of an action, shown as status text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    pub output: String,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output: output.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: String::new(),
        }
    }

    pub fn unsupported() -> Self {
        Self::failure(UNSUPPORTED)
    }
}

impl From<Result<ActionOutput, ActionError>> for ActionResult {
    fn from(result: Result<ActionOutput, ActionError>) -> Self {
        match result {
            Ok(out) => ActionResult::ok(out.message, out.output),
            Err(err) => ActionResult::failure(err.to_string()),
        }
    }
}

/// What an executor hands back on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    pub message: String,
    pub output: String,
}

impl ActionOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            output: String::new(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The external command ran and reported failure
    #[error("{0}")]
    CommandFailed(String),

    /// The external command could not be started
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    /// The executor did not answer within the caller's budget
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// A required parameter is absent or empty
    #[error("missing required parameter '{0}'")]
    MissingParam(String),

    /// The action needs a resource group and none could be resolved
    #[error("no resource group for {0}")]
    MissingResourceGroup(String),
}

/// Static description of an action offered for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: &'static str,
    pub key: char,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub needs_resource_group: bool,
}

impl ActionSpec {
    pub const fn new(name: &'static str, key: char, description: &'static str) -> Self {
        Self {
            name,
            key,
            description,
            required: &[],
            needs_resource_group: false,
        }
    }

    pub const fn requires(mut self, params: &'static [&'static str]) -> Self {
        self.required = params;
        self
    }

    pub const fn in_resource_group(mut self) -> Self {
        self.needs_resource_group = true;
        self
    }
}

/// Handler input: node identity, resource group and parameters.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub target: NodeRef,
    pub resource_group: Option<String>,
    pub params: ActionParams,
}

impl ActionRequest {
    pub fn new(target: NodeRef) -> Self {
        let resource_group = target.resource_group().map(str::to_string);
        Self {
            target,
            resource_group,
            params: ActionParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

struct Route {
    spec: ActionSpec,
    executor: Arc<dyn ActionExecutor>,
}

/// A validated action, ready to run off the UI loop.
pub struct PreparedAction {
    pub spec: ActionSpec,
    pub request: ActionRequest,
    executor: Arc<dyn ActionExecutor>,
}

impl std::fmt::Debug for PreparedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedAction")
            .field("spec", &self.spec)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl PreparedAction {
    pub async fn execute(self) -> Result<ActionOutput, ActionError> {
        self.executor.execute(&self.request).await
    }

    pub async fn run(self) -> ActionResult {
        self.execute().await.into()
    }
}

#[derive(Default)]
pub struct ActionRouter {
    routes: HashMap<(NodeKind, &'static str), Route>,
    offered: BTreeMap<NodeKind, Vec<ActionSpec>>,
}

impl ActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `executor` for `(kind, spec.name)`. Re-registering a pair
    /// replaces its executor and keeps its original position.
    pub fn register(
        &mut self,
        kind: NodeKind,
        spec: ActionSpec,
        executor: Arc<dyn ActionExecutor>,
    ) -> &mut Self {
        let offered = self.offered.entry(kind).or_default();
        match offered.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => offered.push(spec),
        }
        self.routes.insert((kind, spec.name), Route { spec, executor });
        self
    }

    /// Actions offered for `kind`, in registration order.
    pub fn available_actions(&self, kind: NodeKind) -> &[ActionSpec] {
        self.offered.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn action_for_key(&self, kind: NodeKind, key: char) -> Option<&ActionSpec> {
        self.available_actions(kind).iter().find(|s| s.key == key)
    }

    /// Validate an action without running it.
    pub fn prepare(
        &self,
        kind: NodeKind,
        action: &str,
        request: ActionRequest,
    ) -> Result<PreparedAction, ActionResult> {
        let Some(route) = self.routes.get(&(kind, action)) else {
            return Err(ActionResult::unsupported());
        };
        let spec = route.spec;

        if let Some(missing) = spec
            .required
            .iter()
            .find(|p| request.param(p).map(str::trim).unwrap_or("").is_empty())
        {
            return Err(ActionError::MissingParam((*missing).to_string()).into_result());
        }
        if spec.needs_resource_group
            && request.resource_group.as_deref().unwrap_or("").is_empty()
        {
            let label = request.target.label.clone();
            return Err(ActionError::MissingResourceGroup(label).into_result());
        }

        Ok(PreparedAction {
            spec,
            request,
            executor: Arc::clone(&route.executor),
        })
    }

    /// Validate and run in one step.
    pub async fn dispatch(
        &self,
        kind: NodeKind,
        action: &str,
        request: ActionRequest,
    ) -> ActionResult {
        match self.prepare(kind, action, request) {
            Ok(prepared) => prepared.run().await,
            Err(rejected) => rejected,
        }
    }
}

impl ActionError {
    fn into_result(self) -> ActionResult {
        ActionResult::failure(self.to_string())
    }
}
