//! Azure DevOps browse domain
//!
//! Organization -> Project -> Build/Release -> Pipeline -> Run.
//! Organizations come from config; everything below is listed through the
//! `azure-devops` CLI extension.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::domain::{
    ActionError, ActionExecutor, ActionOutput, ActionRequest, LoadError, NodeKind, NodeRef,
    NodeSpec, Payload, ResourceProvider, RootSource,
};

use super::az::AzCli;
use super::time::relative_text;

pub const BUILD_CATEGORY: &str = "build";
pub const RELEASE_CATEGORY: &str = "release";

/// Organization, project and category above a node.
struct Scope<'a> {
    org: &'a str,
    project: &'a str,
    category: Option<&'a str>,
}

impl<'a> Scope<'a> {
    fn of(target: &'a NodeRef) -> Option<Self> {
        let org = organization_url(target)?;
        let project = match target.kind {
            NodeKind::Project => target.label.as_str(),
            _ => target.ancestor(NodeKind::Project)?.label.as_str(),
        };
        let category = match target.kind {
            NodeKind::PipelineCategory => Some(target.id.as_str()),
            _ => target.ancestor(NodeKind::PipelineCategory).map(|a| a.id.as_str()),
        };
        Some(Self {
            org,
            project,
            category,
        })
    }

    fn is_release(&self) -> bool {
        self.category == Some(RELEASE_CATEGORY)
    }
}

fn organization_url(target: &NodeRef) -> Option<&str> {
    let (id, payload) = if target.kind == NodeKind::Organization {
        (target.id.as_str(), &target.payload)
    } else {
        let org = target.ancestor(NodeKind::Organization)?;
        (org.id.as_str(), &org.payload)
    };
    match payload {
        Payload::Organization { url } => Some(url.as_str()),
        _ => Some(id),
    }
}

fn no_scope(target: &NodeRef) -> String {
    format!("no organization/project above {}", target.label)
}

/// Last non-empty path segment of an organization URL.
pub fn organization_name(url: &str) -> &str {
    url.trim_end_matches('/')
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(url)
}

// ---------------------------------------------------------------------------
// Roots and providers
// ---------------------------------------------------------------------------

/// Organizations listed in `[devops] organizations`.
pub struct OrganizationRoots {
    urls: Vec<String>,
}

impl OrganizationRoots {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }
}

#[async_trait]
impl RootSource for OrganizationRoots {
    async fn roots(&self) -> Result<Vec<NodeSpec>, LoadError> {
        if self.urls.is_empty() {
            return Err(LoadError::CommandFailed(
                "no organizations configured (set devops.organizations)".to_string(),
            ));
        }
        Ok(self
            .urls
            .iter()
            .map(|url| {
                NodeSpec::new(NodeKind::Organization, url.clone(), organization_name(url))
                    .with_payload(Payload::Organization { url: url.clone() })
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    #[serde(default)]
    value: Vec<Project>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Project {
    id: String,
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    last_update_time: Option<String>,
}

pub struct ProjectProvider {
    az: Arc<AzCli>,
}

impl ProjectProvider {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ResourceProvider for ProjectProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        let org = organization_url(parent).unwrap_or(parent.id.as_str());
        let list: ProjectList = self
            .az
            .json(&["devops", "project", "list", "--org", org])
            .await?;
        let now = Utc::now();
        let mut projects: Vec<NodeSpec> = list
            .value
            .into_iter()
            .map(|p| {
                NodeSpec::new(NodeKind::Project, p.id, p.name)
                    .with_status(p.state.unwrap_or_default())
                    .with_last_activity(relative_text(p.last_update_time.as_deref(), now))
            })
            .collect();
        projects.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        Ok(projects)
    }
}

/// Fixed Build/Release split under each project. No I/O.
pub struct CategoryProvider;

#[async_trait]
impl ResourceProvider for CategoryProvider {
    async fn children(&self, _parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        Ok(vec![
            NodeSpec::new(NodeKind::PipelineCategory, BUILD_CATEGORY, "Build"),
            NodeSpec::new(NodeKind::PipelineCategory, RELEASE_CATEGORY, "Release"),
        ])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Definition {
    id: u64,
    name: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    queue_status: Option<String>,
}

pub struct PipelineProvider {
    az: Arc<AzCli>,
}

impl PipelineProvider {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ResourceProvider for PipelineProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        let scope = Scope::of(parent).ok_or_else(|| LoadError::CommandFailed(no_scope(parent)))?;
        let base = ["--org", scope.org, "--project", scope.project];
        let definitions: Vec<Definition> = if scope.is_release() {
            let mut args = vec!["pipelines", "release", "definition", "list"];
            args.extend(base);
            self.az.json(&args).await?
        } else {
            let mut args = vec!["pipelines", "list"];
            args.extend(base);
            self.az.json(&args).await?
        };

        let mut pipelines: Vec<NodeSpec> = definitions
            .into_iter()
            .map(|d| {
                let folder = d.path.filter(|p| p != "\\");
                NodeSpec::new(NodeKind::Pipeline, d.id.to_string(), d.name)
                    .with_status(d.queue_status.unwrap_or_default())
                    .with_payload(Payload::Pipeline {
                        pipeline_id: d.id,
                        folder,
                    })
            })
            .collect();
        pipelines.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        Ok(pipelines)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildRun {
    id: u64,
    #[serde(default)]
    build_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    source_branch: Option<String>,
    #[serde(default)]
    queue_time: Option<String>,
    #[serde(default)]
    finish_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Release {
    id: u64,
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_on: Option<String>,
}

/// Latest runs of a pipeline, newest first.
pub struct RunProvider {
    az: Arc<AzCli>,
    limit: u32,
}

impl RunProvider {
    pub fn new(az: Arc<AzCli>, limit: u32) -> Self {
        Self {
            az,
            limit: limit.max(1),
        }
    }
}

#[async_trait]
impl ResourceProvider for RunProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        let scope = Scope::of(parent).ok_or_else(|| LoadError::CommandFailed(no_scope(parent)))?;
        let pipeline_id = match &parent.payload {
            Payload::Pipeline { pipeline_id, .. } => pipeline_id.to_string(),
            _ => parent.id.clone(),
        };
        let top = self.limit.to_string();
        let now = Utc::now();

        if scope.is_release() {
            let releases: Vec<Release> = self
                .az
                .json(&[
                    "pipelines",
                    "release",
                    "list",
                    "--definition-id",
                    pipeline_id.as_str(),
                    "--top",
                    top.as_str(),
                    "--org",
                    scope.org,
                    "--project",
                    scope.project,
                ])
                .await?;
            return Ok(releases
                .into_iter()
                .map(|r| {
                    NodeSpec::new(NodeKind::Run, r.id.to_string(), r.name)
                        .with_status(r.status.unwrap_or_default())
                        .with_last_activity(relative_text(r.created_on.as_deref(), now))
                        .with_payload(Payload::Run {
                            run_id: r.id,
                            source_branch: None,
                            result: None,
                        })
                })
                .collect());
        }

        let runs: Vec<BuildRun> = self
            .az
            .json(&[
                "pipelines",
                "runs",
                "list",
                "--pipeline-ids",
                pipeline_id.as_str(),
                "--top",
                top.as_str(),
                "--org",
                scope.org,
                "--project",
                scope.project,
            ])
            .await?;
        Ok(runs.into_iter().map(|r| build_run_spec(r, now)).collect())
    }
}

fn build_run_spec(run: BuildRun, now: chrono::DateTime<Utc>) -> NodeSpec {
    let branch = run
        .source_branch
        .map(|b| b.trim_start_matches("refs/heads/").to_string());
    let label = match (&run.build_number, &branch) {
        (Some(number), Some(branch)) => format!("{number} ({branch})"),
        (Some(number), None) => number.clone(),
        (None, _) => format!("Run {}", run.id),
    };
    // A finished run reports its result; otherwise show the live status.
    let status = run
        .result
        .clone()
        .filter(|r| !r.is_empty() && r != "none")
        .or(run.status)
        .unwrap_or_default();
    let last = run.finish_time.as_deref().or(run.queue_time.as_deref());
    NodeSpec::new(NodeKind::Run, run.id.to_string(), label)
        .with_status(status)
        .with_last_activity(relative_text(last, now))
        .with_payload(Payload::Run {
            run_id: run.id,
            source_branch: branch,
            result: run.result,
        })
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn action_scope(request: &ActionRequest) -> Result<Scope<'_>, ActionError> {
    Scope::of(&request.target).ok_or_else(|| ActionError::CommandFailed(no_scope(&request.target)))
}

fn run_id(target: &NodeRef) -> String {
    match &target.payload {
        Payload::Run { run_id, .. } => run_id.to_string(),
        _ => target.id.clone(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Queued {
    id: u64,
    #[serde(default)]
    build_number: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Queue a new run of a pipeline on the `branch` parameter.
pub struct RunPipeline {
    az: Arc<AzCli>,
}

impl RunPipeline {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ActionExecutor for RunPipeline {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let scope = action_scope(request)?;
        let branch = request
            .param("branch")
            .ok_or_else(|| ActionError::MissingParam("branch".to_string()))?;
        let id = match &request.target.payload {
            Payload::Pipeline { pipeline_id, .. } => pipeline_id.to_string(),
            _ => request.target.id.clone(),
        };
        let base = ["--org", scope.org, "--project", scope.project];

        let queued: Queued = if scope.is_release() {
            let mut args = vec!["pipelines", "release", "create", "--definition-id", id.as_str()];
            args.extend(base);
            self.az.json(&args).await?
        } else {
            let mut args = vec!["pipelines", "run", "--id", id.as_str(), "--branch", branch];
            args.extend(base);
            self.az.json(&args).await?
        };

        let name = queued
            .build_number
            .or(queued.name)
            .unwrap_or_else(|| queued.id.to_string());
        Ok(ActionOutput::new(format!(
            "queued {} for {}",
            name, request.target.label
        )))
    }
}

/// Cancel an in-progress build run.
pub struct CancelRun {
    az: Arc<AzCli>,
}

impl CancelRun {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ActionExecutor for CancelRun {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let scope = action_scope(request)?;
        if scope.is_release() {
            return Err(ActionError::CommandFailed(
                "releases cannot be cancelled from here".to_string(),
            ));
        }
        let id = run_id(&request.target);
        self.az
            .run(&[
                "pipelines", "build", "cancel", "--build-id", id.as_str(), "--org", scope.org,
                "--project", scope.project,
            ])
            .await?;
        Ok(ActionOutput::new(format!("cancelled run {id}")))
    }
}

#[derive(Debug, Deserialize)]
struct LogList {
    #[serde(default)]
    value: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogEntry {
    id: u64,
    #[serde(default)]
    line_count: Option<u64>,
    #[serde(default)]
    url: Option<String>,
}

/// List the log files of a build run.
pub struct RunLogs {
    az: Arc<AzCli>,
}

impl RunLogs {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ActionExecutor for RunLogs {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let scope = action_scope(request)?;
        let id = run_id(&request.target);
        let project = format!("project={}", scope.project);
        let build = format!("buildId={id}");
        let logs: LogList = self
            .az
            .json(&[
                "devops", "invoke", "--area", "build", "--resource", "logs",
                "--route-parameters", project.as_str(), build.as_str(), "--org", scope.org,
            ])
            .await?;

        let output = logs
            .value
            .iter()
            .map(|l| {
                format!(
                    "log {:>3}  {:>6} lines  {}",
                    l.id,
                    l.line_count.unwrap_or(0),
                    l.url.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let message = format!("{} log(s) for run {id}", logs.value.len());
        Ok(ActionOutput::new(message).with_output(output))
    }
}
