//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `az` - Azure CLI subprocess runner with JSON decoding
//! - `devops` - Organizations, projects, pipelines and runs
//! - `resources` - Resource groups and the resources inside them
//! - `storage` - Storage accounts, containers and blobs
//! - `workspaces` - Log Analytics workspaces and queries
//! - `time` - Relative "last activity" text

pub mod az;
pub mod devops;
pub mod resources;
pub mod storage;
pub mod time;
pub mod workspaces;

use std::sync::Arc;

use clap::ValueEnum;

use crate::application::{BrowseDomain, ProviderRegistry};
use crate::config::Config;
use crate::domain::{ActionRouter, ActionSpec, NodeKind};

pub use az::{AzCli, CliError};

pub const RUN_PIPELINE: ActionSpec =
    ActionSpec::new("run", 'r', "Queue run of").requires(&["branch"]);
pub const CANCEL_RUN: ActionSpec = ActionSpec::new("cancel", 'c', "Cancel run");
pub const RUN_LOGS: ActionSpec = ActionSpec::new("logs", 'o', "Fetch logs of run");

pub const VM_START: ActionSpec = ActionSpec::new("start", 's', "Start").in_resource_group();
pub const VM_STOP: ActionSpec = ActionSpec::new("stop", 'x', "Stop").in_resource_group();
pub const VM_RESTART: ActionSpec = ActionSpec::new("restart", 'r', "Restart").in_resource_group();

pub const CLUSTER_START: ActionSpec = ActionSpec::new("start", 's', "Start").in_resource_group();
pub const CLUSTER_STOP: ActionSpec = ActionSpec::new("stop", 'x', "Stop").in_resource_group();
pub const CLUSTER_CREDENTIALS: ActionSpec =
    ActionSpec::new("credentials", 'g', "Get credentials for").in_resource_group();

pub const BLOB_DOWNLOAD: ActionSpec =
    ActionSpec::new("download", 'd', "Download").requires(&["destination"]);
pub const BLOB_DELETE: ActionSpec = ActionSpec::new("delete", 'D', "Delete");

pub const WORKSPACE_QUERY: ActionSpec =
    ActionSpec::new("query", 'e', "Query").requires(&["query"]);

/// Which tree the dashboard browses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Domain {
    /// Azure DevOps organizations, projects, pipelines and runs
    Devops,
    /// Resource groups and their resources
    Resources,
    /// Storage accounts, containers and blobs
    Storage,
    /// Log Analytics workspaces
    Workspaces,
}

impl Domain {
    pub fn title(self) -> &'static str {
        match self {
            Domain::Devops => "Azure DevOps",
            Domain::Resources => "Resource groups",
            Domain::Storage => "Storage accounts",
            Domain::Workspaces => "Log Analytics workspaces",
        }
    }
}

/// Wire providers, executors and defaults for `domain` from `config`.
pub fn build_domain(domain: Domain, config: &Config) -> BrowseDomain {
    let az = Arc::new(AzCli::new(
        config.azure.cli.clone(),
        config.azure.subscription.clone(),
    ));

    let built = match domain {
        Domain::Devops => devops_domain(&az, config),
        Domain::Resources => resources_domain(&az, config),
        Domain::Storage => storage_domain(&az, config),
        Domain::Workspaces => workspaces_domain(&az, config),
    };
    built.with_fallback_resource_group(config.azure.resource_group.clone())
}

fn devops_domain(az: &Arc<AzCli>, config: &Config) -> BrowseDomain {
    let providers = ProviderRegistry::new(Arc::new(devops::OrganizationRoots::new(
        config.devops.organizations.clone(),
    )))
    .with_provider(NodeKind::Organization, Arc::new(devops::ProjectProvider::new(az.clone())))
    .with_provider(NodeKind::Project, Arc::new(devops::CategoryProvider))
    .with_provider(
        NodeKind::PipelineCategory,
        Arc::new(devops::PipelineProvider::new(az.clone())),
    )
    .with_provider(
        NodeKind::Pipeline,
        Arc::new(devops::RunProvider::new(az.clone(), config.devops.run_limit)),
    );

    let mut actions = ActionRouter::new();
    actions
        .register(NodeKind::Pipeline, RUN_PIPELINE, Arc::new(devops::RunPipeline::new(az.clone())))
        .register(NodeKind::Run, CANCEL_RUN, Arc::new(devops::CancelRun::new(az.clone())))
        .register(NodeKind::Run, RUN_LOGS, Arc::new(devops::RunLogs::new(az.clone())));

    BrowseDomain::new(Domain::Devops.title(), providers)
        .with_actions(actions)
        .with_default_param("branch", config.devops.default_branch.clone())
}

fn register_storage(
    registry: ProviderRegistry,
    actions: &mut ActionRouter,
    az: &Arc<AzCli>,
) -> ProviderRegistry {
    actions
        .register(NodeKind::Blob, BLOB_DOWNLOAD, Arc::new(storage::DownloadBlob::new(az.clone())))
        .register(NodeKind::Blob, BLOB_DELETE, Arc::new(storage::DeleteBlob::new(az.clone())));
    registry
        .with_provider(
            NodeKind::StorageAccount,
            Arc::new(storage::ContainerProvider::new(az.clone())),
        )
        .with_provider(NodeKind::Container, Arc::new(storage::BlobProvider::new(az.clone())))
}

fn register_query(actions: &mut ActionRouter, az: &Arc<AzCli>, config: &Config) {
    actions.register(
        NodeKind::Workspace,
        WORKSPACE_QUERY,
        Arc::new(workspaces::QueryWorkspace::new(
            az.clone(),
            config.workspaces.timespan.clone(),
        )),
    );
}

fn with_query_default(domain: BrowseDomain, config: &Config) -> BrowseDomain {
    match config.workspaces.default_query.clone() {
        Some(query) => domain.with_default_param("query", query),
        None => domain,
    }
}

fn download_dir(config: &Config) -> String {
    config.storage.download_dir.to_string_lossy().into_owned()
}

fn resources_domain(az: &Arc<AzCli>, config: &Config) -> BrowseDomain {
    let arm = |command: &'static [&'static str], done: &'static str| {
        resources::ArmCommand::new(az.clone(), command, done)
    };
    let mut actions = ActionRouter::new();
    actions
        .register(
            NodeKind::VirtualMachine,
            VM_START,
            Arc::new(arm(&["vm", "start"], "start requested for").no_wait()),
        )
        .register(
            NodeKind::VirtualMachine,
            VM_STOP,
            Arc::new(arm(&["vm", "stop"], "stop requested for").no_wait()),
        )
        .register(
            NodeKind::VirtualMachine,
            VM_RESTART,
            Arc::new(arm(&["vm", "restart"], "restart requested for").no_wait()),
        )
        .register(
            NodeKind::Cluster,
            CLUSTER_START,
            Arc::new(arm(&["aks", "start"], "start requested for").no_wait()),
        )
        .register(
            NodeKind::Cluster,
            CLUSTER_STOP,
            Arc::new(arm(&["aks", "stop"], "stop requested for").no_wait()),
        )
        .register(
            NodeKind::Cluster,
            CLUSTER_CREDENTIALS,
            Arc::new(
                arm(&["aks", "get-credentials"], "merged credentials for")
                    .with_args(&["--overwrite-existing"]),
            ),
        );
    register_query(&mut actions, az, config);

    let registry = ProviderRegistry::new(Arc::new(resources::ResourceGroupRoots::new(az.clone())))
        .with_provider(
            NodeKind::ResourceGroup,
            Arc::new(resources::ResourceListProvider::new(az.clone())),
        );
    let registry = register_storage(registry, &mut actions, az);

    let domain = BrowseDomain::new(Domain::Resources.title(), registry)
        .with_actions(actions)
        .with_default_param("destination", download_dir(config));
    with_query_default(domain, config)
}

fn storage_domain(az: &Arc<AzCli>, config: &Config) -> BrowseDomain {
    let mut actions = ActionRouter::new();
    let registry = register_storage(
        ProviderRegistry::new(Arc::new(storage::AccountRoots::new(az.clone()))),
        &mut actions,
        az,
    );
    BrowseDomain::new(Domain::Storage.title(), registry)
        .with_actions(actions)
        .with_default_param("destination", download_dir(config))
}

fn workspaces_domain(az: &Arc<AzCli>, config: &Config) -> BrowseDomain {
    let mut actions = ActionRouter::new();
    register_query(&mut actions, az, config);
    let registry = ProviderRegistry::new(Arc::new(workspaces::WorkspaceRoots::new(az.clone())));
    let domain = BrowseDomain::new(Domain::Workspaces.title(), registry).with_actions(actions);
    with_query_default(domain, config)
}
