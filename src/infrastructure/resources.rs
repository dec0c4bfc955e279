//! Resource group browse domain
//!
//! Resource groups at the root, their resources below. Resources are tagged
//! by exact Azure resource type; anything unrecognised stays a plain
//! `Resource` leaf.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    ActionError, ActionExecutor, ActionOutput, ActionRequest, LoadError, NodeKind, NodeRef,
    NodeSpec, Payload, ResourceProvider, RootSource,
};

use super::az::AzCli;

const TYPE_KINDS: &[(&str, NodeKind)] = &[
    ("Microsoft.Compute/virtualMachines", NodeKind::VirtualMachine),
    ("Microsoft.ContainerService/managedClusters", NodeKind::Cluster),
    ("Microsoft.Storage/storageAccounts", NodeKind::StorageAccount),
    ("Microsoft.OperationalInsights/workspaces", NodeKind::Workspace),
];

/// Kind for an Azure resource type. ARM type names are case-insensitive,
/// so comparison ignores ASCII case but never matches on substrings.
pub fn kind_for_type(resource_type: &str) -> NodeKind {
    TYPE_KINDS
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(resource_type))
        .map(|(_, kind)| *kind)
        .unwrap_or(NodeKind::Resource)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Group {
    name: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    properties: Option<GroupProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupProperties {
    #[serde(default)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ArmResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub resource_group: Option<String>,
}

impl ArmResource {
    pub(crate) fn into_spec(self, fallback_group: &str) -> NodeSpec {
        let kind = kind_for_type(&self.resource_type);
        let status = match kind {
            NodeKind::Resource => short_type(&self.resource_type).to_string(),
            _ => self.location.unwrap_or_default(),
        };
        let resource_group = self
            .resource_group
            .unwrap_or_else(|| fallback_group.to_string());
        NodeSpec::new(kind, self.id.clone(), self.name)
            .with_status(status)
            .with_payload(Payload::Arm {
                resource_id: self.id,
                resource_group,
                resource_type: self.resource_type,
            })
    }
}

fn short_type(resource_type: &str) -> &str {
    resource_type.rsplit('/').next().unwrap_or(resource_type)
}

/// Every resource group in the subscription, sorted by name.
pub struct ResourceGroupRoots {
    az: Arc<AzCli>,
}

impl ResourceGroupRoots {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl RootSource for ResourceGroupRoots {
    async fn roots(&self) -> Result<Vec<NodeSpec>, LoadError> {
        let groups: Vec<Group> = self.az.json(&["group", "list"]).await?;
        let mut roots: Vec<NodeSpec> = groups
            .into_iter()
            .map(|g| {
                let state = g
                    .properties
                    .and_then(|p| p.provisioning_state)
                    .filter(|s| s != "Succeeded");
                NodeSpec::new(NodeKind::ResourceGroup, g.name.clone(), g.name)
                    .with_status(state.or(g.location).unwrap_or_default())
            })
            .collect();
        roots.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        Ok(roots)
    }
}

/// Resources inside one group.
pub struct ResourceListProvider {
    az: Arc<AzCli>,
}

impl ResourceListProvider {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ResourceProvider for ResourceListProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        let group = parent.id.as_str();
        let resources: Vec<ArmResource> = self
            .az
            .json(&["resource", "list", "--resource-group", group])
            .await?;
        let mut specs: Vec<NodeSpec> = resources.into_iter().map(|r| r.into_spec(group)).collect();
        specs.sort_by(|a, b| {
            (a.kind, a.label.to_lowercase()).cmp(&(b.kind, b.label.to_lowercase()))
        });
        Ok(specs)
    }
}

/// A name-and-group ARM command such as `az vm start`.
pub struct ArmCommand {
    az: Arc<AzCli>,
    command: &'static [&'static str],
    done: &'static str,
    no_wait: bool,
    extra: &'static [&'static str],
}

impl ArmCommand {
    pub fn new(az: Arc<AzCli>, command: &'static [&'static str], done: &'static str) -> Self {
        Self {
            az,
            command,
            done,
            no_wait: false,
            extra: &[],
        }
    }

    /// Return as soon as Azure accepts the request.
    pub fn no_wait(mut self) -> Self {
        self.no_wait = true;
        self
    }

    pub fn with_args(mut self, extra: &'static [&'static str]) -> Self {
        self.extra = extra;
        self
    }

    fn args<'a>(&self, name: &'a str, group: &'a str) -> Vec<&'a str> {
        let mut args: Vec<&str> = self.command.to_vec();
        args.extend(["--resource-group", group, "--name", name]);
        args.extend(self.extra);
        if self.no_wait {
            args.push("--no-wait");
        }
        args
    }
}

#[async_trait]
impl ActionExecutor for ArmCommand {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let group = request
            .resource_group
            .as_deref()
            .ok_or_else(|| ActionError::MissingResourceGroup(request.target.label.clone()))?;
        let name = request.target.label.as_str();
        let output = self.az.run(&self.args(name, group)).await?;
        Ok(ActionOutput::new(format!("{} {}", self.done, name)).with_output(output.trim()))
    }
}
