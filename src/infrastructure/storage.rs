//! Storage browse domain
//!
//! Storage account -> container -> blob. Data-plane calls use
//! `--auth-mode login` so no account keys are ever fetched.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::domain::{
    ActionError, ActionExecutor, ActionOutput, ActionRequest, LoadError, NodeKind, NodeRef,
    NodeSpec, Payload, ResourceProvider, RootSource,
};

use super::az::AzCli;
use super::resources::ArmResource;
use super::time::relative_text;

const BLOB_PAGE: &str = "500";

pub struct AccountRoots {
    az: Arc<AzCli>,
}

impl AccountRoots {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl RootSource for AccountRoots {
    async fn roots(&self) -> Result<Vec<NodeSpec>, LoadError> {
        let accounts: Vec<ArmResource> = self.az.json(&["storage", "account", "list"]).await?;
        let mut roots: Vec<NodeSpec> = accounts.into_iter().map(|a| a.into_spec("")).collect();
        roots.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        Ok(roots)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Container {
    name: String,
    #[serde(default)]
    properties: ContainerProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerProperties {
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    public_access: Option<String>,
}

/// Account name of a node at or below a storage account.
fn account_of(target: &NodeRef) -> Option<&str> {
    match target.kind {
        NodeKind::StorageAccount => Some(target.label.as_str()),
        _ => target
            .ancestor(NodeKind::StorageAccount)
            .map(|a| a.label.as_str()),
    }
}

fn container_of(target: &NodeRef) -> Option<&str> {
    match target.kind {
        NodeKind::Container => Some(target.label.as_str()),
        _ => target.ancestor(NodeKind::Container).map(|a| a.label.as_str()),
    }
}

fn missing(what: &str, target: &NodeRef) -> String {
    format!("no {what} above {}", target.label)
}

pub struct ContainerProvider {
    az: Arc<AzCli>,
}

impl ContainerProvider {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ResourceProvider for ContainerProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        let account = account_of(parent)
            .ok_or_else(|| LoadError::CommandFailed(missing("storage account", parent)))?;
        let containers: Vec<Container> = self
            .az
            .json(&[
                "storage", "container", "list", "--account-name", account, "--auth-mode", "login",
            ])
            .await?;
        let now = Utc::now();
        Ok(containers
            .into_iter()
            .map(|c| {
                let access = c.properties.public_access.unwrap_or_default();
                NodeSpec::new(NodeKind::Container, c.name.clone(), c.name)
                    .with_status(access)
                    .with_last_activity(relative_text(c.properties.last_modified.as_deref(), now))
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    name: String,
    #[serde(default)]
    properties: BlobProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobProperties {
    #[serde(default)]
    content_length: Option<u64>,
    #[serde(default)]
    content_settings: Option<ContentSettings>,
    #[serde(default)]
    last_modified: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentSettings {
    #[serde(default)]
    content_type: Option<String>,
}

pub struct BlobProvider {
    az: Arc<AzCli>,
}

impl BlobProvider {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ResourceProvider for BlobProvider {
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError> {
        let account = account_of(parent)
            .ok_or_else(|| LoadError::CommandFailed(missing("storage account", parent)))?;
        let blobs: Vec<Blob> = self
            .az
            .json(&[
                "storage", "blob", "list", "--account-name", account, "--container-name",
                parent.label.as_str(), "--num-results", BLOB_PAGE, "--auth-mode", "login",
            ])
            .await?;
        let now = Utc::now();
        Ok(blobs.into_iter().map(|b| blob_spec(b, now)).collect())
    }
}

fn blob_spec(blob: Blob, now: chrono::DateTime<Utc>) -> NodeSpec {
    let size = blob.properties.content_length;
    let content_type = blob
        .properties
        .content_settings
        .and_then(|s| s.content_type);
    NodeSpec::new(NodeKind::Blob, blob.name.clone(), blob.name)
        .with_status(size.map(human_size).unwrap_or_default())
        .with_last_activity(relative_text(blob.properties.last_modified.as_deref(), now))
        .with_payload(Payload::Blob { size, content_type })
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Account and container of a blob action, or a command failure.
fn blob_location(request: &ActionRequest) -> Result<(&str, &str), ActionError> {
    let target = &request.target;
    let account = account_of(target)
        .ok_or_else(|| ActionError::CommandFailed(missing("storage account", target)))?;
    let container = container_of(target)
        .ok_or_else(|| ActionError::CommandFailed(missing("container", target)))?;
    Ok((account, container))
}

/// Download a blob into the `destination` directory, keeping its file name.
pub struct DownloadBlob {
    az: Arc<AzCli>,
}

impl DownloadBlob {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ActionExecutor for DownloadBlob {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let (account, container) = blob_location(request)?;
        let destination = request
            .param("destination")
            .ok_or_else(|| ActionError::MissingParam("destination".to_string()))?;
        let name = request.target.label.as_str();
        let file = download_path(destination, name);
        let file_arg = file.to_string_lossy();

        self.az
            .run(&[
                "storage", "blob", "download", "--account-name", account, "--container-name",
                container, "--name", name, "--file", file_arg.as_ref(), "--auth-mode", "login",
            ])
            .await?;
        Ok(ActionOutput::new(format!("downloaded {name} to {}", file.display())))
    }
}

/// Blob names may contain `/`; only the last segment becomes the file name.
fn download_path(destination: &str, blob: &str) -> std::path::PathBuf {
    let file_name = blob.rsplit('/').find(|s| !s.is_empty()).unwrap_or(blob);
    Path::new(destination).join(file_name)
}

pub struct DeleteBlob {
    az: Arc<AzCli>,
}

impl DeleteBlob {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl ActionExecutor for DeleteBlob {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let (account, container) = blob_location(request)?;
        let name = request.target.label.as_str();
        self.az
            .run(&[
                "storage", "blob", "delete", "--account-name", account, "--container-name",
                container, "--name", name, "--auth-mode", "login",
            ])
            .await?;
        Ok(ActionOutput::new(format!("deleted {name}")))
    }
}
