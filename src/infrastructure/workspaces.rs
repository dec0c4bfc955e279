//! Log Analytics workspaces
//!
//! Workspaces are leaves; the interesting part is the `query` action, which
//! runs a KQL query and returns the rows as plain text.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{
    ActionError, ActionExecutor, ActionOutput, ActionRequest, LoadError, NodeKind, NodeSpec,
    Payload, RootSource,
};

use super::az::AzCli;

/// Rows shown in the output pane; the count in the message is exact.
const MAX_ROWS: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Workspace {
    id: String,
    name: String,
    customer_id: String,
    #[serde(default)]
    resource_group: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    retention_in_days: Option<u32>,
}

impl Workspace {
    fn into_spec(self) -> NodeSpec {
        let status = match (self.location, self.retention_in_days) {
            (Some(loc), Some(days)) => format!("{loc} · {days}d"),
            (Some(loc), None) => loc,
            (None, Some(days)) => format!("{days}d"),
            (None, None) => String::new(),
        };
        NodeSpec::new(NodeKind::Workspace, self.id, self.name)
            .with_status(status)
            .with_payload(Payload::Workspace {
                customer_id: self.customer_id,
                resource_group: self.resource_group.unwrap_or_default(),
            })
    }
}

pub struct WorkspaceRoots {
    az: Arc<AzCli>,
}

impl WorkspaceRoots {
    pub fn new(az: Arc<AzCli>) -> Self {
        Self { az }
    }
}

#[async_trait]
impl RootSource for WorkspaceRoots {
    async fn roots(&self) -> Result<Vec<NodeSpec>, LoadError> {
        let workspaces: Vec<Workspace> = self
            .az
            .json(&["monitor", "log-analytics", "workspace", "list"])
            .await?;
        let mut roots: Vec<NodeSpec> = workspaces.into_iter().map(Workspace::into_spec).collect();
        roots.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
        Ok(roots)
    }
}

/// Run the `query` parameter against a workspace.
pub struct QueryWorkspace {
    az: Arc<AzCli>,
    timespan: String,
}

impl QueryWorkspace {
    pub fn new(az: Arc<AzCli>, timespan: impl Into<String>) -> Self {
        Self {
            az,
            timespan: timespan.into(),
        }
    }

    /// Workspaces reached through the resource browser only know their ARM
    /// id; the query needs the customer id.
    async fn customer_id(&self, request: &ActionRequest) -> Result<String, ActionError> {
        match &request.target.payload {
            Payload::Workspace { customer_id, .. } => Ok(customer_id.clone()),
            Payload::Arm { resource_id, .. } => {
                let workspace: Workspace = self
                    .az
                    .json(&[
                        "monitor",
                        "log-analytics",
                        "workspace",
                        "show",
                        "--ids",
                        resource_id.as_str(),
                    ])
                    .await?;
                Ok(workspace.customer_id)
            }
            _ => Err(ActionError::CommandFailed(format!(
                "{} has no workspace id",
                request.target.label
            ))),
        }
    }
}

#[async_trait]
impl ActionExecutor for QueryWorkspace {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError> {
        let query = request
            .param("query")
            .ok_or_else(|| ActionError::MissingParam("query".to_string()))?;
        let timespan = request.param("timespan").unwrap_or(&self.timespan);
        let workspace = self.customer_id(request).await?;

        let rows: Vec<Map<String, Value>> = self
            .az
            .json(&[
                "monitor", "log-analytics", "query", "--workspace", workspace.as_str(),
                "--analytics-query", query, "--timespan", timespan,
            ])
            .await?;

        Ok(ActionOutput::new(format!("{} row(s) from {}", rows.len(), request.target.label))
            .with_output(format_rows(&rows, MAX_ROWS)))
    }
}

/// One line per row, columns tab-separated, with a header from the first row.
fn format_rows(rows: &[Map<String, Value>], limit: usize) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let columns: Vec<&String> = first.keys().filter(|k| k.as_str() != "TableName").collect();

    let mut lines = Vec::with_capacity(rows.len().min(limit) + 2);
    lines.push(columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join("\t"));
    for row in rows.iter().take(limit) {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| match row.get(c.as_str()) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        lines.push(cells.join("\t"));
    }
    if rows.len() > limit {
        lines.push(format!("… {} more", rows.len() - limit));
    }
    lines.join("\n")
}
