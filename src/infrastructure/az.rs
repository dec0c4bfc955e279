//! Azure CLI runner
//!
//! Every provider and executor goes through [`AzCli`]: it builds the
//! argument list, runs `az` as a child process on the tokio runtime and
//! decodes JSON output. The child is killed if the calling task is dropped.

use std::process::Stdio;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::process::Command;

use crate::domain::{ActionError, LoadError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// The executable could not be started (not installed, not on PATH)
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    /// Non-zero exit; carries the first meaningful stderr line
    #[error("{0}")]
    Failed(String),

    /// Output was not the JSON we expected
    #[error("unexpected output: {0}")]
    Decode(String),
}

impl From<CliError> for LoadError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Spawn { program, message } => LoadError::Spawn { program, message },
            CliError::Failed(message) => LoadError::CommandFailed(message),
            CliError::Decode(message) => LoadError::Decode(message),
        }
    }
}

impl From<CliError> for ActionError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Spawn { program, message } => ActionError::Spawn { program, message },
            other => ActionError::CommandFailed(other.to_string()),
        }
    }
}

/// Command groups served by the azure-devops extension; they take `--org`
/// and reject `--subscription`.
const DEVOPS_GROUPS: &[&str] = &["devops", "pipelines", "repos", "boards"];

#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
    subscription: Option<String>,
}

impl AzCli {
    pub fn new(program: impl Into<String>, subscription: Option<String>) -> Self {
        Self {
            program: program.into(),
            subscription,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for `args`, with output and subscription flags.
    pub fn command_line(&self, args: &[&str]) -> Vec<String> {
        let mut line: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        line.extend(["--output".to_string(), "json".to_string()]);
        line.push("--only-show-errors".to_string());

        let is_devops = args.first().is_some_and(|g| DEVOPS_GROUPS.contains(g));
        if let Some(sub) = self.subscription.as_ref().filter(|_| !is_devops) {
            line.extend(["--subscription".to_string(), sub.clone()]);
        }
        line
    }

    /// Run and return stdout.
    pub async fn run(&self, args: &[&str]) -> Result<String, CliError> {
        let line = self.command_line(args);
        tracing::debug!(program = %self.program, args = ?line, "running az");

        let output = Command::new(&self.program)
            .args(&line)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CliError::Spawn {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = error_message(&stderr).unwrap_or_else(|| {
                format!("{} exited with {}", self.program, output.status)
            });
            return Err(CliError::Failed(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run and decode stdout as JSON.
    pub async fn json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, CliError> {
        let stdout = self.run(args).await?;
        decode(&stdout)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(stdout: &str) -> Result<T, CliError> {
    // Commands that print nothing on success decode as JSON null.
    let text = if stdout.trim().is_empty() { "null" } else { stdout };
    serde_json::from_str(text).map_err(|e| CliError::Decode(e.to_string()))
}

/// First meaningful stderr line, without az's `ERROR: ` prefix.
fn error_message(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("WARNING:"))
        .map(|l| l.strip_prefix("ERROR:").map(str::trim).unwrap_or(l).to_string())
}
