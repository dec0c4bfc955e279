//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CloudscopeResult;

use super::loader::{self, ConfigWarning};

/// Terminal UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tree rows to show; 0 fits the terminal height
    #[serde(default)]
    pub max_rows: usize,

    #[serde(default = "default_true")]
    pub unicode: bool,

    #[serde(default)]
    pub color: ColorMode,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_rows: 0,
            unicode: true,
            color: ColorMode::default(),
        }
    }
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Budgets for background provider and executor calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_load_secs")]
    pub load_secs: u64,

    #[serde(default = "default_action_secs")]
    pub action_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            load_secs: default_load_secs(),
            action_secs: default_action_secs(),
        }
    }
}

impl TimeoutsConfig {
    pub fn load(&self) -> Duration {
        Duration::from_secs(self.load_secs.max(1))
    }

    pub fn action(&self) -> Duration {
        Duration::from_secs(self.action_secs.max(1))
    }
}

fn default_load_secs() -> u64 {
    30
}

fn default_action_secs() -> u64 {
    120
}

/// Azure CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_cli")]
    pub cli: String,

    #[serde(default)]
    pub subscription: Option<String>,

    /// Fallback resource group for actions on nodes that carry none
    #[serde(default)]
    pub resource_group: Option<String>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            cli: default_cli(),
            subscription: None,
            resource_group: None,
        }
    }
}

fn default_cli() -> String {
    "az".to_string()
}

/// Azure DevOps configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevopsConfig {
    /// Organization URLs, e.g. https://dev.azure.com/contoso
    #[serde(default)]
    pub organizations: Vec<String>,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// How many runs to list under a pipeline
    #[serde(default = "default_run_limit")]
    pub run_limit: u32,
}

impl Default for DevopsConfig {
    fn default() -> Self {
        Self {
            organizations: Vec::new(),
            default_branch: default_branch(),
            run_limit: default_run_limit(),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_run_limit() -> u32 {
    10
}

/// Storage browsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Log Analytics workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspacesConfig {
    #[serde(default)]
    pub default_query: Option<String>,

    #[serde(default = "default_timespan")]
    pub timespan: String,
}

impl Default for WorkspacesConfig {
    fn default() -> Self {
        Self {
            default_query: None,
            timespan: default_timespan(),
        }
    }
}

fn default_timespan() -> String {
    "PT1H".to_string()
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogConfig {
    /// Log file; logging is off when unset
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Filter directive, e.g. "debug" or "cloudscope=trace"
    #[serde(default)]
    pub level: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub devops: DevopsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub workspaces: WorkspacesConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> CloudscopeResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> CloudscopeResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from an explicit path, the user config, or defaults.
    pub fn resolve(explicit: Option<&Path>) -> CloudscopeResult<(Self, Vec<ConfigWarning>)> {
        loader::resolve(explicit)
    }

    /// Apply environment variable overrides (CLOUDSCOPE_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }
}
