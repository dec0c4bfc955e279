//! Configuration module for Cloudscope
//!
//! Resolution order:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (CLOUDSCOPE_*)
//! 3. Config file (`--config` or ~/.config/cloudscope/config.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{default_config_path, ConfigWarning};
pub use types::{
    AzureConfig, ColorMode, Config, DevopsConfig, LogConfig, StorageConfig, TimeoutsConfig,
    UiConfig, WorkspacesConfig,
};
