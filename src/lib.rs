//! Cloudscope - terminal dashboard for Azure resources
//!
//! Cloudscope presents Azure DevOps pipelines, resource groups, storage
//! accounts and Log Analytics workspaces as a lazily loaded tree. Children
//! are fetched in the background the first time a node is expanded, and
//! per-kind actions (start a VM, queue a pipeline run, download a blob) are
//! dispatched from the selected row.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod ui;

// Re-exports for convenience
pub use application::{Command, Dashboard};
pub use config::Config;
pub use domain::{Navigator, NodeKind, NodeSpec};
pub use error::{CloudscopeError, CloudscopeResult};
pub use infrastructure::{build_domain, Domain};
