//! Domain Ports
//!
//! Collaborator boundaries of the core. Concrete implementations shell out
//! to external CLIs and live in `infrastructure`; tests substitute fakes.

use async_trait::async_trait;

use super::action::{ActionError, ActionOutput, ActionRequest};
use super::loader::LoadError;
use super::node::{NodeRef, NodeSpec};

/// Lists the children of one expandable kind.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Children of `parent`, in display order.
    async fn children(&self, parent: &NodeRef) -> Result<Vec<NodeSpec>, LoadError>;
}

/// Lists the first level of a browse domain.
#[async_trait]
pub trait RootSource: Send + Sync {
    async fn roots(&self) -> Result<Vec<NodeSpec>, LoadError>;
}

/// Performs one action against one resource.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, request: &ActionRequest) -> Result<ActionOutput, ActionError>;
}
