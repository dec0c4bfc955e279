//! Lazy Loader messages
//!
//! A load is issued as a [`LoadRequest`] when an unloaded node is expanded
//! and comes back as a [`LoadCompletion`]. Both carry the tree
//! [`Generation`] they were issued under; completions from an older
//! generation are discarded on arrival.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::node::{NodeId, NodeKind, NodeRef, NodeSpec};

/// Monotonic tree generation, bumped on every full refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Provider failure. Always non-fatal: it becomes a synthetic error child.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The external command ran and reported failure
    #[error("{0}")]
    CommandFailed(String),

    /// The external command could not be started
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    /// Output could not be decoded
    #[error("unexpected output: {0}")]
    Decode(String),

    /// The provider did not answer within the caller's budget
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// No provider is registered for the kind
    #[error("no provider for {0}")]
    NoProvider(NodeKind),
}

/// Ask a provider for the children of `node`.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub node: NodeId,
    pub generation: Generation,
    pub target: NodeRef,
}

/// Outcome of a [`LoadRequest`], delivered back to the UI loop.
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    pub node: NodeId,
    pub generation: Generation,
    pub result: Result<Vec<NodeSpec>, LoadError>,
}

impl LoadCompletion {
    pub fn for_request(request: &LoadRequest, result: Result<Vec<NodeSpec>, LoadError>) -> Self {
        Self {
            node: request.node,
            generation: request.generation,
            result,
        }
    }
}

/// What applying a completion did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadApplied {
    /// Children attached; carries how many
    Loaded(usize),
    /// Error child attached; carries the message
    Failed(String),
    /// Stale generation or vanished node: dropped without touching the tree
    Discarded,
}

/// Root listing for a refresh, tagged with the generation it belongs to.
#[derive(Debug, Clone)]
pub struct RootsCompletion {
    pub generation: Generation,
    pub result: Result<Vec<NodeSpec>, LoadError>,
}
