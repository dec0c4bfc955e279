//! Tree node entities
//!
//! A [`Node`] is one row of the navigable resource tree. Nodes live in the
//! [`NodeStore`](super::store::NodeStore) arena and refer to each other by
//! [`NodeId`], never by pointer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a node inside the store arena.
///
/// Ids are only meaningful for the generation of the store that issued
/// them; a refresh discards the whole arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Resource kind tag, resolved once when a node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Organization,
    Project,
    PipelineCategory,
    Pipeline,
    Run,
    ResourceGroup,
    VirtualMachine,
    Cluster,
    StorageAccount,
    Container,
    Blob,
    Workspace,
    Resource,
    Error,
}

impl NodeKind {
    /// Kinds that can have children fetched by a provider.
    pub fn is_expandable(self) -> bool {
        matches!(
            self,
            NodeKind::Organization
                | NodeKind::Project
                | NodeKind::PipelineCategory
                | NodeKind::Pipeline
                | NodeKind::ResourceGroup
                | NodeKind::StorageAccount
                | NodeKind::Container
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Organization => "organization",
            NodeKind::Project => "project",
            NodeKind::PipelineCategory => "pipeline_category",
            NodeKind::Pipeline => "pipeline",
            NodeKind::Run => "run",
            NodeKind::ResourceGroup => "resource_group",
            NodeKind::VirtualMachine => "virtual_machine",
            NodeKind::Cluster => "cluster",
            NodeKind::StorageAccount => "storage_account",
            NodeKind::Container => "container",
            NodeKind::Blob => "blob",
            NodeKind::Workspace => "workspace",
            NodeKind::Resource => "resource",
            NodeKind::Error => "error",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Children load state.
///
/// `Loaded` with no children means "fetched, genuinely empty" and is
/// distinct from `NotLoaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

/// Kind-specific data carried by a node. Opaque to the tree itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Organization {
        url: String,
    },
    Pipeline {
        pipeline_id: u64,
        folder: Option<String>,
    },
    Run {
        run_id: u64,
        source_branch: Option<String>,
        result: Option<String>,
    },
    /// An Azure Resource Manager resource.
    Arm {
        resource_id: String,
        resource_group: String,
        resource_type: String,
    },
    Blob {
        size: Option<u64>,
        content_type: Option<String>,
    },
    Workspace {
        customer_id: String,
        resource_group: String,
    },
}

impl Payload {
    /// Resource group recorded on the payload, if any.
    pub fn resource_group(&self) -> Option<&str> {
        match self {
            Payload::Arm { resource_group, .. } | Payload::Workspace { resource_group, .. } => {
                Some(resource_group.as_str())
            }
            _ => None,
        }
    }
}

/// A child description returned by a provider, before it is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub status_text: String,
    pub last_activity_text: String,
    pub payload: Payload,
}

impl NodeSpec {
    pub fn new(kind: NodeKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            status_text: String::new(),
            last_activity_text: String::new(),
            payload: Payload::None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status_text = status.into();
        self
    }

    pub fn with_last_activity(mut self, text: impl Into<String>) -> Self {
        self.last_activity_text = text.into();
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

/// Identity and context of a node, copied out of the store so background
/// work never touches the store itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub payload: Payload,
    /// Ancestors ordered from the parent up to the root.
    pub ancestors: Vec<Ancestor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub payload: Payload,
}

impl NodeRef {
    /// A context-free reference, mostly useful for roots and tests.
    pub fn detached(kind: NodeKind, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            payload: Payload::None,
            ancestors: Vec::new(),
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_ancestor(
        mut self,
        kind: NodeKind,
        id: impl Into<String>,
        payload: Payload,
    ) -> Self {
        let id = id.into();
        self.ancestors.push(Ancestor {
            label: id.clone(),
            id,
            kind,
            payload,
        });
        self
    }

    /// Nearest ancestor of `kind`.
    pub fn ancestor(&self, kind: NodeKind) -> Option<&Ancestor> {
        self.ancestors.iter().find(|a| a.kind == kind)
    }

    /// Resource group from the node's own payload or the nearest ancestor
    /// that records one.
    pub fn resource_group(&self) -> Option<&str> {
        self.payload.resource_group().or_else(|| {
            self.ancestors.iter().find_map(|a| match a.kind {
                NodeKind::ResourceGroup => Some(a.id.as_str()),
                _ => a.payload.resource_group(),
            })
        })
    }
}

/// A node attached to the store.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub status_text: String,
    pub last_activity_text: String,
    pub payload: Payload,
    pub(crate) expanded: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) depth: usize,
    pub(crate) child_state: ChildState,
}

impl Node {
    pub(crate) fn from_spec(spec: NodeSpec) -> Self {
        // Leaves never trigger a load: they start out as fetched-and-empty.
        let child_state = if spec.kind.is_expandable() {
            ChildState::NotLoaded
        } else {
            ChildState::Loaded
        };
        Self {
            id: spec.id,
            kind: spec.kind,
            label: spec.label,
            status_text: spec.status_text,
            last_activity_text: spec.last_activity_text,
            payload: spec.payload,
            expanded: false,
            parent: None,
            children: Vec::new(),
            depth: 0,
            child_state,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn child_state(&self) -> ChildState {
        self.child_state
    }

    /// Whether expanding this node could reveal anything.
    pub fn is_expandable(&self) -> bool {
        self.kind.is_expandable() || !self.children.is_empty()
    }
}
