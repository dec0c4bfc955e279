//! Domain Layer
//!
//! The tree-state machine and action table, without I/O.
//!
//! ## Structure
//!
//! - `node` - Node entities, kind tags and payloads
//! - `store` - Arena-backed Node Store
//! - `viewport` - Flattener and scroll window
//! - `navigator` - Selection Controller and lazy-load state machine
//! - `loader` - Load request/completion messages and generations
//! - `action` - Action Router
//! - `ports` - Provider and executor traits implemented by infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the network or subprocesses
//! 2. **Single owner** - The store is mutated only by the UI loop
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod action;
pub mod loader;
pub mod navigator;
pub mod node;
pub mod ports;
pub mod store;
pub mod viewport;

pub use action::{
    ActionError, ActionOutput, ActionParams, ActionRequest, ActionResult, ActionRouter,
    ActionSpec, PreparedAction,
};
pub use loader::{Generation, LoadApplied, LoadCompletion, LoadError, LoadRequest, RootsCompletion};
pub use navigator::{Navigator, VisibleRow};
pub use node::{Ancestor, ChildState, Node, NodeId, NodeKind, NodeRef, NodeSpec, Payload};
pub use ports::{ActionExecutor, ResourceProvider, RootSource};
pub use store::{NodeStore, StoreError};
pub use viewport::{flatten_visible, visible_window};
