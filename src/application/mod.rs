//! Application Layer
//!
//! Orchestrates the domain core against the outside world:
//! - Depends on the Domain layer (navigator, router, ports)
//! - Does NOT contain tree rules (those are in Domain)
//! - Owns the background worker and the message drain
//!
//! ## Components
//!
//! - `Dashboard` - Applies commands, drains worker events, exposes render input
//! - `Worker` - Runs provider/executor calls off the UI loop with timeouts
//! - `BrowseDomain` - Providers, actions and defaults for one screen

pub mod dashboard;
pub mod registry;
pub mod worker;

pub use dashboard::{start, Command, Dashboard, StatusLine, Tone};
pub use registry::{BrowseDomain, ProviderRegistry};
pub use worker::{ActionCompletion, Worker, WorkerEvent};
