//! Terminal UI
//!
//! - `theme` - Colors and icons, with ASCII fallbacks
//! - `render` - Rows, header, status and help bar as strings
//! - `input` - Key events to dashboard commands
//! - `terminal` - Capability detection
//! - `app` - The raw-mode event loop

pub mod app;
pub mod input;
pub mod render;
pub mod terminal;
pub mod theme;

pub use app::{run, AppOptions};
pub use terminal::{detect_capabilities, TerminalCapabilities};
