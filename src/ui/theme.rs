use crossterm::style::Color;

use crate::application::Tone;
use crate::domain::{ChildState, NodeKind};

/// Design tokens for the dashboard.
///
/// Design constraints:
/// - Only 5 semantic colors (`colors::*`)
/// - All icons must be sourced from this module
pub mod colors {
    use super::Color;

    /// #22C55E
    pub const SUCCESS: Color = Color::Green;
    /// #EF4444
    pub const ERROR: Color = Color::Red;
    /// #F59E0B
    pub const WARNING: Color = Color::Yellow;
    /// #06B6D4
    pub const INFO: Color = Color::Cyan;
    /// #6B7280
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const ERROR: &str = "✗";
    pub const LOADING: &str = "⟳";
    pub const CURSOR: &str = "›";
    pub const SEPARATOR: &str = "─";
    pub const BREADCRUMB: &str = " › ";

    // Tree expansion.
    pub const EXPAND: &str = "▼";
    pub const COLLAPSE: &str = "▶";
    pub const LEAF: &str = "·";
}

pub mod icons_ascii {
    pub const ERROR: &str = "!";
    pub const LOADING: &str = "~";
    pub const CURSOR: &str = ">";
    pub const SEPARATOR: &str = "-";
    pub const BREADCRUMB: &str = " > ";

    // Tree expansion.
    pub const EXPAND: &str = "v";
    pub const COLLAPSE: &str = ">";
    pub const LEAF: &str = "-";
}

/// Icon set chosen once from terminal capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    unicode: bool,
}

impl Glyphs {
    pub fn new(unicode: bool) -> Self {
        Self { unicode }
    }

    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    fn pick(&self, unicode: &'static str, ascii: &'static str) -> &'static str {
        if self.unicode {
            unicode
        } else {
            ascii
        }
    }

    pub fn cursor(&self) -> &'static str {
        self.pick(icons::CURSOR, icons_ascii::CURSOR)
    }

    pub fn separator(&self) -> &'static str {
        self.pick(icons::SEPARATOR, icons_ascii::SEPARATOR)
    }

    pub fn breadcrumb(&self) -> &'static str {
        self.pick(icons::BREADCRUMB, icons_ascii::BREADCRUMB)
    }

    /// Marker in front of a row: load state first, then expansion.
    pub fn marker(
        &self,
        kind: NodeKind,
        state: ChildState,
        expanded: bool,
        expandable: bool,
    ) -> &'static str {
        if kind == NodeKind::Error {
            return self.pick(icons::ERROR, icons_ascii::ERROR);
        }
        if !expandable {
            return self.pick(icons::LEAF, icons_ascii::LEAF);
        }
        match (state, expanded) {
            (ChildState::Loading, _) => self.pick(icons::LOADING, icons_ascii::LOADING),
            (_, true) => self.pick(icons::EXPAND, icons_ascii::EXPAND),
            (_, false) => self.pick(icons::COLLAPSE, icons_ascii::COLLAPSE),
        }
    }
}

/// Short tag shown after the label so mixed lists stay readable.
pub fn kind_tag(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Organization => "org",
        NodeKind::Project => "project",
        NodeKind::PipelineCategory => "",
        NodeKind::Pipeline => "pipeline",
        NodeKind::Run => "run",
        NodeKind::ResourceGroup => "rg",
        NodeKind::VirtualMachine => "vm",
        NodeKind::Cluster => "aks",
        NodeKind::StorageAccount => "storage",
        NodeKind::Container => "container",
        NodeKind::Blob => "",
        NodeKind::Workspace => "workspace",
        NodeKind::Resource => "",
        NodeKind::Error => "",
    }
}

/// Color for a status string reported by Azure.
pub fn status_color(status: &str) -> Color {
    match status.to_ascii_lowercase().as_str() {
        "succeeded" | "completed" | "running" | "wellformed" | "active" => colors::SUCCESS,
        "failed" | "canceled" | "cancelled" | "rejected" | "abandoned" => colors::ERROR,
        "inprogress" | "notstarted" | "queued" | "partiallysucceeded" | "updating" | "deleting" => {
            colors::WARNING
        }
        _ => colors::DIM,
    }
}

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Info => colors::INFO,
        Tone::Success => colors::SUCCESS,
        Tone::Error => colors::ERROR,
    }
}
