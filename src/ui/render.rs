//! Terminal rendering functions for the dashboard.
//!
//! Everything here renders to strings so it can be tested without a
//! terminal. Color is applied only when the caller says the terminal
//! supports it; widths are measured in terminal cells.

use crossterm::style::Stylize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::application::StatusLine;
use crate::domain::{ActionSpec, NodeKind, VisibleRow};
use crate::ui::theme::{self, colors, Glyphs};

/// Render options fixed for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub glyphs: Glyphs,
    pub color: bool,
    /// Terminal width in cells; 0 disables truncation.
    pub width: usize,
}

/// Cut `text` to at most `max` cells, ending in `…` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Render a single tree row: cursor, indent, marker and label on the left,
/// kind tag, status and last activity on the right.
pub fn render_row(row: &VisibleRow, style: &Style) -> String {
    let cursor = if row.selected { style.glyphs.cursor() } else { " " };
    let marker = style
        .glyphs
        .marker(row.kind, row.child_state, row.expanded, row.expandable);
    let indent = "  ".repeat(row.depth);
    let left = format!("{cursor} {indent}{marker} {}", row.label);

    let detail = [
        theme::kind_tag(row.kind),
        row.status_text.as_str(),
        row.last_activity_text.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("  ");

    let (left, detail, gap) = fit(left, detail, style.width);

    if !style.color {
        return format!("{left}{}{detail}", " ".repeat(gap));
    }

    let left = match (row.kind, row.selected) {
        (NodeKind::Error, _) => format!("{}", left.as_str().with(colors::ERROR)),
        (_, true) => format!("{}", left.as_str().bold()),
        _ => left,
    };
    let detail = if detail.is_empty() {
        detail
    } else {
        format!("{}", detail.as_str().with(theme::status_color(&row.status_text)))
    };
    format!("{left}{}{detail}", " ".repeat(gap))
}

/// Lay out `left` and a right-aligned `detail` inside `width` cells.
/// The detail is dropped before the label is truncated.
fn fit(left: String, detail: String, width: usize) -> (String, String, usize) {
    let min_gap = 2;
    if width == 0 {
        let gap = if detail.is_empty() { 0 } else { min_gap };
        return (left, detail, gap);
    }
    let (lw, dw) = (left.width(), detail.width());
    if detail.is_empty() {
        return (truncate(&left, width), detail, 0);
    }
    if lw + min_gap + dw <= width {
        return (left, detail, width - lw - dw);
    }
    if dw + min_gap < width / 2 {
        let left = truncate(&left, width - dw - min_gap);
        let gap = width - left.width() - dw;
        return (left, detail, gap);
    }
    (truncate(&left, width), String::new(), 0)
}

/// Title line with the selected node's breadcrumb and a count of failed
/// listings.
pub fn render_header(
    title: &str,
    breadcrumb: &[String],
    failed: usize,
    busy: bool,
    style: &Style,
) -> String {
    let mut text = title.to_string();
    for part in breadcrumb {
        text.push_str(style.glyphs.breadcrumb());
        text.push_str(part);
    }
    if failed > 0 {
        text.push_str(&format!("  ({failed} failed)"));
    }
    if busy {
        text.push_str(if style.color { "  …" } else { "  ..." });
    }
    let text = if style.width > 0 {
        truncate(&text, style.width)
    } else {
        text
    };
    if style.color {
        format!("{}", text.as_str().with(colors::INFO).bold())
    } else {
        text
    }
}

pub fn render_separator(style: &Style) -> String {
    let line = style.glyphs.separator().repeat(style.width.clamp(1, 200));
    if style.color {
        format!("{}", line.as_str().with(colors::DIM))
    } else {
        line
    }
}

/// Latest status text; empty when there is nothing to report.
pub fn render_status(status: Option<&StatusLine>, style: &Style) -> String {
    let Some(status) = status else {
        return String::new();
    };
    let text = if style.width > 0 {
        truncate(&status.text, style.width)
    } else {
        status.text.clone()
    };
    if style.color {
        format!("{}", text.as_str().with(theme::tone_color(status.tone)))
    } else {
        text
    }
}

/// Keyboard shortcuts, followed by the actions offered for the selection.
pub fn render_help_bar(actions: &[ActionSpec], style: &Style) -> String {
    let mut help = String::from("[↑↓] Move  [Space] Expand  [Enter] Open  [F5] Refresh  [q] Quit");
    if !style.glyphs.is_unicode() {
        help = help.replace("↑↓", "j/k");
    }
    for action in actions {
        help.push_str(&format!("  [{}] {}", action.key, action.name));
    }
    if style.width > 0 {
        truncate(&help, style.width)
    } else {
        help
    }
}
