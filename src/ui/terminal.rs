use is_terminal::IsTerminal;

use crate::config::{ColorMode, UiConfig};
use crate::error::{CloudscopeError, CloudscopeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub supports_color: bool,
    pub supports_unicode: bool,
    pub width: u16,
    pub height: u16,
}

impl TerminalCapabilities {
    /// Apply `[ui]` overrides on top of what was detected.
    pub fn with_config(mut self, ui: &UiConfig) -> Self {
        self.supports_color = match ui.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => self.supports_color,
        };
        self.supports_unicode = self.supports_unicode && ui.unicode;
        self
    }

    /// The dashboard draws in place, so stdout has to be a terminal.
    pub fn require_tty(self) -> CloudscopeResult<Self> {
        if self.is_tty {
            Ok(self)
        } else {
            Err(CloudscopeError::NotATerminal)
        }
    }
}

pub fn detect_capabilities() -> TerminalCapabilities {
    detect_capabilities_impl(
        |key| std::env::var(key).ok(),
        std::io::stdout().is_terminal(),
        crossterm::terminal::size().ok(),
    )
}

fn detect_capabilities_impl(
    get_env: impl Fn(&str) -> Option<String>,
    is_tty: bool,
    size: Option<(u16, u16)>,
) -> TerminalCapabilities {
    let term = get_env("TERM").unwrap_or_default();
    let term_is_dumb = term.eq_ignore_ascii_case("dumb");

    let no_color = get_env("NO_COLOR").is_some();

    let supports_color = is_tty && !term_is_dumb && !no_color;
    let supports_unicode = !term_is_dumb && unicode_locale(&get_env);

    let (width, height) = size.unwrap_or((80, 24));
    TerminalCapabilities {
        is_tty,
        supports_color,
        supports_unicode,
        width,
        height,
    }
}

fn unicode_locale(get_env: &impl Fn(&str) -> Option<String>) -> bool {
    const KEYS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG"];
    for k in KEYS {
        if let Some(val) = get_env(k).filter(|v| !v.is_empty()) {
            let v = val.to_lowercase();
            // The first locale variable that is set decides.
            return v.contains("utf-8") || v.contains("utf8");
        }
    }

    // Default to true on modern systems unless explicitly "dumb".
    true
}
