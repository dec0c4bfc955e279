//! Tracing setup
//!
//! The dashboard owns the terminal, so log output never goes to stdout or
//! stderr. With no log file configured, no subscriber is installed and
//! every `tracing` call is a no-op.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::CloudscopeResult;

/// Filter directive for `-v` count, unless `level` from config is given.
pub fn default_directive(verbose: u8, level: Option<&str>) -> String {
    if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
        return level.to_string();
    }
    match verbose {
        0 => "cloudscope=info,warn",
        1 => "cloudscope=debug,info",
        _ => "cloudscope=trace,debug",
    }
    .to_string()
}

/// Install a file subscriber. `RUST_LOG` wins over `directive`.
pub fn init(path: &Path, directive: &str) -> CloudscopeResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    // A second init (tests, embedding) keeps the first subscriber.
    if tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!(
            path = %path.display(),
            version = env!("CARGO_PKG_VERSION"),
            "logging initialized"
        );
    }
    Ok(())
}
