//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CloudscopeError, CloudscopeResult};

use super::types::{ColorMode, Config};

/// Non-fatal configuration warning surfaced before the dashboard starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> CloudscopeResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| CloudscopeError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Explicit path (must exist), then the user config, then defaults.
/// Environment overrides are applied last.
pub fn resolve(explicit: Option<&Path>) -> CloudscopeResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match explicit {
        Some(path) if !path.exists() => {
            return Err(CloudscopeError::ConfigNotFound {
                path: path.to_path_buf(),
            })
        }
        Some(path) => load_with_warnings(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_with_warnings(&path)?,
            None => (Config::default(), Vec::new()),
        },
    };
    Ok((config.with_env_overrides(), warnings))
}

/// `$XDG_CONFIG_HOME/cloudscope/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("cloudscope").join("config.toml"))
}

/// Apply environment variable overrides (CLOUDSCOPE_* prefix)
pub fn with_env_overrides(mut config: Config, get_env: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(cli) = get_env("CLOUDSCOPE_AZ_CLI").filter(|v| !v.is_empty()) {
        config.azure.cli = cli;
    }

    if let Some(sub) = get_env("CLOUDSCOPE_SUBSCRIPTION").filter(|v| !v.is_empty()) {
        config.azure.subscription = Some(sub);
    }

    if let Some(rg) = get_env("CLOUDSCOPE_RESOURCE_GROUP").filter(|v| !v.is_empty()) {
        config.azure.resource_group = Some(rg);
    }

    // Comma-separated organization URLs replace the configured list
    if let Some(orgs) = get_env("CLOUDSCOPE_ORGANIZATIONS") {
        let parsed: Vec<String> = orgs
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !parsed.is_empty() {
            config.devops.organizations = parsed;
        }
    }

    if let Some(secs) = get_env("CLOUDSCOPE_LOAD_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.timeouts.load_secs = secs;
    }

    if let Some(secs) = get_env("CLOUDSCOPE_ACTION_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.timeouts.action_secs = secs;
    }

    if let Some(file) = get_env("CLOUDSCOPE_LOG_FILE").filter(|v| !v.is_empty()) {
        config.log.file = Some(PathBuf::from(file));
    }

    if get_env("NO_COLOR").is_some() {
        config.ui.color = ColorMode::Never;
    } else if let Some(color) = get_env("CLOUDSCOPE_COLOR") {
        config.ui.color = match color.to_lowercase().as_str() {
            "always" => ColorMode::Always,
            "never" => ColorMode::Never,
            _ => ColorMode::Auto,
        };
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "ui",
        "max_rows",
        "unicode",
        "color",
        "timeouts",
        "load_secs",
        "action_secs",
        "azure",
        "cli",
        "subscription",
        "resource_group",
        "devops",
        "organizations",
        "default_branch",
        "run_limit",
        "storage",
        "download_dir",
        "workspaces",
        "default_query",
        "timespan",
        "log",
        "file",
        "level",
    ];

    CANDIDATES
        .iter()
        .map(|c| (*c, levenshtein(unknown, c)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(c, _)| c.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
