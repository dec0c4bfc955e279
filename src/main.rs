//! Cloudscope CLI - terminal dashboard for Azure resources
//!
//! Usage: cloudscope [OPTIONS] <DOMAIN>
//!
//! Domains:
//!   devops      Organizations, projects, pipelines and runs
//!   resources   Resource groups and the resources in them
//!   storage     Storage accounts, containers and blobs
//!   workspaces  Log Analytics workspaces

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cloudscope::config::ConfigWarning;
use cloudscope::{application, logging, ui, Config};

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, warnings) =
        Config::resolve(cli.config.as_deref()).context("failed to load configuration")?;
    for warning in &warnings {
        print_config_warning(warning);
    }

    if let Some(path) = cli.log_file.as_ref().or(config.log.file.as_ref()) {
        let directive = logging::default_directive(cli.verbose, config.log.level.as_deref());
        logging::init(path, &directive)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
    }

    let caps = ui::detect_capabilities().require_tty()?.with_config(&config.ui);

    let domain = cloudscope::build_domain(cli.domain, &config);
    let mut dashboard =
        application::start(domain, &config.timeouts).context("failed to start dashboard")?;

    let options = ui::AppOptions {
        max_rows: cli.rows.unwrap_or(config.ui.max_rows),
        caps,
    };
    tracing::info!(domain = ?cli.domain, rows = options.max_rows, "starting dashboard");
    ui::run(&mut dashboard, options).context("terminal error")?;
    Ok(())
}

fn print_config_warning(warning: &ConfigWarning) {
    let location = match warning.line {
        Some(line) => format!("{}:{}", warning.file.display(), line),
        None => warning.file.display().to_string(),
    };
    eprintln!("warning: unknown config key '{}' in {}", warning.key, location);
    if let Some(suggestion) = &warning.suggestion {
        eprintln!("  did you mean '{}'?", suggestion);
    }
}
