use std::path::PathBuf;

use clap::Parser;

use cloudscope::Domain;

/// Cloudscope - browse and operate on Azure resources from the terminal
#[derive(Parser, Debug)]
#[command(name = "cloudscope")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Keys: arrows/jk move, Space expands, Enter opens, F5 refreshes, q quits.")]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/cloudscope/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Tree rows to show (default: fit the terminal)
    #[arg(long)]
    pub rows: Option<usize>,

    /// What to browse
    #[arg(value_enum)]
    pub domain: Domain,
}
