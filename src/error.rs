//! Error types for Cloudscope
//!
//! Uses `thiserror` for library errors. Load and action failures have their
//! own non-fatal types in the domain layer; this enum covers startup and
//! host concerns.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::StoreError;

/// Result type alias for Cloudscope operations
pub type CloudscopeResult<T> = Result<T, CloudscopeError>;

/// Main error type for Cloudscope operations
#[derive(Error, Debug)]
pub enum CloudscopeError {
    /// Config file is not valid TOML or has wrongly typed values
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Config file given explicitly does not exist
    #[error("config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Structural tree mutation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Background runtime could not be started
    #[error("failed to start background runtime: {0}")]
    Runtime(String),

    /// The dashboard needs an interactive terminal
    #[error("stdout is not a terminal; cloudscope needs an interactive terminal")]
    NotATerminal,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
