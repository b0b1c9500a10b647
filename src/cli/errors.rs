//! # CLI Errors

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file problems
    #[error("config error: {0}")]
    Config(String),

    /// Filesystem or network failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
