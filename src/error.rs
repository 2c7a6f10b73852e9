//! Errors the core reports to its caller.
//!
//! Recoverable problems (bad lines, unreadable files) never show up here; they
//! are counted in `schema::Diagnostics` instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("log directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("log path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("job name must not be empty")]
    EmptyJobName,

    #[error("path pattern for job '{0}' must not be empty")]
    EmptyPathPattern(String),

    #[error("invalid label name '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidLabel(String),

    #[error("label '{0}' is reserved and set automatically")]
    ReservedLabel(String),

    #[error("invalid collection config: {0}")]
    InvalidDocument(String),

    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
