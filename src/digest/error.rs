use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("No Git repositories found under {}", .0.display())]
    NoRepositories(PathBuf),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source error: {0}")]
    Source(String),
}
