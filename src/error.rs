//! Error types for write-commit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the fabric generation pipeline.
#[derive(Error, Debug)]
pub enum FabricError {
    #[error("fabric CLI not found. Install it from https://github.com/danielmiessler/fabric and run `fabric --setup`")]
    NotInstalled,

    #[error("Failed to spawn fabric process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to capture fabric output: {0}")]
    OutputCaptureFailed(#[source] std::io::Error),

    #[error("Could not split fabric arguments: {0}")]
    InvalidArguments(String),

    #[error("fabric command failed with exit code {code}: {stderr}")]
    GenerationFailed { code: i32, stderr: String },

    #[error("Failed to generate commit message from any chunk")]
    NoUsableChunks,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors from installing prompt patterns into the fabric pattern store.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Source pattern directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Could not locate the bundled patterns directory")]
    BundledPatternsMissing,

    #[error("Failed to copy pattern from {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while inspecting patterns: {0}")]
    Io(#[source] std::io::Error),
}

/// Errors from diff collection and commit operations.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No staged changes to commit. Stage files with `git add` first.")]
    NoChanges,

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}
