//! write-commit - A CLI tool that writes commit messages for staged changes.
//!
//! # Overview
//!
//! write-commit reads the staged diff, splits it into chunks when it is too
//! large for one request, asks the fabric CLI to describe each chunk
//! concurrently, and merges the results into a single commit message.

pub mod commit;
pub mod error;
pub mod fabric;
pub mod generate;
pub mod patterns;

// Re-export commonly used types
pub use commit::{DiffChunk, FileDiff};
pub use error::{CommitError, FabricError, PatternError};
pub use fabric::{CommandRunner, GenerationParameters, ProcessResult, ProcessRunner};
pub use generate::CommitMessageService;
pub use patterns::{InstallOutcome, PatternConfig};
