//! Staged diff collection, chunking and committing.

pub mod chunk;
pub mod diff;
pub mod message;

pub use chunk::{DEFAULT_MAX_CHUNK_CHARS, DiffChunk, chunk_diff};
pub use diff::{FileDiff, collect_staged_diff};
pub use message::commit_staged;
