//! Commit message generation: per-chunk fan-out and synthesis.

pub mod orchestrator;
pub mod processor;
pub mod service;
pub mod synthesizer;

pub use orchestrator::{CHUNK_PATTERN, IndexedChunkResult, combine_chunks, format_fragment};
pub use processor::process_chunk;
pub use service::CommitMessageService;
pub use synthesizer::{fallback_message, synthesize};
