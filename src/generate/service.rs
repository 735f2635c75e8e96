//! Entry point for turning diff chunks into a commit message.

use std::sync::Arc;

use tracing::debug;

use crate::commit::DiffChunk;
use crate::error::FabricError;
use crate::fabric::{CommandRunner, GenerationParameters, ProcessRunner};

use super::orchestrator::combine_chunks;
use super::processor::process_chunk;
use super::synthesizer::synthesize;

/// Generates commit messages through a [`CommandRunner`].
pub struct CommitMessageService<R: ?Sized = ProcessRunner> {
    runner: Arc<R>,
}

impl CommitMessageService<ProcessRunner> {
    /// Service backed by the real fabric binary.
    pub fn with_fabric() -> Self {
        Self::new(Arc::new(ProcessRunner))
    }
}

impl<R> CommitMessageService<R>
where
    R: CommandRunner + ?Sized + 'static,
{
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Generate one commit message for `chunks`.
    ///
    /// A single chunk goes straight to fabric with `params.pattern` and its
    /// output is returned as is. Several chunks are generated concurrently
    /// with the chunk pattern, then merged with `params.pattern`.
    ///
    /// Parameters and chunk count are checked before any process starts.
    pub async fn generate(
        &self,
        chunks: &[DiffChunk],
        params: &GenerationParameters,
    ) -> Result<String, FabricError> {
        params.validate()?;

        match chunks {
            [] => Err(FabricError::InvalidInput(
                "no diff chunks to describe".to_string(),
            )),
            [single] => {
                debug!("Generating commit message from a single chunk");
                process_chunk(&*self.runner, single, params).await
            }
            _ => {
                let fragments = combine_chunks(Arc::clone(&self.runner), chunks, params).await?;
                synthesize(&*self.runner, &fragments, params).await
            }
        }
    }
}
