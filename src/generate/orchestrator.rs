//! Concurrent per-chunk generation with order restoration.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::commit::DiffChunk;
use crate::error::FabricError;
use crate::fabric::{CommandRunner, GenerationParameters};

use super::processor::process_chunk;

/// Pattern used for every per-chunk call, regardless of the caller's pattern.
pub const CHUNK_PATTERN: &str = "write_commit_message_chunk";

/// Outcome of one chunk, tagged with its position in the input.
///
/// `message` is empty when the chunk failed or produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedChunkResult {
    pub index: usize,
    pub file_name: String,
    pub message: String,
}

/// Generate a message for every chunk concurrently and return the labelled
/// fragments in input order.
///
/// Each chunk runs in its own task. A failing chunk is logged and dropped; it
/// never cancels its siblings. Results are joined in completion order and put
/// back into input order by their index tag. Fails with
/// `FabricError::NoUsableChunks` when no chunk produced any text.
pub async fn combine_chunks<R>(
    runner: Arc<R>,
    chunks: &[DiffChunk],
    params: &GenerationParameters,
) -> Result<Vec<String>, FabricError>
where
    R: CommandRunner + ?Sized + 'static,
{
    let total = chunks.len();
    let chunk_params = params.with_pattern(CHUNK_PATTERN);

    debug!("Processing {} chunks in parallel...", total);

    let mut tasks = JoinSet::new();
    for (index, chunk) in chunks.iter().cloned().enumerate() {
        let runner = Arc::clone(&runner);
        let params = chunk_params.clone();

        tasks.spawn(async move {
            debug!("Processing chunk {}/{}: {}", index + 1, total, chunk.file_name);

            let message = match process_chunk(&*runner, &chunk, &params).await {
                Ok(message) => message,
                Err(e) => {
                    warn!("Chunk {} ({}) failed, skipping it: {}", index + 1, chunk.file_name, e);
                    String::new()
                }
            };

            IndexedChunkResult {
                index,
                file_name: chunk.file_name,
                message,
            }
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => warn!("Chunk task did not complete: {}", e),
        }
    }

    let fragments = ordered_fragments(results);
    if fragments.is_empty() {
        return Err(FabricError::NoUsableChunks);
    }

    Ok(fragments)
}

/// Sort by index and label every result that carries text.
fn ordered_fragments(mut results: Vec<IndexedChunkResult>) -> Vec<String> {
    results.sort_by_key(|r| r.index);
    results
        .iter()
        .filter(|r| !r.message.trim().is_empty())
        .map(format_fragment)
        .collect()
}

/// `Chunk <index+1> (<file>): <message>`
pub fn format_fragment(result: &IndexedChunkResult) -> String {
    format!(
        "Chunk {} ({}): {}",
        result.index + 1,
        result.file_name,
        result.message.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::ProcessResult;
    use crate::fabric::subprocess::MockCommandRunner;
    use crate::generate::testing::{Reply, ScriptedRunner, params};

    fn chunks(n: usize) -> Vec<DiffChunk> {
        (1..=n)
            .map(|i| DiffChunk::new(format!("f{i}.rs"), format!("+change {i}")))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_restored_when_completion_is_reversed() {
        // Later chunks finish first.
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("+change 1", Reply::ok("one").after(300))
                .reply("+change 2", Reply::ok("two").after(200))
                .reply("+change 3", Reply::ok("three").after(100)),
        );

        let fragments = combine_chunks(runner.clone(), &chunks(3), &params())
            .await
            .unwrap();

        let completion: Vec<String> = runner.completed().into_iter().map(|c| c.content).collect();
        assert_eq!(completion, vec!["+change 3", "+change 2", "+change 1"]);

        assert_eq!(
            fragments,
            vec![
                "Chunk 1 (f1.rs): one",
                "Chunk 2 (f2.rs): two",
                "Chunk 3 (f3.rs): three",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_run_concurrently() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("+change 1", Reply::ok("one").after(1_000))
                .reply("+change 2", Reply::ok("two").after(1_000))
                .reply("+change 3", Reply::ok("three").after(1_000)),
        );

        let start = tokio::time::Instant::now();
        combine_chunks(runner, &chunks(3), &params()).await.unwrap();
        assert!(start.elapsed() < std::time::Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_call_uses_chunk_pattern() {
        let runner = Arc::new(ScriptedRunner::new().otherwise(Reply::ok("msg")));

        combine_chunks(runner.clone(), &chunks(4), &params()).await.unwrap();

        let calls = runner.completed();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|c| c.pattern == CHUNK_PATTERN));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_chunk_is_dropped_without_affecting_siblings() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("+change 1", Reply::ok("one").after(50))
                .reply("+change 2", Reply::fail("boom"))
                .reply("+change 3", Reply::ok("three").after(100)),
        );

        let fragments = combine_chunks(runner.clone(), &chunks(3), &params())
            .await
            .unwrap();

        assert_eq!(runner.completed().len(), 3);
        assert_eq!(
            fragments,
            vec!["Chunk 1 (f1.rs): one", "Chunk 3 (f3.rs): three"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_whitespace_output_is_dropped() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("+change 1", Reply::ok("  \n\t\n"))
                .reply("+change 2", Reply::ok("\n two \n")),
        );

        let fragments = combine_chunks(runner, &chunks(2), &params()).await.unwrap();
        assert_eq!(fragments, vec!["Chunk 2 (f2.rs): two"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_chunks_failing_is_no_usable_chunks() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("+change 1", Reply::fail("a"))
                .reply("+change 2", Reply::ok("   ")),
        );

        let result = combine_chunks(runner, &chunks(2), &params()).await;
        assert!(matches!(result, Err(FabricError::NoUsableChunks)));
    }

    #[tokio::test]
    async fn test_runner_errors_are_absorbed_per_chunk() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|_, arguments| arguments.ends_with("\"+change 1\""))
            .returning(|_, _| {
                Err(FabricError::SpawnFailed(std::io::Error::from(
                    std::io::ErrorKind::PermissionDenied,
                )))
            });
        mock.expect_run()
            .withf(|_, arguments| arguments.ends_with("\"+change 2\""))
            .returning(|_, _| {
                Ok(ProcessResult {
                    exit_code: 0,
                    stdout: "two\n".to_string(),
                    stderr: String::new(),
                })
            });

        let fragments = combine_chunks(Arc::new(mock), &chunks(2), &params())
            .await
            .unwrap();
        assert_eq!(fragments, vec!["Chunk 2 (f2.rs): two"]);
    }

    #[test]
    fn test_ordered_fragments_sorts_and_filters() {
        let results = vec![
            IndexedChunkResult {
                index: 2,
                file_name: "c".to_string(),
                message: "third".to_string(),
            },
            IndexedChunkResult {
                index: 0,
                file_name: "a".to_string(),
                message: " first ".to_string(),
            },
            IndexedChunkResult {
                index: 1,
                file_name: "b".to_string(),
                message: String::new(),
            },
        ];

        assert_eq!(
            ordered_fragments(results),
            vec!["Chunk 1 (a): first", "Chunk 3 (c): third"]
        );
    }
}
