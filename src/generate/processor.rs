//! Single-chunk generation.

use crate::commit::DiffChunk;
use crate::error::FabricError;
use crate::fabric::{CommandRunner, FABRIC_COMMAND, GenerationParameters, build_arguments};

/// Run fabric once over `chunk` with `params` (including its pattern).
///
/// Returns the trimmed stdout, or `FabricError::GenerationFailed` carrying
/// stderr when fabric exits non-zero.
pub async fn process_chunk<R>(
    runner: &R,
    chunk: &DiffChunk,
    params: &GenerationParameters,
) -> Result<String, FabricError>
where
    R: CommandRunner + ?Sized,
{
    let arguments = build_arguments(params, &chunk.content);
    let result = runner.run(FABRIC_COMMAND, &arguments).await?;

    if !result.success() {
        return Err(FabricError::GenerationFailed {
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        });
    }

    Ok(result.stdout.trim().to_string())
}
