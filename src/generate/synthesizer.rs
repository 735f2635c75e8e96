//! Merging per-chunk fragments into one commit message.

use tracing::{debug, warn};

use crate::error::FabricError;
use crate::fabric::{CommandRunner, FABRIC_COMMAND, GenerationParameters, build_arguments};

/// Combine ordered fragments with one fabric call using `params.pattern`.
///
/// When the combine call fails, or returns nothing, the first fragment's
/// message stands in for the result. That recovery path cannot fail, so the
/// only error is an empty fragment list.
pub async fn synthesize<R>(
    runner: &R,
    fragments: &[String],
    params: &GenerationParameters,
) -> Result<String, FabricError>
where
    R: CommandRunner + ?Sized,
{
    let Some(first) = fragments.first() else {
        return Err(FabricError::InvalidInput("no fragments to combine".to_string()));
    };

    debug!("Combining {} chunk messages into final commit message...", fragments.len());

    let arguments = build_arguments(params, &fragments.join("\n\n"));
    match runner.run(FABRIC_COMMAND, &arguments).await {
        Ok(result) if result.success() => {
            let message = result.stdout.trim();
            if !message.is_empty() {
                return Ok(message.to_string());
            }
            warn!("Combine step returned no text, using first chunk as fallback");
        }
        Ok(result) => warn!(
            "Failed to combine messages (exit code {}: {}), using first chunk as fallback",
            result.exit_code,
            result.stderr.trim()
        ),
        Err(e) => warn!("Failed to combine messages ({}), using first chunk as fallback", e),
    }

    Ok(fallback_message(first))
}

/// Strip the `Chunk N (file): ` label from a fragment.
///
/// Everything after the first colon is kept; a fragment without a colon, or
/// with nothing after it, is returned whole.
pub fn fallback_message(fragment: &str) -> String {
    match fragment.split_once(':') {
        Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
        _ => fragment.to_string(),
    }
}
