//! fabric CLI spawning and output capture.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::FabricError;

/// Name of the external generation binary.
pub const FABRIC_COMMAND: &str = "fabric";

/// Exit code and captured streams of one finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches external commands.
///
/// A non-zero exit is not an error here: callers inspect `exit_code`.
/// This abstraction allows mocking the fabric subprocess in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` with a shell-style argument string and wait for it to exit.
    async fn run(&self, command: &str, arguments: &str) -> Result<ProcessResult, FabricError>;
}

/// Runner that spawns real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &str, arguments: &str) -> Result<ProcessResult, FabricError> {
        run_command(command, arguments).await
    }
}

/// Check if the fabric CLI is installed and accessible.
///
/// Uses the `which` crate for cross-platform executable detection. A missing
/// `~/.config/fabric` only warns, since fabric itself reports the details.
pub async fn check_fabric_installed() -> Result<(), FabricError> {
    if which::which(FABRIC_COMMAND).is_err() {
        return Err(FabricError::NotInstalled);
    }

    let version_check = Command::new(FABRIC_COMMAND)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(FabricError::SpawnFailed)?;

    if !version_check.status.success() {
        return Err(FabricError::NotInstalled);
    }

    match dirs::home_dir() {
        Some(home) if !is_fabric_configured(&home) => warn!(
            "fabric does not appear to be configured ({} is missing). Run `fabric --setup` first.",
            home.join(".config").join("fabric").display()
        ),
        Some(_) => {}
        None => debug!("No home directory, skipping fabric configuration check"),
    }

    Ok(())
}

/// Whether fabric's configuration directory exists under `home`.
pub fn is_fabric_configured(home: &Path) -> bool {
    home.join(".config").join("fabric").is_dir()
}

/// Tokenise `arguments`, spawn `command` directly (no shell) and capture both
/// streams line by line until the process exits.
///
/// stdout and stderr are drained concurrently with the wait so a chatty child
/// can never block on a full pipe.
pub async fn run_command(command: &str, arguments: &str) -> Result<ProcessResult, FabricError> {
    let argv = shell_words::split(arguments)
        .map_err(|e| FabricError::InvalidArguments(e.to_string()))?;

    debug!("Running: {} {}", command, arguments);

    let mut child = Command::new(command)
        .args(&argv)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(FabricError::SpawnFailed)?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| FabricError::OutputCaptureFailed(std::io::Error::other("stdout not piped")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| FabricError::OutputCaptureFailed(std::io::Error::other("stderr not piped")))?;

    let (stdout, stderr, status) =
        tokio::try_join!(collect_lines(stdout), collect_lines(stderr), child.wait())
            .map_err(FabricError::OutputCaptureFailed)?;

    Ok(ProcessResult {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

/// Read a stream to the end, one line at a time.
///
/// Invalid UTF-8 is replaced rather than rejected and every line, including
/// an unterminated last one, ends with a single `\n`.
async fn collect_lines<R: AsyncRead + Unpin>(reader: R) -> std::io::Result<String> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut captured = String::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&line);
        let text = decoded.strip_suffix('\n').unwrap_or(&decoded);
        let text = text.strip_suffix('\r').unwrap_or(text);
        captured.push_str(text);
        captured.push('\n');
    }

    Ok(captured)
}
