//! write-commit - CLI entry point.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use git2::Repository;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use write_commit::commit::{DEFAULT_MAX_CHUNK_CHARS, chunk_diff, collect_staged_diff, commit_staged};
use write_commit::fabric::check_fabric_installed;
use write_commit::generate::CHUNK_PATTERN;
use write_commit::patterns::{bundled_patterns_dir, ensure_pattern_installed};
use write_commit::{CommitMessageService, GenerationParameters, InstallOutcome, PatternConfig};

/// Pattern used for the final commit message unless `--pattern` says otherwise.
const DEFAULT_PATTERN: &str = "write_commit_message";

/// Write a commit message for the staged changes using fabric.
#[derive(Parser, Debug)]
#[command(name = "write-commit")]
#[command(about = "Write a commit message for the staged changes using fabric")]
#[command(version)]
struct Cli {
    /// fabric pattern used for the final commit message
    #[arg(short = 'p', long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Model passed to fabric
    #[arg(short = 'm', long, default_value = "gpt-4o-mini")]
    model: String,

    /// Sampling temperature
    #[arg(short = 't', long, default_value_t = 1.0)]
    temperature: f32,

    /// Nucleus sampling (top-p)
    #[arg(short = 'T', long, default_value_t = 1.0)]
    top_p: f32,

    /// Presence penalty
    #[arg(short = 'P', long, default_value_t = 0.0, allow_negative_numbers = true)]
    presence: f32,

    /// Frequency penalty
    #[arg(short = 'F', long, default_value_t = 0.0, allow_negative_numbers = true)]
    frequency: f32,

    /// Largest diff (in characters) sent to fabric in one request
    #[arg(long, default_value_t = NonZeroUsize::new(DEFAULT_MAX_CHUNK_CHARS).unwrap_or(NonZeroUsize::MIN))]
    max_chunk_chars: NonZeroUsize,

    /// fabric patterns directory (defaults to ~/.config/fabric/patterns)
    #[arg(long)]
    patterns_root: Option<PathBuf>,

    /// Re-copy the bundled patterns even if they look up to date
    #[arg(long)]
    reinstall_patterns: bool,

    /// Print the message without committing
    #[arg(long)]
    dry_run: bool,

    /// Commit without asking for confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Show progress and the fabric command lines
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Check prerequisites
    check_fabric_installed()
        .await
        .context("fabric CLI is required")?;

    // Step 2: Make sure the patterns fabric will be asked for exist
    install_patterns(&cli).context("Failed to install fabric patterns")?;

    // Step 3: Collect and chunk the staged diff
    let repo = Repository::discover(".")
        .context("Not a git repository. Run write-commit from within a git repository.")?;
    let files = collect_staged_diff(&repo).context("Failed to read staged changes")?;
    let chunks = chunk_diff(&files, cli.max_chunk_chars.get());

    if chunks.len() > 1 {
        println!(
            "Diff is large, processing {} chunks across {} files...",
            chunks.len(),
            files.len()
        );
    }

    // Step 4: Generate
    let params = GenerationParameters {
        temperature: cli.temperature,
        top_p: cli.top_p,
        presence_penalty: cli.presence,
        frequency_penalty: cli.frequency,
        model: cli.model.clone(),
        pattern: cli.pattern.clone(),
    };

    let message = CommitMessageService::with_fabric()
        .generate(&chunks, &params)
        .await
        .context("Failed to generate commit message")?;

    println!("\n{}\n", message);

    if cli.dry_run {
        return Ok(());
    }

    // Step 5: Commit
    if !cli.yes {
        let confirmed = Confirm::new()
            .with_prompt("Commit with this message?")
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Commit cancelled.");
            return Ok(());
        }
    }

    let oid = commit_staged(&repo, &message).context("Failed to create commit")?;
    println!("✓ Created commit {}", &oid.to_string()[..7]);

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Install the final and chunk patterns from the bundled set.
///
/// A final pattern that is not bundled is assumed to be one the user already
/// has in fabric.
fn install_patterns(cli: &Cli) -> Result<()> {
    let config = PatternConfig::resolve(cli.patterns_root.clone())
        .context("Could not determine the fabric patterns directory; pass --patterns-root")?;
    let source_root = bundled_patterns_dir()?;

    for name in [cli.pattern.as_str(), CHUNK_PATTERN] {
        if name != CHUNK_PATTERN && !source_root.join(name).is_dir() {
            debug!("Pattern '{}' is not bundled, using fabric's copy", name);
            continue;
        }

        let outcome =
            ensure_pattern_installed(&config, &source_root, name, cli.reinstall_patterns)?;
        if outcome != InstallOutcome::UpToDate {
            println!(
                "Installed pattern '{}' to {}",
                name,
                config.pattern_dir(name).display()
            );
        }
    }

    Ok(())
}
