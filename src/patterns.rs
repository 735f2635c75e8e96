//! Installing bundled prompt patterns into the fabric pattern store.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::PatternError;

/// Environment variable that overrides the fabric patterns directory.
pub const PATTERNS_ROOT_ENV_VAR: &str = "WRITE_COMMIT_PATTERNS_ROOT";

/// Where fabric looks up pattern directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternConfig {
    pub patterns_root: PathBuf,
}

impl PatternConfig {
    pub fn new(patterns_root: impl Into<PathBuf>) -> Self {
        Self {
            patterns_root: patterns_root.into(),
        }
    }

    /// Resolve the patterns root.
    ///
    /// An explicit override wins, then `WRITE_COMMIT_PATTERNS_ROOT`, then
    /// `~/.config/fabric/patterns`. Returns `None` only when no home directory
    /// can be determined.
    pub fn resolve(explicit: Option<PathBuf>) -> Option<Self> {
        if let Some(root) = explicit {
            return Some(Self::new(root));
        }

        match env::var(PATTERNS_ROOT_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => return Some(Self::new(v)),
            Ok(_) => warn!("{} is set but empty, ignoring it", PATTERNS_ROOT_ENV_VAR),
            Err(_) => {}
        }

        dirs::home_dir().map(|home| Self::new(home.join(".config").join("fabric").join("patterns")))
    }

    pub fn pattern_dir(&self, name: &str) -> PathBuf {
        self.patterns_root.join(name)
    }
}

/// What `ensure_pattern_installed` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    UpToDate,
    Installed,
    Updated,
}

/// Locate the patterns shipped with write-commit.
///
/// Looks next to the executable first, then falls back to the crate's own
/// `patterns/` directory for development builds.
pub fn bundled_patterns_dir() -> Result<PathBuf, PatternError> {
    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("patterns")));

    let candidates = beside_exe
        .into_iter()
        .chain(std::iter::once(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("patterns")));

    for candidate in candidates {
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    Err(PatternError::BundledPatternsMissing)
}

/// Copy `source_root/name` into the pattern store unless an identical copy
/// is already there. `force` re-copies regardless.
pub fn ensure_pattern_installed(
    config: &PatternConfig,
    source_root: &Path,
    name: &str,
    force: bool,
) -> Result<InstallOutcome, PatternError> {
    let source = source_root.join(name);
    let target = config.pattern_dir(name);

    if !source.is_dir() {
        return Err(PatternError::SourceNotFound(source));
    }

    let outcome = if target.exists() {
        if !force && is_pattern_up_to_date(&source, &target) {
            debug!("Pattern '{}' is already up to date", name);
            return Ok(InstallOutcome::UpToDate);
        }
        debug!("Pattern '{}' exists but is outdated, updating", name);
        InstallOutcome::Updated
    } else {
        InstallOutcome::Installed
    };

    copy_pattern(&source, &target)?;
    info!("Pattern '{}' installed to {}", name, target.display());

    Ok(outcome)
}

/// Same relative file set with byte-identical contents.
///
/// Any error while comparing counts as out of date.
fn is_pattern_up_to_date(source: &Path, target: &Path) -> bool {
    let (Ok(source_files), Ok(target_files)) = (relative_files(source), relative_files(target))
    else {
        return false;
    };

    if source_files != target_files {
        return false;
    }

    source_files.iter().all(|rel| {
        match (fs::read(source.join(rel)), fs::read(target.join(rel))) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    })
}

/// Sorted paths of all files under `root`, relative to it.
fn relative_files(root: &Path) -> Result<Vec<PathBuf>, PatternError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| PatternError::Io(e.into()))?;
        if entry.file_type().is_file()
            && let Ok(rel) = entry.path().strip_prefix(root)
        {
            files.push(rel.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Replace `target` with a recursive copy of `source`.
fn copy_pattern(source: &Path, target: &Path) -> Result<(), PatternError> {
    let copy_failed = |e: std::io::Error| PatternError::CopyFailed {
        from: source.to_path_buf(),
        to: target.to_path_buf(),
        source: e,
    };

    if target.exists() {
        fs::remove_dir_all(target).map_err(copy_failed)?;
    }
    fs::create_dir_all(target).map_err(copy_failed)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| copy_failed(e.into()))?;
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let dest = target.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(copy_failed)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(copy_failed)?;
        }
    }

    Ok(())
}
