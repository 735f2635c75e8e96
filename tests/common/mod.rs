//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use write_commit::fabric::run_command;
use write_commit::{CommandRunner, FabricError, GenerationParameters, ProcessResult};

/// Default parameters matching the CLI defaults.
pub fn params() -> GenerationParameters {
    GenerationParameters {
        temperature: 1.0,
        top_p: 1.0,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
        model: "gpt-4o-mini".to_string(),
        pattern: "write_commit_message".to_string(),
    }
}

/// Write an executable shell script into a fresh temp directory.
#[cfg(unix)]
pub fn create_mock_script(script_content: &str) -> (TempDir, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let script_path = temp_dir.path().join("mock_fabric.sh");

    let mut file = File::create(&script_path).expect("Failed to create mock script");
    file.write_all(script_content.as_bytes())
        .expect("Failed to write mock script");
    drop(file);

    let mut perms = fs::metadata(&script_path)
        .expect("Failed to get metadata")
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script_path, perms).expect("Failed to set permissions");

    (temp_dir, script_path)
}

/// Runner that launches a script in place of the fabric binary.
pub struct ScriptRunner {
    pub script_path: PathBuf,
}

#[async_trait]
impl CommandRunner for ScriptRunner {
    async fn run(&self, _command: &str, arguments: &str) -> Result<ProcessResult, FabricError> {
        let program = self.script_path.to_string_lossy();
        run_command(&program, arguments).await
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a configured identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open config");
            config.set_str("user.name", "Test User").expect("Failed to set name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set email");
        }
        Self { dir, repo }
    }

    /// Write a file relative to the repo root.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(full, content).expect("Failed to write file");
    }

    /// Stage a path.
    pub fn stage(&self, path: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is staged. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }
}
