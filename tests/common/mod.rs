//! Shared test utilities

#![allow(dead_code)]

mod mock_publisher;

pub use mock_publisher::{MockPublisher, RecordingProgress};

use cherry_picker::backport::{BackportOptions, CherryPicker};
use cherry_picker::config::{LoadedConfig, load_config};
use cherry_picker::error::Result;
use cherry_picker::git::Git;
use cherry_picker::state::{CONFIG_PATH_KEY, GitConfigStore, StateStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

/// File the fixture's backported change touches
pub const SPAM_FILE: &str = "spam.txt";

/// A work clone with a bare `origin`, two maintenance lines and one change on main
///
/// Layout:
/// - `main`: initial commit, `.cherry_picker.toml`, then [`Self::change_sha`]
/// - `3.6`, `3.7`: branched before the change, pushed to `origin`
pub struct TempGitRepo {
    dir: TempDir,
    /// Bare repository acting as `origin`
    pub remote: PathBuf,
    /// Working clone the tool runs in
    pub work: PathBuf,
    /// Commit used as `check_sha`
    pub root_sha: String,
    /// Change to backport
    pub change_sha: String,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let remote = dir.path().join("origin.git");
        let work = dir.path().join("work");
        fs::create_dir_all(&remote).unwrap();
        fs::create_dir_all(&work).unwrap();

        git_in(&remote, &["init", "--quiet", "--bare"]);
        git_in(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git_in(&work, &["init", "--quiet"]);
        git_in(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git_in(&work, &["config", "user.name", "Test Author"]);
        git_in(&work, &["config", "user.email", "author@example.com"]);
        git_in(&work, &["config", "commit.gpgsign", "false"]);
        git_in(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

        let mut repo = Self {
            dir,
            remote,
            work,
            root_sha: String::new(),
            change_sha: String::new(),
        };

        repo.root_sha = repo.commit_file(SPAM_FILE, "spam\n", "Initial commit");
        let config = format!(
            "team = \"python\"\nrepo = \"cpython\"\ncheck_sha = \"{}\"\ndefault_branch = \"main\"\n",
            repo.root_sha
        );
        repo.commit_file(".cherry_picker.toml", &config, "Add cherry-picker config");

        for line in ["3.6", "3.7"] {
            repo.git(&["branch", line]);
            repo.git(&["push", "--quiet", "origin", line]);
        }

        repo.change_sha = repo.commit_file(SPAM_FILE, "spam\neggs\n", "Add eggs (#1234)");
        repo.git(&["push", "--quiet", "origin", "main"]);
        repo
    }

    /// Path of the temp root (outside any repository)
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the work clone, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        git_in(&self.work, args)
    }

    /// Run git in the bare remote
    pub fn remote_git(&self, args: &[&str]) -> String {
        git_in(&self.remote, args)
    }

    /// Write and commit a file on the current branch, returning the new sha
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> String {
        fs::write(self.work.join(name), content).unwrap();
        self.git(&["add", name]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Make `line` conflict with the change
    pub fn diverge(&self, line: &str) {
        let current = self.current_branch();
        self.git(&["checkout", "--quiet", line]);
        self.commit_file(SPAM_FILE, "spam\nham\n", &format!("Add ham to {line}"));
        self.git(&["push", "--quiet", "origin", line]);
        self.git(&["checkout", "--quiet", &current]);
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn short_change(&self) -> &str {
        &self.change_sha[..7]
    }

    pub fn attempt_branch(&self, line: &str) -> String {
        format!("backport-{}-{line}", self.short_change())
    }

    /// Whether a local branch exists in the work clone
    pub fn has_branch(&self, name: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{name}")])
            .current_dir(&self.work)
            .output()
            .unwrap()
            .status
            .success()
    }

    /// Whether a branch exists in the bare remote
    pub fn remote_has_branch(&self, name: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{name}")])
            .current_dir(&self.remote)
            .output()
            .unwrap()
            .status
            .success()
    }

    /// Raw `cherry-picker.<key>` value from the local git config
    pub fn state_value(&self, key: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["config", "--local", "--get", &format!("cherry-picker.{key}")])
            .current_dir(&self.work)
            .output()
            .unwrap();
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn set_state_value(&self, key: &str, value: &str) {
        self.git(&["config", "--local", &format!("cherry-picker.{key}"), value]);
    }

    pub fn git_handle(&self, progress: &Arc<RecordingProgress>) -> Git {
        Git::new(&self.work).with_progress(progress.clone())
    }

    pub fn loaded_config(&self, git: &Git) -> LoadedConfig {
        let remembered = GitConfigStore::new(git.clone())
            .get(CONFIG_PATH_KEY)
            .unwrap();
        load_config(git, None, remembered.as_deref()).unwrap()
    }

    /// Build an orchestrator the way the CLI does, with a mock publisher
    pub fn picker(
        &self,
        git: Git,
        publisher: &MockPublisher,
        options: BackportOptions,
    ) -> Result<CherryPicker> {
        let loaded = self.loaded_config(&git);
        let store = GitConfigStore::new(git.clone());
        CherryPicker::new(git, Box::new(store), publisher.boxed(), loaded, options)
    }

    /// Options backporting the fixture change onto `lines`
    pub fn options(&self, lines: &[&str]) -> BackportOptions {
        BackportOptions {
            commit_sha: self.change_sha.clone(),
            branches: lines.iter().map(ToString::to_string).collect(),
            ..BackportOptions::default()
        }
    }
}

fn git_in(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", "2020-01-01T00:00:00Z")
        .env("GIT_COMMITTER_DATE", "2020-01-01T00:00:00Z")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
