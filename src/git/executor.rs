//! Runs `git` as a subprocess

use crate::backport::{NoopProgress, ProgressCallback};
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use tracing::debug;

/// Handle on a git checkout, driven through the `git` executable
///
/// Commands are always argument vectors. [`Git::run`] honours dry-run mode;
/// [`Git::exec`] and [`Git::query`] always execute and are meant for
/// read-only queries and for state that must persist during a dry run.
#[derive(Clone)]
pub struct Git {
    workdir: PathBuf,
    dry_run: bool,
    progress: Arc<dyn ProgressCallback>,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("workdir", &self.workdir)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Git {
    /// Open a checkout rooted at (or inside) `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            dry_run: false,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Log mutating commands instead of running them
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Report dry-run commands through `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Whether mutating commands are only logged
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Progress sink shared with the orchestrator
    pub fn progress(&self) -> Arc<dyn ProgressCallback> {
        Arc::clone(&self.progress)
    }

    /// Run a command that mutates the checkout
    ///
    /// In dry-run mode the command is reported and an empty output returned.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        if self.dry_run {
            let line = format_command(args);
            debug!(command = %line, "dry-run");
            self.progress.on_dry_run(&line);
            return Ok(String::new());
        }
        self.exec(args)
    }

    /// Run a command regardless of dry-run mode, returning stdout and stderr combined
    pub fn exec(&self, args: &[&str]) -> Result<String> {
        let output = self.spawn(args)?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::Command {
                command: format_command(args),
                output: combined.trim().to_string(),
            });
        }
        Ok(combined)
    }

    /// Run a read-only command and return its trimmed stdout
    pub fn query(&self, args: &[&str]) -> Result<String> {
        let output = self.spawn(args)?;
        if !output.status.success() {
            return Err(Error::Command {
                command: format_command(args),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run a command and report only whether it succeeded
    pub fn succeeds(&self, args: &[&str]) -> bool {
        self.spawn(args).is_ok_and(|output| output.status.success())
    }

    fn spawn(&self, args: &[&str]) -> Result<Output> {
        debug!(command = %format_command(args), workdir = %self.workdir.display(), "running");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()?;
        debug!(status = %output.status, "finished");
        Ok(output)
    }
}

fn format_command(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('\'');
            line.push_str(arg);
            line.push('\'');
        } else {
            line.push_str(arg);
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        dry_runs: Mutex<Vec<String>>,
    }

    impl ProgressCallback for Recorder {
        fn on_message(&self, _message: &str) {}
        fn on_warning(&self, _message: &str) {}
        fn on_dry_run(&self, command: &str) {
            self.dry_runs.lock().unwrap().push(command.to_string());
        }
    }

    #[test]
    fn test_format_command_quotes_whitespace() {
        assert_eq!(
            format_command(&["commit", "-m", "two words"]),
            "git commit -m 'two words'"
        );
    }

    #[test]
    fn test_dry_run_does_not_execute() {
        let temp = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder::default());
        let git = Git::new(temp.path())
            .with_dry_run(true)
            .with_progress(recorder.clone());

        // would fail outside a repository if it ran
        let output = git.run(&["checkout", "-b", "backport-afc23f4-3.6"]).unwrap();

        assert!(output.is_empty());
        assert_eq!(
            *recorder.dry_runs.lock().unwrap(),
            vec!["git checkout -b backport-afc23f4-3.6"]
        );
    }

    #[test]
    fn test_failure_carries_output() {
        let temp = TempDir::new().unwrap();
        let git = Git::new(temp.path());

        match git.exec(&["rev-parse", "HEAD"]) {
            Err(Error::Command { command, output }) => {
                assert_eq!(command, "git rev-parse HEAD");
                assert!(!output.is_empty());
            }
            other => panic!("Expected Command error, got: {other:?}"),
        }
    }

    #[test]
    fn test_succeeds_outside_repo_is_false() {
        let temp = TempDir::new().unwrap();
        assert!(!Git::new(temp.path()).succeeds(&["rev-parse", "--git-dir"]));
    }
}
