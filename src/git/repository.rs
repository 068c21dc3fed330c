//! Typed git queries and operations used by the backport workflow

use crate::branch::CommitLookup;
use crate::error::{Error, Result};
use crate::git::Git;

/// Result of replaying a commit onto the current branch
#[derive(Debug)]
pub enum ApplyOutcome {
    /// The commit applied cleanly
    Applied,
    /// The commit conflicts and needs manual resolution
    Conflict {
        /// Output of the failed cherry-pick
        output: String,
    },
    /// The cherry-pick failed for another reason
    Failure {
        /// Underlying error
        cause: Error,
    },
}

impl Git {
    /// Whether the working directory is inside a git repository
    pub fn is_repository(&self) -> bool {
        self.succeeds(&["rev-parse", "--git-dir"])
    }

    /// Name of the checked out branch (`HEAD` when detached)
    pub fn current_branch(&self) -> Result<String> {
        self.query(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Full hash of the commit `rev` points to
    pub fn resolve_commit(&self, rev: &str) -> Result<String> {
        self.query(&["rev-parse", "--verify", &format!("{rev}^{{commit}}")])
    }

    /// Whether a remote with this name is configured
    pub fn has_remote(&self, name: &str) -> bool {
        self.succeeds(&["remote", "get-url", name])
    }

    /// Configured URL of a remote
    pub fn remote_url(&self, name: &str) -> Result<String> {
        self.query(&["config", "--get", &format!("remote.{name}.url")])
    }

    /// Full commit message of `rev`
    pub fn commit_message(&self, rev: &str) -> Result<String> {
        self.query(&["show", "-s", "--format=%B", rev])
    }

    /// `Name <email>` of the author of `rev`
    pub fn author(&self, rev: &str) -> Result<String> {
        self.query(&["log", "-1", "--format=%aN <%ae>", rev])
    }

    /// Object type (`blob`, `tree`, ...) of a `<rev>:<path>` spec
    pub fn object_type(&self, spec: &str) -> Option<String> {
        self.query(&["cat-file", "-t", spec]).ok()
    }

    /// Content of `<rev>:<path>` read from the object store
    pub fn read_blob(&self, spec: &str) -> Result<String> {
        self.query(&["show", spec])
    }

    /// Whether a cherry-pick is waiting for conflict resolution
    pub fn cherry_pick_in_progress(&self) -> bool {
        self.succeeds(&["rev-parse", "--quiet", "--verify", "CHERRY_PICK_HEAD"])
    }

    /// `git cherry-pick -x <sha>`, classifying failures
    pub fn cherry_pick(&self, sha: &str) -> ApplyOutcome {
        match self.run(&["cherry-pick", "-x", sha]) {
            Ok(_) => ApplyOutcome::Applied,
            Err(Error::Command { output, .. }) if self.cherry_pick_in_progress() => {
                ApplyOutcome::Conflict { output }
            }
            Err(cause) => ApplyOutcome::Failure { cause },
        }
    }

    /// Output of `git status`
    pub fn status(&self) -> Result<String> {
        self.exec(&["status"])
    }
}

impl CommitLookup for Git {
    fn has_commit(&self, rev: &str) -> bool {
        self.succeeds(&["rev-parse", "--quiet", "--verify", &format!("{rev}^{{commit}}")])
    }
}
