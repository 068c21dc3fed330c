//! Error types for cherry-picker

use crate::branch::BranchNameError;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the backport workflow
#[derive(Error, Debug)]
pub enum Error {
    /// The working directory is not a clone of the configured project
    #[error("not inside a {repo} repository: commit {check_sha} is not present")]
    InvalidRepo {
        /// Configured repository name
        repo: String,
        /// Revision used to validate repository identity
        check_sha: String,
    },

    /// Invalid invocation (missing branches, wrong workflow state, ...)
    #[error("{0}")]
    Usage(String),

    /// Target line has no version in its name
    #[error("branch '{0}' seems to not have a version in its name")]
    InvalidTarget(String),

    /// Two target lines map onto the same attempt branch
    #[error("target lines '{first}' and '{second}' both map to branch '{branch}'")]
    DuplicateTarget {
        /// First target line
        first: String,
        /// Second target line
        second: String,
        /// The shared attempt branch
        branch: String,
    },

    /// Change to backport does not name a commit
    #[error("commit '{0}' does not exist in this repository")]
    UnknownCommit(String),

    /// Attempt branch could not be created
    #[error("error checking out the branch {branch}: {output}")]
    BranchCheckout {
        /// Attempt branch name
        branch: String,
        /// Captured git output
        output: String,
    },

    /// External command exited with a non-zero status
    #[error("`{command}` failed: {output}")]
    Command {
        /// Command line that failed
        command: String,
        /// Combined stdout and stderr
        output: String,
    },

    /// Branch name is not one this tool creates
    #[error("invalid backport branch '{name}': {reason}")]
    InvalidBranch {
        /// The offending branch name
        name: String,
        /// Why it was rejected
        reason: BranchNameError,
    },

    /// Persisted state token is not part of the known enumeration
    #[error(
        "run state cherry-picker.state={0} in git config is not known.\n\
         Perhaps it has been set by a newer version of cherry-picker. Try upgrading.\n\
         As the last resort you can reset the runtime state stored in git config \
         using the following command: `git config --local --remove-section cherry-picker`"
    )]
    UnknownState(String),

    /// Persisted state is known but not resumable
    #[error(
        "a backport is already in progress (state {0}).\n\
         If no other cherry-picker is running, reset it with \
         `git config --local --remove-section cherry-picker`"
    )]
    WorkflowInProgress(String),

    /// Configuration could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Remote URL could not be interpreted
    #[error("cannot determine repository owner from remote URL '{0}'")]
    RemoteUrl(String),

    /// IO error (spawning processes, ...)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::GitHubApi(e.to_string())
    }
}
