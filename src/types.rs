//! Core types for cherry-picker

use crate::error::Error;
use std::str::FromStr;

/// Progress of a backport run, persisted between invocations
///
/// The persisted token is the `SCREAMING_SNAKE_CASE` name returned by
/// [`WorkflowState::as_str`]. Parsing is strict: a token written by an
/// incompatible version is rejected rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    /// No run in flight
    Unset,
    /// Fetching the upstream remote
    FetchingUpstream,
    /// Upstream fetched
    FetchedUpstream,
    /// Switching back to the original branch
    CheckingOutDefaultBranch,
    /// Back on the original branch
    CheckedOutDefaultBranch,
    /// Pushing the attempt branch
    PushingToRemote,
    /// Attempt branch pushed
    PushedToRemote,
    /// Push failed; branch left for manual recovery
    PushingToRemoteFailed,
    /// Creating the pull request through the API
    PrCreating,
    /// Opening the pull request page in a browser
    PrOpening,
    /// Deleting the attempt branch
    RemovingBackportBranch,
    /// Attempt branch could not be deleted
    RemovingBackportBranchFailed,
    /// Attempt branch deleted
    RemovedBackportBranch,
    /// Run started
    BackportStarting,
    /// Iterating over target lines
    BackportLooping,
    /// One target line started
    BackportLoopStart,
    /// One target line finished
    BackportLoopEnd,
    /// All target lines done
    BackportComplete,
    /// Aborting a paused run
    Aborting,
    /// Paused run aborted
    Aborted,
    /// `git cherry-pick --abort` failed
    AbortingFailed,
    /// Continuing a paused run
    ContinuationStarted,
    /// Paused run finished successfully
    BackportingContinuationSucceed,
    /// Current branch is not an attempt branch
    ContinuationFailed,
    /// Waiting for the user after a conflict or a `--no-push` stop
    BackportPaused,
}

impl WorkflowState {
    /// Every state, in declaration order
    pub const ALL: [Self; 25] = [
        Self::Unset,
        Self::FetchingUpstream,
        Self::FetchedUpstream,
        Self::CheckingOutDefaultBranch,
        Self::CheckedOutDefaultBranch,
        Self::PushingToRemote,
        Self::PushedToRemote,
        Self::PushingToRemoteFailed,
        Self::PrCreating,
        Self::PrOpening,
        Self::RemovingBackportBranch,
        Self::RemovingBackportBranchFailed,
        Self::RemovedBackportBranch,
        Self::BackportStarting,
        Self::BackportLooping,
        Self::BackportLoopStart,
        Self::BackportLoopEnd,
        Self::BackportComplete,
        Self::Aborting,
        Self::Aborted,
        Self::AbortingFailed,
        Self::ContinuationStarted,
        Self::BackportingContinuationSucceed,
        Self::ContinuationFailed,
        Self::BackportPaused,
    ];

    /// States a new invocation may start from
    pub const RESUMABLE: [Self; 2] = [Self::BackportPaused, Self::Unset];

    /// Persisted token for this state
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "UNSET",
            Self::FetchingUpstream => "FETCHING_UPSTREAM",
            Self::FetchedUpstream => "FETCHED_UPSTREAM",
            Self::CheckingOutDefaultBranch => "CHECKING_OUT_DEFAULT_BRANCH",
            Self::CheckedOutDefaultBranch => "CHECKED_OUT_DEFAULT_BRANCH",
            Self::PushingToRemote => "PUSHING_TO_REMOTE",
            Self::PushedToRemote => "PUSHED_TO_REMOTE",
            Self::PushingToRemoteFailed => "PUSHING_TO_REMOTE_FAILED",
            Self::PrCreating => "PR_CREATING",
            Self::PrOpening => "PR_OPENING",
            Self::RemovingBackportBranch => "REMOVING_BACKPORT_BRANCH",
            Self::RemovingBackportBranchFailed => "REMOVING_BACKPORT_BRANCH_FAILED",
            Self::RemovedBackportBranch => "REMOVED_BACKPORT_BRANCH",
            Self::BackportStarting => "BACKPORT_STARTING",
            Self::BackportLooping => "BACKPORT_LOOPING",
            Self::BackportLoopStart => "BACKPORT_LOOP_START",
            Self::BackportLoopEnd => "BACKPORT_LOOP_END",
            Self::BackportComplete => "BACKPORT_COMPLETE",
            Self::Aborting => "ABORTING",
            Self::Aborted => "ABORTED",
            Self::AbortingFailed => "ABORTING_FAILED",
            Self::ContinuationStarted => "CONTINUATION_STARTED",
            Self::BackportingContinuationSucceed => "BACKPORTING_CONTINUATION_SUCCEED",
            Self::ContinuationFailed => "CONTINUATION_FAILED",
            Self::BackportPaused => "BACKPORT_PAUSED",
        }
    }

    /// Whether a new invocation may start while this state is persisted
    pub fn is_resumable(self) -> bool {
        Self::RESUMABLE.contains(&self)
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}

/// How a pull request gets published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Created directly through the hosting service's REST API
    Api,
    /// Comparison page opened in a browser for a human to submit
    Browser,
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

/// A pull request to publish for one pushed attempt branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRequest {
    /// Target line the PR merges into
    pub base: String,
    /// Attempt branch holding the backport
    pub head: String,
    /// Owner of the fork the attempt branch was pushed to
    pub head_owner: String,
    /// PR title (first line of the commit message)
    pub title: String,
    /// PR body (rest of the commit message)
    pub body: String,
}

/// Result of publishing a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// PR created through the API
    Created {
        /// Web URL of the new PR
        url: String,
    },
    /// Comparison page opened (or printed) for manual submission
    Opened {
        /// Comparison URL
        url: String,
    },
    /// Dry run; nothing was sent
    DryRun {
        /// URL or endpoint that would have been used
        url: String,
    },
}

impl PublishOutcome {
    /// URL associated with the outcome
    pub fn url(&self) -> &str {
        match self {
            Self::Created { url } | Self::Opened { url } | Self::DryRun { url } => url,
        }
    }
}
