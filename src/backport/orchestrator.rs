//! Backport orchestration - the effectful workflow
//!
//! [`CherryPicker`] drives one change across a [`BackportPlan`], persisting
//! its progress after every step so an interrupted run can be continued or
//! aborted by a later invocation.

use crate::backport::ProgressCallback;
use crate::backport::message::{
    build_backport_message, fix_issue_refs, normalize_commit_message, pr_title,
};
use crate::backport::plan::{BackportPlan, BackportStep, create_backport_plan};
use crate::branch::{self, AttemptBranch, BranchNameError, CommitLookup};
use crate::config::{Config, ConfigRef, LoadedConfig};
use crate::error::{Error, Result};
use crate::git::{ApplyOutcome, Git};
use crate::platform::{PrPublisher, parse_remote_owner};
use crate::state::{StateStore, StateTracker};
use crate::types::{PrRequest, PublishMode, PublishOutcome, WorkflowState};
use std::sync::Arc;
use tracing::debug;

/// Per-invocation options
#[derive(Debug, Clone)]
pub struct BackportOptions {
    /// Change to backport (empty for `--continue`, `--abort`, `--status`)
    pub commit_sha: String,
    /// Target lines, in any order
    pub branches: Vec<String>,
    /// Remote attempt branches are pushed to
    pub pr_remote: String,
    /// Push and publish after each successful apply
    pub push: bool,
    /// Prefix the commit title with `[<target>] `
    pub prefix_commit: bool,
}

impl Default for BackportOptions {
    fn default() -> Self {
        Self {
            commit_sha: String::new(),
            branches: Vec::new(),
            pr_remote: "origin".to_string(),
            push: true,
            prefix_commit: true,
        }
    }
}

/// Why a run stopped before finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// The change conflicts with the target line
    Conflict,
    /// Applied, but pushing was disabled
    NoPush,
}

/// What happened to one target line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReport {
    /// Target line
    pub target: String,
    /// Attempt branch
    pub branch: String,
    /// Whether the push succeeded
    pub pushed: bool,
    /// Publishing result, `None` if skipped or failed
    pub publish: Option<PublishOutcome>,
    /// Whether the attempt branch was deleted
    pub branch_removed: bool,
}

/// Result of [`CherryPicker::backport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackportOutcome {
    /// Every target line was processed
    Completed {
        /// One report per line, in processing order
        lines: Vec<LineReport>,
    },
    /// The run paused and must be continued or aborted
    Paused {
        /// Target line the run stopped at
        target: String,
        /// Attempt branch left checked out
        branch: String,
        /// Why it stopped
        reason: PauseReason,
    },
}

/// Result of [`CherryPicker::continue_cherry_pick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    /// The paused line was committed, pushed and cleaned up
    Completed {
        /// Report for the resumed line
        line: LineReport,
        /// Final commit message
        message: String,
    },
    /// The current branch is not an attempt branch; nothing was changed
    Failed {
        /// Current branch
        branch: String,
        /// Why it was rejected
        reason: BranchNameError,
    },
}

/// Result of [`CherryPicker::abort_cherry_pick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortOutcome {
    /// Whether `git cherry-pick --abort` succeeded
    pub aborted: bool,
    /// Attempt branch that was cleaned up, if any
    pub removed_branch: Option<String>,
}

/// The backport workflow engine
pub struct CherryPicker {
    git: Git,
    state: StateTracker,
    publisher: Box<dyn PrPublisher>,
    progress: Arc<dyn ProgressCallback>,
    config: Config,
    config_ref: Option<ConfigRef>,
    options: BackportOptions,
    initial_state: WorkflowState,
    original_branch: String,
}

impl std::fmt::Debug for CherryPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CherryPicker")
            .field("git", &self.git)
            .field("config", &self.config)
            .field("options", &self.options)
            .field("initial_state", &self.initial_state)
            .field("original_branch", &self.original_branch)
            .finish_non_exhaustive()
    }
}

impl CherryPicker {
    /// Validate the repository and load the persisted state
    ///
    /// Fails with [`Error::InvalidRepo`] before touching anything when the
    /// configured `check_sha` is missing, with [`Error::UnknownState`] for an
    /// unrecognised persisted token and with [`Error::WorkflowInProgress`]
    /// when another run owns the state slot.
    pub fn new(
        git: Git,
        store: Box<dyn StateStore>,
        publisher: Box<dyn PrPublisher>,
        loaded: LoadedConfig,
        mut options: BackportOptions,
    ) -> Result<Self> {
        let LoadedConfig { config, config_ref } = loaded;

        check_repo(&git, &config)?;

        let state = StateTracker::new(store);
        let initial_state = state.load()?;
        if !initial_state.is_resumable() {
            return Err(Error::WorkflowInProgress(initial_state.to_string()));
        }

        let original_branch = original_branch(&git, &config.default_branch)?;
        debug!(%initial_state, %original_branch, "cherry-picker ready");

        let progress = git.progress();
        if git.is_dry_run() {
            progress.on_message("Dry run requested, listing expected command sequence");
        }

        options.commit_sha = options.commit_sha.trim().to_string();

        Ok(Self {
            git,
            state,
            publisher,
            progress,
            config,
            config_ref,
            options,
            initial_state,
            original_branch,
        })
    }

    /// State persisted when this invocation started
    pub const fn initial_state(&self) -> WorkflowState {
        self.initial_state
    }

    /// Branch checked out again after each attempt
    pub fn original_branch(&self) -> &str {
        &self.original_branch
    }

    /// Remote target lines are fetched from: `upstream` if configured, else `origin`
    pub fn upstream(&self) -> &'static str {
        if self.git.has_remote("upstream") {
            "upstream"
        } else {
            "origin"
        }
    }

    /// Owner of the fork attempt branches are pushed to
    pub fn username(&self) -> Result<String> {
        parse_remote_owner(&self.git.remote_url(&self.options.pr_remote)?)
    }

    /// `git status` of the checkout; never changes the workflow state
    pub fn status(&self) -> Result<String> {
        self.git.status()
    }

    /// Backport the change onto every target line
    pub async fn backport(&self) -> Result<BackportOutcome> {
        if self.options.branches.is_empty() {
            return Err(Error::Usage(
                "at least one branch must be specified".to_string(),
            ));
        }
        if self.initial_state != WorkflowState::Unset {
            return Err(Error::Usage(
                "a backport is paused; run with --continue or --abort first".to_string(),
            ));
        }

        let commit_sha = self.resolve_change()?;
        let plan = create_backport_plan(&commit_sha, &self.options.branches)?;
        let result = self.run_plan(&plan).await;
        self.reset_on_error(result)
    }

    /// Finish a paused line: commit, push, publish, clean up
    pub async fn continue_cherry_pick(&self) -> Result<ContinueOutcome> {
        if self.initial_state != WorkflowState::BackportPaused {
            return Err(Error::Usage(
                "one can only continue a paused process".to_string(),
            ));
        }

        let branch = self.git.current_branch()?;
        let attempt = match branch::decode(&branch, &self.git) {
            Ok(attempt) => attempt,
            Err(reason) => {
                self.progress.on_warning(&format!(
                    "Current branch ({branch}) is not a backport branch. Will not continue: {reason}"
                ));
                self.progress.on_state(WorkflowState::ContinuationFailed);
                return Ok(ContinueOutcome::Failed { branch, reason });
            }
        };

        self.set_state(WorkflowState::ContinuationStarted)?;

        let message = match self.commit_resolution(&attempt) {
            Ok(message) => message,
            Err(e) => {
                self.pause()?;
                return Err(e);
            }
        };

        let result = self.finish_continuation(&attempt, &branch, message).await;
        self.reset_on_error(result)
    }

    /// Abandon a paused line and remove its attempt branch
    pub fn abort_cherry_pick(&self) -> Result<AbortOutcome> {
        if self.initial_state != WorkflowState::BackportPaused {
            return Err(Error::Usage("one can only abort a paused process".to_string()));
        }

        let result = self.run_abort();
        self.reset_on_error(result)
    }

    /// Return to the original branch and delete `branch`
    ///
    /// Returns whether the branch was deleted; a failed deletion is reported
    /// but not an error.
    pub fn cleanup_branch(&self, branch: &str) -> Result<bool> {
        self.set_state(WorkflowState::RemovingBackportBranch)?;
        self.checkout_original_branch()?;

        match self.git.run(&["branch", "-D", branch]) {
            Ok(_) => {
                self.progress
                    .on_message(&format!("branch {branch} has been deleted."));
                self.set_state(WorkflowState::RemovedBackportBranch)?;
                Ok(true)
            }
            Err(e) => {
                self.progress
                    .on_warning(&format!("branch {branch} NOT deleted: {e}"));
                self.set_state(WorkflowState::RemovingBackportBranchFailed)?;
                Ok(false)
            }
        }
    }

    async fn run_plan(&self, plan: &BackportPlan) -> Result<BackportOutcome> {
        self.set_state(WorkflowState::BackportStarting)?;
        self.fetch_upstream()?;
        self.set_state(WorkflowState::BackportLooping)?;

        let mut lines = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            self.set_state(WorkflowState::BackportLoopStart)?;
            self.progress.on_message(&format!(
                "Now backporting '{}' into '{}'",
                plan.commit_sha, step.target
            ));

            self.checkout_attempt_branch(step)?;

            match self.git.cherry_pick(&plan.commit_sha) {
                ApplyOutcome::Applied => {}
                ApplyOutcome::Conflict { output } => {
                    self.progress.on_warning(&format!(
                        "Error cherry-pick {}.\n{output}",
                        plan.commit_sha
                    ));
                    self.pause()?;
                    return Ok(BackportOutcome::Paused {
                        target: step.target.clone(),
                        branch: step.branch.clone(),
                        reason: PauseReason::Conflict,
                    });
                }
                ApplyOutcome::Failure { cause } => return Err(cause),
            }

            let message = self.amend_commit_message(&plan.commit_sha, &step.target)?;

            if !self.options.push {
                self.pause()?;
                return Ok(BackportOutcome::Paused {
                    target: step.target.clone(),
                    branch: step.branch.clone(),
                    reason: PauseReason::NoPush,
                });
            }

            let (pushed, publish) = self
                .push_to_remote(&step.target, &step.branch, &message)
                .await?;
            let branch_removed = self.finish_line(&step.branch, pushed)?;
            lines.push(LineReport {
                target: step.target.clone(),
                branch: step.branch.clone(),
                pushed,
                publish,
                branch_removed,
            });

            self.set_state(WorkflowState::BackportLoopEnd)?;
        }

        self.set_state(WorkflowState::BackportComplete)?;
        self.state.reset()?;
        Ok(BackportOutcome::Completed { lines })
    }

    async fn finish_continuation(
        &self,
        attempt: &AttemptBranch,
        branch: &str,
        message: String,
    ) -> Result<ContinueOutcome> {
        let (pushed, publish) = self
            .push_to_remote(&attempt.target, branch, &message)
            .await?;
        let branch_removed = self.finish_line(branch, pushed)?;

        self.set_state(WorkflowState::BackportingContinuationSucceed)?;
        self.state.reset()?;

        Ok(ContinueOutcome::Completed {
            line: LineReport {
                target: attempt.target.clone(),
                branch: branch.to_string(),
                pushed,
                publish,
                branch_removed,
            },
            message,
        })
    }

    fn run_abort(&self) -> Result<AbortOutcome> {
        self.set_state(WorkflowState::Aborting)?;
        let aborted = match self.git.run(&["cherry-pick", "--abort"]) {
            Ok(_) => {
                self.set_state(WorkflowState::Aborted)?;
                true
            }
            Err(e) => {
                self.progress.on_warning(&e.to_string());
                self.set_state(WorkflowState::AbortingFailed)?;
                false
            }
        };

        // only branches this tool created are deleted
        let current = self.git.current_branch()?;
        let removed_branch = if branch::decode(&current, &self.git).is_ok() {
            self.cleanup_branch(&current)?;
            Some(current)
        } else {
            None
        };

        self.state.reset()?;
        Ok(AbortOutcome {
            aborted,
            removed_branch,
        })
    }

    /// Full lowercase hash of the requested change; nothing is written before this
    fn resolve_change(&self) -> Result<String> {
        let requested = &self.options.commit_sha;
        match self.git.resolve_commit(requested) {
            Ok(sha) => Ok(sha.to_ascii_lowercase()),
            Err(Error::Command { .. }) => Err(Error::UnknownCommit(requested.clone())),
            Err(e) => Err(e),
        }
    }

    /// Delete a pushed attempt branch; keep an unpushed one for manual recovery
    fn finish_line(&self, branch: &str, pushed: bool) -> Result<bool> {
        if pushed {
            return self.cleanup_branch(branch);
        }
        self.checkout_original_branch()?;
        self.progress.on_warning(&format!(
            "branch {branch} was not pushed and has been kept for manual recovery"
        ));
        Ok(false)
    }

    fn fetch_upstream(&self) -> Result<()> {
        self.set_state(WorkflowState::FetchingUpstream)?;
        self.git.run(&["fetch", self.upstream()])?;
        self.set_state(WorkflowState::FetchedUpstream)
    }

    fn checkout_attempt_branch(&self, step: &BackportStep) -> Result<()> {
        let start = format!("{}/{}", self.upstream(), step.target);
        match self.git.run(&["checkout", "-b", &step.branch, &start]) {
            Ok(_) => Ok(()),
            Err(Error::Command { output, .. }) => Err(Error::BranchCheckout {
                branch: step.branch.clone(),
                output,
            }),
            Err(e) => Err(e),
        }
    }

    fn checkout_original_branch(&self) -> Result<()> {
        self.set_state(WorkflowState::CheckingOutDefaultBranch)?;
        self.git.run(&["checkout", &self.original_branch])?;
        self.set_state(WorkflowState::CheckedOutDefaultBranch)
    }

    /// Message of the backported commit for `sha` on `target`
    fn backport_message(&self, sha: &str, target: &str) -> Result<String> {
        let full_sha = self.git.resolve_commit(sha)?;
        let mut message = self.git.commit_message(&full_sha)?;
        if self.config.fix_commit_msg {
            message = fix_issue_refs(&message);
        }
        let author = self.git.author(&full_sha)?;
        Ok(build_backport_message(
            &message,
            self.options.prefix_commit.then_some(target),
            &full_sha,
            &author,
        ))
    }

    fn amend_commit_message(&self, sha: &str, target: &str) -> Result<String> {
        let message = self.backport_message(sha, target)?;
        if let Err(e) = self.git.run(&["commit", "--amend", "-m", &message]) {
            self.progress
                .on_warning(&format!("Failed to amend the commit message: {e}"));
        }
        Ok(message)
    }

    fn commit_resolution(&self, attempt: &AttemptBranch) -> Result<String> {
        if !self.git.cherry_pick_in_progress() {
            // paused by --no-push: the commit already carries its final message
            return self.git.commit_message("HEAD");
        }
        let message = self.backport_message(&attempt.short_sha, &attempt.target)?;
        self.git
            .run(&["commit", "-a", "--allow-empty", "-m", &message])?;
        Ok(message)
    }

    async fn push_to_remote(
        &self,
        base: &str,
        head: &str,
        message: &str,
    ) -> Result<(bool, Option<PublishOutcome>)> {
        self.set_state(WorkflowState::PushingToRemote)?;

        let refspec = format!("{head}:{head}");
        if let Err(e) = self.git.run(&["push", &self.options.pr_remote, &refspec]) {
            self.progress.on_warning(&format!(
                "Failed to push to {}: {e}",
                self.options.pr_remote
            ));
            self.set_state(WorkflowState::PushingToRemoteFailed)?;
            return Ok((false, None));
        }
        self.set_state(WorkflowState::PushedToRemote)?;

        self.set_state(match self.publisher.mode() {
            PublishMode::Api => WorkflowState::PrCreating,
            PublishMode::Browser => WorkflowState::PrOpening,
        })?;

        let publish = match self.publish(base, head, message).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.progress
                    .on_warning(&format!("Failed to publish the pull request: {e}"));
                None
            }
        };
        Ok((true, publish))
    }

    async fn publish(&self, base: &str, head: &str, message: &str) -> Result<PublishOutcome> {
        let (title, body) = normalize_commit_message(message);
        let request = PrRequest {
            base: base.to_string(),
            head: head.to_string(),
            head_owner: self.username()?,
            title: pr_title(&title, base, self.options.prefix_commit),
            body,
        };
        self.publisher.publish(&request).await
    }

    fn set_state(&self, state: WorkflowState) -> Result<()> {
        self.state.set(state)?;
        self.progress.on_state(state);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.state.pause(self.config_ref.as_ref())?;
        self.progress.on_state(WorkflowState::BackportPaused);
        Ok(())
    }

    fn reset_on_error<T>(&self, result: Result<T>) -> Result<T> {
        if result.is_err()
            && let Err(e) = self.state.reset()
        {
            self.progress
                .on_warning(&format!("Failed to reset the workflow state: {e}"));
        }
        result
    }
}

fn check_repo(git: &Git, config: &Config) -> Result<()> {
    if git.has_commit(&config.check_sha) {
        Ok(())
    } else {
        Err(Error::InvalidRepo {
            repo: config.repo.clone(),
            check_sha: config.check_sha.clone(),
        })
    }
}

fn original_branch(git: &Git, default_branch: &str) -> Result<String> {
    let current = git.current_branch()?;
    if current == "HEAD" || branch::parse(&current).is_ok() {
        Ok(default_branch.to_string())
    } else {
        Ok(current)
    }
}
