//! Backport commands: start, continue, abort, status

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize, arrow, check, cross, hyperlink};
use anstream::println;
use cherry_picker::backport::{
    AbortOutcome, BackportOptions, BackportOutcome, ContinueOutcome, LineReport, PauseReason,
};
use cherry_picker::error::Result;
use cherry_picker::types::PublishOutcome;
use std::path::Path;

/// What the invocation should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a new backport
    Backport,
    /// Continue a paused backport
    Continue,
    /// Abort a paused backport
    Abort,
    /// Show `git status`
    Status,
}

/// Options shared by all actions
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Log mutating commands instead of running them
    pub dry_run: bool,
    /// Explicit config reference
    pub config_path: Option<String>,
    /// Workflow options
    pub backport: BackportOptions,
}

/// Run one action in the repository at `path`
pub async fn run_command(path: &Path, action: Action, options: CommandOptions) -> Result<()> {
    println!("🐍 🍒 ⛏");

    let commit_sha = options.backport.commit_sha.clone();
    let ctx = CommandContext::new(
        path,
        options.dry_run,
        options.config_path.as_deref(),
        options.backport,
    )?;
    let picker = &ctx.picker;

    match action {
        Action::Backport => {
            let outcome = picker.backport().await?;
            print_backport_outcome(&commit_sha, &outcome, options.dry_run);
        }
        Action::Continue => {
            let outcome = picker.continue_cherry_pick().await?;
            print_continue_outcome(&outcome);
        }
        Action::Abort => {
            let outcome = picker.abort_cherry_pick()?;
            print_abort_outcome(&outcome);
        }
        Action::Status => {
            println!("{}", picker.status()?);
        }
    }
    Ok(())
}

fn print_backport_outcome(commit_sha: &str, outcome: &BackportOutcome, dry_run: bool) {
    match outcome {
        BackportOutcome::Completed { lines } => {
            println!();
            for line in lines {
                print_line_report(line);
            }
            if dry_run {
                println!("{}", "Dry run complete".muted());
            } else {
                println!(
                    "{} {} branch(es)",
                    format!("{CHECK} Backport complete:").success(),
                    lines.len().accent()
                );
            }
        }
        BackportOutcome::Paused {
            target,
            branch,
            reason: PauseReason::Conflict,
        } => println!("{}", conflict_message(commit_sha, target, branch)),
        BackportOutcome::Paused {
            branch,
            reason: PauseReason::NoPush,
            ..
        } => println!("{}", no_push_message(commit_sha, branch)),
    }
}

fn print_continue_outcome(outcome: &ContinueOutcome) {
    match outcome {
        ContinueOutcome::Completed { line, message } => {
            print_line_report(line);
            println!();
            println!("{}", "Backport PR:".emphasis());
            println!();
            println!("{message}");
        }
        ContinueOutcome::Failed { branch, .. } => {
            println!(
                "{}",
                format!("Nothing continued: {branch} is not a backport branch.").muted()
            );
        }
    }
}

fn print_abort_outcome(outcome: &AbortOutcome) {
    let marker = if outcome.aborted { check() } else { cross() };
    println!("{marker} Cherry-pick aborted");
    if let Some(branch) = &outcome.removed_branch {
        println!("  {} removed {}", arrow(), branch.accent());
    }
}

fn print_line_report(line: &LineReport) {
    let marker = if line.pushed { check() } else { cross() };
    println!("{marker} {} {} {}", line.target.emphasis(), arrow(), line.branch.accent());
    match &line.publish {
        Some(PublishOutcome::Created { url }) => {
            println!("  Backport PR created at {}", hyperlink(url));
        }
        Some(PublishOutcome::Opened { url }) => {
            println!("  Backport PR URL: {}", hyperlink(url));
        }
        Some(PublishOutcome::DryRun { url }) => {
            println!("  {}", format!("dry-run: Create new PR: {url}").muted());
        }
        None => {}
    }
    if !line.pushed && !line.branch_removed {
        println!("  {}", format!("branch {} kept for manual recovery", line.branch).muted());
    }
}

/// Instructions printed when a line conflicts
pub fn conflict_message(commit_sha: &str, target: &str, branch: &str) -> String {
    format!(
        "
Failed to cherry-pick {commit_sha} into {target} ☹
Left on branch {branch}.
... Stopping here.

To continue and resolve the conflict:
    $ cherry_picker --status  # to find out which files need attention
    # Fix the conflict
    $ cherry_picker --status  # should now say 'all conflict fixed'
    $ cherry_picker --continue

To abort the cherry-pick and cleanup:
    $ cherry_picker --abort
"
    )
}

/// Instructions printed when a line was applied with `--no-push`
pub fn no_push_message(commit_sha: &str, branch: &str) -> String {
    format!(
        "
Finished cherry-pick {commit_sha} into {branch} 😀
--no-push option used.
... Stopping here.
To continue and push the changes:
    $ cherry_picker --continue

To abort the cherry-pick and cleanup:
    $ cherry_picker --abort
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_lists_recovery_commands() {
        let message = conflict_message("22a594a", "3.6", "backport-22a594a-3.6");
        assert!(message.contains("Failed to cherry-pick 22a594a into 3.6"));
        assert!(message.contains("cherry_picker --continue"));
        assert!(message.contains("cherry_picker --abort"));
    }

    #[test]
    fn test_no_push_message() {
        let message = no_push_message("22a594a", "backport-22a594a-3.6");
        assert!(message.contains("--no-push option used."));
        assert!(message.contains("into backport-22a594a-3.6"));
    }
}
