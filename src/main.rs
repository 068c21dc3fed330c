//! cherry_picker - backport a merged commit to maintenance branches

mod cli;

use anstream::eprintln;
use cherry_picker::backport::BackportOptions;
use clap::{ArgGroup, Parser};
use cli::style::Stylize;
use cli::{Action, CommandOptions, run_command};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
const LOG_ENV: &str = "CHERRY_PICKER_LOG";

/// cherry-pick COMMIT_SHA1 into target BRANCHES
#[derive(Parser, Debug)]
#[command(name = "cherry_picker", version, about)]
#[command(group(ArgGroup::new("action").args(["abort", "resume", "status"])))]
struct Cli {
    /// Prints out the commands, but does not execute them
    #[arg(long)]
    dry_run: bool,

    /// git remote to use for PR branches
    #[arg(long, value_name = "REMOTE", default_value = "origin")]
    pr_remote: String,

    /// Abort current cherry-pick and clean up branch
    #[arg(long)]
    abort: bool,

    /// Continue cherry-pick, push, and clean up branch
    #[arg(long = "continue")]
    resume: bool,

    /// Get the status of cherry-pick
    #[arg(long)]
    status: bool,

    /// Changes won't be pushed to remote
    #[arg(long)]
    no_push: bool,

    /// Don't prefix the commit message with the target branch
    #[arg(long)]
    no_prefix: bool,

    /// Path to config file, .cherry_picker.toml from project root by default.
    /// You can prepend a colon-separated Git 'commitish' reference.
    #[arg(long, value_name = "CONFIG-PATH")]
    config_path: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Commit to backport
    commit_sha1: Option<String>,

    /// Target branches
    branches: Vec<String>,
}

impl Cli {
    const fn action(&self) -> Action {
        if self.abort {
            Action::Abort
        } else if self.resume {
            Action::Continue
        } else if self.status {
            Action::Status
        } else {
            Action::Backport
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "cherry_picker=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let action = cli.action();
    let options = CommandOptions {
        dry_run: cli.dry_run,
        config_path: cli.config_path,
        backport: BackportOptions {
            commit_sha: cli.commit_sha1.unwrap_or_default(),
            branches: cli.branches,
            pr_remote: cli.pr_remote,
            push: !cli.no_push,
            prefix_commit: !cli.no_prefix,
        },
    };

    match run_command(Path::new("."), action, options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".error());
            ExitCode::FAILURE
        }
    }
}
