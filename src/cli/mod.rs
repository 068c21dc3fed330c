//! CLI commands and terminal rendering

mod backport;
mod context;
pub mod style;

pub use backport::{Action, CommandOptions, run_command};

use anstream::{eprintln, println};
use cherry_picker::backport::ProgressCallback;
use cherry_picker::types::WorkflowState;
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;
use style::{Stylize, check, cross, spinner_style};

/// Renders workflow progress on the terminal
///
/// Fetching and pushing show a spinner; everything else is printed as it
/// arrives, above the spinner if one is running.
#[derive(Default)]
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a progress renderer
    pub fn new() -> Self {
        Self::default()
    }

    fn spinner(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.spinner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn start_spinner(&self, message: String) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Some(previous) = self.spinner().replace(spinner) {
            previous.finish_and_clear();
        }
    }

    fn finish_spinner(&self, message: String) {
        if let Some(spinner) = self.spinner().take() {
            spinner.finish_with_message(message);
        }
    }

    fn print(&self, line: &str, to_stderr: bool) {
        let print = || {
            if to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        };
        match self.spinner().as_ref() {
            Some(spinner) => spinner.suspend(print),
            None => print(),
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_message(&self, message: &str) {
        self.print(message, false);
    }

    fn on_warning(&self, message: &str) {
        self.print(&format!("{} {}", cross(), message.warn()), true);
    }

    fn on_dry_run(&self, command: &str) {
        self.print(&format!("  dry-run: {command}").muted(), false);
    }

    fn on_state(&self, state: WorkflowState) {
        tracing::debug!(%state, "state changed");
        match state {
            WorkflowState::FetchingUpstream => self.start_spinner("Fetching upstream...".to_string()),
            WorkflowState::FetchedUpstream => {
                self.finish_spinner(format!("{} Fetched upstream", check()));
            }
            WorkflowState::PushingToRemote => self.start_spinner("Pushing...".to_string()),
            WorkflowState::PushedToRemote => self.finish_spinner(format!("{} Pushed", check())),
            WorkflowState::PushingToRemoteFailed => {
                self.finish_spinner(format!("{} Push failed", cross()));
            }
            _ => {}
        }
    }
}
