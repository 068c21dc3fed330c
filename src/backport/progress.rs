//! Progress reporting for the backport workflow

use crate::types::WorkflowState;

/// Receives human-readable progress from the orchestrator
///
/// The library never prints; the CLI renders these events, tests record them.
pub trait ProgressCallback: Send + Sync {
    /// Informational step ("Now backporting ...")
    fn on_message(&self, message: &str);

    /// A failure the workflow reports but survives (push, publish, cleanup)
    fn on_warning(&self, message: &str);

    /// A command that would have run outside of dry-run mode
    fn on_dry_run(&self, command: &str);

    /// The persisted workflow state changed
    fn on_state(&self, _state: WorkflowState) {}
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_message(&self, _message: &str) {}
    fn on_warning(&self, _message: &str) {}
    fn on_dry_run(&self, _command: &str) {}
}
