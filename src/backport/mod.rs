//! Backport engine
//!
//! Two-phase pattern:
//! 1. Plan - validate, sort and name the attempts (pure, testable)
//! 2. Execute - apply, push, publish and clean up (effectful, resumable)

pub mod message;
mod orchestrator;
mod plan;
mod progress;

pub use orchestrator::{
    AbortOutcome, BackportOptions, BackportOutcome, CherryPicker, ContinueOutcome, LineReport,
    PauseReason,
};
pub use plan::{BackportPlan, BackportStep, create_backport_plan};
pub use progress::{NoopProgress, ProgressCallback};
