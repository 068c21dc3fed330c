//! cherry-picker: backport a merged commit to maintenance branches
//!
//! The library drives `git` as a subprocess, persists workflow progress in the
//! repository's local git config, and opens one pull request per target line.

pub mod backport;
pub mod branch;
pub mod config;
pub mod error;
pub mod git;
pub mod platform;
pub mod state;
pub mod types;

pub use backport::CherryPicker;
pub use error::{Error, Result};
