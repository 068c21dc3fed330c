//! Git access through the `git` command line
//!
//! The checkout is the source of truth for tree state, history and
//! conflicts; nothing here caches it.

mod executor;
mod repository;

pub use executor::Git;
pub use repository::ApplyOutcome;
