//! Git config backend for workflow state.

use super::StateStore;
use crate::error::{Error, Result};
use crate::git::Git;

/// Section of the local git config that holds cherry-picker state.
pub const STATE_SECTION: &str = "cherry-picker";

/// Stores workflow state under `cherry-picker.<key>` in `git config --local`.
///
/// Writes always execute, even when the wrapped [`Git`] is in dry-run mode,
/// so a dry run can still pause and resume.
#[derive(Debug, Clone)]
pub struct GitConfigStore {
    git: Git,
}

impl GitConfigStore {
    /// Store backed by the repository `git` operates on.
    pub const fn new(git: Git) -> Self {
        Self { git }
    }

    fn qualified(key: &str) -> String {
        format!("{STATE_SECTION}.{key}")
    }
}

impl StateStore for GitConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .git
            .query(&["config", "--local", "--get", &Self::qualified(key)])
        {
            Ok(value) => Ok(Some(value)),
            // missing keys exit non-zero without printing anything
            Err(Error::Command { output, .. }) if output.is_empty() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.git
            .exec(&["config", "--local", &Self::qualified(key), value])?;
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        match self
            .git
            .exec(&["config", "--local", "--unset-all", &Self::qualified(key)])
        {
            Ok(_) => Ok(()),
            Err(Error::Command { output, .. }) if output.is_empty() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
