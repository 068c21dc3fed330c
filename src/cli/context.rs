//! Shared command context for CLI commands
//!
//! Wires the library pieces together for one invocation.

use crate::cli::CliProgress;
use cherry_picker::backport::{BackportOptions, CherryPicker};
use cherry_picker::config::load_config;
use cherry_picker::error::Result;
use cherry_picker::git::Git;
use cherry_picker::platform::{GH_AUTH_ENV, create_publisher};
use cherry_picker::state::{CONFIG_PATH_KEY, GitConfigStore, StateStore};
use std::path::Path;
use std::sync::Arc;

/// Everything a command needs to run
///
/// Setup order matters: the config reference remembered by a paused run is
/// read before the configuration is loaded, and the repository is validated
/// before the persisted state is trusted.
pub struct CommandContext {
    /// The workflow engine
    pub picker: CherryPicker,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(
        path: &Path,
        dry_run: bool,
        config_path: Option<&str>,
        options: BackportOptions,
    ) -> Result<Self> {
        let progress = Arc::new(CliProgress::new());
        let git = Git::new(path)
            .with_dry_run(dry_run)
            .with_progress(progress);

        let store = GitConfigStore::new(git.clone());
        let remembered = if git.is_repository() {
            store.get(CONFIG_PATH_KEY)?
        } else {
            None
        };
        let loaded = load_config(&git, config_path, remembered.as_deref())?;

        let token = std::env::var(GH_AUTH_ENV).ok();
        let publisher = create_publisher(&loaded.config, token, dry_run)?;

        let picker = CherryPicker::new(git, Box::new(store), publisher, loaded, options)?;
        Ok(Self { picker })
    }
}
