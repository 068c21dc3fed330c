//! Project configuration
//!
//! Configuration lives in `.cherry_picker.toml` and is always read from the
//! object store at a specific revision (`<rev>:<path>`), never from the
//! working tree, so checking out an old maintenance line does not change the
//! settings of a run in progress.

use crate::error::{Error, Result};
use crate::git::Git;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Name of the configuration file looked up at the repository root
pub const CONFIG_FILE: &str = ".cherry_picker.toml";

/// Settings for one project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub organisation owning the upstream repository
    pub team: String,
    /// Upstream repository name
    pub repo: String,
    /// A commit that must exist in any clone of the project
    pub check_sha: String,
    /// Rewrite `#123` issue references to `GH-123`
    pub fix_commit_msg: bool,
    /// Branch checked out after an attempt branch is removed
    pub default_branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team: "python".to_string(),
            repo: "cpython".to_string(),
            check_sha: "7f777ed95a19224294949e1b4ce56bbffcb1fe9f".to_string(),
            fix_commit_msg: true,
            default_branch: "main".to_string(),
        }
    }
}

impl Config {
    /// Parse TOML, keeping defaults for keys it does not set
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// A `<revision>:<path>` pointer to a configuration blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRef {
    /// Revision the file is read at
    pub revision: String,
    /// Path relative to the repository root
    pub path: String,
}

impl ConfigRef {
    /// Interpret a user supplied reference relative to `head`
    ///
    /// A bare path is read at `head`, as is one with an empty revision.
    pub fn resolve(raw: &str, head: &str) -> Self {
        match raw.split_once(':') {
            Some((revision, path)) => Self {
                revision: if revision.is_empty() {
                    head.to_string()
                } else {
                    revision.to_string()
                },
                path: path.to_string(),
            },
            None => Self {
                revision: head.to_string(),
                path: raw.to_string(),
            },
        }
    }
}

impl fmt::Display for ConfigRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.revision, self.path)
    }
}

impl FromStr for ConfigRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (revision, path) = s.split_once(':').ok_or_else(|| {
            Error::Config(format!("'{s}' must start with a revision followed by ':'"))
        })?;
        Ok(Self {
            revision: revision.to_string(),
            path: path.to_string(),
        })
    }
}

/// Configuration together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    /// Effective settings
    pub config: Config,
    /// Blob they were read from, `None` when only defaults apply
    pub config_ref: Option<ConfigRef>,
}

/// Resolve and read the configuration
///
/// Priority: `explicit`, then `remembered` (from a paused run), then
/// [`CONFIG_FILE`] at `HEAD` if it exists there. A reference that was asked
/// for but cannot be read is an error; a missing default file is not.
/// Outside a repository only the defaults apply.
pub fn load_config(
    git: &Git,
    explicit: Option<&str>,
    remembered: Option<&str>,
) -> Result<LoadedConfig> {
    if !git.is_repository() {
        debug!("not a git repository, using default config");
        return Ok(LoadedConfig {
            config: Config::default(),
            config_ref: None,
        });
    }
    let head = git.resolve_commit("HEAD")?;

    let requested = explicit.filter(|p| !p.is_empty()).or(remembered);
    let config_ref = match requested {
        Some(raw) => Some(ConfigRef::resolve(raw, &head)),
        None => find_default(git, &head),
    };

    let Some(config_ref) = config_ref else {
        debug!("no config file, using defaults");
        return Ok(LoadedConfig {
            config: Config::default(),
            config_ref: None,
        });
    };

    debug!(config = %config_ref, "loading config");
    let content = git
        .read_blob(&config_ref.to_string())
        .map_err(|e| Error::Config(format!("cannot read {config_ref}: {e}")))?;

    Ok(LoadedConfig {
        config: Config::from_toml(&content)?,
        config_ref: Some(config_ref),
    })
}

fn find_default(git: &Git, head: &str) -> Option<ConfigRef> {
    let candidate = ConfigRef {
        revision: head.to_string(),
        path: CONFIG_FILE.to_string(),
    };
    (git.object_type(&candidate.to_string()).as_deref() == Some("blob")).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.team, "python");
        assert_eq!(config.repo, "cpython");
        assert!(config.fix_commit_msg);
    }

    #[test]
    fn test_partial_file_overlays_defaults() {
        let config = Config::from_toml(
            r#"
            team = "octo"
            fix_commit_msg = false
            unknown_key = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.team, "octo");
        assert!(!config.fix_commit_msg);
        assert_eq!(config.repo, "cpython");
        assert_eq!(config.default_branch, "main");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("team = "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_resolve_bare_path_uses_head() {
        let r = ConfigRef::resolve("conf/picker.toml", "abc123");
        assert_eq!(r.to_string(), "abc123:conf/picker.toml");
    }

    #[test]
    fn test_resolve_empty_revision_uses_head() {
        let r = ConfigRef::resolve(":picker.toml", "abc123");
        assert_eq!(r.revision, "abc123");
        assert_eq!(r.path, "picker.toml");
    }

    #[test]
    fn test_resolve_keeps_explicit_revision() {
        let r = ConfigRef::resolve("v1.0:picker.toml", "abc123");
        assert_eq!(r.revision, "v1.0");
    }

    #[test]
    fn test_parse_requires_revision() {
        assert!("picker.toml".parse::<ConfigRef>().is_err());
        let r: ConfigRef = "deadbeef:.cherry_picker.toml".parse().unwrap();
        assert_eq!(r.path, ".cherry_picker.toml");
    }
}
