//! Attempt branch naming and target line ordering
//!
//! An attempt branch is named `backport-<short-sha>-<target-line>`. The name
//! is the only record tying an in-flight attempt to its commit and target
//! line, so decoding is strict: anything this tool would not have created is
//! rejected with a [`BranchNameError`].

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Literal first component of every attempt branch
pub const BRANCH_PREFIX: &str = "backport";

/// Number of hash characters kept in the branch name
pub const SHORT_SHA_LEN: usize = 7;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)+").expect("version regex is valid"));

static SHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{7,40}$").expect("sha regex is valid"));

/// Why a branch name is not a valid attempt branch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BranchNameError {
    /// Fewer than three `-`-separated fields
    #[error("expected backport-<sha>-<branch>")]
    MissingParts,
    /// First field is not `backport`
    #[error("branch name is not prefixed with \"backport-\" (found \"{0}\")")]
    WrongPrefix(String),
    /// Second field is not 7 to 40 lowercase hex digits
    #[error("branch name has an invalid sha: {0}")]
    InvalidSha(String),
    /// Second field does not name a commit in this repository
    #[error("the sha listed in the branch name, {0}, is not present in the repository")]
    UnknownCommit(String),
    /// Third field has no dotted version number
    #[error("branch {0} seems to not have a version in its name")]
    NoVersion(String),
}

/// Resolves whether a revision names an existing commit
pub trait CommitLookup {
    /// Returns true if `rev` resolves to a commit
    fn has_commit(&self, rev: &str) -> bool;
}

impl<F: Fn(&str) -> bool> CommitLookup for F {
    fn has_commit(&self, rev: &str) -> bool {
        self(rev)
    }
}

/// A decoded attempt branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptBranch {
    /// Hash prefix of the commit being backported
    pub short_sha: String,
    /// Target line the attempt applies to
    pub target: String,
}

impl AttemptBranch {
    /// Build the attempt for `change_id` on `target`
    pub fn new(change_id: &str, target: &str) -> Result<Self> {
        version_from_branch(target)?;
        Ok(Self {
            short_sha: change_id.chars().take(SHORT_SHA_LEN).collect(),
            target: target.to_string(),
        })
    }

    /// The branch name
    pub fn name(&self) -> String {
        format!("{BRANCH_PREFIX}-{}-{}", self.short_sha, self.target)
    }
}

impl std::fmt::Display for AttemptBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{BRANCH_PREFIX}-{}-{}", self.short_sha, self.target)
    }
}

/// Encode `(change_id, target)` into the attempt branch name
pub fn encode(change_id: &str, target: &str) -> Result<String> {
    AttemptBranch::new(change_id, target).map(|attempt| attempt.name())
}

/// Parse a branch name without consulting the repository
pub fn parse(name: &str) -> std::result::Result<AttemptBranch, BranchNameError> {
    // target lines may contain dashes themselves, so only split twice
    let mut parts = name.splitn(3, '-');
    let (Some(prefix), Some(sha), Some(target)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(BranchNameError::MissingParts);
    };

    if prefix != BRANCH_PREFIX {
        return Err(BranchNameError::WrongPrefix(prefix.to_string()));
    }

    if !SHA_RE.is_match(sha) {
        return Err(BranchNameError::InvalidSha(sha.to_string()));
    }

    if extract_version(target).is_none() {
        return Err(BranchNameError::NoVersion(target.to_string()));
    }

    Ok(AttemptBranch {
        short_sha: sha.to_string(),
        target: target.to_string(),
    })
}

/// Parse a branch name and check that its hash names a commit in the repository
pub fn decode(
    name: &str,
    lookup: &impl CommitLookup,
) -> std::result::Result<AttemptBranch, BranchNameError> {
    let attempt = parse(name)?;
    if !lookup.has_commit(&attempt.short_sha) {
        return Err(BranchNameError::UnknownCommit(attempt.short_sha));
    }
    Ok(attempt)
}

/// Extract the dotted version of a branch name, e.g. `(3, 10)` from `release-3.10-lts`
pub fn version_from_branch(branch: &str) -> Result<Vec<u64>> {
    extract_version(branch).ok_or_else(|| Error::InvalidTarget(branch.to_string()))
}

fn extract_version(branch: &str) -> Option<Vec<u64>> {
    let found = VERSION_RE.find(branch)?;
    found
        .as_str()
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

/// Normalise a target line as typed by a user
pub fn normalize_target(line: &str) -> String {
    line.trim().trim_end_matches('/').to_string()
}

/// Sort target lines newest first by their numeric version
pub fn sort_branches<S: AsRef<str>>(branches: &[S]) -> Result<Vec<String>> {
    let mut keyed = branches
        .iter()
        .map(|b| {
            let name = b.as_ref();
            version_from_branch(name).map(|version| (version, name.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(keyed.into_iter().map(|(_, name)| name).collect())
}
