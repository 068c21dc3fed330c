//! Backport planning - pure functions
//!
//! Turns the raw target lines given on the command line into an ordered,
//! validated list of attempts. No I/O happens here.

use crate::branch::{encode, normalize_target, sort_branches};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// One attempt: apply the change onto `target` through `branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportStep {
    /// Normalised target line
    pub target: String,
    /// Attempt branch name
    pub branch: String,
}

impl std::fmt::Display for BackportStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} via {}", self.target, self.branch)
    }
}

/// Backport plan - the functional core output
///
/// Steps are ordered newest target line first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportPlan {
    /// Full hash of the change being backported
    pub commit_sha: String,
    /// Ordered attempts
    pub steps: Vec<BackportStep>,
}

impl BackportPlan {
    /// Target lines in execution order
    pub fn targets(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.target.as_str()).collect()
    }
}

/// Create the backport plan (PURE)
///
/// Fails when no lines are given, when a line has no version in its name, or
/// when two lines map onto the same attempt branch.
pub fn create_backport_plan<S: AsRef<str>>(commit_sha: &str, lines: &[S]) -> Result<BackportPlan> {
    if lines.is_empty() {
        return Err(Error::Usage(
            "at least one branch must be specified".to_string(),
        ));
    }

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut targets = Vec::with_capacity(lines.len());
    for raw in lines {
        let raw = raw.as_ref();
        let target = normalize_target(raw);
        let branch = encode(commit_sha, &target)?;
        if let Some(first) = seen.get(&branch) {
            return Err(Error::DuplicateTarget {
                first: first.clone(),
                second: raw.to_string(),
                branch,
            });
        }
        seen.insert(branch, raw.to_string());
        targets.push(target);
    }

    let steps = sort_branches(&targets)?
        .into_iter()
        .map(|target| {
            encode(commit_sha, &target).map(|branch| BackportStep { target, branch })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BackportPlan {
        commit_sha: commit_sha.to_string(),
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "22a594a0047d7706537ff2ac676cdc0f1dcb329c";

    #[test]
    fn test_plan_sorts_newest_first() {
        let plan = create_backport_plan(SHA, &["2.7", "3.10", "3.6"]).unwrap();
        assert_eq!(plan.targets(), vec!["3.10", "3.6", "2.7"]);
        assert_eq!(plan.steps[0].branch, "backport-22a594a-3.10");
    }

    #[test]
    fn test_plan_normalises_lines() {
        let plan = create_backport_plan(SHA, &[" 3.6/"]).unwrap();
        assert_eq!(plan.targets(), vec!["3.6"]);
        assert_eq!(plan.steps[0].branch, "backport-22a594a-3.6");
    }

    #[test]
    fn test_plan_requires_lines() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            create_backport_plan(SHA, &empty),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn test_plan_rejects_versionless_line() {
        match create_backport_plan(SHA, &["3.6", "main"]) {
            Err(Error::InvalidTarget(name)) => assert_eq!(name, "main"),
            other => panic!("Expected InvalidTarget, got: {other:?}"),
        }
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        match create_backport_plan(SHA, &["3.6", "3.7", "3.6/"]) {
            Err(Error::DuplicateTarget {
                first,
                second,
                branch,
            }) => {
                assert_eq!(first, "3.6");
                assert_eq!(second, "3.6/");
                assert_eq!(branch, "backport-22a594a-3.6");
            }
            other => panic!("Expected DuplicateTarget, got: {other:?}"),
        }
    }

    #[test]
    fn test_step_display() {
        let plan = create_backport_plan(SHA, &["3.9"]).unwrap();
        assert_eq!(plan.steps[0].to_string(), "3.9 via backport-22a594a-3.9");
    }
}
