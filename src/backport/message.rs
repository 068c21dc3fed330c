//! Commit message rewriting - pure functions

use regex::Regex;
use std::sync::LazyLock;

static ISSUE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("issue reference regex is valid"));

/// Rewrite `#123` issue references to `GH-123`
pub fn fix_issue_refs(message: &str) -> String {
    ISSUE_REF_RE.replace_all(message, "GH-$1").into_owned()
}

/// Build the message of a backported commit
///
/// `[<base>] ` is prepended when `base` is given; the provenance line and a
/// co-author trailer crediting the original author are appended.
pub fn build_backport_message(
    message: &str,
    base: Option<&str>,
    full_sha: &str,
    author: &str,
) -> String {
    let prefix = base.map(|b| format!("[{b}] ")).unwrap_or_default();
    format!(
        "{prefix}{message}\n(cherry picked from commit {full_sha})\n\n\nCo-authored-by: {author}"
    )
}

/// Split a commit message into pull request title and body
///
/// The title is the first line; the body is the rest with leading blank
/// lines removed.
pub fn normalize_commit_message(message: &str) -> (String, String) {
    match message.split_once('\n') {
        Some((title, body)) => (title.to_string(), body.trim_start_matches('\n').to_string()),
        None => (message.to_string(), String::new()),
    }
}

/// Title used for an API-created pull request
///
/// Commits that were not prefixed still get the target line in the title.
pub fn pr_title(title: &str, base: &str, commit_prefixed: bool) -> String {
    if commit_prefixed {
        title.to_string()
    } else {
        format!("[{base}] {title}")
    }
}
