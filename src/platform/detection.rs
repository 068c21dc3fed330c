//! Fork owner detection from remote URLs

use crate::error::{Error, Result};
use url::Url;

/// Owner of the repository a remote points at
///
/// Handles `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo` and
/// scp-like `git@host:owner/repo.git`. The owner is the second-to-last path
/// segment.
pub fn parse_remote_owner(remote_url: &str) -> Result<String> {
    let trimmed = remote_url.trim().trim_end_matches('/');

    let segments: Vec<String> = match Url::parse(trimmed) {
        Ok(url) if url.has_host() => url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(str::to_string).collect())
            .unwrap_or_default(),
        // scp-like syntax uses ':' between host and path
        _ => trimmed
            .replace(':', "/")
            .split('/')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
    };

    if segments.len() < 2 {
        return Err(Error::RemoteUrl(remote_url.to_string()));
    }
    Ok(segments[segments.len() - 2].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https() {
        assert_eq!(
            parse_remote_owner("https://github.com/mock_user/cpython.git").unwrap(),
            "mock_user"
        );
        assert_eq!(
            parse_remote_owner("https://github.com/mock_user/cpython").unwrap(),
            "mock_user"
        );
    }

    #[test]
    fn test_scp_like() {
        assert_eq!(
            parse_remote_owner("git@github.com:mock_user/cpython.git").unwrap(),
            "mock_user"
        );
    }

    #[test]
    fn test_ssh_scheme() {
        assert_eq!(
            parse_remote_owner("ssh://git@github.com/mock_user/cpython.git").unwrap(),
            "mock_user"
        );
    }

    #[test]
    fn test_trailing_slash_and_newline() {
        assert_eq!(
            parse_remote_owner("https://github.com/mock_user/cpython/\n").unwrap(),
            "mock_user"
        );
    }

    #[test]
    fn test_no_owner() {
        assert!(matches!(
            parse_remote_owner("cpython"),
            Err(Error::RemoteUrl(_))
        ));
        assert!(parse_remote_owner("https://github.com/").is_err());
    }
}
