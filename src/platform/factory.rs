//! Publisher selection

use crate::config::Config;
use crate::error::Result;
use crate::platform::{BrowserPublisher, GitHubPublisher, PrPublisher};
use tracing::debug;

/// Environment variable holding the GitHub token for API publishing
pub const GH_AUTH_ENV: &str = "GH_AUTH";

/// API publisher when a token is available, browser publisher otherwise
pub fn create_publisher(
    config: &Config,
    token: Option<String>,
    dry_run: bool,
) -> Result<Box<dyn PrPublisher>> {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => {
            debug!("publishing through the GitHub API");
            Ok(Box::new(
                GitHubPublisher::new(token, config.team.clone(), config.repo.clone())?
                    .with_dry_run(dry_run),
            ))
        }
        None => {
            debug!("publishing through the browser");
            Ok(Box::new(
                BrowserPublisher::new(config.team.clone(), config.repo.clone())
                    .with_dry_run(dry_run),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublishMode;

    #[test]
    fn test_token_selects_api() {
        let publisher = create_publisher(&Config::default(), Some("t".into()), false).unwrap();
        assert_eq!(publisher.mode(), PublishMode::Api);
    }

    #[test]
    fn test_missing_or_empty_token_selects_browser() {
        let config = Config::default();
        assert_eq!(
            create_publisher(&config, None, false).unwrap().mode(),
            PublishMode::Browser
        );
        assert_eq!(
            create_publisher(&config, Some(String::new()), false)
                .unwrap()
                .mode(),
            PublishMode::Browser
        );
    }
}
