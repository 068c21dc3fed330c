//! Pull request publishing
//!
//! A backport is offered for review either by creating the pull request
//! through the GitHub REST API (when a token is available) or by opening the
//! comparison page in a browser for a human to submit.

mod browser;
mod detection;
mod factory;
mod github;

pub use browser::{BrowserPublisher, compare_url};
pub use detection::parse_remote_owner;
pub use factory::{GH_AUTH_ENV, create_publisher};
pub use github::{GitHubPublisher, GITHUB_API_URL};

use crate::error::Result;
use crate::types::{PrRequest, PublishMode, PublishOutcome};
use async_trait::async_trait;

/// Publishes one pull request per pushed attempt branch
#[async_trait]
pub trait PrPublisher: Send + Sync {
    /// How this publisher offers the pull request
    fn mode(&self) -> PublishMode;

    /// Create or open the pull request for `request`
    async fn publish(&self, request: &PrRequest) -> Result<PublishOutcome>;
}
