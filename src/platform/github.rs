//! GitHub REST publisher

use crate::error::{Error, Result};
use crate::platform::PrPublisher;
use crate::types::{PrRequest, PublishMode, PublishOutcome};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Public GitHub API root
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct CreatePrPayload<'a> {
    title: &'a str,
    body: &'a str,
    head: String,
    base: &'a str,
    maintainer_can_modify: bool,
}

#[derive(Deserialize)]
struct CreatedPr {
    html_url: String,
}

/// Creates pull requests through `POST /repos/{team}/{repo}/pulls`
pub struct GitHubPublisher {
    client: Client,
    token: String,
    team: String,
    repo: String,
    api_url: String,
    dry_run: bool,
}

impl GitHubPublisher {
    /// Create a publisher for `team/repo` authenticating with `token`
    pub fn new(token: String, team: String, repo: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent("cherry-picker")
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::GitHubApi(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            team,
            repo,
            api_url: GITHUB_API_URL.to_string(),
            dry_run: false,
        })
    }

    /// Send requests to a different API root (GitHub Enterprise, tests)
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Report the request instead of sending it
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Endpoint pull requests are created at
    pub fn pulls_url(&self) -> String {
        format!("{}/repos/{}/{}/pulls", self.api_url, self.team, self.repo)
    }
}

impl std::fmt::Debug for GitHubPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubPublisher")
            .field("team", &self.team)
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PrPublisher for GitHubPublisher {
    fn mode(&self) -> PublishMode {
        PublishMode::Api
    }

    async fn publish(&self, request: &PrRequest) -> Result<PublishOutcome> {
        let url = self.pulls_url();
        if self.dry_run {
            debug!(%url, head = %request.head, "dry-run: not creating PR");
            return Ok(PublishOutcome::DryRun { url });
        }

        debug!(head = %request.head, base = %request.base, "creating PR");
        let payload = CreatePrPayload {
            title: &request.title,
            body: &request.body,
            head: format!("{}:{}", request.head_owner, request.head),
            base: &request.base,
            maintainer_can_modify: true,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to create PR: {e}")))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await;
            return Err(Error::GitHubApi(rejection_message(status, body)));
        }

        let created: CreatedPr = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to parse created PR: {e}")))?;

        debug!(url = %created.html_url, "created PR");
        Ok(PublishOutcome::Created {
            url: created.html_url,
        })
    }
}

/// Status plus response body, or the reason the body could not be read
fn rejection_message<E: std::fmt::Display>(
    status: StatusCode,
    body: std::result::Result<String, E>,
) -> String {
    match body {
        Ok(body) => format!("{status}: {body}"),
        Err(e) => format!("{status}: failed to read response body: {e}"),
    }
}
