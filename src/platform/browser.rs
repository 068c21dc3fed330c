//! Browser publisher: opens the GitHub comparison page

use crate::error::{Error, Result};
use crate::platform::PrPublisher;
use crate::types::{PrRequest, PublishMode, PublishOutcome};
use async_trait::async_trait;
use std::process::{Command, Stdio};
use tracing::debug;

/// Comparison page that pre-fills a pull request from `owner:head` into `base`
pub fn compare_url(team: &str, repo: &str, base: &str, owner: &str, head: &str) -> String {
    format!("https://github.com/{team}/{repo}/compare/{base}...{owner}:{head}?expand=1")
}

/// Opens the comparison page so a human can submit the pull request
#[derive(Debug, Clone)]
pub struct BrowserPublisher {
    team: String,
    repo: String,
    dry_run: bool,
}

impl BrowserPublisher {
    /// Publisher for `team/repo`
    pub const fn new(team: String, repo: String) -> Self {
        Self {
            team,
            repo,
            dry_run: false,
        }
    }

    /// Only report the URL
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[async_trait]
impl PrPublisher for BrowserPublisher {
    fn mode(&self) -> PublishMode {
        PublishMode::Browser
    }

    async fn publish(&self, request: &PrRequest) -> Result<PublishOutcome> {
        let url = compare_url(
            &self.team,
            &self.repo,
            &request.base,
            &request.head_owner,
            &request.head,
        );
        if self.dry_run {
            return Ok(PublishOutcome::DryRun { url });
        }
        open_in_browser(&url)?;
        Ok(PublishOutcome::Opened { url })
    }
}

fn opener() -> Command {
    if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    }
}

fn open_in_browser(url: &str) -> Result<()> {
    debug!(%url, "opening browser");
    opener()
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("cannot open browser: {e}"))))?;
    Ok(())
}
