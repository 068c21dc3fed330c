//! Mock PR publisher and progress recorder for testing

#![allow(dead_code)]

use async_trait::async_trait;
use cherry_picker::backport::ProgressCallback;
use cherry_picker::error::{Error, Result};
use cherry_picker::platform::PrPublisher;
use cherry_picker::types::{PrRequest, PublishMode, PublishOutcome, WorkflowState};
use std::sync::{Arc, Mutex};

/// Mock publisher recording every request
///
/// Clones share their call log, so a test can keep one handle while the
/// orchestrator owns another.
///
/// Features:
/// - Call tracking for verification
/// - Configurable publish mode
/// - Error injection for failure path testing
#[derive(Clone)]
pub struct MockPublisher {
    mode: PublishMode,
    requests: Arc<Mutex<Vec<PrRequest>>>,
    error_on_publish: Arc<Mutex<Option<String>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::with_mode(PublishMode::Api)
    }

    pub fn with_mode(mode: PublishMode) -> Self {
        Self {
            mode,
            requests: Arc::new(Mutex::new(Vec::new())),
            error_on_publish: Arc::new(Mutex::new(None)),
        }
    }

    pub fn boxed(&self) -> Box<dyn PrPublisher> {
        Box::new(self.clone())
    }

    pub fn fail_publish(&self, msg: &str) {
        *self.error_on_publish.lock().unwrap() = Some(msg.to_string());
    }

    pub fn get_requests(&self) -> Vec<PrRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn assert_published(&self, head: &str, base: &str) {
        let requests = self.get_requests();
        assert!(
            requests.iter().any(|r| r.head == head && r.base == base),
            "Expected publish for {head} -> {base}, got: {requests:?}"
        );
    }
}

#[async_trait]
impl PrPublisher for MockPublisher {
    fn mode(&self) -> PublishMode {
        self.mode
    }

    async fn publish(&self, request: &PrRequest) -> Result<PublishOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(msg) = self.error_on_publish.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(PublishOutcome::Created {
            url: format!("https://github.com/python/cpython/pull/{}", self.get_requests().len()),
        })
    }
}

/// Progress sink that records everything it is told
#[derive(Default)]
pub struct RecordingProgress {
    pub messages: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub dry_runs: Mutex<Vec<String>>,
    pub states: Mutex<Vec<WorkflowState>>,
}

impl RecordingProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn dry_runs(&self) -> Vec<String> {
        self.dry_runs.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<WorkflowState> {
        self.states.lock().unwrap().clone()
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn on_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn on_dry_run(&self, command: &str) {
        self.dry_runs.lock().unwrap().push(command.to_string());
    }

    fn on_state(&self, state: WorkflowState) {
        self.states.lock().unwrap().push(state);
    }
}
