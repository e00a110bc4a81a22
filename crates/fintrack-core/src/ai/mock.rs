//! Mock backend for testing
//!
//! Counts every `generate` call so tests can assert whether the remote slot
//! was consulted, and can be told to succeed, fail, or never answer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::compose::PromptPayload;
use crate::error::GenerationUnavailable;

use super::{GenerationResult, NarrativeBackend};

/// What the mock does when asked to generate
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this text
    Respond(String),
    /// Fail with a malformed-response error
    Fail,
    /// Never complete
    Hang,
}

/// Mock narrative backend
///
/// Clones share the call counter.
#[derive(Debug, Clone)]
pub struct MockBackend {
    outcome: MockOutcome,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A mock that answers with a short summary of the payload
    pub fn new() -> Self {
        Self::with_outcome(MockOutcome::Respond(String::new()))
    }

    pub fn responding(text: &str) -> Self {
        Self::with_outcome(MockOutcome::Respond(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_outcome(MockOutcome::Fail)
    }

    pub fn hanging() -> Self {
        Self::with_outcome(MockOutcome::Hang)
    }

    pub fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeBackend for MockBackend {
    async fn generate(&self, payload: &PromptPayload) -> GenerationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.outcome {
            MockOutcome::Respond(text) if text.is_empty() => Ok(format!(
                "Mock insight: {} transactions between {} and {}.",
                payload.count, payload.start_date, payload.end_date
            )),
            MockOutcome::Respond(text) => Ok(text.clone()),
            MockOutcome::Fail => Err(GenerationUnavailable::MalformedResponse(
                "mock failure".into(),
            )),
            MockOutcome::Hang => {
                std::future::pending::<()>().await;
                Err(GenerationUnavailable::Cancelled)
            }
        }
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
