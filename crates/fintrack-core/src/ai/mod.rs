//! Pluggable narrative generation
//!
//! # Architecture
//!
//! - `NarrativeBackend` trait: one operation, `generate(payload)`, which either
//!   returns text or a [`GenerationUnavailable`] reason
//! - `NarrativeClient` enum: concrete wrapper for the remote slot, providing
//!   Clone + compile-time dispatch
//! - Backend implementations: `OpenAIBackend` (remote), `MockBackend` (tests)
//! - `RuleBasedNarrator`: deterministic fallback that never fails
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = NarrativeConfig::load(None)?;
//! let client = NarrativeClient::from_config(&config);
//! match client.generate(&payload).await {
//!     Ok(text) => println!("{}", text),
//!     Err(e) => println!("{}", RuleBasedNarrator.narrate(&payload)),
//! }
//! ```

mod mock;
mod openai;
mod rule_based;

pub use mock::{MockBackend, MockOutcome};
pub use openai::OpenAIBackend;
pub use rule_based::RuleBasedNarrator;

use async_trait::async_trait;

use crate::compose::PromptPayload;
use crate::config::NarrativeConfig;
use crate::error::GenerationUnavailable;

/// Result of a narrative generation attempt
pub type GenerationResult = std::result::Result<String, GenerationUnavailable>;

/// Interface shared by all narrative generators
///
/// Backends hold no per-request mutable state, so one instance can serve
/// concurrent reports.
#[async_trait]
pub trait NarrativeBackend: Send + Sync {
    /// Produce narrative text for the payload
    async fn generate(&self, payload: &PromptPayload) -> GenerationResult;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete remote narrative client
#[derive(Clone)]
pub enum NarrativeClient {
    /// OpenAI chat completions (or any compatible server)
    OpenAI(OpenAIBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl NarrativeClient {
    /// Create the remote client from configuration
    ///
    /// A missing or placeholder credential still yields a client; its
    /// `generate` reports the credential problem without any network I/O.
    pub fn from_config(config: &NarrativeConfig) -> Self {
        NarrativeClient::OpenAI(OpenAIBackend::new(config))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        NarrativeClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl NarrativeBackend for NarrativeClient {
    async fn generate(&self, payload: &PromptPayload) -> GenerationResult {
        match self {
            NarrativeClient::OpenAI(b) => b.generate(payload).await,
            NarrativeClient::Mock(b) => b.generate(payload).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            NarrativeClient::OpenAI(b) => b.model(),
            NarrativeClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            NarrativeClient::OpenAI(b) => b.host(),
            NarrativeClient::Mock(b) => b.host(),
        }
    }
}
