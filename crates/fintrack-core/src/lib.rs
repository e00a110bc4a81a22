//! FinTrack Core Library
//!
//! Expense analysis engine for the FinTrack expense tracker:
//! - Expense data model and validated date-window datasets
//! - Deterministic aggregation with exact decimal arithmetic
//! - Insight composer producing generator-neutral prompt payloads
//! - Pluggable narrative generation (OpenAI-compatible, rule-based fallback)
//! - Prompt library with user overrides
//! - Report assembly with single-attempt remote narrative and fallback

pub mod aggregate;
pub mod ai;
pub mod compose;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod report;

/// Test utilities including mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{aggregate, Aggregates, CategoryTotals, NO_CATEGORY};
pub use ai::{
    MockBackend, MockOutcome, NarrativeBackend, NarrativeClient, OpenAIBackend,
    RuleBasedNarrator,
};
pub use compose::{
    compose_fallback_narrative, compose_prompt, format_money, CategoryLine, PromptPayload,
};
pub use config::NarrativeConfig;
pub use error::{Error, GenerationUnavailable, Result};
pub use models::{Category, ExpenseDataset, ExpenseRecord, PaymentMethod};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use report::{AnalysisReport, InsightSource, ReportBuilder};
