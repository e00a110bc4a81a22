//! Deterministic rule-based narrator

use async_trait::async_trait;

use crate::compose::{fallback_narrative, PromptPayload};

use super::{GenerationResult, NarrativeBackend};

/// Narrative generator that works from the numbers alone
///
/// Always succeeds; identical payloads produce identical text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedNarrator;

impl RuleBasedNarrator {
    pub fn narrate(&self, payload: &PromptPayload) -> String {
        fallback_narrative(payload)
    }
}

#[async_trait]
impl NarrativeBackend for RuleBasedNarrator {
    async fn generate(&self, payload: &PromptPayload) -> GenerationResult {
        Ok(self.narrate(payload))
    }

    fn model(&self) -> &str {
        "rule-based"
    }

    fn host(&self) -> &str {
        "local"
    }
}
