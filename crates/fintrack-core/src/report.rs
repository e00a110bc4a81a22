//! Analysis report assembly
//!
//! `aggregate -> compose -> remote narrative (once) -> fallback on any failure`.
//! Narrative problems never fail a report; they only change which generator
//! wrote the text.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, Aggregates, CategoryTotals};
use crate::ai::{GenerationResult, NarrativeBackend, NarrativeClient, RuleBasedNarrator};
use crate::compose::{compose_prompt, PromptPayload};
use crate::config::NarrativeConfig;
use crate::error::GenerationUnavailable;
use crate::models::ExpenseDataset;

/// Which generator produced the narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    Ai,
    RuleBased,
}

impl InsightSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightSource::Ai => "ai",
            InsightSource::RuleBased => "rule_based",
        }
    }
}

/// Flat analysis result, serialized as the API response body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub total_expenses: Decimal,
    pub expense_count: usize,
    pub category_breakdown: CategoryTotals,
    pub average_expense: Decimal,
    pub top_category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ai_insights: String,
    pub insight_source: InsightSource,
}

impl AnalysisReport {
    fn assemble(
        dataset: &ExpenseDataset,
        aggregates: Aggregates,
        narrative: String,
        source: InsightSource,
    ) -> Self {
        Self {
            total_expenses: aggregates.total,
            expense_count: aggregates.count,
            average_expense: aggregates.average,
            top_category: aggregates.top_category_label().to_string(),
            category_breakdown: aggregates.category_totals,
            start_date: dataset.start_date(),
            end_date: dataset.end_date(),
            ai_insights: narrative,
            insight_source: source,
        }
    }
}

/// Builds reports, trying the remote narrative once before falling back
pub struct ReportBuilder {
    remote: Option<NarrativeClient>,
    fallback: RuleBasedNarrator,
    remote_timeout: Duration,
}

impl ReportBuilder {
    pub fn new(remote: NarrativeClient, remote_timeout: Duration) -> Self {
        Self {
            remote: Some(remote),
            fallback: RuleBasedNarrator,
            remote_timeout,
        }
    }

    /// Remote client and timeout taken from configuration
    pub fn from_config(config: &NarrativeConfig) -> Self {
        Self::new(NarrativeClient::from_config(config), config.timeout)
    }

    /// Never attempt the remote narrative
    pub fn offline() -> Self {
        Self {
            remote: None,
            fallback: RuleBasedNarrator,
            remote_timeout: Duration::ZERO,
        }
    }

    pub fn remote(&self) -> Option<&NarrativeClient> {
        self.remote.as_ref()
    }

    /// Build the report for a dataset
    pub async fn build_report(&self, dataset: &ExpenseDataset) -> AnalysisReport {
        self.build_report_with_cancel(dataset, std::future::pending())
            .await
    }

    /// Build the report, abandoning the remote wait once `cancelled` resolves
    ///
    /// Cancellation only short-circuits the remote call; the report is still
    /// produced with the rule-based narrative.
    pub async fn build_report_with_cancel<F>(
        &self,
        dataset: &ExpenseDataset,
        cancelled: F,
    ) -> AnalysisReport
    where
        F: Future<Output = ()>,
    {
        let aggregates = aggregate(dataset);
        let payload = compose_prompt(dataset, &aggregates);

        let (narrative, source) = match self.attempt_remote(&payload, cancelled).await {
            Ok(text) => (text, InsightSource::Ai),
            Err(e) => {
                warn!(error = %e, "AI insights unavailable, using rule-based narrative");
                (self.fallback.narrate(&payload), InsightSource::RuleBased)
            }
        };

        info!(
            count = aggregates.count,
            source = source.as_str(),
            "Analysis report assembled"
        );
        AnalysisReport::assemble(dataset, aggregates, narrative, source)
    }

    async fn attempt_remote<F>(&self, payload: &PromptPayload, cancelled: F) -> GenerationResult
    where
        F: Future<Output = ()>,
    {
        let Some(remote) = &self.remote else {
            return Err(GenerationUnavailable::Disabled);
        };

        debug!(model = remote.model(), host = remote.host(), "Attempting remote narrative");
        tokio::select! {
            result = tokio::time::timeout(self.remote_timeout, remote.generate(payload)) => {
                result.unwrap_or(Err(GenerationUnavailable::Timeout(self.remote_timeout)))
            }
            _ = cancelled => Err(GenerationUnavailable::Cancelled),
        }
    }
}
