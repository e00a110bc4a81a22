//! Insight composer
//!
//! Turns aggregates into a [`PromptPayload`], the structured material both
//! narrative generators format on their own, and renders the deterministic
//! rule-based narrative from it.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::{round_money, share_percent, Aggregates, NO_CATEGORY};
use crate::models::{Category, ExpenseDataset};

/// Currency marker used in every rendered amount
pub const CURRENCY_SYMBOL: &str = "₹";

/// A category above this share of total spend gets a concentration warning
pub const CONCENTRATION_THRESHOLD_PERCENT: u32 = 40;

const CLOSING_TIP: &str =
    "💡 Tip: Track your expenses regularly to identify patterns and save more!";

/// Render an amount with the currency marker and exactly 2 fractional digits
pub fn format_money(amount: Decimal) -> String {
    format!("{}{}", CURRENCY_SYMBOL, round_money(amount))
}

/// One line of the category breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLine {
    pub category: Category,
    pub amount: Decimal,
    /// Percentage of total spend
    pub share: Decimal,
}

/// Facts handed to a narrative generator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptPayload {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    /// Breakdown in category declaration order
    pub categories: Vec<CategoryLine>,
    pub top_category: Option<CategoryLine>,
}

impl PromptPayload {
    /// Whether the top category exceeds the concentration threshold
    pub fn concentration_warning(&self) -> Option<&CategoryLine> {
        self.top_category
            .as_ref()
            .filter(|top| top.share > Decimal::from(CONCENTRATION_THRESHOLD_PERCENT))
    }

    /// Breakdown as `- CATEGORY: ₹amount` lines
    pub fn category_breakdown(&self) -> String {
        self.categories
            .iter()
            .map(|line| format!("- {}: {}", line.category, format_money(line.amount)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Variables for prompt template rendering
    pub fn template_vars(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert("start_date", self.start_date.format("%Y-%m-%d").to_string());
        vars.insert("end_date", self.end_date.format("%Y-%m-%d").to_string());
        vars.insert("total", format_money(self.total));
        vars.insert("count", self.count.to_string());
        vars.insert("average", format_money(self.average));
        vars.insert("category_breakdown", self.category_breakdown());
        vars.insert(
            "top_category",
            self.top_category
                .as_ref()
                .map(|t| t.category.as_str())
                .unwrap_or(NO_CATEGORY)
                .to_string(),
        );
        vars
    }
}

/// Bundle the window and aggregates for a narrative generator
pub fn compose_prompt(dataset: &ExpenseDataset, aggregates: &Aggregates) -> PromptPayload {
    let line = |(category, amount): (Category, Decimal)| CategoryLine {
        category,
        amount,
        share: share_percent(amount, aggregates.total),
    };

    PromptPayload {
        start_date: dataset.start_date(),
        end_date: dataset.end_date(),
        total: aggregates.total,
        count: aggregates.count,
        average: aggregates.average,
        categories: aggregates.category_totals.iter().map(line).collect(),
        top_category: aggregates
            .top_category
            .zip(aggregates.top_category_amount())
            .map(line),
    }
}

/// Deterministic narrative for a dataset, without any network dependency
pub fn compose_fallback_narrative(dataset: &ExpenseDataset, aggregates: &Aggregates) -> String {
    fallback_narrative(&compose_prompt(dataset, aggregates))
}

/// Rule-based narrative text for a payload
pub fn fallback_narrative(payload: &PromptPayload) -> String {
    let mut text = String::from("📊 Expense Summary\n\n");

    let _ = write!(
        text,
        "During this period, you spent a total of {} across {} transactions.\n\n",
        format_money(payload.total),
        payload.count
    );

    if let Some(top) = &payload.top_category {
        let _ = write!(
            text,
            "💰 Your highest spending category is {} with {}.\n\n",
            top.category,
            format_money(top.amount)
        );
    }

    if let Some(top) = payload.concentration_warning() {
        let _ = write!(
            text,
            "⚠️ Alert: {} represents {}% of your total spending. Consider reviewing this category.\n\n",
            top.category,
            round_money(top.share)
        );
    }

    if payload.count > 0 {
        let _ = write!(
            text,
            "📈 Average transaction: {}\n\n",
            format_money(payload.average)
        );
    }

    text.push_str(CLOSING_TIP);
    text
}
