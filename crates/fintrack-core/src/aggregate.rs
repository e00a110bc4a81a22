//! Deterministic spending aggregates
//!
//! Pure functions over an [`ExpenseDataset`]: no I/O, no shared state.
//! All arithmetic is exact decimal; results are presented with 2 fractional
//! digits and half-up rounding.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{Category, ExpenseDataset};

/// Label used for the top category when there is no spending
pub const NO_CATEGORY: &str = "N/A";

/// Round half-up to 2 fractional digits and pin the scale to 2
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// `part` as a percentage of `total`, 2 digits half-up (0 when total is 0)
pub fn share_percent(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return round_money(Decimal::ZERO);
    }
    round_money(part * Decimal::ONE_HUNDRED / total)
}

/// Summed amount per category
///
/// Only categories with at least one record are present. Iteration follows
/// [`Category`] declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(BTreeMap<Category, Decimal>);

impl CategoryTotals {
    pub fn get(&self, category: Category) -> Option<Decimal> {
        self.0.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        self.0.iter().map(|(c, a)| (*c, *a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all category amounts
    pub fn sum(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    /// Category with the largest amount; the earliest declared wins ties
    pub fn max(&self) -> Option<(Category, Decimal)> {
        let mut best: Option<(Category, Decimal)> = None;
        for (category, amount) in self.iter() {
            match best {
                Some((_, top)) if amount <= top => {}
                _ => best = Some((category, amount)),
            }
        }
        best
    }

    fn add(&mut self, category: Category, amount: Decimal) {
        *self.0.entry(category).or_insert(Decimal::ZERO) += amount;
    }
}

/// Numeric facts about a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub category_totals: CategoryTotals,
    pub top_category: Option<Category>,
}

impl Aggregates {
    /// Top category name, or [`NO_CATEGORY`] for an empty dataset
    pub fn top_category_label(&self) -> &'static str {
        self.top_category
            .map(|c| c.as_str())
            .unwrap_or(NO_CATEGORY)
    }

    pub fn top_category_amount(&self) -> Option<Decimal> {
        self.top_category
            .and_then(|c| self.category_totals.get(c))
    }

    /// Share of the top category in the total, as a percentage
    pub fn top_category_share(&self) -> Option<Decimal> {
        self.top_category_amount()
            .map(|amount| share_percent(amount, self.total))
    }
}

/// Compute totals, average and per-category breakdown
pub fn aggregate(dataset: &ExpenseDataset) -> Aggregates {
    let mut total = Decimal::ZERO;
    let mut totals = CategoryTotals::default();

    for record in dataset.records() {
        total += record.amount;
        totals.add(record.category, record.amount);
    }

    for amount in totals.0.values_mut() {
        amount.rescale(2);
    }
    total.rescale(2);

    let count = dataset.len();
    let average = if count == 0 {
        round_money(Decimal::ZERO)
    } else {
        round_money(total / Decimal::from(count))
    };

    let top_category = totals.max().map(|(category, _)| category);

    Aggregates {
        total,
        count,
        average,
        category_totals: totals,
        top_category,
    }
}
