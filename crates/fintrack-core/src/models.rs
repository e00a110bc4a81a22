//! Expense data model
//!
//! Records are produced by the persistence layer and only read here. An
//! [`ExpenseDataset`] is the validated, immutable view the analysis engine
//! works on.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest amount a single expense may carry (10 digits, 2 fractional)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Expense category
///
/// Variant order is significant: it is the iteration order of category
/// totals and therefore the tie-break order for the top category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Food,
    Transportation,
    Utilities,
    Entertainment,
    Healthcare,
    Shopping,
    Education,
    Travel,
    Housing,
    Insurance,
    Savings,
    Other,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 12] = [
        Category::Food,
        Category::Transportation,
        Category::Utilities,
        Category::Entertainment,
        Category::Healthcare,
        Category::Shopping,
        Category::Education,
        Category::Travel,
        Category::Housing,
        Category::Insurance,
        Category::Savings,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "FOOD",
            Category::Transportation => "TRANSPORTATION",
            Category::Utilities => "UTILITIES",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Healthcare => "HEALTHCARE",
            Category::Shopping => "SHOPPING",
            Category::Education => "EDUCATION",
            Category::Travel => "TRAVEL",
            Category::Housing => "HOUSING",
            Category::Insurance => "INSURANCE",
            Category::Savings => "SAVINGS",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    DigitalWallet,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::DigitalWallet,
        PaymentMethod::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::CreditCard => "CREDIT_CARD",
            PaymentMethod::DebitCard => "DEBIT_CARD",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
            PaymentMethod::DigitalWallet => "DIGITAL_WALLET",
            PaymentMethod::Other => "OTHER",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PaymentMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown payment method: {}", s))
    }
}

/// A single expense as exposed by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Positive amount with at most 2 fractional digits
    pub amount: Decimal,
    pub category: Category,
    #[serde(alias = "expenseDate")]
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub vendor: Option<String>,
}

/// One user's expenses over an inclusive date window
///
/// Records are expected newest first. Construction is the only place the
/// dataset contract is checked; the fields are private so every value of
/// this type satisfies it.
#[derive(Debug, Clone)]
pub struct ExpenseDataset {
    start_date: NaiveDate,
    end_date: NaiveDate,
    records: Vec<ExpenseRecord>,
}

impl ExpenseDataset {
    /// Build a dataset, rejecting inputs that break the window contract
    ///
    /// Fails with [`Error::DatasetContract`] when `end_date` precedes
    /// `start_date`, a record falls outside the window, or an amount is not
    /// positive, exceeds [`MAX_AMOUNT`], or has more than 2 fractional digits.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        records: Vec<ExpenseRecord>,
    ) -> Result<Self> {
        if end_date < start_date {
            return Err(Error::DatasetContract(format!(
                "window end {} is before start {}",
                end_date, start_date
            )));
        }

        for record in &records {
            if record.date < start_date || record.date > end_date {
                return Err(Error::DatasetContract(format!(
                    "expense {} dated {} is outside {}..={}",
                    record.id, record.date, start_date, end_date
                )));
            }
            if record.amount <= Decimal::ZERO {
                return Err(Error::DatasetContract(format!(
                    "expense {} has non-positive amount {}",
                    record.id, record.amount
                )));
            }
            if record.amount > MAX_AMOUNT {
                return Err(Error::DatasetContract(format!(
                    "expense {} amount {} exceeds {}",
                    record.id, record.amount, MAX_AMOUNT
                )));
            }
            if record.amount.normalize().scale() > 2 {
                return Err(Error::DatasetContract(format!(
                    "expense {} amount {} has more than 2 fractional digits",
                    record.id, record.amount
                )));
            }
        }

        Ok(Self {
            start_date,
            end_date,
            records,
        })
    }

    /// An empty dataset for the given window
    pub fn empty(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        Self::new(start_date, end_date, Vec::new())
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, amount: Decimal, day: u32) -> ExpenseRecord {
        ExpenseRecord {
            id,
            title: format!("Expense {}", id),
            description: None,
            amount,
            category: Category::Food,
            date: date(2024, 3, day),
            payment_method: PaymentMethod::Cash,
            vendor: None,
        }
    }

    #[test]
    fn test_category_declaration_order() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
        assert_eq!(Category::ALL[0], Category::Food);
        assert_eq!(Category::ALL[11], Category::Other);
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!("food".parse::<Category>().unwrap(), Category::Food);
        assert!("GROCERIES".parse::<Category>().is_err());
    }

    #[test]
    fn test_payment_method_serde_names() {
        let json = serde_json::to_string(&PaymentMethod::DigitalWallet).unwrap();
        assert_eq!(json, "\"DIGITAL_WALLET\"");
        assert_eq!(
            "credit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
    }

    #[test]
    fn test_record_accepts_expense_date_alias() {
        let json = r#"{
            "id": 7,
            "title": "Lunch",
            "amount": "12.50",
            "category": "FOOD",
            "expenseDate": "2024-03-05",
            "paymentMethod": "DEBIT_CARD",
            "vendor": "Cafe"
        }"#;
        let record: ExpenseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, date(2024, 3, 5));
        assert_eq!(record.amount, dec!(12.50));
        assert_eq!(record.payment_method, PaymentMethod::DebitCard);
        assert!(record.description.is_none());
    }

    #[test]
    fn test_dataset_rejects_reversed_window() {
        let result = ExpenseDataset::empty(date(2024, 3, 31), date(2024, 3, 1));
        assert!(matches!(result, Err(Error::DatasetContract(_))));
    }

    #[test]
    fn test_dataset_allows_single_day_window() {
        let dataset = ExpenseDataset::new(
            date(2024, 3, 5),
            date(2024, 3, 5),
            vec![record(1, dec!(10.00), 5)],
        )
        .unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_dataset_rejects_record_outside_window() {
        let result = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 10),
            vec![record(1, dec!(10.00), 15)],
        );
        assert!(matches!(result, Err(Error::DatasetContract(_))));
    }

    #[test]
    fn test_dataset_rejects_non_positive_amount() {
        let result = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 31),
            vec![record(1, dec!(0.00), 2)],
        );
        assert!(matches!(result, Err(Error::DatasetContract(_))));
    }

    #[test]
    fn test_dataset_rejects_sub_cent_amount() {
        let result = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 31),
            vec![record(1, dec!(10.005), 2)],
        );
        assert!(matches!(result, Err(Error::DatasetContract(_))));
    }

    #[test]
    fn test_dataset_accepts_trailing_zero_scale() {
        // 10.500 has scale 3 but only 1 significant fractional digit
        let dataset = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 31),
            vec![record(1, dec!(10.500), 2)],
        );
        assert!(dataset.is_ok());
    }

    #[test]
    fn test_max_amount_value() {
        assert_eq!(MAX_AMOUNT, dec!(99999999.99));
    }

    #[test]
    fn test_dataset_amount_bounds() {
        let at_limit = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 31),
            vec![record(1, dec!(99999999.99), 2)],
        );
        assert!(at_limit.is_ok());

        let over = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 31),
            vec![record(1, dec!(100000000.00), 2)],
        );
        assert!(matches!(over, Err(Error::DatasetContract(_))));

        let huge = ExpenseDataset::new(
            date(2024, 3, 1),
            date(2024, 3, 31),
            vec![record(1, dec!(1000000000000000000000000000), 2)],
        );
        assert!(matches!(huge, Err(Error::DatasetContract(_))));
    }
}
