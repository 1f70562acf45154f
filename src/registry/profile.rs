use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::CategorySpendResult;

/// The seven columns a card profile needs to read from every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Date,
    Account,
    Category,
    Subcategory,
    Description,
    Amount,
    TransactionType,
}

impl LogicalField {
    pub const ALL: [LogicalField; 7] = [
        LogicalField::Date,
        LogicalField::Account,
        LogicalField::Category,
        LogicalField::Subcategory,
        LogicalField::Description,
        LogicalField::Amount,
        LogicalField::TransactionType,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LogicalField::Date => "date",
            LogicalField::Account => "account",
            LogicalField::Category => "category",
            LogicalField::Subcategory => "subcategory",
            LogicalField::Description => "description",
            LogicalField::Amount => "amount",
            LogicalField::TransactionType => "transaction type",
        }
    }
}

/// Header names of the logical fields in an uploaded sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: String,
    pub account: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub amount: String,
    pub transaction_type: String,
}

impl ColumnMapping {
    pub fn column(&self, field: LogicalField) -> &str {
        match field {
            LogicalField::Date => &self.date,
            LogicalField::Account => &self.account,
            LogicalField::Category => &self.category,
            LogicalField::Subcategory => &self.subcategory,
            LogicalField::Description => &self.description,
            LogicalField::Amount => &self.amount,
            LogicalField::TransactionType => &self.transaction_type,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, &str)> {
        LogicalField::ALL
            .into_iter()
            .map(move |field| (field, self.column(field)))
    }
}

/// Headers of the money-manager export both built-in cards read.
impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            account: "Account".to_string(),
            category: "Category".to_string(),
            subcategory: "Subcategory".to_string(),
            description: "Note".to_string(),
            amount: "Amount".to_string(),
            transaction_type: "Income/Expense".to_string(),
        }
    }
}

/// A cashback bucket: rate, display limit and keyword triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    /// Percent of the transaction amount paid back, 0 to 100
    pub percentage: Decimal,
    /// Shown against the earned cashback; never caps it
    pub limit: Decimal,
    /// Matched case-insensitively, in order. Empty keywords never match.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, percentage: Decimal, limit: Decimal, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            percentage,
            limit,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// First keyword, in configured order, found inside `description`.
    ///
    /// `description` must already be lowercased. Empty keywords never match.
    pub fn first_match(&self, description: &str) -> Option<&str> {
        self.keywords
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .find(|keyword| description.contains(keyword.to_lowercase().as_str()))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProfile {
    pub key: String,
    /// Display name, also compared against each row's account column
    pub name: String,
    pub categories: Vec<CategoryRule>,
    pub columns: ColumnMapping,
}

impl CardProfile {
    /// Zeroed results, one per category rule, sharing nothing with `self`.
    pub fn fresh_spend_results(&self) -> Vec<CategorySpendResult> {
        self.categories
            .iter()
            .map(CategorySpendResult::from_rule)
            .collect()
    }
}
