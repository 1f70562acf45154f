use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::registry::CategoryRule;

/// A single cell as handed over by a row source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl CellValue {
    /// True for the empty text cell, which decoders emit for blank cells.
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(text) if text.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(number) => write!(f, "{}", number),
            CellValue::Date(date) => write!(f, "{}", date),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Date(value)
    }
}

/// One decoded spreadsheet row, keyed by header name in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing an earlier cell with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    /// Stringified cell value, or an empty string when the cell is absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(ToString::to_string).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

/// A row that matched a category and earned cashback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingTransaction {
    pub id: String,
    pub date: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    /// Amount cell exactly as it appeared in the row
    pub raw_amount: String,
    pub amount: Decimal,
    pub cashback: Decimal,
}

/// Cashback accumulated for one category during a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpendResult {
    pub name: String,
    pub percentage: Decimal,
    pub limit: Decimal,
    pub keywords: Vec<String>,
    pub cashback: Decimal,
    pub contributing_transactions: Vec<ContributingTransaction>,
}

impl CategorySpendResult {
    /// A zeroed result carrying its own copy of the rule's fields.
    pub fn from_rule(rule: &CategoryRule) -> Self {
        Self {
            name: rule.name.clone(),
            percentage: rule.percentage,
            limit: rule.limit,
            keywords: rule.keywords.clone(),
            cashback: Decimal::ZERO,
            contributing_transactions: Vec::new(),
        }
    }

    /// Adds the transaction to this category.
    ///
    /// Returns `false`, leaving the result untouched, when the running total
    /// would overflow.
    pub fn record(&mut self, transaction: ContributingTransaction) -> bool {
        let Some(total) = self.cashback.checked_add(transaction.cashback) else {
            return false;
        };
        self.cashback = total;
        self.contributing_transactions.push(transaction);
        true
    }

    /// Share of the limit already earned, in percent. Not clamped, but
    /// saturates at `Decimal::MAX`.
    pub fn limit_progress(&self) -> Decimal {
        if self.limit <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.cashback
            .checked_div(self.limit)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    }

    pub fn limit_progress_clamped(&self) -> Decimal {
        self.limit_progress().min(Decimal::ONE_HUNDRED)
    }

    pub fn is_limit_reached(&self) -> bool {
        self.limit_progress() >= Decimal::ONE_HUNDRED
    }
}

/// Outcome of a classification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    /// Rows received
    pub processed_count: usize,
    /// Rows whose account and transaction type matched the card
    pub relevant_count: usize,
    pub results: Vec<CategorySpendResult>,
}

impl ClassificationSummary {
    pub fn total_cashback(&self) -> Decimal {
        self.results
            .iter()
            .fold(Decimal::ZERO, |total, r| total.saturating_add(r.cashback))
    }

    pub fn matched_count(&self) -> usize {
        self.results
            .iter()
            .map(|r| r.contributing_transactions.len())
            .sum()
    }

    pub fn result(&self, name: &str) -> Option<&CategorySpendResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
