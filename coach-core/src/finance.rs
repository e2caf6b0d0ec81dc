//! Finance record types: transactions, category totals, and the category catalog

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A categorized spend transaction. Read-only input to every computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    /// Local wall-clock time of the transaction
    pub timestamp: NaiveDateTime,
    /// Positive = money spent
    pub amount: Decimal,
    /// Normalized category name (the catalog key)
    pub category_key: String,
    /// Category label as it appeared in the source statement
    #[serde(default)]
    pub raw_category: Option<String>,
}

impl TransactionRecord {
    pub fn new(timestamp: NaiveDateTime, amount: Decimal, category_key: impl Into<String>) -> Self {
        Self {
            timestamp,
            amount,
            category_key: category_key.into(),
            raw_category: None,
        }
    }

    pub fn with_raw_category(mut self, raw: impl Into<String>) -> Self {
        self.raw_category = Some(raw.into());
        self
    }
}

/// Format a currency amount as `12.34`, rounding half to even first.
pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Sum amounts, clamping at `Decimal::MAX`/`Decimal::MIN` instead of overflowing.
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sum of one category's transactions over a period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category_key: String,
    pub total: Decimal,
}

/// Catalog entry for a spending category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Display name, used as the category key
    pub key: String,
    /// Raw statement label this category was first seen as
    pub raw_name: String,
    /// Optional grouping, e.g. "Food & Drink"
    pub group: Option<String>,
    #[serde(default = "default_discretionary")]
    pub discretionary: bool,
}

fn default_discretionary() -> bool {
    true
}

impl Category {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            raw_name: key.clone(),
            key,
            group: None,
            discretionary: true,
        }
    }

    pub fn with_raw_name(mut self, raw_name: impl Into<String>) -> Self {
        self.raw_name = raw_name.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}
