//! Budget evaluation: compare monthly category spend against configured limits.

use crate::aggregate::category_spend;
use crate::error::{CoachError, Result};
use crate::finance::{money, TransactionRecord};
use crate::month::MonthKey;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Default share of the limit at which a budget counts as near its limit.
pub const DEFAULT_NEAR_LIMIT_THRESHOLD: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// A monthly spending limit for one category. Keyed by (category, month).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetLimit {
    pub category_key: String,
    pub month: MonthKey,
    pub limit: Decimal,
}

impl BudgetLimit {
    pub fn new(category_key: impl Into<String>, month: MonthKey, limit: Decimal) -> Self {
        Self {
            category_key: category_key.into(),
            month,
            limit,
        }
    }

    pub fn same_key(&self, other: &BudgetLimit) -> bool {
        self.category_key == other.category_key && self.month == other.month
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetState {
    Ok,
    NearLimit,
    OverLimit,
}

impl BudgetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetState::Ok => "OK",
            BudgetState::NearLimit => "NEAR_LIMIT",
            BudgetState::OverLimit => "OVER_LIMIT",
        }
    }

    /// Lowercase phrase for sentences, e.g. "near limit"
    pub fn phrase(&self) -> &'static str {
        match self {
            BudgetState::Ok => "ok",
            BudgetState::NearLimit => "near limit",
            BudgetState::OverLimit => "over limit",
        }
    }

    /// Classify `spent` against `limit`. Over wins over near; zero limits are over as soon as
    /// anything (including nothing) is spent.
    pub fn classify(spent: Decimal, limit: Decimal, threshold: Decimal) -> Self {
        if spent >= limit {
            BudgetState::OverLimit
        } else if spent >= threshold * limit {
            BudgetState::NearLimit
        } else {
            BudgetState::Ok
        }
    }
}

impl fmt::Display for BudgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived status of one budget for one month. Serializes with its coaching `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub category_key: String,
    pub month: MonthKey,
    pub limit: Decimal,
    pub spent: Decimal,
    pub status: BudgetState,
}

impl BudgetStatus {
    /// limit - spent; negative once over budget
    pub fn remaining(&self) -> Decimal {
        self.limit - self.spent
    }

    /// How far spend exceeds the limit, zero when within it
    pub fn overage(&self) -> Decimal {
        (self.spent - self.limit).max(Decimal::ZERO)
    }

    /// Coaching sentence for this status
    pub fn message(&self) -> String {
        let cat = &self.category_key;
        match self.status {
            BudgetState::OverLimit => format!(
                "You've exceeded your {cat} budget of ${} by ${} this month.",
                money(self.limit),
                money(self.spent - self.limit)
            ),
            BudgetState::NearLimit => format!(
                "You're close to your {cat} budget for {}. You've spent ${} out of ${}. \
                 Try to keep the remaining ${} for the rest of the month.",
                self.month,
                money(self.spent),
                money(self.limit),
                money(self.remaining())
            ),
            BudgetState::Ok => format!(
                "Your {cat} spending is on track. You've spent ${} out of your ${} budget for {}.",
                money(self.spent),
                money(self.limit),
                self.month
            ),
        }
    }
}

impl Serialize for BudgetStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BudgetStatus", 6)?;
        state.serialize_field("category_key", &self.category_key)?;
        state.serialize_field("month", &self.month)?;
        state.serialize_field("limit", &self.limit)?;
        state.serialize_field("spent", &self.spent)?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

pub fn validate_threshold(threshold: Decimal) -> Result<()> {
    if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
        return Err(CoachError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Collapse repeated (category, month) limits: the last write wins, at the first write's position.
pub fn latest_limits(budgets: &[BudgetLimit]) -> Vec<BudgetLimit> {
    let mut out: Vec<BudgetLimit> = Vec::with_capacity(budgets.len());
    for b in budgets {
        match out.iter_mut().find(|existing| existing.same_key(b)) {
            Some(existing) => existing.limit = b.limit,
            None => out.push(b.clone()),
        }
    }
    out
}

/// Classify every budgeted category. Categories without a limit are not reported.
pub fn evaluate_budgets(
    budgets: &[BudgetLimit],
    transactions: &[TransactionRecord],
    threshold: Decimal,
) -> Result<Vec<BudgetStatus>> {
    validate_threshold(threshold)?;

    Ok(latest_limits(budgets)
        .into_iter()
        .map(|b| {
            let spent = category_spend(transactions, &b.category_key, &b.month.period());
            BudgetStatus {
                status: BudgetState::classify(spent, b.limit, threshold),
                category_key: b.category_key,
                month: b.month,
                limit: b.limit,
                spent,
            }
        })
        .collect())
}
