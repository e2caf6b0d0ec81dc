//! Storage seam: what the coach reads and writes, plus an in-memory implementation.
//!
//! The coach never caches; every call reads a fresh view through this trait.
//! Implementations must make `add_contribution` atomic (read-modify-write of
//! `current_amount` without lost updates). `MemoryStore` gets that for free from
//! `&mut self`.

use crate::budget::BudgetLimit;
use crate::error::{CoachError, Result};
use crate::finance::{Category, TransactionRecord};
use crate::goals::{Goal, NewGoal};
use crate::month::{MonthKey, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transaction filter: time range and/or category. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub period: Option<Period>,
    pub category_key: Option<String>,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_period(period: Period) -> Self {
        Self {
            period: Some(period),
            category_key: None,
        }
    }

    pub fn with_category(mut self, category_key: impl Into<String>) -> Self {
        self.category_key = Some(category_key.into());
        self
    }

    pub fn matches(&self, txn: &TransactionRecord) -> bool {
        self.period.is_none_or(|p| p.contains(&txn.timestamp))
            && self
                .category_key
                .as_deref()
                .is_none_or(|c| c == txn.category_key)
    }
}

pub trait FinanceStore {
    fn transactions(&self, query: &TransactionQuery) -> Result<Vec<TransactionRecord>>;

    fn category(&self, key: &str) -> Result<Option<Category>>;

    fn categories(&self) -> Result<Vec<Category>>;

    fn budgets_for_month(&self, month: MonthKey) -> Result<Vec<BudgetLimit>>;

    /// Insert or replace the limit for (category, month).
    fn upsert_budget(&mut self, budget: BudgetLimit) -> Result<BudgetLimit>;

    fn goals(&self) -> Result<Vec<Goal>>;

    fn insert_goal(&mut self, goal: NewGoal) -> Result<Goal>;

    /// Atomically add `amount` to a goal and return the updated goal.
    fn add_contribution(&mut self, goal_id: u64, amount: Decimal) -> Result<Goal>;
}

/// In-memory store; serializable so callers can persist it as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    categories: BTreeMap<String, Category>,
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
    #[serde(default)]
    budgets: Vec<BudgetLimit>,
    #[serde(default)]
    goals: Vec<Goal>,
    /// Last id handed out. Ledgers written without it fall back to the highest goal id.
    #[serde(default)]
    next_goal_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category to the catalog; an existing entry with the same key is kept.
    pub fn register_category(&mut self, category: Category) {
        self.categories.entry(category.key.clone()).or_insert(category);
    }

    pub fn extend_transactions(&mut self, txns: impl IntoIterator<Item = TransactionRecord>) {
        self.transactions.extend(txns);
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

impl FinanceStore for MemoryStore {
    fn transactions(&self, query: &TransactionQuery) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect())
    }

    fn category(&self, key: &str) -> Result<Option<Category>> {
        Ok(self.categories.get(key).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.values().cloned().collect())
    }

    fn budgets_for_month(&self, month: MonthKey) -> Result<Vec<BudgetLimit>> {
        Ok(self
            .budgets
            .iter()
            .filter(|b| b.month == month)
            .cloned()
            .collect())
    }

    fn upsert_budget(&mut self, budget: BudgetLimit) -> Result<BudgetLimit> {
        match self.budgets.iter_mut().find(|b| b.same_key(&budget)) {
            Some(existing) => existing.limit = budget.limit,
            None => self.budgets.push(budget.clone()),
        }
        Ok(budget)
    }

    fn goals(&self) -> Result<Vec<Goal>> {
        Ok(self.goals.clone())
    }

    fn insert_goal(&mut self, goal: NewGoal) -> Result<Goal> {
        goal.validate()?;
        let last_id = self.goals.iter().map(|g| g.id).fold(self.next_goal_id, u64::max);
        self.next_goal_id = last_id + 1;
        let goal = goal.into_goal(self.next_goal_id);
        self.goals.push(goal.clone());
        Ok(goal)
    }

    fn add_contribution(&mut self, goal_id: u64, amount: Decimal) -> Result<Goal> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or(CoachError::GoalNotFound(goal_id))?;
        goal.contribute(amount)?;
        Ok(goal.clone())
    }
}
