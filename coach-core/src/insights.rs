//! Insights orchestration: one coaching report per month, plus the write side
//! (budgets, goals) that feeds it.

use crate::aggregate::{summarize_month, MonthlySummary};
use crate::budget::{
    evaluate_budgets, validate_threshold, BudgetLimit, BudgetStatus, DEFAULT_NEAR_LIMIT_THRESHOLD,
};
use crate::error::{CoachError, Result};
use crate::finance::TransactionRecord;
use crate::goals::{goal_highlight, project_goal, Goal, GoalProgress, NewGoal};
use crate::month::MonthKey;
use crate::recommend::{recommend, Recommendation};
use crate::store::{FinanceStore, TransactionQuery};
use crate::trajectory::{build_trajectory, Trajectory};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

/// Highlight shown when no budgets exist for the month.
pub const NO_BUDGETS_MESSAGE: &str = "Set at least one category budget to unlock recommendations.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoachSettings {
    /// Share of a limit at which a budget is flagged as near its limit, in (0, 1]
    pub near_limit_threshold: Decimal,
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            near_limit_threshold: DEFAULT_NEAR_LIMIT_THRESHOLD,
        }
    }
}

/// Everything the coach has to say about one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachingReport {
    pub month: MonthKey,
    pub total_spent: Decimal,
    pub recommendations: Vec<Recommendation>,
    pub goal_highlight: Option<String>,
    pub budget_statuses: Vec<BudgetStatus>,
}

pub struct Coach<S> {
    store: S,
    settings: CoachSettings,
}

impl<S: FinanceStore> Coach<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, CoachSettings::default())
    }

    pub fn with_settings(store: S, settings: CoachSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn monthly_summary(&self, month: MonthKey) -> Result<MonthlySummary> {
        let txns = self.store.transactions(&TransactionQuery::in_period(month.period()))?;
        Ok(summarize_month(&txns, month))
    }

    pub fn trajectory(&self, window_months: i32) -> Result<Trajectory> {
        let txns = self.store.transactions(&TransactionQuery::all())?;
        Ok(build_trajectory(&txns, window_months))
    }

    /// One page of the ledger, newest first. Transactions with equal timestamps
    /// keep their import order.
    pub fn recent_transactions(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TransactionRecord>> {
        let mut txns = self.store.transactions(&TransactionQuery::all())?;
        txns.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(txns.into_iter().skip(offset).take(limit).collect())
    }

    pub fn budgets(&self, month: MonthKey) -> Result<Vec<BudgetLimit>> {
        self.store.budgets_for_month(month)
    }

    /// Budget statuses using the configured threshold.
    pub fn budget_statuses(&self, month: MonthKey) -> Result<Vec<BudgetStatus>> {
        self.budget_statuses_with(month, self.settings.near_limit_threshold)
    }

    pub fn budget_statuses_with(
        &self,
        month: MonthKey,
        threshold: Decimal,
    ) -> Result<Vec<BudgetStatus>> {
        validate_threshold(threshold)?;
        let budgets = self.store.budgets_for_month(month)?;
        if budgets.is_empty() {
            return Ok(vec![]);
        }
        let txns = self.store.transactions(&TransactionQuery::in_period(month.period()))?;
        evaluate_budgets(&budgets, &txns, threshold)
    }

    pub fn goal_progress(&self, today: NaiveDate) -> Result<Vec<GoalProgress>> {
        Ok(self
            .store
            .goals()?
            .iter()
            .map(|g| project_goal(g, today))
            .collect())
    }

    /// Compose summary, budget statuses, recommendations, and the goal highlight.
    pub fn monthly_report(&self, month: MonthKey, today: NaiveDate) -> Result<CoachingReport> {
        let summary = self.monthly_summary(month)?;
        let budget_statuses = self.budget_statuses(month)?;

        if budget_statuses.is_empty() {
            debug!(%month, "no budgets set; skipping recommendations");
            return Ok(CoachingReport {
                month,
                total_spent: summary.total,
                recommendations: vec![],
                goal_highlight: Some(NO_BUDGETS_MESSAGE.to_string()),
                budget_statuses,
            });
        }

        let recommendations = recommend(&budget_statuses);

        let goal_highlight = match self.goal_progress(today) {
            Ok(progress) => goal_highlight(&progress),
            Err(e) => {
                warn!(error = %e, "could not load goals; report has no highlight");
                None
            }
        };

        debug!(
            %month,
            budgets = budget_statuses.len(),
            recommendations = recommendations.len(),
            "built coaching report"
        );

        Ok(CoachingReport {
            month,
            total_spent: summary.total,
            recommendations,
            goal_highlight,
            budget_statuses,
        })
    }

    /// Create or replace the limit for a catalogued category.
    pub fn set_budget(
        &mut self,
        category_key: &str,
        month: MonthKey,
        limit: Decimal,
    ) -> Result<BudgetLimit> {
        if limit < Decimal::ZERO {
            return Err(CoachError::InvalidAmount(format!(
                "budget limit must not be negative, got {limit}"
            )));
        }
        let category = self
            .store
            .category(category_key)?
            .ok_or_else(|| CoachError::UnknownCategory(category_key.to_string()))?;
        self.store.upsert_budget(BudgetLimit::new(category.key, month, limit))
    }

    pub fn create_goal(&mut self, goal: NewGoal) -> Result<Goal> {
        goal.validate()?;
        self.store.insert_goal(goal)
    }

    pub fn contribute(&mut self, goal_id: u64, amount: Decimal) -> Result<Goal> {
        if amount <= Decimal::ZERO {
            return Err(CoachError::InvalidAmount(format!(
                "contribution must be positive, got {amount}"
            )));
        }
        self.store.add_contribution(goal_id, amount)
    }
}
