//! Recommendation engine: greedy, single-pass slack reallocation.
//!
//! Over- and near-limit budgets are paired with the on-track budget that has the
//! most headroom. Only the head of the slack pool is ever consulted; it is drawn
//! down in place and never re-ranked, even once exhausted. Budgets that still need
//! room after the head runs dry get no recommendation. This is a heuristic, not an
//! optimal assignment.

use crate::budget::{BudgetState, BudgetStatus};
use crate::finance::money;
use rust_decimal::Decimal;
use serde::Serialize;

/// Share of the limit a near-limit budget is asked to free up.
const NEAR_LIMIT_TRIM: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Where to cut back
    pub from_category: String,
    /// Where to move the money; `None` means reduce spend directly
    pub to_category: Option<String>,
    pub amount: Decimal,
    pub reason: String,
    pub action: String,
}

/// Unused headroom in an on-track budget.
#[derive(Debug, Clone, PartialEq)]
struct SlackEntry {
    category_key: String,
    remaining: Decimal,
}

/// Slack entries ordered by remaining headroom, largest first. Scratch space for one call.
#[derive(Debug, Default)]
struct SlackPool {
    entries: Vec<SlackEntry>,
}

impl SlackPool {
    fn from_statuses(statuses: &[BudgetStatus]) -> Self {
        let mut entries: Vec<SlackEntry> = statuses
            .iter()
            .filter(|s| s.status == BudgetState::Ok)
            .map(|s| SlackEntry {
                category_key: s.category_key.clone(),
                remaining: s.remaining(),
            })
            .filter(|e| e.remaining > Decimal::ZERO)
            .collect();
        // stable: equal headroom keeps encounter order
        entries.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        Self { entries }
    }

    fn head_mut(&mut self) -> Option<&mut SlackEntry> {
        self.entries.first_mut()
    }
}

/// How much an over/near-limit budget should give back.
fn needed(status: &BudgetStatus) -> Decimal {
    match status.status {
        BudgetState::OverLimit => status.spent - status.limit,
        BudgetState::NearLimit => NEAR_LIMIT_TRIM * status.limit,
        BudgetState::Ok => Decimal::ZERO,
    }
}

fn reason(status: &BudgetStatus) -> String {
    format!(
        "{} spending is {} for {}.",
        status.category_key,
        status.status.phrase(),
        status.month
    )
}

fn shift_action(from: &str, to: &str, amount: Decimal) -> String {
    format!(
        "Try trimming about ${} from {from} and shifting that towards your {to} / savings for this month.",
        money(amount)
    )
}

fn reduce_action(from: &str, amount: Decimal) -> String {
    format!(
        "Try reducing your {from} spend by about ${} over the rest of the month to get back on track.",
        money(amount)
    )
}

/// Produce reallocation suggestions in the order the over/near-limit budgets appear.
pub fn recommend(statuses: &[BudgetStatus]) -> Vec<Recommendation> {
    let mut pool = SlackPool::from_statuses(statuses);
    let mut out = Vec::new();

    let over_budget = statuses
        .iter()
        .filter(|s| matches!(s.status, BudgetState::OverLimit | BudgetState::NearLimit));

    for status in over_budget {
        let needed = needed(status);
        if needed <= Decimal::ZERO {
            continue;
        }

        match pool.head_mut() {
            Some(head) => {
                let reallocate = needed.min(head.remaining);
                if reallocate <= Decimal::ZERO {
                    continue;
                }
                head.remaining -= reallocate;
                out.push(Recommendation {
                    from_category: status.category_key.clone(),
                    to_category: Some(head.category_key.clone()),
                    amount: reallocate.round_dp(2),
                    reason: reason(status),
                    action: shift_action(&status.category_key, &head.category_key, reallocate),
                });
            }
            None => out.push(Recommendation {
                from_category: status.category_key.clone(),
                to_category: None,
                amount: needed.round_dp(2),
                reason: reason(status),
                action: reduce_action(&status.category_key, needed),
            }),
        }
    }

    tracing::debug!(
        recommendations = out.len(),
        slack_categories = pool.entries.len(),
        "built spend recommendations"
    );
    out
}
