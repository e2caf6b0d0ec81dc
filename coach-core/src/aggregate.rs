//! Aggregator: category totals over a half-open period.

use crate::finance::{saturating_sum, CategoryTotal, TransactionRecord};
use crate::month::{MonthKey, Period};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Spend for one month, overall and per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub total: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

/// Group transactions inside `period` into per-category totals.
///
/// Output is sorted by category key and its totals sum exactly to the sum of
/// the matching records. Totals clamp at the `Decimal` range rather than panic.
pub fn aggregate(transactions: &[TransactionRecord], period: &Period) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();

    for txn in transactions.iter().filter(|t| period.contains(&t.timestamp)) {
        let total = totals.entry(txn.category_key.as_str()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(txn.amount);
    }

    totals
        .into_iter()
        .map(|(category_key, total)| CategoryTotal {
            category_key: category_key.to_string(),
            total,
        })
        .collect()
}

/// Spend in `period` for a single category.
pub fn category_spend(
    transactions: &[TransactionRecord],
    category_key: &str,
    period: &Period,
) -> Decimal {
    saturating_sum(
        transactions
            .iter()
            .filter(|t| t.category_key == category_key && period.contains(&t.timestamp))
            .map(|t| t.amount),
    )
}

pub fn grand_total(totals: &[CategoryTotal]) -> Decimal {
    saturating_sum(totals.iter().map(|t| t.total))
}

pub fn summarize_month(transactions: &[TransactionRecord], month: MonthKey) -> MonthlySummary {
    let by_category = aggregate(transactions, &month.period());
    MonthlySummary {
        month,
        total: grand_total(&by_category),
        by_category,
    }
}
