//! Trajectory builder: month-by-month category history and the biggest jump.
//!
//! Algorithm (deterministic):
//! 1) group transactions into (month, category) totals
//! 2) sort distinct months ascending and keep the last N (N <= 0 keeps all)
//! 3) emit one snapshot per kept month
//! 4) walk each category's history inside the window, comparing adjacent points
//!    and keeping the single largest absolute change
//!
//! Months where a category has no spend are skipped, not treated as zero, so a
//! category that disappears for a month is compared against its last seen value.

use crate::finance::{saturating_sum, CategoryTotal, TransactionRecord};
use crate::month::MonthKey;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSnapshot {
    pub month: MonthKey,
    pub total: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

/// The largest month-over-month change of any category within the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JumpRecord {
    pub category_key: String,
    pub from_month: MonthKey,
    pub to_month: MonthKey,
    /// later - earlier; positive means spend went up
    pub change: Decimal,
    pub abs_change: Decimal,
    /// Absent when the earlier amount is zero or the ratio leaves `Decimal`'s range
    pub pct_change: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trajectory {
    pub months: Vec<MonthSnapshot>,
    pub biggest_jump: Option<JumpRecord>,
}

pub fn build_trajectory(transactions: &[TransactionRecord], window_months: i32) -> Trajectory {
    let mut per_month: BTreeMap<MonthKey, BTreeMap<&str, Decimal>> = BTreeMap::new();
    for txn in transactions {
        let total = per_month
            .entry(MonthKey::from_datetime(&txn.timestamp))
            .or_default()
            .entry(txn.category_key.as_str())
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(txn.amount);
    }

    if per_month.is_empty() {
        return Trajectory::default();
    }

    let skip = match usize::try_from(window_months) {
        Ok(n) if n > 0 => per_month.len().saturating_sub(n),
        _ => 0,
    };
    let kept: Vec<(&MonthKey, &BTreeMap<&str, Decimal>)> = per_month.iter().skip(skip).collect();

    let months = kept
        .iter()
        .map(|(month, cats)| {
            let by_category: Vec<CategoryTotal> = cats
                .iter()
                .map(|(cat, total)| CategoryTotal {
                    category_key: cat.to_string(),
                    total: *total,
                })
                .collect();
            MonthSnapshot {
                month: **month,
                total: saturating_sum(by_category.iter().map(|c| c.total)),
                by_category,
            }
        })
        .collect();

    // category -> [(month, amount)] ascending, inside the window only
    let mut history: BTreeMap<&str, Vec<(MonthKey, Decimal)>> = BTreeMap::new();
    for (month, cats) in &kept {
        for (cat, amount) in cats.iter() {
            history.entry(*cat).or_default().push((**month, *amount));
        }
    }

    Trajectory {
        months,
        biggest_jump: biggest_jump(&history),
    }
}

fn biggest_jump(history: &BTreeMap<&str, Vec<(MonthKey, Decimal)>>) -> Option<JumpRecord> {
    let mut best: Option<JumpRecord> = None;
    let mut max_abs = Decimal::ZERO;

    for (cat, points) in history {
        for pair in points.windows(2) {
            let (from_month, earlier) = pair[0];
            let (to_month, later) = pair[1];

            let change = later.saturating_sub(earlier);
            let abs_change = change.abs();
            // strictly greater: the first maximum encountered wins
            if abs_change > max_abs {
                max_abs = abs_change;
                let pct_change = change
                    .checked_div(earlier)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
                best = Some(JumpRecord {
                    category_key: cat.to_string(),
                    from_month,
                    to_month,
                    change,
                    abs_change,
                    pct_change,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn txn(y: i32, m: u32, amount: Decimal, cat: &str) -> TransactionRecord {
        let ts = NaiveDate::from_ymd_opt(y, m, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
        TransactionRecord::new(ts, amount, cat)
    }

    fn mk(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let t = build_trajectory(&[], 6);
        assert!(t.months.is_empty());
        assert!(t.biggest_jump.is_none());
    }

    #[test]
    fn test_all_months_when_window_not_positive() {
        let txns = vec![
            txn(2025, 3, dec!(10), "Coffee"),
            txn(2024, 11, dec!(10), "Coffee"),
            txn(2025, 1, dec!(10), "Groceries"),
            txn(2025, 1, dec!(5), "Coffee"),
        ];
        for window in [0, -3] {
            let t = build_trajectory(&txns, window);
            let months: Vec<MonthKey> = t.months.iter().map(|s| s.month).collect();
            assert_eq!(months, vec![mk(2024, 11), mk(2025, 1), mk(2025, 3)]);
        }
    }

    #[test]
    fn test_window_keeps_latest_months() {
        let txns = vec![
            txn(2025, 1, dec!(10), "Coffee"),
            txn(2025, 2, dec!(20), "Coffee"),
            txn(2025, 3, dec!(30), "Coffee"),
        ];
        let t = build_trajectory(&txns, 2);
        let months: Vec<MonthKey> = t.months.iter().map(|s| s.month).collect();
        assert_eq!(months, vec![mk(2025, 2), mk(2025, 3)]);
        assert_eq!(build_trajectory(&txns, 10).months.len(), 3);
    }

    #[test]
    fn test_snapshot_total_matches_categories() {
        let txns = vec![
            txn(2025, 1, dec!(12.34), "Coffee"),
            txn(2025, 1, dec!(100.01), "Groceries"),
            txn(2025, 1, dec!(0.65), "Coffee"),
        ];
        let t = build_trajectory(&txns, 0);
        let snap = &t.months[0];
        assert_eq!(snap.total, dec!(113.00));
        assert_eq!(snap.total, snap.by_category.iter().map(|c| c.total).sum::<Decimal>());
    }

    #[test]
    fn test_jump_with_percentage() {
        let txns = vec![
            txn(2025, 1, dec!(100), "Restaurant"),
            txn(2025, 2, dec!(150), "Restaurant"),
            txn(2025, 1, dec!(40), "Coffee"),
            txn(2025, 2, dec!(45), "Coffee"),
        ];
        let jump = build_trajectory(&txns, 6).biggest_jump.unwrap();
        assert_eq!(jump.category_key, "Restaurant");
        assert_eq!(jump.from_month, mk(2025, 1));
        assert_eq!(jump.to_month, mk(2025, 2));
        assert_eq!(jump.abs_change, dec!(50));
        assert_eq!(jump.pct_change, Some(dec!(50)));
    }

    #[test]
    fn test_jump_from_zero_has_no_percentage() {
        let txns = vec![
            txn(2025, 1, dec!(0), "Gifts"),
            txn(2025, 2, dec!(20), "Gifts"),
        ];
        let jump = build_trajectory(&txns, 0).biggest_jump.unwrap();
        assert_eq!(jump.abs_change, dec!(20));
        assert_eq!(jump.change, dec!(20));
        assert_eq!(jump.pct_change, None);
    }

    #[test]
    fn test_decrease_is_signed_but_ranked_by_magnitude() {
        let txns = vec![
            txn(2025, 1, dec!(300), "Travel"),
            txn(2025, 2, dec!(20), "Travel"),
            txn(2025, 1, dec!(10), "Coffee"),
            txn(2025, 2, dec!(90), "Coffee"),
        ];
        let jump = build_trajectory(&txns, 0).biggest_jump.unwrap();
        assert_eq!(jump.category_key, "Travel");
        assert_eq!(jump.change, dec!(-280));
        assert_eq!(jump.abs_change, dec!(280));
        assert_eq!(jump.pct_change.map(|p| p.round_dp(2)), Some(dec!(-93.33)));
    }

    #[test]
    fn test_absent_month_is_skipped_not_zero() {
        let txns = vec![
            txn(2025, 1, dec!(100), "Gym"),
            txn(2025, 2, dec!(5), "Coffee"),
            txn(2025, 3, dec!(130), "Gym"),
        ];
        let jump = build_trajectory(&txns, 0).biggest_jump.unwrap();
        // Gym is compared Jan -> Mar; a zero-filled Feb would have produced a 130 jump
        assert_eq!(jump.category_key, "Gym");
        assert_eq!(jump.from_month, mk(2025, 1));
        assert_eq!(jump.to_month, mk(2025, 3));
        assert_eq!(jump.abs_change, dec!(30));
    }

    #[test]
    fn test_jump_ignores_pairs_outside_window() {
        let txns = vec![
            txn(2025, 1, dec!(10), "Rent"),
            txn(2025, 2, dec!(900), "Rent"),
            txn(2025, 3, dec!(910), "Rent"),
        ];
        let jump = build_trajectory(&txns, 2).biggest_jump.unwrap();
        assert_eq!(jump.from_month, mk(2025, 2));
        assert_eq!(jump.abs_change, dec!(10));
    }

    #[test]
    fn test_flat_spend_has_no_jump() {
        let txns = vec![
            txn(2025, 1, dec!(10), "Coffee"),
            txn(2025, 2, dec!(10), "Coffee"),
        ];
        assert!(build_trajectory(&txns, 0).biggest_jump.is_none());
    }

    #[test]
    fn test_extreme_amounts_do_not_panic() {
        let txns = vec![
            txn(2025, 1, dec!(0.01), "Rent"),
            txn(2025, 2, Decimal::MAX, "Rent"),
            txn(2025, 2, Decimal::MAX, "Rent"),
        ];
        let t = build_trajectory(&txns, 0);
        assert_eq!(t.months[1].total, Decimal::MAX);
        let jump = t.biggest_jump.unwrap();
        assert_eq!(jump.to_month, mk(2025, 2));
        assert_eq!(jump.pct_change, None);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let txns = vec![
            txn(2025, 1, dec!(10), "Coffee"),
            txn(2025, 2, dec!(25), "Coffee"),
            txn(2025, 2, dec!(7), "Books"),
        ];
        assert_eq!(build_trajectory(&txns, 3), build_trajectory(&txns, 3));
    }
}
