//! Savings goals: contributions, pacing projection, and the highlight goal

use crate::error::{CoachError, Result};
use crate::finance::money;
use crate::month::whole_months_between;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "ACTIVE",
            GoalStatus::Completed => "COMPLETED",
            GoalStatus::Paused => "PAUSED",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(GoalStatus::Active),
            "COMPLETED" => Ok(GoalStatus::Completed),
            "PAUSED" => Ok(GoalStatus::Paused),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

/// A savings target with a deadline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: u64,
    /// e.g. "Europe 2026"
    pub name: String,
    pub target_amount: Decimal,
    /// Saved so far; only ever grows
    pub current_amount: Decimal,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
    pub status: GoalStatus,
}

impl Goal {
    /// Add money to the goal. Reaching the target completes it; completion is never undone.
    pub fn contribute(&mut self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(CoachError::InvalidAmount(format!(
                "contribution must be positive, got {amount}"
            )));
        }
        self.current_amount = self.current_amount.checked_add(amount).ok_or_else(|| {
            CoachError::InvalidAmount(format!("contribution of {amount} is too large"))
        })?;
        if self.current_amount >= self.target_amount {
            self.status = GoalStatus::Completed;
        }
        Ok(())
    }
}

/// Input for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub start_date: NaiveDate,
    pub target_date: NaiveDate,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoachError::InvalidGoal("name must not be empty".to_string()));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(CoachError::InvalidGoal(format!(
                "target amount must be positive, got {}",
                self.target_amount
            )));
        }
        if self.target_date < self.start_date {
            return Err(CoachError::InvalidGoal(format!(
                "target date {} is before start date {}",
                self.target_date, self.start_date
            )));
        }
        Ok(())
    }

    /// New goals start empty and active.
    pub fn into_goal(self, id: u64) -> Goal {
        Goal {
            id,
            name: self.name.trim().to_string(),
            target_amount: self.target_amount,
            current_amount: Decimal::ZERO,
            start_date: self.start_date,
            target_date: self.target_date,
            status: GoalStatus::Active,
        }
    }
}

/// Pacing snapshot for one goal, derived on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: u64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub percent_complete: Decimal,
    /// Always at least 1
    pub months_left: u32,
    pub monthly_needed: Decimal,
    pub status: GoalStatus,
    pub message: String,
}

/// Months remaining until the target date; a due or overdue goal counts as due this month.
pub fn months_left(target_date: NaiveDate, today: NaiveDate) -> u32 {
    if target_date <= today {
        return 1;
    }
    whole_months_between(today, target_date).max(1)
}

pub fn project_goal(goal: &Goal, today: NaiveDate) -> GoalProgress {
    let target = goal.target_amount;
    let current = goal.current_amount;

    let percent_complete = if target > Decimal::ZERO {
        current
            .checked_div(target)
            .map_or(Decimal::MAX, |ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
    } else {
        Decimal::ZERO
    };

    let months_left = months_left(goal.target_date, today);
    let monthly_needed = (target - current).max(Decimal::ZERO) / Decimal::from(months_left);

    let message = match goal.status {
        GoalStatus::Completed => format!(
            "Goal '{}' is completed 🎉. You reached your target of ${}.",
            goal.name,
            money(target)
        ),
        _ => format!(
            "You're {:.1}% of the way to '{}'. To hit ${} by {}, you need to save about ${} \
             per month for the next {} month(s).",
            percent_complete.round_dp(1),
            goal.name,
            money(target),
            goal.target_date,
            money(monthly_needed),
            months_left
        ),
    };

    GoalProgress {
        goal_id: goal.id,
        name: goal.name.clone(),
        target_amount: target,
        current_amount: current,
        percent_complete,
        months_left,
        monthly_needed,
        status: goal.status,
        message,
    }
}

/// The active goal that needs the most per month; the first one wins ties.
pub fn most_demanding(progress: &[GoalProgress]) -> Option<&GoalProgress> {
    progress
        .iter()
        .filter(|p| p.status == GoalStatus::Active)
        .fold(None, |best: Option<&GoalProgress>, p| match best {
            Some(b) if b.monthly_needed >= p.monthly_needed => Some(b),
            _ => Some(p),
        })
}

pub fn goal_highlight(progress: &[GoalProgress]) -> Option<String> {
    most_demanding(progress).map(|g| {
        format!(
            "Top priority goal: '{}'. To stay on track you need about ${}/month for the next {} month(s).",
            g.name,
            money(g.monthly_needed),
            g.months_left
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(target: Decimal, current: Decimal, target_date: NaiveDate) -> Goal {
        Goal {
            id: 1,
            name: "Europe 2026".to_string(),
            target_amount: target,
            current_amount: current,
            start_date: date(2025, 1, 1),
            target_date,
            status: GoalStatus::Active,
        }
    }

    #[test]
    fn test_pacing_six_months_out() {
        let g = goal(dec!(1200), dec!(600), date(2025, 7, 15));
        let p = project_goal(&g, date(2025, 1, 15));
        assert_eq!(p.months_left, 6);
        assert_eq!(p.monthly_needed, dec!(100));
        assert_eq!(p.percent_complete, dec!(50));
        assert_eq!(
            p.message,
            "You're 50.0% of the way to 'Europe 2026'. To hit $1200.00 by 2025-07-15, you need to save \
             about $100.00 per month for the next 6 month(s)."
        );
    }

    #[test]
    fn test_past_target_date_counts_as_one_month() {
        let g = goal(dec!(1200), dec!(300), date(2023, 2, 1));
        let p = project_goal(&g, date(2025, 6, 30));
        assert_eq!(p.months_left, 1);
        assert_eq!(p.monthly_needed, dec!(900));

        let due_today = goal(dec!(1200), dec!(300), date(2025, 6, 30));
        assert_eq!(project_goal(&due_today, date(2025, 6, 30)).months_left, 1);
    }

    #[test]
    fn test_less_than_a_month_left_floors_to_one() {
        let g = goal(dec!(500), dec!(0), date(2025, 6, 20));
        let p = project_goal(&g, date(2025, 6, 1));
        assert_eq!(p.months_left, 1);
        assert_eq!(p.monthly_needed, dec!(500));
    }

    #[test]
    fn test_overfunded_goal_needs_nothing() {
        let mut g = goal(dec!(1000), dec!(1250), date(2026, 1, 1));
        g.status = GoalStatus::Completed;
        let p = project_goal(&g, date(2025, 1, 1));
        assert_eq!(p.monthly_needed, Decimal::ZERO);
        assert_eq!(p.percent_complete, dec!(125));
        assert_eq!(
            p.message,
            "Goal 'Europe 2026' is completed 🎉. You reached your target of $1000.00."
        );
    }

    #[test]
    fn test_zero_target_guards_percentage() {
        let g = goal(dec!(0), dec!(0), date(2026, 1, 1));
        assert_eq!(project_goal(&g, date(2025, 1, 1)).percent_complete, Decimal::ZERO);
    }

    #[test]
    fn test_contribution_completes_goal() {
        let mut g = goal(dec!(1000), dec!(900), date(2026, 1, 1));
        g.contribute(dec!(50)).unwrap();
        assert_eq!(g.status, GoalStatus::Active);
        g.contribute(dec!(50)).unwrap();
        assert_eq!(g.current_amount, dec!(1000));
        assert_eq!(g.status, GoalStatus::Completed);
        g.contribute(dec!(10)).unwrap();
        assert_eq!(g.status, GoalStatus::Completed);
    }

    #[test]
    fn test_non_positive_contribution_rejected() {
        let mut g = goal(dec!(1000), dec!(100), date(2026, 1, 1));
        assert!(matches!(g.contribute(dec!(0)), Err(CoachError::InvalidAmount(_))));
        assert!(matches!(g.contribute(dec!(-5)), Err(CoachError::InvalidAmount(_))));
        assert_eq!(g.current_amount, dec!(100));
    }

    #[test]
    fn test_contribution_past_decimal_range_rejected() {
        let mut g = goal(dec!(0.01), Decimal::MAX, date(2026, 1, 1));
        assert!(matches!(g.contribute(Decimal::MAX), Err(CoachError::InvalidAmount(_))));
        assert_eq!(g.current_amount, Decimal::MAX);
        assert_eq!(project_goal(&g, date(2025, 1, 1)).percent_complete, Decimal::MAX);
    }

    #[test]
    fn test_new_goal_validation() {
        let ok = NewGoal {
            name: " Emergency fund ".to_string(),
            target_amount: dec!(3000),
            start_date: date(2025, 3, 1),
            target_date: date(2026, 3, 1),
        };
        assert!(ok.validate().is_ok());
        let g = ok.clone().into_goal(7);
        assert_eq!(g.name, "Emergency fund");
        assert_eq!(g.current_amount, Decimal::ZERO);
        assert_eq!(g.status, GoalStatus::Active);

        let backwards = NewGoal {
            target_date: date(2025, 1, 1),
            ..ok.clone()
        };
        assert!(matches!(backwards.validate(), Err(CoachError::InvalidGoal(_))));

        let empty = NewGoal {
            target_amount: dec!(0),
            ..ok
        };
        assert!(matches!(empty.validate(), Err(CoachError::InvalidGoal(_))));
    }

    #[test]
    fn test_highlight_picks_most_demanding_active_goal() {
        let today = date(2025, 1, 1);
        let mut a = goal(dec!(1200), dec!(0), date(2026, 1, 1));
        a.name = "Laptop".into();
        let mut b = goal(dec!(600), dec!(0), date(2025, 4, 1));
        b.name = "Concert".into();
        let mut c = goal(dec!(50000), dec!(0), date(2025, 2, 1));
        c.name = "House".into();
        c.status = GoalStatus::Paused;

        let progress: Vec<GoalProgress> =
            [a, b, c].iter().map(|g| project_goal(g, today)).collect();
        assert_eq!(
            goal_highlight(&progress).unwrap(),
            "Top priority goal: 'Concert'. To stay on track you need about $200.00/month for the next 3 month(s)."
        );
    }

    #[test]
    fn test_highlight_tie_keeps_first() {
        let today = date(2025, 1, 1);
        let mut a = goal(dec!(300), dec!(0), date(2025, 4, 1));
        a.name = "First".into();
        let mut b = a.clone();
        b.name = "Second".into();
        let progress: Vec<GoalProgress> = [a, b].iter().map(|g| project_goal(g, today)).collect();
        assert_eq!(most_demanding(&progress).unwrap().name, "First");
    }

    #[test]
    fn test_no_active_goals_no_highlight() {
        let mut g = goal(dec!(100), dec!(100), date(2026, 1, 1));
        g.status = GoalStatus::Completed;
        let progress = vec![project_goal(&g, date(2025, 1, 1))];
        assert!(goal_highlight(&progress).is_none());
        assert!(goal_highlight(&[]).is_none());
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!("paused".parse::<GoalStatus>().unwrap(), GoalStatus::Paused);
        assert!("done".parse::<GoalStatus>().is_err());
        assert_eq!(serde_json::to_string(&GoalStatus::Completed).unwrap(), r#""COMPLETED""#);
    }
}
