//! coach-core: Core types and computations for the personal finance coach

pub mod aggregate;
pub mod budget;
pub mod error;
pub mod finance;
pub mod goals;
pub mod insights;
pub mod month;
pub mod recommend;
pub mod store;
pub mod trajectory;

pub use aggregate::{aggregate, category_spend, grand_total, summarize_month, MonthlySummary};
pub use budget::{
    evaluate_budgets, latest_limits, validate_threshold, BudgetLimit, BudgetState, BudgetStatus,
    DEFAULT_NEAR_LIMIT_THRESHOLD,
};
pub use error::{CoachError, Result};
pub use finance::{money, Category, CategoryTotal, TransactionRecord};
pub use goals::{
    goal_highlight, months_left, most_demanding, project_goal, Goal, GoalProgress, GoalStatus,
    NewGoal,
};
pub use insights::{Coach, CoachSettings, CoachingReport, NO_BUDGETS_MESSAGE};
pub use month::{whole_months_between, MonthKey, Period};
pub use recommend::{recommend, Recommendation};
pub use store::{FinanceStore, MemoryStore, TransactionQuery};
pub use trajectory::{build_trajectory, JumpRecord, MonthSnapshot, Trajectory};
