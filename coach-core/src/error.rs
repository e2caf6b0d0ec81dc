//! Error types for coach-core

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid near-limit threshold {0}: must be in (0, 1]")]
    InvalidThreshold(Decimal),

    #[error("Category '{0}' not found. Make sure it matches a category in your data.")]
    UnknownCategory(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(u64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    /// Errors raised by a storage backend, passed through untouched.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoachError>;
