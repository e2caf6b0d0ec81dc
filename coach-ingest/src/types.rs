use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One parsed row of a transactions export, before category normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Wall-clock time as written in the file; any UTC offset is dropped.
    pub timestamp: NaiveDateTime,
    /// Category label exactly as it appeared (trimmed)
    pub raw_category: String,
    /// Positive number means spend; negative means refund.
    pub amount: Decimal,
    /// 1-based line in the source file
    pub line: u64,
}

/// Rows that parsed, plus how many were skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedStatement {
    pub rows: Vec<StatementRow>,
    pub skipped: usize,
}
