//! coach-ingest: transaction export parsing and category normalization.

pub mod category_map;
pub mod csv_loader;
pub mod types;

pub use category_map::{clean_label, normalize_category, NormalizedCategory};
pub use csv_loader::{
    parse_amount, parse_timestamp, parse_transactions_csv, parse_transactions_reader, MAX_AMOUNT,
};
pub use types::{ParsedStatement, StatementRow};

use coach_core::{Category, TransactionRecord};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV must contain columns: date, category, amount (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Ledger-ready records built from parsed rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Imported {
    pub transactions: Vec<TransactionRecord>,
    /// One entry per distinct normalized category, in order of first appearance
    pub categories: Vec<Category>,
}

/// Normalize categories and build transaction records. The first raw label seen
/// for a category becomes its catalog `raw_name`.
pub fn to_records(rows: &[StatementRow]) -> Imported {
    let mut out = Imported::default();

    for row in rows {
        let normalized = normalize_category(&row.raw_category);

        if !out.categories.iter().any(|c| c.key == normalized.key) {
            let mut category =
                Category::new(normalized.key.clone()).with_raw_name(row.raw_category.clone());
            if let Some(group) = normalized.group {
                category = category.with_group(group);
            }
            out.categories.push(category);
        }

        out.transactions.push(
            TransactionRecord::new(row.timestamp, row.amount, normalized.key)
                .with_raw_category(row.raw_category.clone()),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(d: u32, cat: &str, amount: rust_decimal::Decimal) -> StatementRow {
        StatementRow {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, d).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            raw_category: cat.to_string(),
            amount,
            line: d as u64,
        }
    }

    #[test]
    fn test_to_records_normalizes_and_dedupes() {
        let rows = vec![
            row(1, "Coffe", dec!(4.50)),
            row(2, "Groceries", dec!(60)),
            row(3, "Coffe", dec!(3.80)),
            row(4, "Film/enjoyment", dec!(18)),
        ];
        let imported = to_records(&rows);

        assert_eq!(imported.transactions.len(), 4);
        assert_eq!(imported.transactions[0].category_key, "Coffee");
        assert_eq!(imported.transactions[0].raw_category.as_deref(), Some("Coffe"));

        let keys: Vec<&str> = imported.categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["Coffee", "Groceries", "Entertainment"]);
        assert_eq!(imported.categories[0].raw_name, "Coffe");
        assert_eq!(imported.categories[2].group.as_deref(), Some("Leisure"));
        assert_eq!(imported.categories[1].group, None);
    }

    #[test]
    fn test_missing_columns_message() {
        let err = IngestError::MissingColumns(vec!["date".into(), "amount".into()]);
        assert_eq!(
            err.to_string(),
            "CSV must contain columns: date, category, amount (missing: date, amount)"
        );
    }
}
