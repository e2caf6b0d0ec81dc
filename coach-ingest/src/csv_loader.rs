//! Parse `date,category,amount` transaction exports.
//!
//! Columns may come in any order and header names are matched case-insensitively.
//! Extra columns are ignored. Rows with an unreadable date or amount, or an empty
//! category, are skipped and counted rather than failing the whole file.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::types::{ParsedStatement, StatementRow};
use crate::IngestError;

const REQUIRED_COLUMNS: [&str; 3] = ["date", "category", "amount"];

/// Largest absolute amount accepted for a single row (one trillion).
/// Keeps ledger totals far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Zone-aware layouts; the offset is parsed and then discarded.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%:z",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    category: usize,
    amount: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&c| find(c).is_none())
            .map(|c| c.to_string())
            .collect();

        match (find("date"), find("category"), find("amount")) {
            (Some(date), Some(category), Some(amount)) => Ok(Self {
                date,
                category,
                amount,
            }),
            _ => Err(IngestError::MissingColumns(missing)),
        }
    }
}

/// Parse a timestamp, keeping the wall-clock time as written.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Parse a currency amount such as `1,234.50` or `$12.00`. Amounts beyond
/// [`MAX_AMOUNT`] in either direction are rejected.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .filter(|amount| amount.abs() <= MAX_AMOUNT)
}

fn parse_row(record: &csv::StringRecord, cols: Columns, line: u64) -> Result<StatementRow, String> {
    let date = record.get(cols.date).unwrap_or("").trim();
    let category = record.get(cols.category).unwrap_or("").trim();
    let amount = record.get(cols.amount).unwrap_or("").trim();

    let timestamp = parse_timestamp(date).ok_or_else(|| format!("unreadable date '{date}'"))?;
    if category.is_empty() {
        return Err("empty category".to_string());
    }
    let amount = parse_amount(amount)
        .ok_or_else(|| format!("unreadable or out-of-range amount '{amount}'"))?;

    Ok(StatementRow {
        timestamp,
        raw_category: category.to_string(),
        amount,
        line,
    })
}

/// Parse a transactions CSV file.
pub fn parse_transactions_csv(path: impl AsRef<Path>) -> Result<ParsedStatement, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_transactions_reader(file)
}

pub fn parse_transactions_reader<R: Read>(reader: R) -> Result<ParsedStatement, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let cols = Columns::locate(rdr.headers()?)?;
    let mut out = ParsedStatement::default();

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping malformed CSV record");
                out.skipped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match parse_row(&record, cols, line) {
            Ok(row) => out.rows.push(row),
            Err(reason) => {
                warn!(line, %reason, "skipping transaction row");
                out.skipped += 1;
            }
        }
    }

    debug!(rows = out.rows.len(), skipped = out.skipped, "parsed transactions CSV");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert_eq!(parse_timestamp("2025-03-04"), Some(ts(2025, 3, 4, 0, 0, 0)));
        assert_eq!(parse_timestamp("2025-03-04 08:15:00"), Some(ts(2025, 3, 4, 8, 15, 0)));
        assert_eq!(parse_timestamp("2025-03-04T08:15:00"), Some(ts(2025, 3, 4, 8, 15, 0)));
        assert_eq!(parse_timestamp("2025-03-04 08:15:00+0000"), Some(ts(2025, 3, 4, 8, 15, 0)));
        assert_eq!(parse_timestamp("2025-03-04T08:15:00+10:00"), Some(ts(2025, 3, 4, 8, 15, 0)));
        assert_eq!(parse_timestamp("2025-03-04T08:15:00Z"), Some(ts(2025, 3, 4, 8, 15, 0)));
        assert_eq!(parse_timestamp("04/03/2025"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50"), Some(dec!(12.50)));
        assert_eq!(parse_amount(" $1,234.05 "), Some(dec!(1234.05)));
        assert_eq!(parse_amount("-3.10"), Some(dec!(-3.10)));
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_amount_range_limit() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000));
        assert_eq!(parse_amount("1,000,000,000,000"), Some(MAX_AMOUNT));
        assert_eq!(parse_amount("-1000000000000"), Some(-MAX_AMOUNT));
        assert_eq!(parse_amount("1000000000000.01"), None);
        assert_eq!(parse_amount("79228162514264337593543950335"), None);
    }

    #[test]
    fn test_huge_amounts_are_skipped() {
        let data = "\
date,category,amount
2025-03-01,Rent,79228162514264337593543950335
2025-03-02,Rent,79228162514264337593543950335
2025-03-03,Rent,1500.00
";
        let parsed = parse_transactions_reader(data.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.rows[0].amount, dec!(1500.00));
    }

    #[test]
    fn test_columns_any_order_any_case() {
        let data = "Amount,Note,CATEGORY,Date\n4.50,latte,Coffe,2025-03-04 09:00:00\n";
        let parsed = parse_transactions_reader(data.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].raw_category, "Coffe");
        assert_eq!(parsed.rows[0].amount, dec!(4.50));
        assert_eq!(parsed.rows[0].line, 2);
    }

    #[test]
    fn test_missing_columns() {
        let data = "date,amount\n2025-03-04,4.50\n";
        match parse_transactions_reader(data.as_bytes()) {
            Err(IngestError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["category".to_string()])
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_rows_are_skipped_and_counted() {
        let data = "\
date,category,amount
2025-03-01,Groceries,82.10
yesterday,Groceries,10.00
2025-03-02,,5.00
2025-03-03,Coffee,abc
2025-03-04,Coffee,4.20
";
        let parsed = parse_transactions_reader(data.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.skipped, 3);
        assert_eq!(parsed.rows[1].timestamp, ts(2025, 3, 4, 0, 0, 0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_transactions_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
