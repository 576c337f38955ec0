//! Date decomposition and chronological ordering on the `date` column.

use chrono::NaiveDate;
use log::{debug, info};

use crate::{
    error::{PipelineWarning, Result},
    table::Table,
};

pub const DATE_SEPARATOR: char = '/';
pub const CANONICAL_DATE_FORMAT: &str = "%Y/%m/%d";

/// Names of the three columns produced by [`decompose_dates`].
#[derive(Debug, Clone, Copy)]
pub struct DateParts<'a> {
    pub year: &'a str,
    pub month: &'a str,
    pub day: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Applied,
    Warned(PipelineWarning),
}

/// Splits every `date_column` cell on `/` and inserts year, month, and day
/// columns after it. Either every row splits into exactly three parts or
/// nothing is inserted.
pub fn decompose_dates(
    table: &mut Table,
    date_column: &str,
    parts: DateParts<'_>,
) -> Result<StageOutcome> {
    let Some(dates) = table.column(date_column) else {
        return Ok(StageOutcome::Warned(PipelineWarning::DateColumnMissing {
            stage: "date decomposition".to_string(),
            column: date_column.to_string(),
        }));
    };

    let mut years = Vec::with_capacity(table.row_count());
    let mut months = Vec::with_capacity(table.row_count());
    let mut days = Vec::with_capacity(table.row_count());
    for (idx, value) in dates.enumerate() {
        let trimmed = value.trim();
        let pieces: Vec<&str> = trimmed.split(DATE_SEPARATOR).collect();
        match pieces.as_slice() {
            [year, month, day] => {
                years.push(year.to_string());
                months.push(month.to_string());
                days.push(day.to_string());
            }
            _ => {
                return Ok(StageOutcome::Warned(PipelineWarning::DateSplit {
                    row: idx + 2,
                    value: value.to_string(),
                    parts: pieces.len(),
                }));
            }
        }
    }

    table.insert_column_after(date_column, parts.year, years)?;
    table.insert_column_after(parts.year, parts.month, months)?;
    table.insert_column_after(parts.month, parts.day, days)?;
    info!(
        "Extracted '{}', '{}', '{}' from '{date_column}'",
        parts.year, parts.month, parts.day
    );
    Ok(StageOutcome::Applied)
}

/// Parses `YYYY/M/D` with a four-digit year and one- or two-digit month and
/// day. Surrounding whitespace is ignored.
pub fn parse_slash_date(value: &str) -> Option<NaiveDate> {
    let mut pieces = value.trim().split(DATE_SEPARATOR);
    let (year, month, day) = (pieces.next()?, pieces.next()?, pieces.next()?);
    if pieces.next().is_some() {
        return None;
    }
    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(year, 4, 4) || !digits(month, 1, 2) || !digits(day, 1, 2) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Stable sort by parsed date, most recent first. Parsed dates are rewritten
/// as `YYYY/MM/DD`; rows that fail to parse keep their text and go last in
/// their original relative order.
pub fn sort_by_date_desc(table: &mut Table, date_column: &str) -> Result<StageOutcome> {
    let Some(idx) = table.column_index(date_column) else {
        return Ok(StageOutcome::Warned(PipelineWarning::DateColumnMissing {
            stage: "date sort".to_string(),
            column: date_column.to_string(),
        }));
    };

    let parsed: Vec<Option<NaiveDate>> = table
        .rows()
        .iter()
        .map(|row| parse_slash_date(&row[idx]))
        .collect();
    let unparseable = parsed.iter().filter(|d| d.is_none()).count();
    let first_bad = parsed
        .iter()
        .position(Option::is_none)
        .map(|row| table.rows()[row][idx].clone());

    let mut order: Vec<usize> = (0..parsed.len()).collect();
    // `None` orders below every date, so reversing the key puts it last.
    order.sort_by_key(|row| std::cmp::Reverse(parsed[*row]));
    table.reorder(&order);

    for (row, original) in table.rows_mut().iter_mut().zip(order.iter()) {
        if let Some(date) = parsed[*original] {
            row[idx] = date.format(CANONICAL_DATE_FORMAT).to_string();
        }
    }
    debug!("Sorted {} row(s) by '{date_column}'", parsed.len());

    match first_bad {
        Some(first) => Ok(StageOutcome::Warned(PipelineWarning::UnparseableDates {
            count: unparseable,
            first,
        })),
        None => {
            info!("Sorted by '{date_column}' descending");
            Ok(StageOutcome::Applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTS: DateParts<'static> = DateParts {
        year: "year",
        month: "month",
        day: "day",
    };

    #[test]
    fn decompose_inserts_raw_parts_after_date() {
        let mut table = Table::from_literal(
            &["date", "customer"],
            &[&[" 2024/1/5 ", "a"], &["2023/12/31", "b"]],
        )
        .unwrap();
        let outcome = decompose_dates(&mut table, "date", PARTS).unwrap();
        assert_eq!(outcome, StageOutcome::Applied);
        assert_eq!(table.headers(), &["date", "year", "month", "day", "customer"]);
        assert_eq!(table.rows()[0], vec![" 2024/1/5 ", "2024", "1", "5", "a"]);
        assert_eq!(table.rows()[1], vec!["2023/12/31", "2023", "12", "31", "b"]);
    }

    #[test]
    fn decompose_is_all_or_nothing() {
        let mut table = Table::from_literal(
            &["date"],
            &[&["2024/01/05"], &["2024-01-06"], &["2024/01/07/extra"]],
        )
        .unwrap();
        let outcome = decompose_dates(&mut table, "date", PARTS).unwrap();
        assert_eq!(
            outcome,
            StageOutcome::Warned(PipelineWarning::DateSplit {
                row: 3,
                value: "2024-01-06".to_string(),
                parts: 1,
            })
        );
        assert_eq!(table.headers(), &["date"]);
    }

    #[test]
    fn decompose_skips_without_date_column() {
        let mut table = Table::from_literal(&["other"], &[&["x"]]).unwrap();
        let outcome = decompose_dates(&mut table, "date", PARTS).unwrap();
        assert!(matches!(
            outcome,
            StageOutcome::Warned(PipelineWarning::DateColumnMissing { .. })
        ));
    }

    #[test]
    fn decompose_empty_table_keeps_layout() {
        let mut table = Table::from_literal(&["date", "customer"], &[]).unwrap();
        decompose_dates(&mut table, "date", PARTS).unwrap();
        assert_eq!(table.headers(), &["date", "year", "month", "day", "customer"]);
    }

    #[test]
    fn parse_slash_date_enforces_shape() {
        assert_eq!(
            parse_slash_date("2024/1/5"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(
            parse_slash_date(" 2024/01/05 "),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_slash_date("24/01/05"), None);
        assert_eq!(parse_slash_date("2024/001/05"), None);
        assert_eq!(parse_slash_date("2024/02/30"), None);
        assert_eq!(parse_slash_date("2024-01-05"), None);
        assert_eq!(parse_slash_date("2024/+1/05"), None);
        assert_eq!(parse_slash_date(""), None);
    }

    #[test]
    fn sort_orders_descending_and_canonicalizes() {
        let mut table = Table::from_literal(
            &["date", "id"],
            &[
                &["2024/1/5", "a"],
                &["2024/03/01", "b"],
                &["2023/12/31", "c"],
                &["2024/01/05", "d"],
            ],
        )
        .unwrap();
        let outcome = sort_by_date_desc(&mut table, "date").unwrap();
        assert_eq!(outcome, StageOutcome::Applied);
        let ids: Vec<_> = table.column("id").unwrap().collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);
        let dates: Vec<_> = table.column("date").unwrap().collect();
        assert_eq!(dates, vec!["2024/03/01", "2024/01/05", "2024/01/05", "2023/12/31"]);
    }

    #[test]
    fn sort_keeps_unparseable_rows_last_with_their_text() {
        let mut table = Table::from_literal(
            &["date", "id"],
            &[
                &["soon", "a"],
                &["2024/01/05", "b"],
                &["", "c"],
                &["2025/01/01", "d"],
            ],
        )
        .unwrap();
        let outcome = sort_by_date_desc(&mut table, "date").unwrap();
        assert_eq!(
            outcome,
            StageOutcome::Warned(PipelineWarning::UnparseableDates {
                count: 2,
                first: "soon".to_string(),
            })
        );
        let ids: Vec<_> = table.column("id").unwrap().collect();
        assert_eq!(ids, vec!["d", "b", "a", "c"]);
        assert_eq!(table.cell(2, "date"), Some("soon"));
        assert_eq!(table.cell(3, "date"), Some(""));
    }
}
