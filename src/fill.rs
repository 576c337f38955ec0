//! Forward-fill and trailing summary row removal.

use log::{debug, info};

use crate::table::Table;

/// Replaces each empty cell with the last non-empty value above it in the
/// same column. Leading empties stay empty. Returns the number of cells filled.
pub fn forward_fill(table: &mut Table) -> usize {
    let mut last_seen: Vec<Option<String>> = vec![None; table.column_count()];
    let mut filled = 0usize;
    for row in table.rows_mut() {
        for (cell, last) in row.iter_mut().zip(last_seen.iter_mut()) {
            if cell.is_empty() {
                if let Some(previous) = last {
                    cell.clone_from(previous);
                    filled += 1;
                }
            } else {
                *last = Some(cell.clone());
            }
        }
    }
    debug!("Forward-filled {filled} empty cell(s)");
    filled
}

/// Drops the last row when its `date_column` cell, trimmed, equals `marker`.
/// A missing column or an empty table is left alone.
pub fn trim_trailing_summary(table: &mut Table, date_column: &str, marker: &str) -> bool {
    let last_row = table.row_count().checked_sub(1);
    let is_summary = last_row
        .and_then(|row| table.cell(row, date_column))
        .is_some_and(|value| value.trim() == marker);
    if is_summary {
        table.pop_row();
        info!("Last row '{date_column}' is '{marker}'; removed summary row");
    }
    is_summary
}
