//! Ordered-column table used by every pipeline stage.
//!
//! A [`Table`] keeps an explicit header list and row-major cells. Column
//! positions are always resolved by name at the moment they are needed, so
//! inserting a derived column after an anchor shifts everything behind it
//! without any caller doing index arithmetic.

use itertools::Itertools;
use log::debug;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table, rejecting rows whose width differs from the header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(PipelineError::Unexpected(format!(
                "Row {} has {} cell(s) but the header defines {} column(s)",
                idx + 2,
                row.len(),
                headers.len()
            )));
        }
        Ok(Table { headers, rows })
    }

    /// Convenience constructor for literal tables.
    pub fn from_literal(headers: &[&str], rows: &[&[&str]]) -> Result<Self> {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<String>] {
        &mut self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Keeps only `columns`, in the order given. Fails on the first name the
    /// table does not have; `table_label` identifies the source in the error.
    pub fn select(&self, columns: &[&str], table_label: &str) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| PipelineError::missing_column(table_label, name))
            })
            .collect::<Result<Vec<_>>>()?;
        let dropped = self
            .headers
            .iter()
            .filter(|h| !columns.contains(&h.as_str()))
            .join(", ");
        if !dropped.is_empty() {
            debug!("Dropping column(s) from {table_label} file: {dropped}");
        }
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|idx| row[*idx].clone()).collect())
            .collect();
        Ok(Table {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    /// Inserts `name` immediately after `anchor`, one value per row.
    pub fn insert_column_after(
        &mut self,
        anchor: &str,
        name: &str,
        values: Vec<String>,
    ) -> Result<()> {
        let anchor_idx = self.column_index(anchor).ok_or_else(|| {
            PipelineError::Unexpected(format!("Anchor column '{anchor}' not present"))
        })?;
        if self.has_column(name) {
            return Err(PipelineError::Unexpected(format!(
                "Column '{name}' already exists"
            )));
        }
        if values.len() != self.rows.len() {
            return Err(PipelineError::Unexpected(format!(
                "Column '{name}' has {} value(s) for {} row(s)",
                values.len(),
                self.rows.len()
            )));
        }
        let position = anchor_idx + 1;
        self.headers.insert(position, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(position, value);
        }
        debug!("Inserted column '{name}' at position {position} after '{anchor}'");
        Ok(())
    }

    /// Replaces every cell of `name` with `f(cell)`.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Option<()>
    where
        F: FnMut(&str) -> String,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Some(())
    }

    pub fn pop_row(&mut self) -> Option<Vec<String>> {
        self.rows.pop()
    }

    /// Reorders rows by a permutation of row indices.
    pub fn reorder(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.rows.len());
        let mut taken: Vec<Option<Vec<String>>> =
            std::mem::take(&mut self.rows).into_iter().map(Some).collect();
        self.rows = order
            .iter()
            .filter_map(|idx| taken.get_mut(*idx).and_then(Option::take))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_literal(
            &["a", "b", "c"],
            &[&["1", "2", "3"], &["4", "5", "6"]],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let err = Table::from_literal(&["a", "b"], &[&["1"]]).unwrap_err();
        assert!(matches!(err, PipelineError::Unexpected(_)));
    }

    #[test]
    fn select_reorders_and_reports_missing() {
        let table = sample();
        let selected = table.select(&["c", "a"], "data").unwrap();
        assert_eq!(selected.headers(), &["c", "a"]);
        assert_eq!(selected.rows()[1], vec!["6", "4"]);

        let err = table.select(&["a", "z"], "data").unwrap_err();
        assert_eq!(err, PipelineError::missing_column("data", "z"));
    }

    #[test]
    fn insert_after_shifts_following_columns() {
        let mut table = sample();
        table
            .insert_column_after("a", "x", vec!["x1".into(), "x2".into()])
            .unwrap();
        assert_eq!(table.headers(), &["a", "x", "b", "c"]);
        assert_eq!(table.column_index("b"), Some(2));
        table
            .insert_column_after("c", "y", vec!["y1".into(), "y2".into()])
            .unwrap();
        assert_eq!(table.headers(), &["a", "x", "b", "c", "y"]);
        assert_eq!(table.rows()[0], vec!["1", "x1", "2", "3", "y1"]);
    }

    #[test]
    fn insert_after_rejects_bad_input() {
        let mut table = sample();
        assert!(table.insert_column_after("zz", "x", vec![]).is_err());
        assert!(table.insert_column_after("a", "b", vec!["".into(), "".into()]).is_err());
        assert!(table.insert_column_after("a", "x", vec!["".into()]).is_err());
    }

    #[test]
    fn reorder_applies_permutation() {
        let mut table = sample();
        table.reorder(&[1, 0]);
        assert_eq!(table.rows()[0][0], "4");
        assert_eq!(table.rows()[1][0], "1");
    }
}
