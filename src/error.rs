//! Error and warning types raised by the cleaning pipeline.
//!
//! Errors abort a run; warnings are collected in the run report and the
//! pipeline carries on with best-effort output.

use thiserror::Error;

/// Fatal failures. Any of these ends the run without producing output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A required column is absent from one of the input tables.
    #[error("Column '{column}' not found in {table} file")]
    MissingColumn { table: String, column: String },

    /// The mapping file lacks one of its two required columns.
    #[error("Mapping file must contain columns '{material}' and '{alias}' (missing '{column}')")]
    MappingSchema {
        column: String,
        material: String,
        alias: String,
    },

    /// Anything else that went wrong while transforming the table.
    #[error("Unexpected failure during processing: {0}")]
    Unexpected(String),
}

impl PipelineError {
    pub fn missing_column(table: &str, column: &str) -> Self {
        PipelineError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

/// Non-fatal problems. The affected stage is skipped or degrades.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    #[error("Date column '{column}' not found; {stage} skipped")]
    DateColumnMissing { stage: String, column: String },

    #[error(
        "Date value '{value}' in row {row} splits into {parts} part(s) instead of year/month/day; decomposition skipped"
    )]
    DateSplit {
        row: usize,
        value: String,
        parts: usize,
    },

    #[error("{count} row(s) have dates that are not year/month/day (first: '{first}'); they were kept last")]
    UnparseableDates { count: usize, first: String },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
