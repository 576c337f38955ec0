//! Runs the cleaning stages in order and collects a report.
//!
//! Stage order is fixed: reduce columns, forward-fill, drop the trailing
//! summary row, add aliases, split dates, sort by date, normalize material
//! names. Alias lookup sees material names before normalization.

use std::fmt;

use log::{info, warn};

use crate::{
    alias::{DATA_TABLE, enrich_with_alias},
    config::PipelineConfig,
    dates::{DateParts, StageOutcome, decompose_dates, sort_by_date_desc},
    error::{PipelineError, PipelineWarning, Result},
    fill::{forward_fill, trim_trailing_summary},
    names::NameNormalizer,
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReduceColumns,
    ForwardFill,
    TrimSummary,
    Alias,
    SplitDate,
    SortByDate,
    NormalizeNames,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::ReduceColumns => "reduce columns",
            Stage::ForwardFill => "forward fill",
            Stage::TrimSummary => "trim summary row",
            Stage::Alias => "alias enrichment",
            Stage::SplitDate => "date decomposition",
            Stage::SortByDate => "date sort",
            Stage::NormalizeNames => "name normalization",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNote {
    pub stage: Stage,
    pub message: String,
}

/// What happened during a run, stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub notes: Vec<StageNote>,
    pub warnings: Vec<PipelineWarning>,
}

impl RunReport {
    fn note(&mut self, stage: Stage, message: impl Into<String>) {
        self.notes.push(StageNote {
            stage,
            message: message.into(),
        });
    }

    fn record(&mut self, stage: Stage, outcome: StageOutcome, applied: impl Into<String>) {
        match outcome {
            StageOutcome::Applied => self.note(stage, applied),
            StageOutcome::Warned(warning) => {
                warn!("{stage}: {warning}");
                self.warnings.push(warning);
            }
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub table: Table,
    pub report: RunReport,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    normalizer: NameNormalizer,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Result<Self> {
        config
            .labels
            .validate()
            .map_err(|err| PipelineError::Unexpected(format!("{err:#}")))?;
        let normalizer =
            NameNormalizer::new(&config.vendor_prefixes, &config.packaging_keywords)
                .map_err(|err| PipelineError::Unexpected(format!("{err:#}")))?;
        Ok(Pipeline { config, normalizer })
    }

    /// Restricts a raw data table to the reserved columns.
    pub fn reduce(&self, raw: &Table) -> Result<Table> {
        let reserved = self.config.labels.reserved();
        let reduced = raw.select(&reserved, DATA_TABLE)?;
        info!(
            "Kept {} reserved column(s), dropped {}",
            reduced.column_count(),
            raw.column_count().saturating_sub(reduced.column_count())
        );
        Ok(reduced)
    }

    /// Runs every stage. `mapping` is only read.
    pub fn run(&self, raw: &Table, mapping: &Table) -> Result<PipelineOutcome> {
        let labels = &self.config.labels;
        let mut report = RunReport::default();

        let mut table = self.reduce(raw)?;
        report.note(
            Stage::ReduceColumns,
            format!("kept {} column(s)", table.column_count()),
        );

        let filled = forward_fill(&mut table);
        report.note(Stage::ForwardFill, format!("filled {filled} empty cell(s)"));

        if trim_trailing_summary(&mut table, &labels.date, &self.config.total_marker) {
            report.note(
                Stage::TrimSummary,
                format!("removed trailing '{}' row", self.config.total_marker),
            );
        }

        enrich_with_alias(
            &mut table,
            mapping,
            &labels.material_name,
            &labels.alias,
            &self.config.alias_placeholder,
        )?;
        report.note(
            Stage::Alias,
            format!("inserted '{}' after '{}'", labels.alias, labels.material_name),
        );

        let parts = DateParts {
            year: &labels.year,
            month: &labels.month,
            day: &labels.day,
        };
        let outcome = decompose_dates(&mut table, &labels.date, parts)?;
        report.record(
            Stage::SplitDate,
            outcome,
            format!("extracted '{}', '{}', '{}'", labels.year, labels.month, labels.day),
        );

        let outcome = sort_by_date_desc(&mut table, &labels.date)?;
        report.record(Stage::SortByDate, outcome, "sorted by date descending");

        table
            .map_column(&labels.material_name, |name| self.normalizer.normalize(name))
            .ok_or_else(|| PipelineError::missing_column(DATA_TABLE, &labels.material_name))?;
        report.note(
            Stage::NormalizeNames,
            format!("normalized '{}'", labels.material_name),
        );

        info!(
            "Pipeline finished: {} row(s), {} column(s), {} warning(s)",
            table.row_count(),
            table.column_count(),
            report.warnings.len()
        );
        Ok(PipelineOutcome { table, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_records() -> Table {
        Table::from_literal(
            &[
                "document_id",
                "extra",
                "date",
                "customer",
                "material_name",
                "quantity_delivered",
                "unit_price_pretax",
                "total_price_taxed",
            ],
            &[
                &["D1", "x", "2024/01/05", "Acme", "品胜-充电宝 纸盒装", "2", "10", "23"],
                &["D2", "y", "2024/02/01", "", "数据线", "1", "5", "5.65"],
                &["", "", "合计", "", "", "3", "", "28.65"],
            ],
        )
        .unwrap()
    }

    fn mapping() -> Table {
        Table::from_literal(
            &["material_name", "alias"],
            &[&["充电宝", "PB001"], &["数据线", "DL01"]],
        )
        .unwrap()
    }

    #[test]
    fn run_produces_expected_layout_and_values() {
        let config = PipelineConfig::default();
        let pipeline = Pipeline::new(&config).unwrap();
        let outcome = pipeline.run(&raw_records(), &mapping()).unwrap();
        let table = outcome.table;
        assert_eq!(table.headers(), &config.labels.output_layout());
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.rows()[0],
            vec![
                "2024/02/01", "2024", "02", "01", "Acme", "数据线", "DL01", "1", "5", "5.65", "D2"
            ]
        );
        assert_eq!(table.cell(1, "material_name"), Some("充电宝"));
        assert_eq!(table.cell(1, "alias"), Some("无"));
        assert!(!outcome.report.has_warnings());
    }

    #[test]
    fn missing_reserved_column_aborts() {
        let raw = Table::from_literal(&["date", "customer"], &[&["2024/01/05", "a"]]).unwrap();
        let config = PipelineConfig::default();
        let err = Pipeline::new(&config)
            .unwrap()
            .run(&raw, &mapping())
            .unwrap_err();
        assert_eq!(err, PipelineError::missing_column("data", "material_name"));
    }

    #[test]
    fn bad_mapping_aborts() {
        let config = PipelineConfig::default();
        let mapping = Table::from_literal(&["material_name", "short"], &[]).unwrap();
        let err = Pipeline::new(&config)
            .unwrap()
            .run(&raw_records(), &mapping)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MappingSchema { .. }));
    }

    #[test]
    fn malformed_dates_warn_but_finish() {
        let raw = Table::from_literal(
            &config_headers(),
            &[
                &["2024-01-05", "c", "m", "1", "1", "1", "D1"],
                &["2024/01/06", "c", "m", "1", "1", "1", "D2"],
            ],
        )
        .unwrap();
        let config = PipelineConfig::default();
        let outcome = Pipeline::new(&config)
            .unwrap()
            .run(&raw, &mapping())
            .unwrap();
        assert_eq!(outcome.report.warnings.len(), 2);
        assert!(!outcome.table.has_column("year"));
        let ids: Vec<_> = outcome.table.column("document_id").unwrap().collect();
        assert_eq!(ids, vec!["D2", "D1"]);
        assert_eq!(outcome.table.cell(1, "date"), Some("2024-01-05"));
    }

    #[test]
    fn shared_labels_are_refused_before_running() {
        let mut config = PipelineConfig::default();
        config.labels.customer = config.labels.date.clone();
        match Pipeline::new(&config) {
            Err(PipelineError::Unexpected(message)) => {
                assert!(message.contains("'date' is used more than once"))
            }
            other => panic!("expected label error, got {:?}", other.map(|_| ())),
        }
    }

    fn config_headers() -> Vec<&'static str> {
        vec![
            "date",
            "customer",
            "material_name",
            "quantity_delivered",
            "unit_price_pretax",
            "total_price_taxed",
            "document_id",
        ]
    }
}
