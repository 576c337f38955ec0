//! Material alias lookup built from the mapping file.

use std::collections::HashMap;

use log::{debug, info};

use crate::{
    error::{PipelineError, Result},
    table::Table,
};

pub const DATA_TABLE: &str = "data";

/// Total lookup from material name to alias. Unknown names, and names whose
/// last mapping row has an empty alias, resolve to the placeholder.
#[derive(Debug, Clone)]
pub struct AliasLookup {
    entries: HashMap<String, String>,
    placeholder: String,
}

impl AliasLookup {
    /// Reads the mapping top to bottom; a repeated material name keeps the
    /// alias from its last row.
    pub fn build(
        mapping: &Table,
        material_column: &str,
        alias_column: &str,
        placeholder: &str,
    ) -> Result<Self> {
        let schema_error = |column: &str| PipelineError::MappingSchema {
            column: column.to_string(),
            material: material_column.to_string(),
            alias: alias_column.to_string(),
        };
        let material_idx = mapping
            .column_index(material_column)
            .ok_or_else(|| schema_error(material_column))?;
        let alias_idx = mapping
            .column_index(alias_column)
            .ok_or_else(|| schema_error(alias_column))?;

        let mut entries = HashMap::with_capacity(mapping.row_count());
        for row in mapping.rows() {
            entries.insert(row[material_idx].clone(), row[alias_idx].clone());
        }
        debug!(
            "Alias lookup built from {} mapping row(s), {} distinct material(s)",
            mapping.row_count(),
            entries.len()
        );
        Ok(AliasLookup {
            entries,
            placeholder: placeholder.to_string(),
        })
    }

    pub fn resolve(&self, material: &str) -> &str {
        match self.entries.get(material) {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.placeholder,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Inserts `alias_column` right after `material_column`, resolving each
/// material name through the mapping table.
pub fn enrich_with_alias(
    records: &mut Table,
    mapping: &Table,
    material_column: &str,
    alias_column: &str,
    placeholder: &str,
) -> Result<()> {
    if !records.has_column(material_column) {
        return Err(PipelineError::missing_column(DATA_TABLE, material_column));
    }
    let lookup = AliasLookup::build(mapping, material_column, alias_column, placeholder)?;

    let mut unmatched = 0usize;
    let aliases = records
        .column(material_column)
        .map(|names| {
            names
                .map(|name| {
                    let alias = lookup.resolve(name);
                    if alias == placeholder {
                        unmatched += 1;
                    }
                    alias.to_string()
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    records.insert_column_after(material_column, alias_column, aliases)?;
    info!(
        "Inserted '{alias_column}' after '{material_column}' ({} matched, {unmatched} unmatched)",
        records.row_count() - unmatched
    );
    Ok(())
}
