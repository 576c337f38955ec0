//! Pipeline configuration: column labels, markers, and normalizer word lists.
//!
//! Defaults reproduce the stock behaviour. A YAML file may override any field;
//! omitted fields keep their defaults.

use std::{fs::File, io::Read, path::Path};

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_MARKER: &str = "合计";
pub const DEFAULT_ALIAS_PLACEHOLDER: &str = "无";
pub const DEFAULT_OUTPUT_FILE: &str = "processed_data.csv";

pub const DEFAULT_VENDOR_PREFIXES: &[&str] = &[
    "品胜严选-",
    "品胜-",
    "移动电源 PISEN QUICK",
    "PISEN (QUICK)",
    "PISEN (PRO)",
    "PISEN QUICK",
    "PISEN PRO",
    "PISEN-",
    "PISEN",
];

pub const DEFAULT_PACKAGING_KEYWORDS: &[&str] = &[
    "纸盒装",
    "纸质彩盒",
    "通用彩盒",
    "彩盒",
    "牛皮盒装",
    "天地盒装",
    "气泡袋",
];

/// Header text for each logical column the pipeline touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLabels {
    pub date: String,
    pub customer: String,
    pub material_name: String,
    pub quantity_delivered: String,
    pub unit_price_pretax: String,
    pub total_price_taxed: String,
    pub document_id: String,
    pub alias: String,
    pub year: String,
    pub month: String,
    pub day: String,
}

impl ColumnLabels {
    pub fn english() -> Self {
        ColumnLabels {
            date: "date".into(),
            customer: "customer".into(),
            material_name: "material_name".into(),
            quantity_delivered: "quantity_delivered".into(),
            unit_price_pretax: "unit_price_pretax".into(),
            total_price_taxed: "total_price_taxed".into(),
            document_id: "document_id".into(),
            alias: "alias".into(),
            year: "year".into(),
            month: "month".into(),
            day: "day".into(),
        }
    }

    pub fn chinese() -> Self {
        ColumnLabels {
            date: "日期".into(),
            customer: "客户".into(),
            material_name: "物料名称".into(),
            quantity_delivered: "实发数量".into(),
            unit_price_pretax: "含税单价".into(),
            total_price_taxed: "价税合计".into(),
            document_id: "单据编号".into(),
            alias: "型号简称".into(),
            year: "年".into(),
            month: "月".into(),
            day: "日".into(),
        }
    }

    /// Columns kept from the data file, in output order.
    pub fn reserved(&self) -> [&str; 7] {
        [
            self.date.as_str(),
            self.customer.as_str(),
            self.material_name.as_str(),
            self.quantity_delivered.as_str(),
            self.unit_price_pretax.as_str(),
            self.total_price_taxed.as_str(),
            self.document_id.as_str(),
        ]
    }

    /// Final column layout after every derived column has been inserted.
    pub fn output_layout(&self) -> [&str; 11] {
        [
            self.date.as_str(),
            self.year.as_str(),
            self.month.as_str(),
            self.day.as_str(),
            self.customer.as_str(),
            self.material_name.as_str(),
            self.alias.as_str(),
            self.quantity_delivered.as_str(),
            self.unit_price_pretax.as_str(),
            self.total_price_taxed.as_str(),
            self.document_id.as_str(),
        ]
    }

    /// Every label must be non-empty and name a different column.
    pub fn validate(&self) -> Result<()> {
        let layout = self.output_layout();
        if layout.iter().any(|label| label.trim().is_empty()) {
            bail!("Column labels must not be empty");
        }
        let repeated = layout.iter().duplicates().join("', '");
        if !repeated.is_empty() {
            bail!("Column labels must be distinct; '{repeated}' is used more than once");
        }
        Ok(())
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        ColumnLabels::english()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LabelPreset {
    #[default]
    En,
    Zh,
}

impl LabelPreset {
    pub fn labels(self) -> ColumnLabels {
        match self {
            LabelPreset::En => ColumnLabels::english(),
            LabelPreset::Zh => ColumnLabels::chinese(),
        }
    }
}

/// A preset name (`en`, `zh`) or an explicit label map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    Preset(LabelPreset),
    Custom(ColumnLabels),
}

impl LabelSpec {
    pub fn resolve(&self) -> ColumnLabels {
        match self {
            LabelSpec::Preset(preset) => preset.labels(),
            LabelSpec::Custom(labels) => labels.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub labels: ColumnLabels,
    pub total_marker: String,
    pub alias_placeholder: String,
    pub vendor_prefixes: Vec<String>,
    pub packaging_keywords: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            labels: ColumnLabels::default(),
            total_marker: DEFAULT_TOTAL_MARKER.to_string(),
            alias_placeholder: DEFAULT_ALIAS_PLACEHOLDER.to_string(),
            vendor_prefixes: DEFAULT_VENDOR_PREFIXES.iter().map(|s| s.to_string()).collect(),
            packaging_keywords: DEFAULT_PACKAGING_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// On-disk form; `labels` accepts a preset name as well as a full map.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    labels: Option<LabelSpec>,
    total_marker: Option<String>,
    alias_placeholder: Option<String>,
    vendor_prefixes: Option<Vec<String>>,
    packaging_keywords: Option<Vec<String>>,
}

impl PipelineConfig {
    pub fn with_preset(preset: LabelPreset) -> Self {
        PipelineConfig {
            labels: preset.labels(),
            ..PipelineConfig::default()
        }
    }

    pub fn from_yaml_str(input: &str, preset: LabelPreset) -> Result<Self> {
        let file: ConfigFile = if input.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(input).context("Parsing pipeline config YAML")?
        };
        let base = PipelineConfig::with_preset(preset);
        let labels = file.labels.map(|spec| spec.resolve()).unwrap_or(base.labels);
        labels.validate()?;
        Ok(PipelineConfig {
            labels,
            total_marker: file.total_marker.unwrap_or(base.total_marker),
            alias_placeholder: file.alias_placeholder.unwrap_or(base.alias_placeholder),
            vendor_prefixes: file.vendor_prefixes.unwrap_or(base.vendor_prefixes),
            packaging_keywords: file.packaging_keywords.unwrap_or(base.packaging_keywords),
        })
    }

    pub fn load(path: &Path, preset: LabelPreset) -> Result<Self> {
        let mut file =
            File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .with_context(|| format!("Reading config file {path:?}"))?;
        PipelineConfig::from_yaml_str(&raw, preset)
            .with_context(|| format!("Loading config from {path:?}"))
    }

    /// Loads `path` when given, otherwise falls back to the preset defaults.
    pub fn resolve(path: Option<&Path>, preset: LabelPreset) -> Result<Self> {
        match path {
            Some(path) => PipelineConfig::load(path, preset),
            None => Ok(PipelineConfig::with_preset(preset)),
        }
    }
}
