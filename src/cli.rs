use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_OUTPUT_FILE, LabelPreset};

#[derive(Debug, Parser)]
#[command(author, version, about = "Clean and enrich sales delivery CSV exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reduce, fill, enrich, split dates, sort, and normalize a data file
    Process(ProcessArgs),
    /// Print the cleaned form of material names
    Normalize(NormalizeArgs),
    /// List the reserved input columns and the final output layout
    Columns(ColumnsArgs),
}

/// Options shared by every command that needs pipeline configuration.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Built-in column label set
    #[arg(long = "labels", value_enum, default_value_t = LabelPreset::En)]
    pub labels: LabelPreset,
    /// YAML file overriding labels, markers, prefixes, or packaging keywords
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Data CSV file (`-` reads stdin)
    #[arg(short = 'd', long = "data")]
    pub data: PathBuf,
    /// Mapping CSV file with material name and alias columns
    #[arg(short = 'm', long = "mapping")]
    pub mapping: PathBuf,
    /// Output CSV file (`-` writes stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,
    #[command(flatten)]
    pub config: ConfigArgs,
    /// CSV delimiter for the data file (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// CSV delimiter for the mapping file (defaults to extension-based detection)
    #[arg(long = "mapping-delimiter", value_parser = parse_delimiter)]
    pub mapping_delimiter: Option<u8>,
    /// Delimiter to use for output (defaults to comma, or tab for .tsv)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Character encoding of the data file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding of the mapping file (defaults to the data file encoding)
    #[arg(long = "mapping-encoding")]
    pub mapping_encoding: Option<String>,
    /// Character encoding for the output (defaults to utf-8 with a byte-order mark)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Omit the UTF-8 byte-order mark
    #[arg(long = "no-bom")]
    pub no_bom: bool,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Names to normalize; reads one name per stdin line when omitted
    pub names: Vec<String>,
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
