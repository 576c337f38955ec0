//! CSV reading and writing, encoding, and delimiter resolution.
//!
//! - **Delimiter resolution**: `.tsv` means tab, everything else comma, unless
//!   a delimiter is given explicitly.
//! - **Encoding**: inputs are decoded and outputs encoded with `encoding_rs`,
//!   defaulting to UTF-8. A leading byte-order mark on input is dropped.
//! - **Output**: the whole table is encoded in memory first, so a failed run
//!   never leaves a half-written file behind. UTF-8 output carries a BOM
//!   unless disabled; other encodings never do.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::{self, File},
    io::{BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow, bail};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::table::Table;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "ods"];

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    match path.and_then(|p| p.extension()).and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    }
}

fn ensure_delimited_text(path: &Path) -> Result<()> {
    let is_spreadsheet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        });
    if is_spreadsheet {
        bail!("Spreadsheet input {path:?} is not supported; export it as CSV first");
    }
    Ok(())
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    ensure_delimited_text(path)?;
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Decodes the header row, dropping a byte-order mark from the first name.
pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers().context("Reading header row")?.clone();
    let mut decoded = decode_record(&headers, encoding)?;
    if let Some(first) = decoded.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(decoded)
}

/// Reads a whole delimited file into a [`Table`]. Short rows are padded to the
/// header width; rows with surplus fields are an error.
pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    let headers = reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", idx + 2))?;
        let mut decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} in {path:?}", idx + 2))?;
        if decoded.len() > headers.len() {
            bail!(
                "Row {} has {} field(s) but the header defines {} column(s) in {path:?}",
                idx + 2,
                decoded.len(),
                headers.len()
            );
        }
        // Short rows (typically a summary line) are padded with empty cells.
        decoded.resize(headers.len(), String::new());
        rows.push(decoded);
    }
    Table::new(headers, rows).with_context(|| format!("Loading table from {path:?}"))
}

/// Serializes `table` with a header row and no index column.
pub fn encode_table(
    table: &Table,
    delimiter: u8,
    encoding: &'static Encoding,
    with_bom: bool,
) -> Result<Vec<u8>> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    let mut writer = builder.from_writer(Vec::new());
    writer
        .write_record(table.headers())
        .context("Writing output headers")?;
    for (idx, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing output row {}", idx + 2))?;
    }
    let utf8 = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV buffer: {}", err.error()))?;

    if encoding == UTF_8 {
        if with_bom {
            let mut bytes = Vec::with_capacity(UTF8_BOM.len() + utf8.len());
            bytes.extend_from_slice(UTF8_BOM);
            bytes.extend_from_slice(&utf8);
            return Ok(bytes);
        }
        return Ok(utf8);
    }

    let text = String::from_utf8(utf8).context("Output is not valid UTF-8")?;
    let (encoded, _output_encoding, had_errors) = encoding.encode(&text);
    if had_errors {
        bail!("Failed to encode output using {}", encoding.name());
    }
    Ok(encoded.into_owned())
}

/// Writes already-encoded output to `path`, or stdout for `None` / `-`.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) if !is_dash(p) => {
            fs::write(p, bytes).with_context(|| format!("Writing output file {p:?}"))
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Writing output to stdout")?;
            stdout.flush().context("Flushing stdout")
        }
    }
}
