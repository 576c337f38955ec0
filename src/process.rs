use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    cli::{ColumnsArgs, ConfigArgs, NormalizeArgs, ProcessArgs},
    config::PipelineConfig,
    io_utils,
    names::NameNormalizer,
    pipeline::Pipeline,
};

fn load_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let config = PipelineConfig::resolve(args.config.as_deref(), args.labels)?;
    debug!("Reserved columns: {:?}", config.labels.reserved());
    Ok(config)
}

pub fn execute(args: &ProcessArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    let data_delimiter = io_utils::resolve_input_delimiter(&args.data, args.delimiter);
    let mapping_delimiter =
        io_utils::resolve_input_delimiter(&args.mapping, args.mapping_delimiter);
    let data_encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mapping_encoding = match args.mapping_encoding.as_deref() {
        Some(label) => io_utils::resolve_encoding(Some(label))?,
        None => data_encoding,
    };
    let output_encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let output_path = Some(args.output.as_path()).filter(|p| !io_utils::is_dash(p));
    let output_delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter);

    info!(
        "Processing '{}' with mapping '{}' -> {}",
        args.data.display(),
        args.mapping.display(),
        output_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into()),
    );

    let raw = io_utils::read_table(&args.data, data_delimiter, data_encoding)
        .with_context(|| format!("Reading data file {:?}", args.data))?;
    info!(
        "Loaded data file: {} row(s), {} column(s)",
        raw.row_count(),
        raw.column_count()
    );
    let mapping = io_utils::read_table(&args.mapping, mapping_delimiter, mapping_encoding)
        .with_context(|| format!("Reading mapping file {:?}", args.mapping))?;
    info!("Loaded mapping file: {} row(s)", mapping.row_count());

    let pipeline = Pipeline::new(&config)?;
    let outcome = pipeline
        .run(&raw, &mapping)
        .context("Processing data file")?;

    let bytes = io_utils::encode_table(
        &outcome.table,
        output_delimiter,
        output_encoding,
        !args.no_bom,
    )?;
    io_utils::write_output(output_path, &bytes)?;

    for note in &outcome.report.notes {
        debug!("{}: {}", note.stage, note.message);
    }
    if outcome.report.has_warnings() {
        warn!(
            "Finished with {} warning(s); see messages above",
            outcome.report.warnings.len()
        );
    }
    info!(
        "Wrote {} row(s) to {}",
        outcome.table.row_count(),
        output_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}

pub fn normalize(args: &NormalizeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let normalizer = NameNormalizer::new(&config.vendor_prefixes, &config.packaging_keywords)?;
    let mut out = io::stdout().lock();
    if args.names.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("Reading names from stdin")?;
            writeln_normalized(&mut out, &normalizer, &line)?;
        }
    } else {
        for name in &args.names {
            writeln_normalized(&mut out, &normalizer, name)?;
        }
    }
    Ok(())
}

fn writeln_normalized<W: Write>(
    out: &mut W,
    normalizer: &NameNormalizer,
    name: &str,
) -> Result<()> {
    writeln!(out, "{}", normalizer.normalize(name)).context("Writing normalized name")
}

pub fn columns(args: &ColumnsArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let labels = &config.labels;
    let mut out = io::stdout().lock();
    writeln!(out, "input:  {}", labels.reserved().join(", ")).context("Writing column list")?;
    writeln!(out, "output: {}", labels.output_layout().join(", "))
        .context("Writing column list")?;
    Ok(())
}
