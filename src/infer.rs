//! `infer` command: per-column kind inference.

use anyhow::{Context, Result};
use log::info;

use crate::{
    classify::{KindTally, ValueKind, tally_column},
    cli::InferArgs,
    config::GridConfig,
    io_utils,
    rows::{LoadedRows, load_rows},
    table::RenderedTable,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInference {
    pub column: String,
    pub tally: KindTally,
    pub kind: ValueKind,
}

pub fn infer_columns(loaded: &LoadedRows, sample_rows: usize) -> Vec<ColumnInference> {
    let sample = match sample_rows {
        0 => &loaded.rows[..],
        n => &loaded.rows[..n.min(loaded.rows.len())],
    };
    loaded
        .headers
        .iter()
        .map(|header| {
            let tally = tally_column(sample, header);
            ColumnInference {
                column: header.clone(),
                tally,
                kind: tally.decide(),
            }
        })
        .collect()
}

pub fn inferred_config(inferences: &[ColumnInference]) -> GridConfig {
    let headers: Vec<String> = inferences
        .iter()
        .map(|inference| inference.column.clone())
        .collect();
    let mut config = GridConfig::from_headers(&headers);
    for (column, inference) in config.columns.iter_mut().zip(inferences) {
        column.filter_type = Some(inference.kind);
    }
    config
}

pub fn execute(args: &InferArgs) -> Result<()> {
    let input = &args.input;
    info!(
        "Inferring column kinds in '{}' with delimiter '{}'",
        input.input.display(),
        crate::printable_delimiter(io_utils::resolve_input_delimiter(&input.input, input.delimiter))
    );
    let options = crate::load_options(input)?;
    let loaded = load_rows(&input.input, &options, None)?;
    let inferences = infer_columns(&loaded, args.sample_rows);

    let rows = inferences
        .iter()
        .map(|inference| {
            vec![
                inference.column.clone(),
                inference.tally.number.to_string(),
                inference.tally.string.to_string(),
                inference.tally.mixed.to_string(),
                inference.kind.to_string(),
            ]
        })
        .collect();
    RenderedTable::report(&["column", "number", "string", "mixed", "kind"], rows).print();

    if let Some(output) = &args.output {
        let config = inferred_config(&inferences);
        config
            .save(output)
            .with_context(|| format!("Writing grid configuration to {output:?}"))?;
        info!(
            "Grid configuration for {} column(s) written to {output:?}",
            config.columns.len()
        );
    }
    Ok(())
}
