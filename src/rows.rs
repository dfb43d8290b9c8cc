//! Row loading from delimited text and JSON files.
//!
//! Rows are keyed by source field name. Structured columns (links, labels,
//! paths) are parsed into their cell family according to the grid
//! configuration; everything else stays text and is classified later.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use log::debug;
use serde_json::Value as JsonValue;

use crate::{
    comparator::SortVariant,
    config::{ColumnDef, GridConfig},
    io_utils::{self, InputFormat},
    value::{CellFamily, CellValue, Row, RowLevel},
};

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub format: Option<InputFormat>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: None,
            encoding: encoding_rs::UTF_8,
            format: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadedRows {
    /// Field names in first-seen order.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Cell family a column's source field is parsed into: the family of the
/// first of `sort_type`, `render_with` that names a structured comparator.
pub fn family_for(column: &ColumnDef) -> CellFamily {
    let keys = [column.sort_type.as_deref(), column.render_with.as_deref()];
    keys.into_iter()
        .flatten()
        .filter_map(|key| key.parse::<SortVariant>().ok())
        .find_map(SortVariant::family)
        .unwrap_or_default()
}

struct FieldPlan {
    families: HashMap<String, CellFamily>,
    class_field: Option<String>,
}

impl FieldPlan {
    fn new(config: Option<&GridConfig>) -> Self {
        let families = config
            .map(|config| {
                config
                    .columns
                    .iter()
                    .map(|column| (column.source().to_string(), family_for(column)))
                    .collect()
            })
            .unwrap_or_default();
        FieldPlan {
            families,
            class_field: config.and_then(|config| config.class_column.clone()),
        }
    }

    fn family(&self, field: &str) -> CellFamily {
        self.families.get(field).copied().unwrap_or_default()
    }

    fn finish(&self, row: Row) -> Row {
        match &self.class_field {
            Some(field) => {
                let level = RowLevel::from_marker(row.cell(field));
                row.with_level(level)
            }
            None => row,
        }
    }
}

pub fn load_rows(
    path: &Path,
    options: &LoadOptions,
    config: Option<&GridConfig>,
) -> Result<LoadedRows> {
    let format = options.format.unwrap_or_else(|| InputFormat::detect(path));
    let plan = FieldPlan::new(config);
    let loaded = match format {
        InputFormat::Delimited => load_delimited(path, options, &plan),
        InputFormat::Json => load_json(path, options, &plan),
    }
    .with_context(|| format!("Loading rows from {path:?}"))?;
    debug!(
        "Loaded {} row(s) with {} field(s) from {path:?}",
        loaded.rows.len(),
        loaded.headers.len()
    );
    Ok(loaded)
}

fn load_delimited(path: &Path, options: &LoadOptions, plan: &FieldPlan) -> Result<LoadedRows> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let mut reader = io_utils::open_csv_reader(io_utils::open_input(path)?, delimiter);
    let headers = io_utils::reader_headers(&mut reader, options.encoding)?;
    let families: Vec<CellFamily> = headers.iter().map(|h| plan.family(h)).collect();
    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        let fields = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {}", idx + 2))?;
        let row = headers
            .iter()
            .zip(&families)
            .zip(&fields)
            .fold(Row::new(), |row, ((header, family), raw)| {
                row.with_cell(header.as_str(), CellValue::parse(raw, *family))
            });
        rows.push(plan.finish(row));
    }
    Ok(LoadedRows { headers, rows })
}

fn load_json(path: &Path, options: &LoadOptions, plan: &FieldPlan) -> Result<LoadedRows> {
    let text = io_utils::read_text(path, options.encoding)?;
    let document: JsonValue = serde_json::from_str(&text).context("Parsing JSON rows")?;
    let items = match document {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("rows") {
            Some(JsonValue::Array(items)) => items,
            _ => return Err(anyhow!("Expected a JSON array of row objects")),
        },
        _ => return Err(anyhow!("Expected a JSON array of row objects")),
    };
    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let JsonValue::Object(object) = item else {
            return Err(anyhow!("Row {} is not a JSON object", idx + 1));
        };
        let mut row = Row::new();
        for (field, value) in object {
            if !headers.iter().any(|h| h == field) {
                headers.push(field.clone());
            }
            row = row.with_cell(field.as_str(), CellValue::from_json(value, plan.family(field)));
        }
        rows.push(plan.finish(row));
    }
    Ok(LoadedRows { headers, rows })
}
