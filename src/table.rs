//! Plain-text presenter.
//!
//! [`RenderedTable`] renders a page of rows through each column's renderer
//! and doubles as the measure phase of the layout protocol: its widths are
//! the rendered character widths plus the gutter between columns, scaled to
//! pixels at [`CHAR_WIDTH_PX`] per character.

use std::{borrow::Cow, io};

use anyhow::{Context, Result};

use crate::{
    config::ColumnDef,
    layout::{Measure, WidthMap},
    render::RendererKind,
    value::Row,
};

const GUTTER: usize = 2;
pub const CHAR_WIDTH_PX: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    ids: Vec<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    widths: Vec<usize>,
}

impl RenderedTable {
    pub fn build<'a, I>(columns: &[ColumnDef], rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let renderers: Vec<RendererKind> = columns.iter().map(RendererKind::for_column).collect();
        let headers: Vec<String> = columns
            .iter()
            .map(|column| column.header_text().to_string())
            .collect();
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(&renderers)
                    .map(|(column, renderer)| renderer.render(row.cell(column.source())).into_owned())
                    .collect()
            })
            .collect();

        let ids = columns.iter().map(|column| column.id.clone()).collect();
        RenderedTable::from_cells(ids, headers, rows)
    }

    /// Table over already-rendered text, e.g. a report.
    pub fn from_cells(ids: Vec<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
        for row in &rows {
            for (idx, cell) in row.iter().enumerate().take(widths.len()) {
                widths[idx] = widths[idx].max(display_width(cell));
            }
        }
        for width in &mut widths {
            *width = (*width).max(1);
        }
        RenderedTable {
            ids,
            headers,
            rows,
            widths,
        }
    }

    pub fn report(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        RenderedTable::from_cells(headers.clone(), headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn render(&self) -> String {
        let separators: Vec<String> = self.widths.iter().map(|w| "-".repeat(*w)).collect();
        let mut output = String::new();
        for line in [&self.headers, &separators].into_iter().chain(&self.rows) {
            output.push_str(&format_row(line, &self.widths));
            output.push('\n');
        }
        output
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }

    pub fn write_csv<W: io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer
            .write_record(&self.headers)
            .context("Writing header row")?;
        for (idx, row) in self.rows.iter().enumerate() {
            writer
                .write_record(row)
                .with_context(|| format!("Writing row {}", idx + 1))?;
        }
        writer.flush().context("Flushing output")?;
        Ok(())
    }
}

impl Measure for RenderedTable {
    fn measure(&self) -> WidthMap {
        self.ids
            .iter()
            .zip(&self.widths)
            .map(|(id, width)| {
                let chars = u32::try_from(width + GUTTER).unwrap_or(u32::MAX);
                let measured = chars.saturating_mul(CHAR_WIDTH_PX);
                (id.clone(), measured)
            })
            .collect()
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let value = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&value));
            format!("{value}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(&" ".repeat(GUTTER));
    line.truncate(line.trim_end().len());
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape, e.g. \x1b[31m
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    fn sample() -> (Vec<ColumnDef>, Vec<Row>) {
        let columns = vec![
            ColumnDef::new("name"),
            ColumnDef::new("active").render_with("boolean"),
        ];
        let rows = vec![
            Row::new()
                .with_cell("name", CellValue::text("Pump\nA"))
                .with_cell("active", CellValue::Boolean(true)),
            Row::new().with_cell("name", CellValue::text("Valve")),
        ];
        (columns, rows)
    }

    #[test]
    fn render_pads_columns_and_sanitizes_cells() {
        let (columns, rows) = sample();
        let table = RenderedTable::build(&columns, &rows);
        let rendered = table.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "name    active");
        assert_eq!(lines[1], "------  ------");
        assert_eq!(lines[2], "Pump A  √");
        assert_eq!(lines[3], "Valve   -");
        assert_eq!(lines.len(), 4);
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn measure_reports_widths_with_gutter() {
        let (columns, rows) = sample();
        let widths = RenderedTable::build(&columns, &rows).measure();
        assert_eq!(widths.get("name"), Some(&64));
        assert_eq!(widths.get("active"), Some(&64));
    }
}
