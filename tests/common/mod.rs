#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sticky_grid::value::{CellValue, Row};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory that is removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}

/// One single-cell text row per value; empty strings become blank cells.
pub fn text_rows(column: &str, values: &[&str]) -> Vec<Row> {
    values
        .iter()
        .map(|value| {
            let cell = if value.is_empty() {
                CellValue::Blank
            } else {
                CellValue::text(*value)
            };
            Row::new().with_cell(column, cell)
        })
        .collect()
}

/// The display text of `column` for each row, blanks as empty strings.
pub fn column_text<'a, I>(rows: I, column: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .map(|row| row.cell(column).to_string())
        .collect()
}
