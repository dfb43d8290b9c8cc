//! Column value-kind inference.
//!
//! Samples a column and tallies each non-blank cell as numeric, string or
//! mixed (numeric prefix followed by text). The plurality kind wins only when
//! it outnumbers both other kinds by [`DOMINANCE_RATIO`]; otherwise the column
//! is `mixed`, so a mostly-numeric column with a few formatted exceptions is
//! not forced into pure numeric ordering.

use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::{
    collate::{first_non_numeric_index, is_incomplete_number, strip_thousands},
    value::{CellValue, Row},
};

/// Sampling stops once any kind reaches this many matches.
pub const CLASSIFY_MATCH_CAP: usize = 50;
pub const DOMINANCE_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ValueKind {
    Number,
    String,
    Mixed,
    Date,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Mixed => "mixed",
            ValueKind::Date => "date",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "number" | "numeric" => Ok(ValueKind::Number),
            "string" | "text" => Ok(ValueKind::String),
            "mixed" => Ok(ValueKind::Mixed),
            "date" => Ok(ValueKind::Date),
            other => Err(anyhow!(
                "Unknown value kind '{other}'. Supported kinds: number, string, mixed, date"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTally {
    pub number: usize,
    pub string: usize,
    pub mixed: usize,
}

impl KindTally {
    pub fn record(&mut self, kind: ValueKind) {
        match kind {
            ValueKind::Number => self.number += 1,
            ValueKind::String => self.string += 1,
            ValueKind::Mixed | ValueKind::Date => self.mixed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.number + self.string + self.mixed
    }

    pub fn reached_cap(&self) -> bool {
        self.number >= CLASSIFY_MATCH_CAP
            || self.string >= CLASSIFY_MATCH_CAP
            || self.mixed >= CLASSIFY_MATCH_CAP
    }

    pub fn decide(&self) -> ValueKind {
        let candidates = [
            (ValueKind::String, self.string),
            (ValueKind::Number, self.number),
            (ValueKind::Mixed, self.mixed),
        ];
        // First of equal maxima wins, so ties resolve in candidate order.
        let (leader, leader_count) = candidates
            .iter()
            .copied()
            .fold(candidates[0], |best, next| if next.1 > best.1 { next } else { best });
        let dominates = candidates
            .iter()
            .filter(|(kind, _)| *kind != leader)
            .all(|(_, count)| leader_count as f64 > *count as f64 * DOMINANCE_RATIO);
        if dominates { leader } else { ValueKind::Mixed }
    }
}

/// Kind of a single text value, `None` for blanks and incomplete numbers.
pub fn text_kind(value: &str) -> Option<ValueKind> {
    let trimmed = value.trim();
    if trimmed.is_empty() || is_incomplete_number(trimmed) {
        return None;
    }
    match first_non_numeric_index(&strip_thousands(trimmed)) {
        None => Some(ValueKind::Number),
        Some(0) => Some(ValueKind::String),
        Some(_) => Some(ValueKind::Mixed),
    }
}

pub fn cell_kind(cell: &CellValue) -> Option<ValueKind> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(ValueKind::Number),
        CellValue::Boolean(_) => Some(ValueKind::String),
        other => other.sort_text().and_then(|text| text_kind(&text)),
    }
}

pub fn tally<'a, I>(sample: I) -> KindTally
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut tally = KindTally::default();
    for cell in sample {
        if let Some(kind) = cell_kind(cell) {
            tally.record(kind);
            if tally.reached_cap() {
                break;
            }
        }
    }
    tally
}

pub fn classify<'a, I>(sample: I) -> ValueKind
where
    I: IntoIterator<Item = &'a CellValue>,
{
    tally(sample).decide()
}

pub fn tally_column(rows: &[Row], column_id: &str) -> KindTally {
    tally(rows.iter().map(|row| row.cell(column_id)))
}

pub fn classify_column(rows: &[Row], column_id: &str) -> ValueKind {
    tally_column(rows, column_id).decide()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::text(*v)).collect()
    }

    #[test]
    fn text_kind_strips_thousands_separators() {
        assert_eq!(text_kind("1,234,567"), Some(ValueKind::Number));
        assert_eq!(text_kind("12 apples"), Some(ValueKind::Mixed));
        assert_eq!(text_kind("apples"), Some(ValueKind::String));
        assert_eq!(text_kind("-"), None);
        assert_eq!(text_kind("."), None);
        assert_eq!(text_kind("   "), None);
    }

    #[test]
    fn empty_and_blank_samples_are_mixed() {
        assert_eq!(classify(&cells(&[])), ValueKind::Mixed);
        assert_eq!(classify(&cells(&["", "-", "."])), ValueKind::Mixed);
    }

    #[test]
    fn sampling_stops_at_the_match_cap() {
        let mut values = vec!["7"; 60];
        values.extend(vec!["seven"; 40]);
        let sample = cells(&values);
        let counts = tally(&sample);
        assert_eq!(counts.number, CLASSIFY_MATCH_CAP);
        assert_eq!(counts.string, 0);
        assert_eq!(classify(&sample), ValueKind::Number);
    }

    #[test]
    fn leader_must_dominate_both_other_kinds() {
        let tally = KindTally {
            number: 30,
            string: 10,
            mixed: 25,
        };
        assert_eq!(tally.decide(), ValueKind::Mixed);
        let tally = KindTally {
            number: 10,
            string: 31,
            mixed: 20,
        };
        assert_eq!(tally.decide(), ValueKind::String);
    }

    #[test]
    fn structured_cells_classify_by_sort_text() {
        assert_eq!(cell_kind(&CellValue::Number(3.5)), Some(ValueKind::Number));
        assert_eq!(cell_kind(&CellValue::Boolean(true)), Some(ValueKind::String));
        let links = CellValue::Links(vec![crate::value::Link::labelled("404")]);
        assert_eq!(cell_kind(&links), Some(ValueKind::Number));
    }
}
