//! Row filtering over normalized filter values.
//!
//! Comparator descriptors normalize each cell into a [`FilterValue`]; the
//! column filters here only ever see that normalized shape. Global search is
//! fuzzy and delegated to `fuzzy-matcher`.

use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use regex::Regex;

use crate::{time::TIME_FORMAT, value::format_number};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(Option<String>),
    Number(Option<f64>),
    /// Offered to widgets that support both numeric-range and substring
    /// filtering.
    Mixed {
        number: Option<f64>,
        text: Option<String>,
    },
    Date(Option<DateTime<Utc>>),
}

impl FilterValue {
    pub fn text(&self) -> Option<String> {
        match self {
            FilterValue::Text(text) | FilterValue::Mixed { text, .. } => text.clone(),
            FilterValue::Number(number) => number.map(format_number),
            FilterValue::Date(date) => date.map(|dt| dt.format(TIME_FORMAT).to_string()),
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(number) | FilterValue::Mixed { number, .. } => *number,
            FilterValue::Date(date) => date.map(|dt| dt.timestamp_millis() as f64),
            FilterValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ColumnFilter {
    /// Case-insensitive prefix match; cells without text pass.
    Prefix(String),
    /// Inclusive numeric bounds; cells without a number fail.
    Range { min: Option<f64>, max: Option<f64> },
    /// Regular expression over the cell text; cells without text fail.
    Pattern(Regex),
}

impl ColumnFilter {
    pub fn matches(&self, value: &FilterValue) -> bool {
        match self {
            ColumnFilter::Prefix(prefix) => value
                .text()
                .is_none_or(|text| text.to_lowercase().starts_with(&prefix.to_lowercase())),
            ColumnFilter::Range { min, max } => value.number().is_some_and(|number| {
                min.is_none_or(|lo| number >= lo) && max.is_none_or(|hi| number <= hi)
            }),
            ColumnFilter::Pattern(regex) => value.text().is_some_and(|text| regex.is_match(&text)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterCondition {
    pub column: String,
    pub filter: ColumnFilter,
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            ColumnFilter::Prefix(prefix) => write!(f, "{}^={prefix}", self.column),
            ColumnFilter::Range { min, max } => write!(
                f,
                "{}={}..{}",
                self.column,
                min.map(format_number).unwrap_or_default(),
                max.map(format_number).unwrap_or_default()
            ),
            ColumnFilter::Pattern(regex) => write!(f, "{}~={}", self.column, regex.as_str()),
        }
    }
}

pub fn parse_filters(filters: &[String]) -> Result<Vec<FilterCondition>> {
    filters.iter().map(|f| parse_filter(f)).collect()
}

/// Parses `col^=prefix`, `col~=regex`, `col>=n`, `col<=n` or `col=lo..hi`
/// (either bound may be omitted).
pub fn parse_filter(filter: &str) -> Result<FilterCondition> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        bail!("Empty filter expression");
    }
    // The operator is the leftmost one; operands such as patterns may
    // contain operator characters themselves.
    let operator = ["^=", "~=", ">=", "<=", "="]
        .into_iter()
        .filter_map(|needle| trimmed.find(needle).map(|idx| (idx, needle)))
        .min_by_key(|(idx, _)| *idx);
    if let Some((idx, needle)) = operator {
        let column = trimmed[..idx].trim();
        if column.is_empty() {
            bail!("Filter '{trimmed}' is missing a column name");
        }
        let operand = unquote(trimmed[idx + needle.len()..].trim());
        let filter = match needle {
            "^=" => ColumnFilter::Prefix(operand.to_string()),
            "~=" => ColumnFilter::Pattern(
                Regex::new(operand)
                    .with_context(|| format!("Compiling filter pattern '{operand}'"))?,
            ),
            ">=" => ColumnFilter::Range {
                min: Some(parse_bound(operand)?),
                max: None,
            },
            "<=" => ColumnFilter::Range {
                min: None,
                max: Some(parse_bound(operand)?),
            },
            _ => parse_range(operand)?,
        };
        return Ok(FilterCondition {
            column: column.to_string(),
            filter,
        });
    }
    Err(anyhow!("Failed to parse filter expression '{trimmed}'"))
}

fn parse_range(operand: &str) -> Result<ColumnFilter> {
    let (lo, hi) = operand
        .split_once("..")
        .ok_or_else(|| anyhow!("Range filter '{operand}' must look like 'min..max'"))?;
    let min = (!lo.trim().is_empty()).then(|| parse_bound(lo)).transpose()?;
    let max = (!hi.trim().is_empty()).then(|| parse_bound(hi)).transpose()?;
    if min.is_none() && max.is_none() {
        bail!("Range filter '{operand}' needs at least one bound");
    }
    Ok(ColumnFilter::Range { min, max })
}

fn parse_bound(raw: &str) -> Result<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .with_context(|| format!("Filter bound '{}' is not a number", raw.trim()))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if value.len() >= 2
        && ((bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Fuzzy global search across a row's rendered text.
pub struct FuzzySearch {
    pattern: String,
    matcher: SkimMatcherV2,
}

impl FuzzySearch {
    pub fn new(pattern: impl Into<String>) -> Self {
        FuzzySearch {
            pattern: pattern.into().trim().to_string(),
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn score(&self, haystack: &str) -> Option<i64> {
        if self.pattern.is_empty() {
            return Some(0);
        }
        self.matcher.fuzzy_match(haystack, &self.pattern)
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.score(haystack).is_some()
    }
}

impl fmt::Debug for FuzzySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzySearch")
            .field("pattern", &self.pattern)
            .finish()
    }
}
