//! Comparator selection and the default mixed-content cascade.
//!
//! [`ComparatorDescriptor::build`] resolves a column's sort variant and value
//! kind once; the descriptor is then reused for every comparison of a sort
//! pass. Every comparison first applies the blank policy, so blank cells end
//! up after non-blank ones when `inverted` is false and before them when it is
//! true, whatever the variant.

use std::{borrow::Cow, cmp::Ordering, fmt, str::FromStr};

use anyhow::anyhow;
use log::{debug, warn};

use crate::{
    classify::{ValueKind, classify},
    collate::{
        compare_numbers, first_non_numeric_index, is_incomplete_number, locale_compare,
        parse_float_prefix, strip_special, strip_thousands,
    },
    config::{ColumnDef, DeclaredType, normalize_key},
    filter::FilterValue,
    time::{resolve_epoch_millis, to_datetime},
    value::{CellFamily, CellValue, Link, Row, format_number},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortVariant {
    #[default]
    Default,
    Name,
    Labels,
    Markdown,
    Links,
    Path,
    MultiPath,
    Date,
    CustomDate,
    ClassGrouping,
    Numeric,
}

impl SortVariant {
    pub const ALL: [SortVariant; 11] = [
        SortVariant::Default,
        SortVariant::Name,
        SortVariant::Labels,
        SortVariant::Markdown,
        SortVariant::Links,
        SortVariant::Path,
        SortVariant::MultiPath,
        SortVariant::Date,
        SortVariant::CustomDate,
        SortVariant::ClassGrouping,
        SortVariant::Numeric,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SortVariant::Default => "default",
            SortVariant::Name => "name",
            SortVariant::Labels => "labels",
            SortVariant::Markdown => "markdown",
            SortVariant::Links => "links",
            SortVariant::Path => "path",
            SortVariant::MultiPath => "multi_path",
            SortVariant::Date => "date",
            SortVariant::CustomDate => "custom_date",
            SortVariant::ClassGrouping => "class_grouping",
            SortVariant::Numeric => "numeric",
        }
    }

    /// Variant for a column: `sort_type`, else `render_with`, else the
    /// default. Unknown keys log a warning and fall back to the default.
    pub fn for_column(column: &ColumnDef) -> Self {
        let Some(key) = column
            .sort_type
            .as_deref()
            .or(column.render_with.as_deref())
        else {
            return SortVariant::Default;
        };
        match key.parse::<SortVariant>() {
            Ok(variant) => variant,
            Err(_) if column.sort_type.is_none() => SortVariant::Default,
            Err(_) => {
                warn!(
                    "Unknown sort type '{key}' on column '{}'; using default ordering",
                    column.id
                );
                SortVariant::Default
            }
        }
    }

    fn is_date(self) -> bool {
        matches!(self, SortVariant::Date | SortVariant::CustomDate)
    }

    /// Structured cell family this variant compares, if any.
    pub fn family(self) -> Option<CellFamily> {
        match self {
            SortVariant::Links => Some(CellFamily::Links),
            SortVariant::Labels => Some(CellFamily::Labels),
            SortVariant::Path => Some(CellFamily::Path),
            SortVariant::MultiPath => Some(CellFamily::Paths),
            _ => None,
        }
    }
}

impl fmt::Display for SortVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortVariant {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let variant = match normalize_key(value).as_str() {
            "default" => SortVariant::Default,
            "name" => SortVariant::Name,
            "labels" | "classes" => SortVariant::Labels,
            "markdown" => SortVariant::Markdown,
            "links" => SortVariant::Links,
            "path" => SortVariant::Path,
            "multi_path" | "multipath" | "paths" => SortVariant::MultiPath,
            "date" => SortVariant::Date,
            "custom_date" => SortVariant::CustomDate,
            "class_grouping" => SortVariant::ClassGrouping,
            "numeric" | "number" => SortVariant::Numeric,
            other => return Err(anyhow!("Unknown sort type '{other}'")),
        };
        Ok(variant)
    }
}

/// Comparison function, inferred kind and filter normalizer for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorDescriptor {
    variant: SortVariant,
    kind: ValueKind,
    declared: Option<DeclaredType>,
}

impl ComparatorDescriptor {
    pub fn new(variant: SortVariant, kind: ValueKind) -> Self {
        ComparatorDescriptor {
            variant,
            kind,
            declared: None,
        }
    }

    pub fn with_declared(mut self, declared: Option<DeclaredType>) -> Self {
        self.declared = declared;
        self
    }

    pub fn build(column: &ColumnDef, rows: &[Row]) -> Self {
        let variant = SortVariant::for_column(column);
        let kind = match (variant, column.filter_type) {
            (SortVariant::Numeric, _) => ValueKind::Number,
            (_, Some(kind)) => kind,
            (v, None) if v.is_date() => ValueKind::Date,
            _ => classify(rows.iter().map(|row| row.cell(column.source()))),
        };
        debug!(
            "Column '{}' sorts with {variant} comparator over {kind} values",
            column.id
        );
        ComparatorDescriptor::new(variant, kind).with_declared(column.data_type)
    }

    pub fn variant(&self) -> SortVariant {
        self.variant
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn declared(&self) -> Option<DeclaredType> {
        self.declared
    }

    pub fn compare(&self, left: &Row, right: &Row, column_id: &str, inverted: bool) -> Ordering {
        let left_cell = left.cell(column_id);
        let right_cell = right.cell(column_id);
        if let Some(ord) = self.blank_order(left_cell, right_cell, inverted) {
            return ord;
        }
        if self.variant == SortVariant::ClassGrouping {
            return match (left.is_class(), right.is_class()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => self.default_order(left_cell, right_cell, inverted),
            };
        }
        self.variant_order(left_cell, right_cell, inverted)
    }

    /// Compares two cells without row context. Class grouping degrades to
    /// the default cascade here.
    pub fn compare_cells(&self, left: &CellValue, right: &CellValue, inverted: bool) -> Ordering {
        self.blank_order(left, right, inverted)
            .unwrap_or_else(|| self.variant_order(left, right, inverted))
    }

    pub fn filter_value(&self, row: &Row, column_id: &str) -> FilterValue {
        self.filter_value_of(row.cell(column_id))
    }

    pub fn filter_value_of(&self, cell: &CellValue) -> FilterValue {
        match self.variant {
            SortVariant::Labels => {
                FilterValue::Text(cell.joined_label_names().or_else(|| owned_text(cell)))
            }
            SortVariant::Path => {
                FilterValue::Text(cell.derived_path().or_else(|| owned_text(cell)))
            }
            SortVariant::MultiPath => {
                FilterValue::Text(cell.joined_paths().or_else(|| owned_text(cell)))
            }
            SortVariant::Links => link_filter_value(cell, self.kind),
            v if v.is_date() => date_filter_value(cell),
            _ => match self.kind {
                ValueKind::String => FilterValue::Text(owned_text(cell)),
                ValueKind::Number => FilterValue::Number(number_value(cell)),
                ValueKind::Mixed => FilterValue::Mixed {
                    number: number_value(cell),
                    text: owned_text(cell),
                },
                ValueKind::Date => date_filter_value(cell),
            },
        }
    }

    fn blank_order(&self, left: &CellValue, right: &CellValue, inverted: bool) -> Option<Ordering> {
        match (self.is_blank(left), self.is_blank(right)) {
            (true, true) => Some(Ordering::Equal),
            (false, true) => Some(if inverted {
                Ordering::Greater
            } else {
                Ordering::Less
            }),
            (true, false) => Some(if inverted {
                Ordering::Less
            } else {
                Ordering::Greater
            }),
            (false, false) => None,
        }
    }

    fn is_blank(&self, cell: &CellValue) -> bool {
        if cell.is_blank() {
            return true;
        }
        match self.variant {
            SortVariant::Links => cell.sort_text().is_none(),
            SortVariant::Path => cell.derived_path().is_none(),
            SortVariant::MultiPath => cell.joined_paths().is_none(),
            v if v.is_date() => resolve_epoch_millis(cell).is_none(),
            _ => false,
        }
    }

    fn variant_order(&self, left: &CellValue, right: &CellValue, inverted: bool) -> Ordering {
        match self.variant {
            SortVariant::Default
            | SortVariant::ClassGrouping
            | SortVariant::Links
            | SortVariant::Numeric => self.default_order(left, right, inverted),
            SortVariant::Name => locale_compare(&plain_text(left), &plain_text(right)),
            SortVariant::Labels => locale_compare(&label_text(left), &label_text(right)),
            SortVariant::Markdown => {
                let left = plain_text(left);
                let right = plain_text(right);
                locale_compare(&strip_special(&left), &strip_special(&right))
            }
            SortVariant::Path => {
                let path = |cell: &CellValue| cell.derived_path().unwrap_or_default().to_lowercase();
                locale_compare(&path(left), &path(right))
            }
            SortVariant::MultiPath => {
                let paths = |cell: &CellValue| cell.joined_paths().unwrap_or_default().to_lowercase();
                locale_compare(&paths(left), &paths(right))
            }
            SortVariant::Date => {
                let left = resolve_epoch_millis(left).unwrap_or_default();
                let right = resolve_epoch_millis(right).unwrap_or_default();
                right.cmp(&left)
            }
            SortVariant::CustomDate => {
                let left = resolve_epoch_millis(left).unwrap_or_default();
                let right = resolve_epoch_millis(right).unwrap_or_default();
                if left < right {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
        }
    }

    fn numeric_column(&self) -> bool {
        self.kind == ValueKind::Number || self.declared.is_some_and(DeclaredType::is_numeric)
    }

    /// The default cascade over two non-blank cells.
    fn default_order(&self, left: &CellValue, right: &CellValue, inverted: bool) -> Ordering {
        if let (CellValue::Boolean(l), CellValue::Boolean(r)) = (left, right) {
            return r.cmp(l);
        }
        let left_text = plain_text(left);
        let right_text = plain_text(right);
        let left_text = left_text.trim();
        let right_text = right_text.trim();

        match (is_incomplete_number(left_text), is_incomplete_number(right_text)) {
            (true, true) => return Ordering::Equal,
            (true, false) => {
                return if inverted {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
            (false, true) => {
                return if inverted {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
            (false, false) => {}
        }

        let left_text = strip_thousands(left_text);
        let right_text = strip_thousands(right_text);
        let left_split = first_non_numeric_index(&left_text);
        let right_split = first_non_numeric_index(&right_text);

        if left_split.is_none() || right_split.is_none() {
            let left_number = numeric(left, &left_text);
            let right_number = numeric(right, &right_text);
            if left_number.is_some() || right_number.is_some() {
                return compare_numbers(left_number, right_number);
            }
        } else if left_split.is_some_and(|idx| idx > 0) || right_split.is_some_and(|idx| idx > 0)
        {
            let (left_prefix, left_suffix) = left_text.split_at(left_split.unwrap_or_default());
            let (right_prefix, right_suffix) =
                right_text.split_at(right_split.unwrap_or_default());
            return compare_numbers(
                parse_float_prefix(left_prefix),
                parse_float_prefix(right_prefix),
            )
            .then_with(|| locale_compare(left_suffix, right_suffix));
        }

        if self.numeric_column() {
            compare_numbers(parse_float_prefix(&left_text), parse_float_prefix(&right_text))
                .then_with(|| locale_compare(&left_text, &right_text))
        } else {
            locale_compare(&left_text, &right_text)
        }
    }
}

fn numeric(cell: &CellValue, text: &str) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        _ => parse_float_prefix(text),
    }
}

fn plain_text(cell: &CellValue) -> Cow<'_, str> {
    match cell {
        CellValue::Number(n) => Cow::Owned(format_number(*n)),
        other => other.sort_text().unwrap_or_default(),
    }
}

fn label_text(cell: &CellValue) -> Cow<'_, str> {
    cell.joined_label_names()
        .map(Cow::Owned)
        .unwrap_or_else(|| plain_text(cell))
}

fn owned_text(cell: &CellValue) -> Option<String> {
    cell.as_text().map(Cow::into_owned)
}

/// Numeric filter value: `None` for blanks, sentinels and unparsable text.
fn number_value(cell: &CellValue) -> Option<f64> {
    if let CellValue::Number(n) = cell {
        return n.is_finite().then_some(*n);
    }
    let text = cell.sort_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() || is_incomplete_number(trimmed) {
        return None;
    }
    parse_float_prefix(&strip_thousands(trimmed))
}

fn link_filter_value(cell: &CellValue, kind: ValueKind) -> FilterValue {
    let first = match cell {
        CellValue::Links(links) => links.first().and_then(Link::display_name),
        _ => None,
    };
    let number = first
        .map(|name| strip_thousands(name.trim()).into_owned())
        .filter(|name| !is_incomplete_number(name))
        .and_then(|name| parse_float_prefix(&name));
    let text = owned_text(cell);
    match kind {
        ValueKind::Number => FilterValue::Number(number),
        ValueKind::Mixed => FilterValue::Mixed { number, text },
        ValueKind::String | ValueKind::Date => FilterValue::Text(text),
    }
}

fn date_filter_value(cell: &CellValue) -> FilterValue {
    FilterValue::Date(resolve_epoch_millis(cell).and_then(to_datetime))
}
