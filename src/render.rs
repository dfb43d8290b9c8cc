//! Cell renderers resolved from a column's `render_with` key.

use std::{borrow::Cow, fmt, str::FromStr};

use anyhow::anyhow;
use itertools::Itertools;
use log::warn;

use crate::{
    config::{ColumnDef, normalize_key},
    time::{format_millis, resolve_epoch_millis},
    value::{CellValue, Link},
};

pub const CHECK_MARK: &str = "√";
pub const DASH: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererKind {
    /// No renderer configured: the value as text.
    #[default]
    Plain,
    Date,
    Boolean,
    Priority,
    Links,
    Labels,
    Path,
    /// Configured renderer is not registered.
    Fallback,
}

impl RendererKind {
    pub fn for_column(column: &ColumnDef) -> Self {
        let Some(key) = column.render_with.as_deref() else {
            return RendererKind::Plain;
        };
        key.parse().unwrap_or_else(|_| {
            warn!(
                "Renderer '{key}' on column '{}' is not registered; rendering plain text",
                column.id
            );
            RendererKind::Fallback
        })
    }

    pub fn key(self) -> &'static str {
        match self {
            RendererKind::Plain => "plain",
            RendererKind::Date => "date",
            RendererKind::Boolean => "boolean",
            RendererKind::Priority => "priority",
            RendererKind::Links => "links",
            RendererKind::Labels => "labels",
            RendererKind::Path => "path",
            RendererKind::Fallback => "fallback",
        }
    }

    /// Display text for a cell. Never fails; unrenderable values become an
    /// empty string.
    pub fn render(self, cell: &CellValue) -> Cow<'_, str> {
        match self {
            RendererKind::Plain | RendererKind::Priority => {
                cell.as_text().unwrap_or(Cow::Borrowed(""))
            }
            RendererKind::Fallback => match cell {
                CellValue::Text(text) => Cow::Borrowed(text.as_str()),
                _ => Cow::Borrowed(""),
            },
            RendererKind::Boolean => Cow::Borrowed(if is_truthy(cell) { CHECK_MARK } else { DASH }),
            RendererKind::Date => {
                if cell.is_blank() {
                    return Cow::Borrowed("");
                }
                resolve_epoch_millis(cell)
                    .and_then(format_millis)
                    .map_or(Cow::Borrowed(DASH), Cow::Owned)
            }
            RendererKind::Links => match cell {
                CellValue::Links(links) => {
                    Cow::Owned(links.iter().filter_map(Link::display_name).join(", "))
                }
                other => other.as_text().unwrap_or_default(),
            },
            RendererKind::Labels => match cell {
                CellValue::Labels(labels) => {
                    Cow::Owned(labels.iter().map(|label| label.name.as_str()).join(", "))
                }
                other => other.as_text().unwrap_or_default(),
            },
            RendererKind::Path => cell.as_text().unwrap_or_default(),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RendererKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let kind = match normalize_key(value).as_str() {
            "plain" | "text" => RendererKind::Plain,
            "date" | "datetime" | "custom_date" => RendererKind::Date,
            "boolean" | "bool" => RendererKind::Boolean,
            "priority" => RendererKind::Priority,
            "links" => RendererKind::Links,
            "labels" | "classes" => RendererKind::Labels,
            "path" | "paths" | "multi_path" | "multipath" => RendererKind::Path,
            other => return Err(anyhow!("Unknown renderer '{other}'")),
        };
        Ok(kind)
    }
}

fn is_truthy(cell: &CellValue) -> bool {
    match cell {
        CellValue::Boolean(b) => *b,
        CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
        CellValue::Text(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        other => !other.is_blank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Label;

    #[test]
    fn renderer_keys_resolve_with_and_without_suffix() {
        assert_eq!("dateRenderer".parse::<RendererKind>().expect("key"), RendererKind::Date);
        assert_eq!("boolean".parse::<RendererKind>().expect("key"), RendererKind::Boolean);
        assert!("sparkline".parse::<RendererKind>().is_err());
    }

    #[test]
    fn unregistered_renderer_falls_back() {
        let column = ColumnDef::new("a").render_with("sparkline");
        let kind = RendererKind::for_column(&column);
        assert_eq!(kind, RendererKind::Fallback);
        assert_eq!(kind.render(&CellValue::text("hello")), "hello");
        assert_eq!(kind.render(&CellValue::Number(4.0)), "");
        assert_eq!(RendererKind::for_column(&ColumnDef::new("b")), RendererKind::Plain);
    }

    #[test]
    fn boolean_and_date_renderers() {
        assert_eq!(RendererKind::Boolean.render(&CellValue::Boolean(true)), CHECK_MARK);
        assert_eq!(RendererKind::Boolean.render(&CellValue::text("no")), DASH);
        assert_eq!(
            RendererKind::Date.render(&CellValue::Number(1_715_005_800_000.0)),
            "06-May-24 14:30"
        );
        assert_eq!(RendererKind::Date.render(&CellValue::text("whenever")), DASH);
        assert_eq!(RendererKind::Date.render(&CellValue::Blank), "");
    }

    #[test]
    fn collection_renderers_join_members() {
        let labels = CellValue::Labels(vec![Label::new("Pump"), Label::new("Valve")]);
        assert_eq!(RendererKind::Labels.render(&labels), "Pump, Valve");
        let path = CellValue::Path(vec!["Plant".into(), "Line 2".into()]);
        assert_eq!(RendererKind::Path.render(&path), "Plant/Line 2");
    }
}
