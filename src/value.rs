//! Cell and row model.
//!
//! A [`CellValue`] carries one variant per renderer family so every
//! comparator knows the exact shape of its input. Rows are immutable once
//! built; the engine only reads them.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use itertools::Itertools;
use serde_json::Value as JsonValue;

static BLANK: CellValue = CellValue::Blank;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Link {
    pub label: Option<String>,
    pub name: Option<String>,
    pub status_code: Option<String>,
}

impl Link {
    pub fn labelled(label: impl Into<String>) -> Self {
        Link {
            label: Some(label.into()),
            ..Link::default()
        }
    }

    /// Value the link sorts by: its label, else its status code.
    pub fn sort_key(&self) -> Option<&str> {
        non_empty(self.label.as_deref()).or_else(|| non_empty(self.status_code.as_deref()))
    }

    /// Value the link filters and displays by: its name, else its label.
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| non_empty(self.label.as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label { name: name.into() }
    }
}

/// Which structured shape a column's cells are parsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellFamily {
    #[default]
    Plain,
    Links,
    Labels,
    Path,
    Paths,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Blank,
    Text(String),
    Number(f64),
    Boolean(bool),
    Links(Vec<Link>),
    Labels(Vec<Label>),
    /// Hierarchical location, outermost segment first.
    Path(Vec<String>),
    /// Entity that lives at several locations.
    Paths(Vec<String>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(_) | CellValue::Boolean(_) => false,
            CellValue::Links(links) => links.is_empty(),
            CellValue::Labels(labels) => labels.is_empty(),
            CellValue::Path(_) => self.derived_path().is_none(),
            CellValue::Paths(paths) => paths.iter().all(|p| p.trim().is_empty()),
        }
    }

    /// Display text of the cell, `None` when blank.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        if self.is_blank() {
            return None;
        }
        match self {
            CellValue::Blank => None,
            CellValue::Text(text) => Some(Cow::Borrowed(text.as_str())),
            CellValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            CellValue::Boolean(b) => Some(Cow::Owned(b.to_string())),
            CellValue::Links(links) => Some(Cow::Owned(
                links.iter().filter_map(Link::display_name).join(""),
            )),
            CellValue::Labels(_) => self.joined_label_names().map(Cow::Owned),
            CellValue::Path(_) => self.derived_path().map(Cow::Owned),
            CellValue::Paths(_) => self.joined_paths().map(Cow::Owned),
        }
    }

    /// Text the cell sorts and classifies by. Link collections use their
    /// first link, everything else its display text.
    pub fn sort_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Links(links) => links.first().and_then(Link::sort_key).map(Cow::Borrowed),
            other => other.as_text(),
        }
    }

    pub fn joined_label_names(&self) -> Option<String> {
        match self {
            CellValue::Labels(labels) if !labels.is_empty() => {
                Some(labels.iter().map(|label| label.name.as_str()).join(""))
            }
            _ => None,
        }
    }

    /// Path segments joined with `/`, `None` when nothing is derivable.
    pub fn derived_path(&self) -> Option<String> {
        match self {
            CellValue::Path(segments) => {
                let joined = segments
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .join("/");
                (!joined.is_empty()).then_some(joined)
            }
            CellValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        }
    }

    /// Paths ordered case-insensitively and joined with `,`.
    pub fn joined_paths(&self) -> Option<String> {
        match self {
            CellValue::Paths(paths) => {
                let joined = paths
                    .iter()
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .sorted_by_key(|p| p.to_lowercase())
                    .join(",");
                (!joined.is_empty()).then_some(joined)
            }
            CellValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        }
    }

    /// Builds a cell from raw text. Structured families accept JSON-encoded
    /// payloads and fall back to a single-element collection.
    pub fn parse(raw: &str, family: CellFamily) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Blank;
        }
        if family != CellFamily::Plain
            && (trimmed.starts_with('[') || trimmed.starts_with('{'))
            && let Ok(json) = serde_json::from_str::<JsonValue>(trimmed)
        {
            return CellValue::from_json(&json, family);
        }
        match family {
            CellFamily::Plain => CellValue::Text(trimmed.to_string()),
            CellFamily::Links => CellValue::Links(vec![Link::labelled(trimmed)]),
            CellFamily::Labels => CellValue::Labels(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(Label::new)
                    .collect(),
            ),
            CellFamily::Path => CellValue::Path(
                trimmed
                    .split('/')
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            CellFamily::Paths => CellValue::Paths(vec![trimmed.to_string()]),
        }
    }

    pub fn from_json(value: &JsonValue, family: CellFamily) -> CellValue {
        match value {
            JsonValue::Null => CellValue::Blank,
            JsonValue::Bool(b) => CellValue::Boolean(*b),
            JsonValue::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
            JsonValue::String(s) => CellValue::parse(s, family),
            JsonValue::Object(map) => {
                if let Some(inner) = map.get("value") {
                    return CellValue::from_json(inner, family);
                }
                let nested = match family {
                    CellFamily::Plain => None,
                    CellFamily::Links => map.get("links"),
                    CellFamily::Labels => map.get("labels").or_else(|| map.get("classes")),
                    CellFamily::Path => map.get("segments").or_else(|| map.get("path")),
                    CellFamily::Paths => map.get("paths").or_else(|| map.get("path")),
                };
                match (family, nested) {
                    (_, Some(inner)) => CellValue::from_json(inner, family),
                    (CellFamily::Links, None) => CellValue::Links(vec![link_from_json(value)]),
                    (CellFamily::Labels, None) => {
                        label_from_json(value).map_or(CellValue::Blank, |l| CellValue::Labels(vec![l]))
                    }
                    _ => CellValue::Text(value.to_string()),
                }
            }
            JsonValue::Array(items) => match family {
                CellFamily::Links => CellValue::Links(items.iter().map(link_from_json).collect()),
                CellFamily::Labels => {
                    CellValue::Labels(items.iter().filter_map(label_from_json).collect())
                }
                CellFamily::Path => CellValue::Path(items.iter().filter_map(json_text).collect()),
                CellFamily::Paths => CellValue::Paths(items.iter().filter_map(json_text).collect()),
                CellFamily::Plain => {
                    let joined = items.iter().filter_map(json_text).join(", ");
                    if joined.is_empty() {
                        CellValue::Blank
                    } else {
                        CellValue::Text(joined)
                    }
                }
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text().unwrap_or_default())
    }
}

fn link_from_json(value: &JsonValue) -> Link {
    match value {
        JsonValue::Object(map) => Link {
            label: map.get("label").and_then(json_text),
            name: map.get("name").and_then(json_text),
            status_code: map
                .get("statusCode")
                .or_else(|| map.get("status_code"))
                .and_then(json_text),
        },
        other => Link {
            label: json_text(other),
            ..Link::default()
        },
    }
}

fn label_from_json(value: &JsonValue) -> Option<Label> {
    match value {
        JsonValue::Object(map) => map
            .get("name")
            .or_else(|| map.get("label"))
            .and_then(json_text)
            .map(Label::new),
        other => json_text(other).map(Label::new),
    }
}

fn json_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Whether a row is a class definition or an instance of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLevel {
    Class,
    #[default]
    Instance,
}

impl RowLevel {
    /// Interprets a marker cell: `Class`, `true`, `yes` or `1` mark a class.
    pub fn from_marker(cell: &CellValue) -> Self {
        let is_class = match cell {
            CellValue::Boolean(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "class" | "true" | "yes" | "1"
            ),
            _ => false,
        };
        if is_class {
            RowLevel::Class
        } else {
            RowLevel::Instance
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
    level: RowLevel,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, column_id: impl Into<String>, value: CellValue) -> Self {
        self.cells.insert(column_id.into(), value);
        self
    }

    pub fn with_level(mut self, level: RowLevel) -> Self {
        self.level = level;
        self
    }

    /// The cell for `column_id`, or a blank cell when the row has none.
    pub fn cell(&self, column_id: &str) -> &CellValue {
        self.cells.get(column_id).unwrap_or(&BLANK)
    }

    pub fn is_class(&self) -> bool {
        self.level == RowLevel::Class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_covers_empty_structured_values() {
        assert!(CellValue::Blank.is_blank());
        assert!(CellValue::text("").is_blank());
        assert!(CellValue::Links(Vec::new()).is_blank());
        assert!(CellValue::Labels(Vec::new()).is_blank());
        assert!(CellValue::Path(vec!["  ".into()]).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Boolean(false).is_blank());
    }

    #[test]
    fn parse_reads_json_payloads_for_structured_families() {
        let links = CellValue::parse(
            r#"{"links":[{"label":"PR-7","name":"seven"},{"label":"PR-9"}]}"#,
            CellFamily::Links,
        );
        assert_eq!(links.sort_text().as_deref(), Some("PR-7"));
        assert_eq!(links.as_text().as_deref(), Some("sevenPR-9"));

        let labels = CellValue::parse(r#"[{"name":"Pump"},{"name":"Valve"}]"#, CellFamily::Labels);
        assert_eq!(labels.joined_label_names().as_deref(), Some("PumpValve"));

        let path = CellValue::parse("Plant / Line 2 / Pump", CellFamily::Path);
        assert_eq!(path.derived_path().as_deref(), Some("Plant/Line 2/Pump"));
    }

    #[test]
    fn from_json_unwraps_value_objects() {
        let cell = CellValue::from_json(&json!({"value": 42}), CellFamily::Plain);
        assert_eq!(cell, CellValue::Number(42.0));
        let status = CellValue::from_json(&json!([{"statusCode": 404}]), CellFamily::Links);
        assert_eq!(status.sort_text().as_deref(), Some("404"));
    }

    #[test]
    fn joined_paths_sort_case_insensitively() {
        let cell = CellValue::Paths(vec!["b/x".into(), "A/y".into(), "c".into()]);
        assert_eq!(cell.joined_paths().as_deref(), Some("A/y,b/x,c"));
    }

    #[test]
    fn missing_cells_read_as_blank() {
        let row = Row::new().with_cell("a", CellValue::text("x"));
        assert_eq!(row.cell("missing"), &CellValue::Blank);
        assert!(!row.is_class());
    }

    #[test]
    fn row_level_reads_common_markers() {
        assert_eq!(RowLevel::from_marker(&CellValue::text("Class")), RowLevel::Class);
        assert_eq!(RowLevel::from_marker(&CellValue::Boolean(true)), RowLevel::Class);
        assert_eq!(RowLevel::from_marker(&CellValue::text("Instance")), RowLevel::Instance);
    }
}
