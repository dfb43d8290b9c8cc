//! Grid configuration: column definitions and YAML persistence.
//!
//! A [`GridConfig`] is the declarative description of a grid: its ordered
//! [`ColumnDef`] list plus the optional column that marks class rows. It is
//! read from and written to YAML (`serde_yaml`) and validated on load.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::ValueKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Pin {
    Left,
    Right,
}

impl TryFrom<String> for Pin {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match normalize_key(&value).as_str() {
            "left" => Ok(Pin::Left),
            "right" => Ok(Pin::Right),
            _ => Err(ConfigError::UnknownPin(value)),
        }
    }
}

impl TryFrom<String> for ValueKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ConfigError::UnknownFilterType(value))
    }
}

/// Declared data type of a column's source field. YAML accepts either the
/// variant name or its numeric code (1 = Float through 7 = Date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DeclaredTypeRepr")]
pub enum DeclaredType {
    Float,
    Integer,
    String,
    State,
    Location,
    Bit,
    Date,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeclaredTypeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<DeclaredTypeRepr> for DeclaredType {
    type Error = ConfigError;

    fn try_from(repr: DeclaredTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            DeclaredTypeRepr::Code(code) => DeclaredType::from_code(code)
                .ok_or_else(|| ConfigError::UnknownDataType(code.to_string())),
            DeclaredTypeRepr::Name(name) => DeclaredType::from_name(&name)
                .ok_or(ConfigError::UnknownDataType(name)),
        }
    }
}

impl DeclaredType {
    pub fn from_name(name: &str) -> Option<Self> {
        let declared = match normalize_key(name).as_str() {
            "float" => DeclaredType::Float,
            "integer" | "int" => DeclaredType::Integer,
            "string" => DeclaredType::String,
            "state" => DeclaredType::State,
            "location" => DeclaredType::Location,
            "bit" => DeclaredType::Bit,
            "date" => DeclaredType::Date,
            _ => return None,
        };
        Some(declared)
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(DeclaredType::Float),
            2 => Some(DeclaredType::Integer),
            3 => Some(DeclaredType::String),
            4 => Some(DeclaredType::State),
            5 => Some(DeclaredType::Location),
            6 => Some(DeclaredType::Bit),
            7 => Some(DeclaredType::Date),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, DeclaredType::Float | DeclaredType::Integer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Pin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DeclaredType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
}

impl ColumnDef {
    pub fn new(id: impl Into<String>) -> Self {
        ColumnDef {
            id: id.into(),
            header: None,
            accessor: None,
            pinned: None,
            filter_type: None,
            render_with: None,
            sort_type: None,
            data_type: None,
            sequence: None,
        }
    }

    pub fn pinned(mut self, pin: Pin) -> Self {
        self.pinned = Some(pin);
        self
    }

    pub fn sort_type(mut self, key: impl Into<String>) -> Self {
        self.sort_type = Some(key.into());
        self
    }

    pub fn render_with(mut self, key: impl Into<String>) -> Self {
        self.render_with = Some(key.into());
        self
    }

    pub fn filter_type(mut self, kind: ValueKind) -> Self {
        self.filter_type = Some(kind);
        self
    }

    pub fn data_type(mut self, data_type: DeclaredType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn header_text(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.id)
    }

    /// Source field the column reads; defaults to the column id.
    pub fn source(&self) -> &str {
        self.accessor.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid configuration does not define any columns")]
    NoColumns,
    #[error("column #{position} has an empty id")]
    EmptyId { position: usize },
    #[error("column id '{0}' is defined more than once")]
    DuplicateId(String),
    #[error("unknown pin side '{0}' (expected left or right)")]
    UnknownPin(String),
    #[error("unknown filter type '{0}' (expected number, string, mixed or date)")]
    UnknownFilterType(String),
    #[error("unknown data type '{0}' (expected a name such as Float or a code from 1 to 7)")]
    UnknownDataType(String),
}

/// Canonical form of a configuration key: trimmed, lowercase, `-` and spaces
/// as `_`, without a trailing `renderer` suffix.
pub fn normalize_key(key: &str) -> String {
    let key = key.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    match key.strip_suffix("renderer") {
        Some(stem) => stem.trim_end_matches('_').to_string(),
        None => key,
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridConfig {
    pub columns: Vec<ColumnDef>,
    /// Source field whose value marks a row as a class definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_column: Option<String>,
}

impl GridConfig {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        GridConfig {
            columns,
            class_column: None,
        }
    }

    pub fn from_headers(headers: &[String]) -> Self {
        GridConfig::new(headers.iter().map(ColumnDef::new).collect())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }
        let mut seen = HashSet::new();
        for (idx, column) in self.columns.iter().enumerate() {
            if column.id.trim().is_empty() {
                return Err(ConfigError::EmptyId { position: idx + 1 });
            }
            if !seen.insert(column.id.as_str()) {
                return Err(ConfigError::DuplicateId(column.id.clone()));
            }
        }
        Ok(())
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// Columns in declared display sequence. Columns without a sequence keep
    /// their relative order after the sequenced ones.
    pub fn sequenced_columns(&self) -> Vec<ColumnDef> {
        let mut columns = self.columns.clone();
        columns.sort_by_key(|column| column.sequence.map_or((1, 0), |seq| (0, seq)));
        columns
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: GridConfig =
            serde_yaml::from_str(input).context("Parsing grid configuration YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading grid configuration {path:?}"))?;
        GridConfig::from_yaml_str(&raw).with_context(|| format!("Loading {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = self.to_yaml_string()?;
        fs::write(path, yaml).with_context(|| format!("Writing grid configuration {path:?}"))
    }
}
