use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Sort, filter, page and lay out tabular data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column value kinds from a row file and optionally write a grid configuration
    Infer(InferArgs),
    /// Sort, filter and page a row file and print the visible page
    View(ViewArgs),
    /// Print column order and sticky offsets for a grid configuration
    Layout(LayoutArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Row file (.csv, .tsv or .json; '-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Input format, detected from the extension when omitted
    #[arg(long = "input-format", value_enum)]
    pub input_format: Option<InputFormatArg>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum InputFormatArg {
    Csv,
    Json,
}

#[derive(Debug, Args)]
pub struct InferArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Write an inferred grid configuration (YAML) to this path
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Number of rows to sample (0 samples every row)
    #[arg(long, default_value_t = 0)]
    pub sample_rows: usize,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Grid configuration (YAML); columns default to the input fields
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Sort directives of the form `column[:asc|desc]`, applied left to right
    #[arg(long = "sort", action = clap::ArgAction::Append)]
    pub sort: Vec<String>,
    /// Column filters such as `name^=pump`, `visits>=10` or `visits=10..20`
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// Fuzzy search across the rendered row text
    #[arg(long)]
    pub search: Option<String>,
    /// One-based page number (clamped to the last page)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page; derived from --height and --width when omitted
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,
    /// Output format for the visible page
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Print measured widths and sticky offsets after the page
    #[arg(long = "show-layout")]
    pub show_layout: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
}

#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// Grid configuration (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,
    /// Measured column widths as `column=pixels`
    #[arg(long = "width", action = clap::ArgAction::Append, value_parser = parse_width)]
    pub widths: Vec<(String, u32)>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_width(value: &str) -> Result<(String, u32), String> {
    let (column, width) = value
        .split_once('=')
        .ok_or_else(|| format!("Width '{value}' must look like 'column=pixels'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("Width '{value}' is missing a column"));
    }
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("Width for '{column}' must be a whole number of pixels"))?;
    Ok((column.to_string(), width))
}
