pub mod classify;
pub mod cli;
pub mod collate;
pub mod comparator;
pub mod config;
pub mod filter;
pub mod io_utils;
pub mod layout;
pub mod layout_cmd;
pub mod page;
pub mod infer;
pub mod render;
pub mod rows;
pub mod sort;
pub mod table;
pub mod time;
pub mod value;
pub mod view;
pub mod view_cmd;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::{
    cli::{Cli, Commands, InputArgs, InputFormatArg},
    io_utils::InputFormat,
    rows::LoadOptions,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sticky_grid", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Infer(args) => infer::execute(&args),
        Commands::View(args) => view_cmd::execute(&args),
        Commands::Layout(args) => layout_cmd::execute(&args),
    }
}

pub(crate) fn load_options(input: &InputArgs) -> Result<LoadOptions> {
    Ok(LoadOptions {
        delimiter: input.delimiter,
        encoding: io_utils::resolve_encoding(input.input_encoding.as_deref())?,
        format: input.input_format.map(|format| match format {
            InputFormatArg::Csv => InputFormat::Delimited,
            InputFormatArg::Json => InputFormat::Json,
        }),
    })
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
