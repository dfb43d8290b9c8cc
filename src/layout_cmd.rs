//! `layout` command and the layout report shared with `view --show-layout`.

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::LayoutArgs,
    config::{GridConfig, Pin},
    layout::{PositionedColumn, WidthMap, layout},
    table::RenderedTable,
};

fn offset_text(offset: Option<u32>) -> String {
    offset.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn layout_report(positioned: &[PositionedColumn]) -> RenderedTable {
    let rows = positioned
        .iter()
        .map(|column| {
            let pin = match column.column.pinned {
                Some(Pin::Left) => "left",
                Some(Pin::Right) => "right",
                None => "",
            };
            vec![
                column.id().to_string(),
                pin.to_string(),
                offset_text(column.width),
                offset_text(column.style.left),
                offset_text(column.style.right),
            ]
        })
        .collect();
    RenderedTable::report(&["column", "pinned", "width", "left", "right"], rows)
}

pub fn execute(args: &LayoutArgs) -> Result<()> {
    let config = GridConfig::load(&args.config)
        .with_context(|| format!("Loading grid configuration from {:?}", args.config))?;
    let widths: WidthMap = args.widths.iter().cloned().collect();
    for id in widths.keys() {
        if config.column(id).is_none() {
            warn!("Width given for unknown column '{id}'");
        }
    }
    let positioned = layout(&config.sequenced_columns(), &widths);
    info!(
        "Laid out {} column(s) from {:?}",
        positioned.len(),
        args.config
    );
    layout_report(&positioned).print();
    Ok(())
}
