//! `view` command: load, sort, filter, page and render a row file.
//!
//! Rendering runs the measure/layout protocol in two passes. The first pass
//! renders the page against an empty width map; its measured widths are fed
//! back through [`GridView::apply_widths`], which may change the derived page
//! size (a horizontal scrollbar eats a row), so the page is re-sliced and
//! rendered once more when that happens.

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cli::{OutputFormat, ViewArgs},
    config::GridConfig,
    filter::parse_filters,
    io_utils,
    layout::{Measure, order_columns},
    layout_cmd::layout_report,
    page::{Viewport, page_size},
    rows::load_rows,
    sort::SortDirective,
    table::RenderedTable,
    view::GridView,
};

pub fn execute(args: &ViewArgs) -> Result<()> {
    let input = &args.input;
    let config = match &args.config {
        Some(path) => Some(
            GridConfig::load(path)
                .with_context(|| format!("Loading grid configuration from {path:?}"))?,
        ),
        None => None,
    };
    let options = crate::load_options(input)?;
    let loaded = load_rows(&input.input, &options, config.as_ref())?;
    let mut config = config.unwrap_or_else(|| GridConfig::from_headers(&loaded.headers));
    config.columns = config.sequenced_columns();
    info!(
        "Viewing {} row(s) across {} column(s) from {:?}",
        loaded.rows.len(),
        config.columns.len(),
        input.input
    );

    let sorts = args
        .sort
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(SortDirective::parse)
        .collect::<Result<Vec<_>>>()?;
    let filters = parse_filters(&args.filters)?;

    let mut view = GridView::new(config, loaded.rows);
    view.set_filters(filters)?;
    view.set_search(args.search.as_deref());
    view.sort_by(sorts)?;

    let columns = order_columns(view.columns());
    let viewport = Viewport::new(args.width, args.height);
    let page_index = args.page.saturating_sub(1);
    let size_for = |view: &GridView| {
        args.page_size
            .unwrap_or_else(|| page_size(viewport, &view.snapshot().widths))
    };

    let mut size = size_for(&view);
    let mut table = {
        let page = view.page(size, page_index);
        RenderedTable::build(&columns, view.page_rows(&page))
    };
    if view.apply_widths(table.measure()) {
        let resized = size_for(&view);
        if resized != size {
            debug!("Page size changed from {size} to {resized} after measuring");
            size = resized;
            let page = view.page(size, page_index);
            table = RenderedTable::build(&columns, view.page_rows(&page));
            view.apply_widths(table.measure());
        }
    }

    let page = view.page(size, page_index);
    debug!(
        "Showing page {} of {} (previous: {}, next: {})",
        page.index + 1,
        page.count,
        page.can_previous(),
        page.can_next()
    );
    match args.format {
        OutputFormat::Table => {
            table.print();
            println!(
                "Page {} of {} ({} row(s))",
                page.index + 1,
                page.count,
                page.total_rows
            );
        }
        OutputFormat::Csv => {
            let mut writer = io_utils::stdout_csv_writer(b',');
            table.write_csv(&mut writer)?;
        }
    }
    if args.show_layout {
        println!();
        layout_report(&view.snapshot().layout).print();
    }
    Ok(())
}
