//! Host-facing grid state.
//!
//! [`GridView`] owns the rows, column definitions and interaction state
//! (sort directives, filters, search). Everything derived from them lives in
//! an immutable [`GridSnapshot`] behind an `Arc` that is rebuilt and swapped
//! wholesale by each trigger, so a reader holding a snapshot never observes
//! a partial recomputation.

use std::{collections::BTreeMap, sync::Arc};

use anyhow::{Result, anyhow};
use itertools::Itertools;
use log::debug;

use crate::{
    comparator::ComparatorDescriptor,
    config::{ColumnDef, GridConfig},
    filter::{FilterCondition, FuzzySearch},
    layout::{PositionedColumn, WidthMap, layout},
    page::{Page, paginate},
    render::RendererKind,
    sort::{SortDirective, SortKey, order_subset},
    value::Row,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSnapshot {
    pub descriptors: BTreeMap<String, ComparatorDescriptor>,
    /// Indices of visible rows in display order.
    pub order: Vec<usize>,
    pub widths: WidthMap,
    pub layout: Vec<PositionedColumn>,
}

impl GridSnapshot {
    pub fn descriptor(&self, column_id: &str) -> Option<&ComparatorDescriptor> {
        self.descriptors.get(column_id)
    }

    pub fn visible_count(&self) -> usize {
        self.order.len()
    }
}

#[derive(Debug)]
pub struct GridView {
    config: GridConfig,
    rows: Vec<Row>,
    sorts: Vec<SortDirective>,
    filters: Vec<FilterCondition>,
    search: Option<FuzzySearch>,
    snapshot: Arc<GridSnapshot>,
}

impl GridView {
    pub fn new(config: GridConfig, rows: Vec<Row>) -> Self {
        let mut view = GridView {
            config,
            rows,
            sorts: Vec::new(),
            filters: Vec::new(),
            search: None,
            snapshot: Arc::new(GridSnapshot::default()),
        };
        view.rebuild(None);
        view
    }

    pub fn snapshot(&self) -> Arc<GridSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.config.columns
    }

    pub fn sorts(&self) -> &[SortDirective] {
        &self.sorts
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.rebuild(None);
    }

    /// Replaces the column definitions. Sorts and filters that reference a
    /// column which no longer exists are dropped.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef>) {
        self.config.columns = columns;
        let known = |id: &str| self.config.column(id).is_some();
        self.sorts.retain(|sort| known(&sort.column));
        self.filters.retain(|filter| known(&filter.column));
        self.rebuild(None);
    }

    pub fn sort_by(&mut self, sorts: Vec<SortDirective>) -> Result<()> {
        for sort in &sorts {
            self.require_column(&sort.column)?;
        }
        self.sorts = sorts;
        self.reorder();
        Ok(())
    }

    pub fn set_filters(&mut self, filters: Vec<FilterCondition>) -> Result<()> {
        for filter in &filters {
            self.require_column(&filter.column)?;
        }
        self.filters = filters;
        self.reorder();
        Ok(())
    }

    pub fn set_search(&mut self, pattern: Option<&str>) {
        self.search = pattern
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(FuzzySearch::new);
        self.reorder();
    }

    /// Feeds measured widths back into the layout. Returns false, leaving
    /// the snapshot untouched, when the widths match the current map.
    pub fn apply_widths(&mut self, widths: WidthMap) -> bool {
        if widths == self.snapshot.widths {
            return false;
        }
        let mut next = (*self.snapshot).clone();
        next.layout = layout(&self.config.columns, &widths);
        next.widths = widths;
        self.snapshot = Arc::new(next);
        true
    }

    /// Visible rows in display order.
    pub fn visible_rows(&self) -> Vec<&Row> {
        self.snapshot.order.iter().map(|&idx| &self.rows[idx]).collect()
    }

    pub fn page(&self, page_size: usize, page_index: usize) -> Page<'_, usize> {
        paginate(&self.snapshot.order, page_size, page_index)
    }

    pub fn page_rows(&self, page: &Page<'_, usize>) -> Vec<&Row> {
        page.rows.iter().map(|&idx| &self.rows[idx]).collect()
    }

    fn require_column(&self, id: &str) -> Result<&ColumnDef> {
        self.config.column(id).ok_or_else(|| {
            anyhow!(
                "Column '{id}' not found. Known columns: {}",
                self.config.columns.iter().map(|c| c.id.as_str()).join(", ")
            )
        })
    }

    fn reorder(&mut self) {
        let current = Arc::clone(&self.snapshot);
        self.rebuild(Some(&current.descriptors));
    }

    /// Recomputes derived state. Descriptors are rebuilt unless the caller
    /// passes the current ones for reuse.
    fn rebuild(&mut self, descriptors: Option<&BTreeMap<String, ComparatorDescriptor>>) {
        let descriptors = descriptors.cloned().unwrap_or_else(|| {
            self.config
                .columns
                .iter()
                .map(|column| {
                    (
                        column.id.clone(),
                        ComparatorDescriptor::build(column, &self.rows),
                    )
                })
                .collect()
        });
        let order = self.visible_order(&descriptors);
        let widths = self.snapshot.widths.clone();
        let positioned = layout(&self.config.columns, &widths);
        debug!(
            "Grid recomputed: {} of {} row(s) visible",
            order.len(),
            self.rows.len()
        );
        self.snapshot = Arc::new(GridSnapshot {
            descriptors,
            order,
            widths,
            layout: positioned,
        });
    }

    fn visible_order(&self, descriptors: &BTreeMap<String, ComparatorDescriptor>) -> Vec<usize> {
        let filters: Vec<(&str, &ComparatorDescriptor, &FilterCondition)> = self
            .filters
            .iter()
            .filter_map(|condition| {
                let column = self.config.column(&condition.column)?;
                let descriptor = descriptors.get(&column.id)?;
                Some((column.source(), descriptor, condition))
            })
            .collect();
        let renderers: Vec<RendererKind> = self
            .config
            .columns
            .iter()
            .map(RendererKind::for_column)
            .collect();

        let subset: Vec<usize> = (0..self.rows.len())
            .filter(|&idx| {
                let row = &self.rows[idx];
                filters.iter().all(|(field, descriptor, condition)| {
                    condition
                        .filter
                        .matches(&descriptor.filter_value(row, field))
                })
            })
            .filter(|&idx| match &self.search {
                Some(search) => {
                    let row = &self.rows[idx];
                    let haystack = self
                        .config
                        .columns
                        .iter()
                        .zip(&renderers)
                        .map(|(column, renderer)| renderer.render(row.cell(column.source())))
                        .join(" ");
                    search.matches(&haystack)
                }
                None => true,
            })
            .collect();

        let keys: Vec<SortKey<'_>> = self
            .sorts
            .iter()
            .filter_map(|sort| {
                let column = self.config.column(&sort.column)?;
                Some(SortKey {
                    column_id: column.source(),
                    descriptor: descriptors.get(&column.id)?,
                    direction: sort.direction,
                })
            })
            .collect();
        order_subset(&self.rows, subset, &keys)
    }
}
