//! Page size derivation and page slicing.

use crate::layout::WidthMap;

pub const ROW_HEIGHT: u32 = 34;
pub const HEADER_HEIGHT: u32 = ROW_HEIGHT + 4;
pub const FOOTER_HEIGHT: u32 = 37;
pub const SCROLLBAR_HEIGHT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Viewport { width, height }
    }
}

/// Rows that fit the viewport below the header and above the footer. A
/// horizontal scrollbar is reserved when the columns overflow the width.
pub fn page_size(viewport: Viewport, widths: &WidthMap) -> usize {
    let total_width: u64 = widths.values().map(|w| u64::from(*w)).sum();
    let scrollbar = if total_width > u64::from(viewport.width) {
        SCROLLBAR_HEIGHT
    } else {
        0
    };
    let chrome = HEADER_HEIGHT + FOOTER_HEIGHT + scrollbar;
    let rows = viewport.height.saturating_sub(chrome) / ROW_HEIGHT;
    rows.max(1) as usize
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// Zero-based index of this page after clamping.
    pub index: usize,
    pub count: usize,
    pub size: usize,
    pub total_rows: usize,
    pub rows: &'a [T],
}

impl<T> Page<'_, T> {
    pub fn can_previous(&self) -> bool {
        self.index > 0
    }

    pub fn can_next(&self) -> bool {
        self.index + 1 < self.count
    }
}

/// Slices one page out of `rows`. The index is clamped to the last page and
/// an empty row set still has one (empty) page.
pub fn paginate<T>(rows: &[T], page_size: usize, page_index: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let count = rows.len().div_ceil(size).max(1);
    let index = page_index.min(count - 1);
    let start = (index * size).min(rows.len());
    let end = (start + size).min(rows.len());
    Page {
        index,
        count,
        size,
        total_rows: rows.len(),
        rows: &rows[start..end],
    }
}
