//! Column ordering and sticky offsets.
//!
//! Layout is the second half of a two-phase protocol. A presenter first
//! renders the columns and reports their widths through [`Measure`]; the pure
//! [`layout`] function then turns those widths into sticky offsets. Until the
//! first measurement arrives the width map is empty and every offset is
//! `None`, so sticky columns render unpositioned for one pass.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;

use crate::config::{ColumnDef, Pin};

/// Measured column widths keyed by column id.
pub type WidthMap = BTreeMap<String, u32>;

pub trait Measure {
    fn measure(&self) -> WidthMap;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickyStyle {
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub sticky: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedColumn {
    pub column: ColumnDef,
    pub width: Option<u32>,
    pub style: StickyStyle,
}

impl PositionedColumn {
    pub fn id(&self) -> &str {
        &self.column.id
    }

    /// Offset from whichever edge the column sticks to.
    pub fn offset(&self) -> Option<u32> {
        self.style.left.or(self.style.right)
    }
}

fn pin_rank(column: &ColumnDef) -> u8 {
    match column.pinned {
        Some(Pin::Left) => 0,
        None => 1,
        Some(Pin::Right) => 2,
    }
}

/// Left-pinned, then unpinned, then right-pinned; each group keeps its
/// declared order.
pub fn order_columns(columns: &[ColumnDef]) -> Vec<ColumnDef> {
    columns.iter().cloned().sorted_by_key(pin_rank).collect()
}

/// Each column's offset is the summed width of the columns before it. A
/// column without a measured width leaves every later offset unresolved.
pub fn sticky_offsets<'a, I>(widths: &WidthMap, columns: I) -> Vec<Option<u32>>
where
    I: IntoIterator<Item = &'a ColumnDef>,
{
    let mut total = (!widths.is_empty()).then_some(0u32);
    columns
        .into_iter()
        .map(|column| {
            let offset = total;
            total = total
                .zip(widths.get(&column.id))
                .map(|(sum, width)| sum.saturating_add(*width));
            offset
        })
        .collect()
}

pub fn layout(columns: &[ColumnDef], widths: &WidthMap) -> Vec<PositionedColumn> {
    let ordered = order_columns(columns);
    let left = sticky_offsets(
        widths,
        ordered.iter().filter(|c| c.pinned == Some(Pin::Left)),
    );
    let mut right = sticky_offsets(
        widths,
        ordered.iter().filter(|c| c.pinned == Some(Pin::Right)).rev(),
    );
    right.reverse();

    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let positioned: Vec<PositionedColumn> = ordered
        .into_iter()
        .map(|column| {
            let style = match column.pinned {
                Some(Pin::Left) => StickyStyle {
                    left: left.next().flatten(),
                    right: None,
                    sticky: true,
                },
                Some(Pin::Right) => StickyStyle {
                    left: None,
                    right: right.next().flatten(),
                    sticky: true,
                },
                None => StickyStyle::default(),
            };
            PositionedColumn {
                width: widths.get(&column.id).copied(),
                column,
                style,
            }
        })
        .collect();
    debug!(
        "Laid out {} column(s) against {} measured width(s)",
        positioned.len(),
        widths.len()
    );
    positioned
}
