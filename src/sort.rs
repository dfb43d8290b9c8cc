//! Row ordering.
//!
//! Sorting never reorders the input slice; it produces a permutation of row
//! indices (or cloned rows) so callers can keep the original order around.
//!
//! Direction follows the grid framework convention: the comparator receives
//! `inverted = descending`, and for descending sorts its result is reversed.
//! Normal values therefore flip while blanks and incomplete numbers stay at
//! the end in both directions.

use std::{cmp::Ordering, fmt};

use anyhow::{Result, anyhow};
use log::debug;

use crate::{comparator::ComparatorDescriptor, value::Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub column: String,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        SortDirective {
            column: column.into(),
            direction,
        }
    }

    /// Parses `column[:asc|desc]`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (column, direction) = match spec.rsplit_once(':') {
            Some((column, direction)) => (column, Some(direction)),
            None => (spec, None),
        };
        let column = Some(column.trim())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("Sort directive is missing a column"))?;
        let direction = match direction.map(|d| d.trim().to_ascii_lowercase()).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => return Err(anyhow!("Unknown sort direction '{other}'")),
        };
        Ok(SortDirective::new(column, direction))
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.direction)
    }
}

/// One resolved sort key: the field to read, its comparator and direction.
#[derive(Debug, Clone)]
pub struct SortKey<'a> {
    pub column_id: &'a str,
    pub descriptor: &'a ComparatorDescriptor,
    pub direction: SortDirection,
}

impl SortKey<'_> {
    pub fn compare(&self, left: &Row, right: &Row) -> Ordering {
        let descending = !self.direction.is_ascending();
        let ord = self
            .descriptor
            .compare(left, right, self.column_id, descending);
        if descending { ord.reverse() } else { ord }
    }
}

pub fn sort_rows(
    rows: &[Row],
    column_id: &str,
    descriptor: &ComparatorDescriptor,
    direction: SortDirection,
) -> Vec<Row> {
    sort_indices(rows, column_id, descriptor, direction)
        .into_iter()
        .map(|idx| rows[idx].clone())
        .collect()
}

pub fn sort_indices(
    rows: &[Row],
    column_id: &str,
    descriptor: &ComparatorDescriptor,
    direction: SortDirection,
) -> Vec<usize> {
    let key = SortKey {
        column_id,
        descriptor,
        direction,
    };
    sort_indices_by(rows, std::slice::from_ref(&key))
}

/// Orders row indices by each key in turn; later keys only break ties left
/// by earlier ones, and full ties keep input order.
pub fn sort_indices_by(rows: &[Row], keys: &[SortKey<'_>]) -> Vec<usize> {
    order_subset(rows, (0..rows.len()).collect(), keys)
}

/// Like [`sort_indices_by`] over a subset of row indices, e.g. the rows left
/// after filtering. Ties keep the order of `subset`.
pub fn order_subset(rows: &[Row], mut subset: Vec<usize>, keys: &[SortKey<'_>]) -> Vec<usize> {
    if keys.is_empty() {
        return subset;
    }
    debug!(
        "Sorting {} row(s) by {}",
        subset.len(),
        keys.iter()
            .map(|key| format!("{}:{}", key.column_id, key.direction))
            .collect::<Vec<_>>()
            .join(", ")
    );
    merge_sort_by(&mut subset, |&a, &b| {
        keys.iter()
            .map(|key| key.compare(&rows[a], &rows[b]))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    subset
}

/// Stable bottom-up merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order, and
/// the custom date comparator never reports equality, so ordering here only
/// relies on the comparator being callable.
fn merge_sort_by<T, F>(items: &mut Vec<T>, mut compare: F)
where
    T: Copy,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut buffer = items.clone();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right, mut out) = (start, mid, start);
            while left < mid && right < end {
                // Take from the right run only when strictly smaller.
                if compare(&items[right], &items[left]) == Ordering::Less {
                    buffer[out] = items[right];
                    right += 1;
                } else {
                    buffer[out] = items[left];
                    left += 1;
                }
                out += 1;
            }
            buffer[out..out + (mid - left)].copy_from_slice(&items[left..mid]);
            out += mid - left;
            buffer[out..out + (end - right)].copy_from_slice(&items[right..end]);
            start = end;
        }
        std::mem::swap(items, &mut buffer);
        width *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_directive_defaults_to_ascending() {
        assert_eq!(
            SortDirective::parse("visits").expect("parse"),
            SortDirective::new("visits", SortDirection::Asc)
        );
        assert_eq!(
            SortDirective::parse(" visits : DESC ").expect("parse"),
            SortDirective::new("visits", SortDirection::Desc)
        );
        assert!(SortDirective::parse(":desc").is_err());
        assert!(SortDirective::parse("visits:sideways").is_err());
    }

    #[test]
    fn merge_sort_is_stable() {
        let mut items = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd'), (1, 'e')];
        merge_sort_by(&mut items, |a, b| a.0.cmp(&b.0));
        assert_eq!(items, vec![(1, 'b'), (1, 'e'), (2, 'd'), (3, 'a'), (3, 'c')]);
    }

    #[test]
    fn merge_sort_tolerates_inconsistent_comparators() {
        let mut items: Vec<usize> = (0..37).collect();
        merge_sort_by(&mut items, |_, _| Ordering::Less);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..37).collect::<Vec<_>>());
    }
}
