//! String collation and numeric-prefix helpers.
//!
//! Everything here is total: no helper panics or returns an error on odd
//! input, because a single malformed cell must never abort a whole sort.
//!
//! - [`locale_compare()`] is the locale-aware comparison used by every text
//!   comparator. It folds case at the primary level, compares digit runs by
//!   numeric value, breaks ties lower-case first and finally falls back to
//!   byte order so the result is a deterministic total order.
//! - [`first_non_numeric_index()`] and [`parse_float_prefix()`] split cells
//!   such as `"10 items"` into a numeric prefix and a text suffix.

use std::{
    borrow::Cow,
    cmp::Ordering,
    iter::Peekable,
    str::Chars,
    sync::LazyLock,
};

use regex::Regex;

static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid special-character pattern"));

/// Returns true for the placeholders an editable cell holds while a negative
/// or decimal number is still being typed.
pub fn is_incomplete_number(value: &str) -> bool {
    value == "-" || value == "."
}

pub fn strip_thousands(value: &str) -> Cow<'_, str> {
    if value.contains(',') {
        Cow::Owned(value.replace(',', ""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Byte index of the first character outside the leading numeric run, or
/// `None` when the whole value is numeric.
///
/// The run is an optional leading `-` followed by digits and `.`.
pub fn first_non_numeric_index(value: &str) -> Option<usize> {
    value
        .char_indices()
        .find(|(idx, ch)| !(ch.is_ascii_digit() || *ch == '.' || (*ch == '-' && *idx == 0)))
        .map(|(idx, _)| idx)
}

/// Parses the longest floating-point prefix of `value`, ignoring leading
/// whitespace. `"12.5kg"` yields `12.5`, `"kg"` yields `None`.
pub fn parse_float_prefix(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0usize;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let integer_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - integer_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut fraction_end = end + 1;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        digits += fraction_end - (end + 1);
        if digits > 0 {
            end = fraction_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if exponent_end < bytes.len() && matches!(bytes[exponent_end], b'+' | b'-') {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }
    trimmed[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Ascending numeric order with unparsable operands after parsable ones.
pub fn compare_numbers(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Removes every character that is neither a word character nor whitespace.
pub fn strip_special(value: &str) -> Cow<'_, str> {
    SPECIAL.replace_all(value, "")
}

pub fn locale_compare(left: &str, right: &str) -> Ordering {
    primary_compare(left, right)
        .then_with(|| case_compare(left, right))
        .then_with(|| left.cmp(right))
}

fn primary_compare(left: &str, right: &str) -> Ordering {
    let mut left_chars = left.chars().peekable();
    let mut right_chars = right.chars().peekable();
    loop {
        match (left_chars.peek().copied(), right_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_run = take_digit_run(&mut left_chars);
                let right_run = take_digit_run(&mut right_chars);
                let ord = compare_digit_runs(&left_run, &right_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = collation_key(l).cmp(&collation_key(r));
                if ord != Ordering::Equal {
                    return ord;
                }
                left_chars.next();
                right_chars.next();
            }
        }
    }
}

fn take_digit_run(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(ch) = chars.peek().copied() {
        if !ch.is_ascii_digit() {
            break;
        }
        run.push(ch);
        chars.next();
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

// Whitespace, then punctuation, then digits, then letters (case folded).
fn collation_key(ch: char) -> (u8, char) {
    if ch.is_whitespace() {
        (0, ch)
    } else if ch.is_ascii_digit() {
        (2, ch)
    } else if ch.is_alphanumeric() {
        (3, ch.to_lowercase().next().unwrap_or(ch))
    } else {
        (1, ch)
    }
}

fn case_compare(left: &str, right: &str) -> Ordering {
    for (l, r) in left.chars().zip(right.chars()) {
        if l == r {
            continue;
        }
        if l.to_lowercase().eq(r.to_lowercase()) {
            return match (l.is_lowercase(), r.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            };
        }
        return Ordering::Equal;
    }
    Ordering::Equal
}
