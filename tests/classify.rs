mod common;

use common::text_rows;
use sticky_grid::{
    classify::{ValueKind, classify, classify_column, tally_column},
    value::{CellValue, Link, Row},
};

fn interleaved(number: usize, string: usize, mixed: usize) -> Vec<Row> {
    let mut values = Vec::new();
    let (mut n, mut s, mut m) = (0, 0, 0);
    while n < number || s < string || m < mixed {
        if n < number {
            values.push(format!("{}", 1000 + n));
            n += 1;
        }
        if s < string {
            values.push(format!("name {s}"));
            s += 1;
        }
        if m < mixed {
            values.push(format!("{m} units"));
            m += 1;
        }
    }
    values
        .into_iter()
        .map(|v| Row::new().with_cell("v", CellValue::text(v)))
        .collect()
}

#[test]
fn seventy_twenty_ten_split_is_numeric() {
    let rows = interleaved(70, 20, 10);
    assert_eq!(classify_column(&rows, "v"), ValueKind::Number);
}

#[test]
fn forty_thirty_five_twenty_five_split_is_mixed() {
    let rows = interleaved(40, 35, 25);
    let tally = tally_column(&rows, "v");
    assert_eq!((tally.number, tally.string, tally.mixed), (40, 35, 25));
    assert_eq!(tally.decide(), ValueKind::Mixed);
}

#[test]
fn string_dominant_column_is_string() {
    let rows = interleaved(5, 30, 5);
    assert_eq!(classify_column(&rows, "v"), ValueKind::String);
}

#[test]
fn blanks_and_sentinels_do_not_vote() {
    let rows = text_rows("v", &["", "-", ".", "12", "13", "", "14"]);
    let tally = tally_column(&rows, "v");
    assert_eq!(tally.total(), 3);
    assert_eq!(classify_column(&rows, "v"), ValueKind::Number);
}

#[test]
fn classification_is_stable_for_a_fixed_sample() {
    let rows = interleaved(33, 12, 21);
    let first = classify_column(&rows, "v");
    for _ in 0..5 {
        assert_eq!(classify_column(&rows, "v"), first);
    }
}

#[test]
fn link_columns_classify_by_first_label() {
    let cells: Vec<CellValue> = ["101", "205", "330"]
        .iter()
        .map(|label| CellValue::Links(vec![Link::labelled(*label), Link::labelled("zzz")]))
        .collect();
    assert_eq!(classify(&cells), ValueKind::Number);
}

#[test]
fn empty_or_blank_samples_are_mixed() {
    assert_eq!(classify_column(&[], "v"), ValueKind::Mixed);
    let rows = text_rows("v", &["", "", "-"]);
    assert_eq!(classify_column(&rows, "v"), ValueKind::Mixed);
}
