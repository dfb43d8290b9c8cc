mod common;

use std::cmp::Ordering;

use common::TestWorkspace;
use proptest::prelude::*;
use sticky_grid::{
    classify::ValueKind,
    comparator::{ComparatorDescriptor, SortVariant},
    config::{ColumnDef, DeclaredType, GridConfig},
    filter::FilterValue,
    rows::{LoadOptions, load_rows},
    value::{CellValue, Label, Link, Row},
};

fn descriptor(variant: SortVariant, kind: ValueKind) -> ComparatorDescriptor {
    ComparatorDescriptor::new(variant, kind)
}

fn cell_strategy() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        "[a-zA-Z0-9 ,.-]{1,10}".prop_map(CellValue::Text),
        (-1.0e6f64..1.0e6f64).prop_map(CellValue::Number),
        "[0-9]{1,4} [a-z]{1,4}".prop_map(CellValue::Text),
        "20[0-9]{2}-0[1-9]-1[0-9]".prop_map(CellValue::Text),
    ]
}

proptest! {
    #[test]
    fn comparison_is_antisymmetric(
        left in cell_strategy(),
        right in cell_strategy(),
        inverted in any::<bool>(),
    ) {
        for variant in SortVariant::ALL {
            if variant == SortVariant::CustomDate {
                continue;
            }
            for kind in [ValueKind::Number, ValueKind::String, ValueKind::Mixed] {
                let d = descriptor(variant, kind);
                let forward = d.compare_cells(&left, &right, inverted);
                let backward = d.compare_cells(&right, &left, inverted);
                prop_assert_eq!(
                    forward,
                    backward.reverse(),
                    "variant {} kind {} on {:?} / {:?}",
                    variant,
                    kind,
                    left,
                    right
                );
            }
        }
    }

    #[test]
    fn numbers_sort_numerically(left in -1.0e6f64..1.0e6f64, right in -1.0e6f64..1.0e6f64) {
        let d = descriptor(SortVariant::Default, ValueKind::Number);
        let expected = left.partial_cmp(&right).unwrap_or(Ordering::Equal);
        prop_assert_eq!(
            d.compare_cells(&CellValue::Number(left), &CellValue::Number(right), false),
            expected
        );
    }
}

#[test]
fn blanks_sort_after_values_for_every_variant() {
    let value = CellValue::text("2024-05-06");
    for variant in SortVariant::ALL {
        let d = descriptor(variant, ValueKind::String);
        assert_eq!(
            d.compare_cells(&CellValue::Blank, &value, false),
            Ordering::Greater,
            "{variant}"
        );
        assert_eq!(
            d.compare_cells(&value, &CellValue::Blank, false),
            Ordering::Less,
            "{variant}"
        );
        assert_eq!(
            d.compare_cells(&CellValue::Blank, &value, true),
            Ordering::Less,
            "{variant}"
        );
        assert_eq!(
            d.compare_cells(&value, &CellValue::Blank, true),
            Ordering::Greater,
            "{variant}"
        );
        assert_eq!(
            d.compare_cells(&CellValue::Blank, &CellValue::text(""), false),
            Ordering::Equal,
            "{variant}"
        );
    }
}

#[test]
fn builder_prefers_explicit_filter_type() {
    let rows = common::text_rows("v", &["1", "2", "3"]);
    let column = ColumnDef::new("v").filter_type(ValueKind::String);
    assert_eq!(
        ComparatorDescriptor::build(&column, &rows).kind(),
        ValueKind::String
    );
    assert_eq!(
        ComparatorDescriptor::build(&ColumnDef::new("v"), &rows).kind(),
        ValueKind::Number
    );
}

#[test]
fn builder_selects_variant_from_sort_type_then_renderer() {
    let rows: Vec<Row> = Vec::new();
    let by_sort = ColumnDef::new("v").sort_type("path").render_with("links");
    assert_eq!(
        ComparatorDescriptor::build(&by_sort, &rows).variant(),
        SortVariant::Path
    );
    let by_renderer = ColumnDef::new("v").render_with("labels");
    assert_eq!(
        ComparatorDescriptor::build(&by_renderer, &rows).variant(),
        SortVariant::Labels
    );
    let unknown = ColumnDef::new("v").sort_type("bogus");
    assert_eq!(
        ComparatorDescriptor::build(&unknown, &rows).variant(),
        SortVariant::Default
    );
    let dated = ColumnDef::new("v").sort_type("date");
    assert_eq!(
        ComparatorDescriptor::build(&dated, &rows).kind(),
        ValueKind::Date
    );
}

#[test]
fn booleans_sort_true_first() {
    let d = descriptor(SortVariant::Default, ValueKind::String);
    assert_eq!(
        d.compare_cells(&CellValue::Boolean(true), &CellValue::Boolean(false), false),
        Ordering::Less
    );
}

#[test]
fn declared_numeric_type_compares_signed_prefixes_numerically() {
    let string_column = descriptor(SortVariant::Default, ValueKind::String);
    let float_column = string_column.clone().with_declared(Some(DeclaredType::Float));
    let left = CellValue::text("+.5");
    let right = CellValue::text("+.25");
    assert_eq!(
        string_column.compare_cells(&left, &right, false),
        Ordering::Less
    );
    assert_eq!(
        float_column.compare_cells(&left, &right, false),
        Ordering::Greater
    );
}

#[test]
fn markdown_ignores_punctuation() {
    let d = descriptor(SortVariant::Markdown, ValueKind::String);
    assert_eq!(
        d.compare_cells(&CellValue::text("**beta**"), &CellValue::text("alpha"), false),
        Ordering::Greater
    );
    assert_eq!(
        d.compare_cells(&CellValue::text("[alpha](x)"), &CellValue::text("beta"), false),
        Ordering::Less
    );
}

#[test]
fn labels_compare_joined_names() {
    let d = descriptor(SortVariant::Labels, ValueKind::String);
    let left = CellValue::Labels(vec![Label::new("Pump"), Label::new("Asset")]);
    let right = CellValue::Labels(vec![Label::new("Asset")]);
    assert_eq!(d.compare_cells(&left, &right, false), Ordering::Greater);
}

#[test]
fn path_compares_case_insensitively() {
    let d = descriptor(SortVariant::Path, ValueKind::String);
    let left = CellValue::Path(vec!["plant".into(), "Line 2".into()]);
    let right = CellValue::Path(vec!["Plant".into(), "line 10".into()]);
    assert_eq!(d.compare_cells(&left, &right, false), Ordering::Less);
}

#[test]
fn links_without_sort_key_count_as_blank() {
    let d = descriptor(SortVariant::Links, ValueKind::String);
    let keyless = CellValue::Links(vec![Link {
        name: Some("only a name".into()),
        ..Link::default()
    }]);
    let labelled = CellValue::Links(vec![Link::labelled("PR-1")]);
    assert_eq!(d.compare_cells(&keyless, &labelled, false), Ordering::Greater);
    assert_eq!(d.compare_cells(&keyless, &CellValue::Blank, false), Ordering::Equal);
}

#[test]
fn filter_values_follow_column_kind() {
    let number = descriptor(SortVariant::Default, ValueKind::Number);
    assert_eq!(
        number.filter_value_of(&CellValue::text("1,200")),
        FilterValue::Number(Some(1200.0))
    );
    assert_eq!(
        number.filter_value_of(&CellValue::text("-")),
        FilterValue::Number(None)
    );
    let mixed = descriptor(SortVariant::Default, ValueKind::Mixed);
    assert_eq!(
        mixed.filter_value_of(&CellValue::text("12 kg")),
        FilterValue::Mixed {
            number: Some(12.0),
            text: Some("12 kg".into())
        }
    );
    let text = descriptor(SortVariant::Default, ValueKind::String);
    assert_eq!(
        text.filter_value_of(&CellValue::Blank),
        FilterValue::Text(None)
    );
}

#[test]
fn hyphenated_multi_path_key_loads_and_compares_path_lists() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "paths.json",
        r#"[{"where": ["zeta", "Alpha"]}, {"where": ["beta"]}]"#,
    );
    let column = ColumnDef::new("where").sort_type("multi-path");
    let config = GridConfig::new(vec![column.clone()]);
    let loaded = load_rows(&input, &LoadOptions::default(), Some(&config)).expect("load rows");

    let first = loaded.rows[0].cell("where");
    let second = loaded.rows[1].cell("where");
    assert_eq!(first, &CellValue::Paths(vec!["zeta".into(), "Alpha".into()]));

    let d = ComparatorDescriptor::build(&column, &loaded.rows);
    assert_eq!(d.variant(), SortVariant::MultiPath);
    assert_eq!(d.compare_cells(first, second, false), Ordering::Less);
}
