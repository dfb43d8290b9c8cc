use sticky_grid::{
    config::{ColumnDef, GridConfig, Pin},
    layout::{WidthMap, layout, order_columns},
};

fn widths(entries: &[(&str, u32)]) -> WidthMap {
    entries
        .iter()
        .map(|(id, width)| (id.to_string(), *width))
        .collect()
}

fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("A").pinned(Pin::Left),
        ColumnDef::new("B"),
        ColumnDef::new("C").pinned(Pin::Left),
        ColumnDef::new("D").pinned(Pin::Right),
        ColumnDef::new("E").pinned(Pin::Right),
    ]
}

#[test]
fn pinned_offsets_accumulate_from_each_edge() {
    let measured = widths(&[("A", 50), ("B", 80), ("C", 30), ("D", 40), ("E", 20)]);
    let positioned = layout(&columns(), &measured);

    let ids: Vec<&str> = positioned.iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["A", "C", "B", "D", "E"]);

    let offsets: Vec<(Option<u32>, Option<u32>)> = positioned
        .iter()
        .map(|p| (p.style.left, p.style.right))
        .collect();
    assert_eq!(
        offsets,
        vec![
            (Some(0), None),
            (Some(50), None),
            (None, None),
            (None, Some(20)),
            (None, Some(0)),
        ]
    );
    assert!(positioned[0].style.sticky);
    assert!(!positioned[2].style.sticky);
    assert_eq!(positioned[2].width, Some(80));
}

#[test]
fn layout_is_idempotent() {
    let measured = widths(&[("A", 50), ("B", 80), ("C", 30), ("D", 40), ("E", 20)]);
    let first = layout(&columns(), &measured);
    let second = layout(&columns(), &measured);
    assert_eq!(first, second);
}

#[test]
fn unmeasured_columns_have_no_offsets() {
    let positioned = layout(&columns(), &WidthMap::new());
    assert!(positioned.iter().all(|p| p.offset().is_none()));
    assert!(positioned.iter().all(|p| p.width.is_none()));
    assert!(positioned[0].style.sticky);
}

#[test]
fn missing_width_unresolves_later_offsets() {
    let measured = widths(&[("C", 30), ("D", 40), ("E", 20)]);
    let positioned = layout(&columns(), &measured);
    assert_eq!(positioned[0].style.left, Some(0));
    assert_eq!(positioned[1].style.left, None);
    assert_eq!(positioned[4].style.right, Some(0));
    assert_eq!(positioned[3].style.right, Some(20));
}

#[test]
fn ordering_keeps_declared_order_within_groups() {
    let ordered = order_columns(&columns());
    let ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "C", "B", "D", "E"]);
}

#[test]
fn layout_uses_config_sequence() {
    let config = GridConfig::from_yaml_str(
        "columns:\n  - id: total\n    pinned: right\n  - id: name\n    pinned: left\n  - id: notes\n",
    )
    .expect("parse config");
    let positioned = layout(
        &config.sequenced_columns(),
        &widths(&[("total", 64), ("name", 96), ("notes", 200)]),
    );
    let ids: Vec<&str> = positioned.iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec!["name", "notes", "total"]);
    assert_eq!(positioned[0].style.left, Some(0));
    assert_eq!(positioned[2].style.right, Some(0));
}
