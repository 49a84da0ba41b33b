// crates/tessera-layout/tests/flex_layout.rs
use tessera_layout::{
    Align, Dimension, Direction, Display, Edge, Errata, FlexDirection, Gutter, Justify, LayoutTree, NodeId, Overflow,
    Size, Value, Wrap, UNDEFINED,
};

fn fixed_child(tree: &mut LayoutTree, parent: NodeId, width: f32, height: f32) -> NodeId {
    let child = tree.new_node();
    tree.update_style(child, |s| {
        s.set_width(Value::Point(width));
        s.set_height(Value::Point(height));
    })
    .unwrap();
    tree.add_child(parent, child).unwrap();
    child
}

fn row_root(tree: &mut LayoutTree, width: f32, height: f32) -> NodeId {
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_flex_direction(FlexDirection::Row);
        s.set_width(Value::Point(width));
        s.set_height(Value::Point(height));
    })
    .unwrap();
    root
}

#[test]
fn test_percent_margin_mirrors_under_rtl() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(100.0));
        s.set_height(Value::Point(100.0));
        s.set_margin(Edge::Start, Value::Percent(10.0));
    })
    .unwrap();

    tree.calculate_layout(root, 100.0, 100.0, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_margin(root, Edge::Left), 10.0);
    assert_eq!(tree.computed_margin(root, Edge::Right), 0.0);
    assert_eq!(tree.computed_margin(root, Edge::Start), 10.0);

    tree.calculate_layout(root, 100.0, 100.0, Direction::Rtl).unwrap();
    assert_eq!(tree.computed_margin(root, Edge::Left), 0.0);
    assert_eq!(tree.computed_margin(root, Edge::Right), 10.0);
    assert_eq!(tree.computed_direction(root), Direction::Rtl);
}

#[test]
fn test_baseline_alignment() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(150.0));
        s.set_flex_direction(FlexDirection::Row);
        s.set_align_items(Align::Baseline);
    })
    .unwrap();
    let a = fixed_child(&mut tree, root, 50.0, 50.0);
    let b = fixed_child(&mut tree, root, 50.0, 40.0);
    tree.set_baseline_func(b, Some(Box::new(|_, height| height / 2.0))).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();

    assert_eq!(tree.computed_height(root), 70.0);
    assert_eq!(tree.computed_width(root), 150.0);
    assert_eq!((tree.computed_left(a), tree.computed_top(a)), (0.0, 0.0));
    assert_eq!((tree.computed_width(a), tree.computed_height(a)), (50.0, 50.0));
    assert_eq!((tree.computed_left(b), tree.computed_top(b)), (50.0, 30.0));
    assert_eq!((tree.computed_width(b), tree.computed_height(b)), (50.0, 40.0));
}

#[test]
fn test_flex_grow_splits_free_space() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 300.0, 100.0);
    let mut children = Vec::new();
    for _ in 0..2 {
        let child = tree.new_node();
        tree.update_style(child, |s| {
            s.set_flex_grow(1.0);
            s.set_flex_basis(Value::Point(0.0));
        })
        .unwrap();
        tree.add_child(root, child).unwrap();
        children.push(child);
    }

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();

    assert_eq!(tree.computed_width(children[0]), 150.0);
    assert_eq!(tree.computed_width(children[1]), 150.0);
    assert_eq!(tree.computed_left(children[1]), 150.0);
    // Stretched to the cross size of the line
    assert_eq!(tree.computed_height(children[0]), 100.0);
}

#[test]
fn test_max_width_redistributes_growth() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 300.0, 100.0);
    let capped = tree.new_node();
    let open = tree.new_node();
    tree.update_style(capped, |s| {
        s.set_flex_grow(1.0);
        s.set_max_dimension(Dimension::Width, Value::Point(100.0));
    })
    .unwrap();
    tree.update_style(open, |s| s.set_flex_grow(1.0)).unwrap();
    tree.add_child(root, capped).unwrap();
    tree.add_child(root, open).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();

    assert_eq!(tree.computed_width(capped), 100.0);
    assert_eq!(tree.computed_width(open), 200.0);
    assert_eq!(tree.computed_left(open), 100.0);
}

#[test]
fn test_root_sized_to_content_under_max() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| s.set_max_dimension(Dimension::Width, Value::Point(200.0))).unwrap();
    fixed_child(&mut tree, root, 50.0, 20.0);
    fixed_child(&mut tree, root, 30.0, 20.0);

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_width(root), 50.0);
    assert_eq!(tree.computed_height(root), 40.0);
}

#[test]
fn test_wrap_moves_overflowing_items_to_next_line() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_flex_direction(FlexDirection::Row);
        s.set_flex_wrap(Wrap::Wrap);
        s.set_width(Value::Point(100.0));
    })
    .unwrap();
    let a = fixed_child(&mut tree, root, 40.0, 20.0);
    let b = fixed_child(&mut tree, root, 40.0, 20.0);
    let c = fixed_child(&mut tree, root, 40.0, 20.0);

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();

    assert_eq!((tree.computed_left(a), tree.computed_top(a)), (0.0, 0.0));
    assert_eq!((tree.computed_left(b), tree.computed_top(b)), (40.0, 0.0));
    assert_eq!((tree.computed_left(c), tree.computed_top(c)), (0.0, 20.0));
    assert_eq!(tree.computed_height(root), 40.0);
}

#[test]
fn test_justify_content() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 300.0, 100.0);
    let children: Vec<_> = (0..3).map(|_| fixed_child(&mut tree, root, 50.0, 50.0)).collect();

    tree.update_style(root, |s| s.set_justify_content(Justify::SpaceBetween)).unwrap();
    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    let lefts: Vec<f32> = children.iter().map(|c| tree.computed_left(*c)).collect();
    assert_eq!(lefts, vec![0.0, 125.0, 250.0]);

    tree.update_style(root, |s| s.set_justify_content(Justify::Center)).unwrap();
    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    let lefts: Vec<f32> = children.iter().map(|c| tree.computed_left(*c)).collect();
    assert_eq!(lefts, vec![75.0, 125.0, 175.0]);

    tree.update_style(root, |s| s.set_justify_content(Justify::FlexEnd)).unwrap();
    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_left(children[2]), 250.0);
    assert_eq!(tree.computed_left(children[0]), 150.0);
}

#[test]
fn test_rtl_row_starts_from_the_right() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 300.0, 100.0);
    let a = fixed_child(&mut tree, root, 50.0, 50.0);
    let b = fixed_child(&mut tree, root, 50.0, 50.0);

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Rtl).unwrap();
    assert_eq!(tree.computed_left(a), 250.0);
    assert_eq!(tree.computed_left(b), 200.0);
}

#[test]
fn test_row_reverse() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 300.0, 100.0);
    tree.update_style(root, |s| s.set_flex_direction(FlexDirection::RowReverse)).unwrap();
    let a = fixed_child(&mut tree, root, 50.0, 50.0);
    let b = fixed_child(&mut tree, root, 60.0, 50.0);

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_left(a), 250.0);
    assert_eq!(tree.computed_left(b), 190.0);
}

#[test]
fn test_display_none_collapses_subtree() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(100.0));
        s.set_height(Value::Point(100.0));
    })
    .unwrap();
    let hidden = fixed_child(&mut tree, root, 50.0, 50.0);
    let inner = fixed_child(&mut tree, hidden, 10.0, 10.0);
    let visible = fixed_child(&mut tree, root, 50.0, 50.0);
    tree.update_style(hidden, |s| s.set_display(Display::None)).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!((tree.computed_width(hidden), tree.computed_height(hidden)), (0.0, 0.0));
    assert_eq!(tree.computed_width(inner), 0.0);
    assert_eq!(tree.computed_top(visible), 0.0);
}

#[test]
fn test_column_gap_between_items() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 200.0, 100.0);
    tree.update_style(root, |s| s.set_gap(Gutter::Column, Value::Point(10.0))).unwrap();
    let children: Vec<_> = (0..3).map(|_| fixed_child(&mut tree, root, 50.0, 50.0)).collect();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    let lefts: Vec<f32> = children.iter().map(|c| tree.computed_left(*c)).collect();
    assert_eq!(lefts, vec![0.0, 60.0, 120.0]);
}

#[test]
fn test_aspect_ratio_derives_height() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(200.0));
        s.set_height(Value::Point(200.0));
    })
    .unwrap();
    let child = tree.new_node();
    tree.update_style(child, |s| {
        s.set_width(Value::Point(100.0));
        s.set_aspect_ratio(2.0);
    })
    .unwrap();
    tree.add_child(root, child).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_width(child), 100.0);
    assert_eq!(tree.computed_height(child), 50.0);
}

#[test]
fn test_auto_margin_absorbs_free_space() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 200.0, 100.0);
    let child = fixed_child(&mut tree, root, 50.0, 50.0);
    tree.update_style(child, |s| s.set_margin(Edge::Left, Value::Auto)).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_left(child), 150.0);
    let position = tree.computed_position(child);
    let size = tree.computed_size(child);
    assert_eq!((position.x, position.y), (150.0, 0.0));
    assert_eq!((size.x, size.y), (50.0, 50.0));
}

#[test]
fn test_align_self_center() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(200.0));
        s.set_height(Value::Point(200.0));
    })
    .unwrap();
    let child = fixed_child(&mut tree, root, 50.0, 50.0);
    tree.update_style(child, |s| s.set_align_self(Align::Center)).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_left(child), 75.0);
    assert_eq!(tree.computed_top(child), 0.0);
}

#[test]
fn test_padding_and_border_floor_at_zero_but_margin_does_not() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(100.0));
        s.set_height(Value::Point(100.0));
        s.set_padding(Edge::Left, Value::Point(-5.0));
        s.set_border(Edge::Top, Value::Point(-3.0));
        s.set_margin(Edge::Left, Value::Point(-7.0));
    })
    .unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_padding(root, Edge::Left), 0.0);
    assert_eq!(tree.computed_border(root, Edge::Top), 0.0);
    assert_eq!(tree.computed_margin(root, Edge::Left), -7.0);
}

#[test]
fn test_measured_leaf_wraps_to_available_width() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| s.set_width(Value::Point(120.0))).unwrap();
    let text = tree.new_node();
    tree.set_measure_func(
        text,
        Some(Box::new(|width, _, _, _| {
            // 200 points of text, 10 points per line
            let lines = (200.0 / width).ceil();
            Size::new(width.min(200.0), lines * 10.0)
        })),
    )
    .unwrap();
    tree.add_child(root, text).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_width(text), 120.0);
    assert_eq!(tree.computed_height(text), 20.0);
    assert_eq!(tree.computed_height(root), 20.0);
}

#[test]
fn test_infinite_width_is_treated_as_unset() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(100.0));
        s.set_height(Value::Point(100.0));
    })
    .unwrap();
    let child = tree.new_node();
    tree.update_style(child, |s| {
        s.set_width(Value::Point(f32::INFINITY));
        s.set_min_dimension(Dimension::Width, Value::Percent(f32::NAN));
        s.set_height(Value::Point(10.0));
    })
    .unwrap();
    tree.add_child(root, child).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    // Unset width stretches like auto
    assert_eq!(tree.computed_width(child), 100.0);
    assert_eq!(tree.computed_height(child), 10.0);
}

#[test]
fn test_wrap_reverse_mirrors_lines() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_flex_direction(FlexDirection::Row);
        s.set_flex_wrap(Wrap::WrapReverse);
        s.set_width(Value::Point(100.0));
    })
    .unwrap();
    let children: Vec<_> = [10.0, 20.0, 30.0, 40.0, 50.0]
        .iter()
        .map(|&height| fixed_child(&mut tree, root, 30.0, height))
        .collect();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_height(root), 80.0);
    let positions: Vec<(f32, f32)> =
        children.iter().map(|c| (tree.computed_left(*c), tree.computed_top(*c))).collect();
    assert_eq!(positions, vec![(0.0, 70.0), (30.0, 60.0), (60.0, 50.0), (0.0, 10.0), (30.0, 0.0)]);
}

#[test]
fn test_align_content_space_between_lines() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 100.0, 100.0);
    tree.update_style(root, |s| {
        s.set_flex_wrap(Wrap::Wrap);
        s.set_align_content(Align::SpaceBetween);
    })
    .unwrap();
    let children: Vec<_> = (0..4).map(|_| fixed_child(&mut tree, root, 50.0, 10.0)).collect();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    let tops: Vec<f32> = children.iter().map(|c| tree.computed_top(*c)).collect();
    assert_eq!(tops, vec![0.0, 0.0, 90.0, 90.0]);
    assert_eq!(tree.computed_left(children[3]), 50.0);
}

fn growing_under_max_height(errata: Errata) -> (f32, f32) {
    let mut tree = LayoutTree::new();
    tree.config().set_errata(errata);
    let root = tree.new_node();
    tree.update_style(root, |s| s.set_max_dimension(Dimension::Height, Value::Point(200.0))).unwrap();
    let child = tree.new_node();
    tree.update_style(child, |s| {
        s.set_height(Value::Point(10.0));
        s.set_flex_grow(1.0);
    })
    .unwrap();
    tree.add_child(root, child).unwrap();

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    (tree.computed_height(root), tree.computed_height(child))
}

#[test]
fn test_stretch_flex_basis_errata() {
    assert_eq!(growing_under_max_height(Errata::empty()), (10.0, 10.0));
    // The legacy behaviour grows the container up to its max
    assert_eq!(growing_under_max_height(Errata::STRETCH_FLEX_BASIS), (200.0, 200.0));
}

#[test]
fn test_flex_shrink_splits_overflow() {
    let mut tree = LayoutTree::new();
    let root = row_root(&mut tree, 100.0, 100.0);
    let children: Vec<_> = (0..2).map(|_| fixed_child(&mut tree, root, 100.0, 10.0)).collect();
    for &child in &children {
        tree.update_style(child, |s| s.set_flex_shrink(1.0)).unwrap();
    }

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_width(children[0]), 50.0);
    assert_eq!(tree.computed_width(children[1]), 50.0);
    assert_eq!(tree.computed_left(children[1]), 50.0);
}

#[test]
fn test_column_reverse_places_from_bottom() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_flex_direction(FlexDirection::ColumnReverse);
        s.set_width(Value::Point(100.0));
        s.set_height(Value::Point(100.0));
    })
    .unwrap();
    let child = fixed_child(&mut tree, root, 100.0, 10.0);

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_top(child), 90.0);
    assert_eq!(tree.computed_left(child), 0.0);
}

#[test]
fn test_scroll_container_does_not_grow_past_available_space() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.update_style(root, |s| {
        s.set_width(Value::Point(100.0));
        s.set_height(Value::Point(100.0));
        s.set_align_items(Align::FlexStart);
    })
    .unwrap();
    let scroller = tree.new_node();
    tree.update_style(scroller, |s| s.set_overflow(Overflow::Scroll)).unwrap();
    tree.add_child(root, scroller).unwrap();
    fixed_child(&mut tree, scroller, 150.0, 10.0);

    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_width(scroller), 100.0);
    assert_eq!(tree.computed_height(scroller), 10.0);

    tree.update_style(scroller, |s| s.set_overflow(Overflow::Visible)).unwrap();
    tree.calculate_layout(root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
    assert_eq!(tree.computed_width(scroller), 150.0);
}
