// crates/tessera-layout/src/constraints.rs

use crate::flex_direction::dimension;
use crate::node::Node;
use tessera_core::{is_defined, max_or_defined, min_or_defined, Dimension, Direction, FlexDirection, SizingMode};

pub(crate) fn padding_and_border_for_axis(
    node: &Node,
    axis: FlexDirection,
    direction: Direction,
    width_size: f32,
) -> f32 {
    node.style.compute_inline_start_padding_and_border(axis, direction, width_size)
        + node.style.compute_inline_end_padding_and_border(axis, direction, width_size)
}

/// Clamp `value` to the node's min/max along `axis`. The max bound is
/// checked first, so a value above max yields max even when min > max.
pub(crate) fn bound_axis_within_min_and_max(node: &Node, axis: FlexDirection, value: f32, axis_size: f32) -> f32 {
    let dim = dimension(axis);
    let min = node.style.resolved_min_dimension(dim, axis_size);
    let max = node.style.resolved_max_dimension(dim, axis_size);

    if max >= 0.0 && value > max {
        return max;
    }
    if min >= 0.0 && value < min {
        return min;
    }
    value
}

/// Like [`bound_axis_within_min_and_max`], but never smaller than the
/// node's padding and border.
pub(crate) fn bound_axis(
    node: &Node,
    axis: FlexDirection,
    direction: Direction,
    value: f32,
    axis_size: f32,
    width_size: f32,
) -> f32 {
    max_or_defined(
        bound_axis_within_min_and_max(node, axis, value, axis_size),
        padding_and_border_for_axis(node, axis, direction, width_size),
    )
}

/// Fold the node's max size (plus margins) into a sizing request.
/// An unconstrained request becomes fit-content against the max.
pub(crate) fn constrain_max_size_for_mode(
    node: &Node,
    axis: FlexDirection,
    owner_axis_size: f32,
    owner_width: f32,
    mode: SizingMode,
    size: f32,
) -> (SizingMode, f32) {
    let max_size = node.style.resolved_max_dimension(dimension(axis), owner_axis_size)
        + node.style.compute_margin_for_axis(axis, owner_width);

    match mode {
        SizingMode::StretchFit | SizingMode::FitContent => {
            let size = if max_size.is_nan() || size < max_size { size } else { max_size };
            (mode, size)
        }
        SizingMode::MaxContent => {
            if is_defined(max_size) {
                (SizingMode::FitContent, max_size)
            } else {
                (mode, size)
            }
        }
    }
}

/// Space left for children once padding and border are removed, clamped to
/// the node's inner min/max.
pub(crate) fn calculate_available_inner_dimension(
    node: &Node,
    dim: Dimension,
    available_dim: f32,
    padding_and_border: f32,
    owner_dim: f32,
) -> f32 {
    let mut available_inner_dim = available_dim - padding_and_border;
    if is_defined(available_inner_dim) {
        let min = node.style.resolved_min_dimension(dim, owner_dim);
        let min_inner_dim = if min.is_nan() { 0.0 } else { min - padding_and_border };

        let max = node.style.resolved_max_dimension(dim, owner_dim);
        let max_inner_dim = if max.is_nan() { f32::MAX } else { max - padding_and_border };

        available_inner_dim = max_or_defined(min_or_defined(available_inner_dim, max_inner_dim), min_inner_dim);
    }
    available_inner_dim
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tessera_core::{Config, Edge, Value, UNDEFINED};

    fn node() -> Node {
        Node::new(Rc::new(Config::new()))
    }

    #[test]
    fn test_max_checked_before_min() {
        let mut n = node();
        n.style.set_min_dimension(Dimension::Width, Value::Point(50.0));
        n.style.set_max_dimension(Dimension::Width, Value::Point(30.0));
        assert_eq!(bound_axis_within_min_and_max(&n, FlexDirection::Row, 10.0, 100.0), 50.0);
        assert_eq!(bound_axis_within_min_and_max(&n, FlexDirection::Row, 80.0, 100.0), 30.0);
    }

    #[test]
    fn test_bound_axis_floors_at_padding_and_border() {
        let mut n = node();
        n.style.set_padding(Edge::Left, Value::Point(6.0));
        n.style.set_border(Edge::Right, Value::Point(4.0));
        assert_eq!(bound_axis(&n, FlexDirection::Row, Direction::Ltr, 3.0, 100.0, 100.0), 10.0);
        assert_eq!(bound_axis(&n, FlexDirection::Column, Direction::Ltr, 3.0, 100.0, 100.0), 3.0);
    }

    #[test]
    fn test_constrain_max_size() {
        let mut n = node();
        n.style.set_max_dimension(Dimension::Width, Value::Percent(50.0));
        n.style.set_margin(Edge::Left, Value::Point(5.0));

        assert_eq!(
            constrain_max_size_for_mode(&n, FlexDirection::Row, 100.0, 100.0, SizingMode::MaxContent, UNDEFINED),
            (SizingMode::FitContent, 55.0)
        );
        assert_eq!(
            constrain_max_size_for_mode(&n, FlexDirection::Row, 100.0, 100.0, SizingMode::StretchFit, 80.0),
            (SizingMode::StretchFit, 55.0)
        );
        assert_eq!(
            constrain_max_size_for_mode(&n, FlexDirection::Row, 100.0, 100.0, SizingMode::FitContent, 20.0),
            (SizingMode::FitContent, 20.0)
        );
    }

    #[test]
    fn test_available_inner_dimension() {
        let mut n = node();
        n.style.set_max_dimension(Dimension::Height, Value::Point(60.0));
        assert_eq!(calculate_available_inner_dimension(&n, Dimension::Height, 100.0, 10.0, 100.0), 50.0);
        assert!(calculate_available_inner_dimension(&n, Dimension::Height, UNDEFINED, 10.0, 100.0).is_nan());
    }
}
