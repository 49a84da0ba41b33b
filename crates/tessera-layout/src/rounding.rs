// crates/tessera-layout/src/rounding.rs

use crate::{LayoutTree, NodeId};
use tessera_core::{inexact_equals_f64, Dimension, NodeType, PhysicalEdge, UNDEFINED};

/// Snap `value` to the nearest multiple of `1 / point_scale_factor`.
///
/// `force_ceil` and `force_floor` pick a direction for values that are not
/// already on the grid. Negative values round with floor semantics.
pub(crate) fn round_value_to_pixel_grid(
    value: f64,
    point_scale_factor: f64,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    let mut scaled_value = value * point_scale_factor;
    // fractional part such that floor(scaled_value) == scaled_value - fractional
    let mut fractional = scaled_value % 1.0;
    if fractional < 0.0 {
        fractional += 1.0;
    }

    if inexact_equals_f64(fractional, 0.0) {
        scaled_value -= fractional;
    } else if inexact_equals_f64(fractional, 1.0) {
        scaled_value = scaled_value - fractional + 1.0;
    } else if force_ceil {
        scaled_value = scaled_value - fractional + 1.0;
    } else if force_floor {
        scaled_value -= fractional;
    } else {
        let round_up = !fractional.is_nan() && (fractional > 0.5 || inexact_equals_f64(fractional, 0.5));
        scaled_value = scaled_value - fractional + if round_up { 1.0 } else { 0.0 };
    }

    if scaled_value.is_nan() || point_scale_factor.is_nan() {
        UNDEFINED
    } else {
        (scaled_value / point_scale_factor) as f32
    }
}

fn has_fractional_part(size: f64, point_scale_factor: f64) -> bool {
    let fractional = (size * point_scale_factor) % 1.0;
    !inexact_equals_f64(fractional, 0.0) && !inexact_equals_f64(fractional, 1.0)
}

/// Round positions and sizes of the subtree at `node` to the pixel grid.
///
/// Sizes are derived from rounded absolute edges so neighbouring boxes
/// stay seamless. Text nodes never round their size down.
pub(crate) fn round_layout_results_to_pixel_grid(
    tree: &mut LayoutTree,
    node: NodeId,
    absolute_left: f64,
    absolute_top: f64,
) {
    let entry = &tree.nodes[node];
    let point_scale_factor = entry.config.point_scale_factor() as f64;
    let layout = &entry.layout;

    let node_left = layout.position(PhysicalEdge::Left) as f64;
    let node_top = layout.position(PhysicalEdge::Top) as f64;
    let node_width = layout.dimension(Dimension::Width) as f64;
    let node_height = layout.dimension(Dimension::Height) as f64;

    let absolute_node_left = absolute_left + node_left;
    let absolute_node_top = absolute_top + node_top;
    let absolute_node_right = absolute_node_left + node_width;
    let absolute_node_bottom = absolute_node_top + node_height;

    if point_scale_factor != 0.0 {
        let text_rounding = entry.node_type == NodeType::Text;
        let fractional_width = has_fractional_part(node_width, point_scale_factor);
        let fractional_height = has_fractional_part(node_height, point_scale_factor);

        let left = round_value_to_pixel_grid(node_left, point_scale_factor, false, text_rounding);
        let top = round_value_to_pixel_grid(node_top, point_scale_factor, false, text_rounding);

        let width = round_value_to_pixel_grid(
            absolute_node_right,
            point_scale_factor,
            text_rounding && fractional_width,
            text_rounding && !fractional_width,
        ) - round_value_to_pixel_grid(absolute_node_left, point_scale_factor, false, text_rounding);
        let height = round_value_to_pixel_grid(
            absolute_node_bottom,
            point_scale_factor,
            text_rounding && fractional_height,
            text_rounding && !fractional_height,
        ) - round_value_to_pixel_grid(absolute_node_top, point_scale_factor, false, text_rounding);

        let layout = &mut tree.nodes[node].layout;
        layout.set_position(PhysicalEdge::Left, left);
        layout.set_position(PhysicalEdge::Top, top);
        layout.set_dimension(Dimension::Width, width);
        layout.set_dimension(Dimension::Height, height);
    }

    for index in 0..tree.nodes[node].children.len() {
        let child = tree.nodes[node].children[index];
        round_layout_results_to_pixel_grid(tree, child, absolute_node_left, absolute_node_top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_value_to_pixel_grid(10.5, 1.0, false, false), 11.0);
        assert_eq!(round_value_to_pixel_grid(10.49, 1.0, false, false), 10.0);
        assert_eq!(round_value_to_pixel_grid(10.2, 2.0, false, false), 10.0);
        assert_eq!(round_value_to_pixel_grid(10.3, 2.0, false, false), 10.5);
    }

    #[test]
    fn test_forced_directions() {
        assert_eq!(round_value_to_pixel_grid(10.2, 1.0, true, false), 11.0);
        assert_eq!(round_value_to_pixel_grid(10.8, 1.0, false, true), 10.0);
        // Already on the grid: forcing has no effect
        assert_eq!(round_value_to_pixel_grid(10.0, 1.0, true, false), 10.0);
    }

    #[test]
    fn test_negative_values_use_floor_semantics() {
        assert_eq!(round_value_to_pixel_grid(-10.2, 1.0, false, false), -10.0);
        assert_eq!(round_value_to_pixel_grid(-10.6, 1.0, false, false), -11.0);
        assert_eq!(round_value_to_pixel_grid(-10.2, 1.0, false, true), -11.0);
    }

    #[test]
    fn test_undefined_passes_through() {
        assert!(round_value_to_pixel_grid(f64::NAN, 1.0, false, false).is_nan());
    }
}
