// crates/tessera-layout/src/justify.rs

use crate::align::fallback_justify;
use crate::baseline::{calculate_baseline, is_baseline_layout};
use crate::calculate::FlexContainer;
use crate::flex_direction::{dimension, flex_start_edge};
use crate::flex_line::FlexLine;
use crate::LayoutTree;
use tessera_core::{max_or_defined, Dimension, FlexDirection, Justify, Result, SizingMode};

/// Place the items of `line` along the main axis and accumulate the line's
/// main and cross extents.
pub(crate) fn justify_main_axis(tree: &mut LayoutTree, container: &FlexContainer, line: &mut FlexLine) -> Result<()> {
    let c = container;
    let (leading_padding_and_border_main, trailing_padding_and_border_main, gap, justify_content, min_main) = {
        let style = &tree.nodes[c.node].style;
        let main_dimension = dimension(c.main_axis);
        (
            style.compute_flex_start_padding_and_border(c.main_axis, c.direction, c.owner_width),
            style.compute_flex_end_padding_and_border(c.main_axis, c.direction, c.owner_width),
            style.compute_gap_for_axis(c.main_axis, c.available_inner_main_dim),
            style.justify_content(),
            style.resolved_min_dimension(main_dimension, c.main_axis_owner_size),
        )
    };

    // Fit-content containers only keep free space needed to reach their min size
    if c.sizing_mode_main_dim == SizingMode::FitContent && line.layout.remaining_free_space > 0.0 {
        if !min_main.is_nan() {
            let min_available_main_dim = min_main - leading_padding_and_border_main - trailing_padding_and_border_main;
            let occupied_space_by_children = c.available_inner_main_dim - line.layout.remaining_free_space;
            line.layout.remaining_free_space = max_or_defined(0.0, min_available_main_dim - occupied_space_by_children);
        } else {
            line.layout.remaining_free_space = 0.0;
        }
    }

    let remaining_free_space = line.layout.remaining_free_space;
    let item_count = line.items_in_flow.len() as f32;
    let justify_content = if remaining_free_space >= 0.0 {
        justify_content
    } else {
        fallback_justify(justify_content)
    };

    let mut leading_main_dim = 0.0;
    let mut between_main_dim = gap;
    if line.number_of_auto_margins == 0 {
        match justify_content {
            Justify::Center => leading_main_dim = remaining_free_space / 2.0,
            Justify::FlexEnd => leading_main_dim = remaining_free_space,
            Justify::SpaceBetween => {
                if line.items_in_flow.len() > 1 {
                    between_main_dim += remaining_free_space / (item_count - 1.0);
                }
            }
            Justify::SpaceEvenly => {
                leading_main_dim = remaining_free_space / (item_count + 1.0);
                between_main_dim += leading_main_dim;
            }
            Justify::SpaceAround => {
                leading_main_dim = 0.5 * remaining_free_space / item_count;
                between_main_dim += leading_main_dim * 2.0;
            }
            Justify::FlexStart => {}
        }
    }

    line.layout.main_dim = leading_padding_and_border_main + leading_main_dim;
    line.layout.cross_dim = 0.0;

    let mut max_ascent_for_current_line: f32 = 0.0;
    let mut max_descent_for_current_line: f32 = 0.0;
    let is_node_baseline_layout = is_baseline_layout(tree, c.node);
    let can_skip_flex = !c.perform_layout && c.sizing_mode_cross_dim == SizingMode::StretchFit;
    let auto_margin_share = if line.number_of_auto_margins > 0 {
        remaining_free_space / line.number_of_auto_margins as f32
    } else {
        0.0
    };
    let main_edge = flex_start_edge(c.main_axis);
    let last_index = line.items_in_flow.len().saturating_sub(1);

    for (index, &child_id) in line.items_in_flow.iter().enumerate() {
        let child = &tree.nodes[child_id];
        let start_margin_auto = child.style.flex_start_margin_is_auto(c.main_axis, c.direction);
        let end_margin_auto = child.style.flex_end_margin_is_auto(c.main_axis, c.direction);

        if start_margin_auto && remaining_free_space > 0.0 {
            line.layout.main_dim += auto_margin_share;
        }

        if c.perform_layout {
            let main_dim = line.layout.main_dim;
            let layout = &mut tree.nodes[child_id].layout;
            layout.set_position(main_edge, layout.position(main_edge) + main_dim);
        }

        if index != last_index {
            line.layout.main_dim += between_main_dim;
        }

        if end_margin_auto && remaining_free_space > 0.0 {
            line.layout.main_dim += auto_margin_share;
        }

        let child = &tree.nodes[child_id];
        if can_skip_flex {
            // Measured sizes were not computed, fall back to the basis
            line.layout.main_dim += child.style.compute_margin_for_axis(c.main_axis, c.available_inner_width)
                + child.layout.computed_flex_basis().unwrap_or(f32::NAN);
            line.layout.cross_dim = c.available_inner_cross_dim;
        } else {
            line.layout.main_dim += child.dimension_with_margin(c.main_axis, c.available_inner_width);

            if is_node_baseline_layout {
                let ascent = calculate_baseline(tree, child_id)?
                    + child.style.compute_flex_start_margin(FlexDirection::Column, c.direction, c.available_inner_width);
                let descent = child.layout.measured_dimension(Dimension::Height)
                    + child.style.compute_margin_for_axis(FlexDirection::Column, c.available_inner_width)
                    - ascent;
                max_ascent_for_current_line = max_or_defined(max_ascent_for_current_line, ascent);
                max_descent_for_current_line = max_or_defined(max_descent_for_current_line, descent);
            } else {
                line.layout.cross_dim = max_or_defined(
                    line.layout.cross_dim,
                    child.dimension_with_margin(c.cross_axis, c.available_inner_width),
                );
            }
        }
    }
    line.layout.main_dim += trailing_padding_and_border_main;

    if is_node_baseline_layout {
        line.layout.cross_dim = max_ascent_for_current_line + max_descent_for_current_line;
    }
    Ok(())
}
