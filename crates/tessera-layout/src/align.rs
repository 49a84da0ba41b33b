// crates/tessera-layout/src/align.rs

use crate::baseline::calculate_baseline;
use crate::calculate::{calculate_layout_internal, FlexContainer};
use crate::constraints::{bound_axis, constrain_max_size_for_mode};
use crate::context::{LayoutContext, LayoutPassReason, LayoutRequest};
use crate::flex_direction::{dimension, flex_start_edge, is_column};
use crate::flex_line::FlexLine;
use crate::node::Node;
use crate::LayoutTree;
use tessera_core::{
    inexact_equals, max_or_defined, Align, Dimension, Display, FlexDirection, Justify, PhysicalEdge, PositionType,
    Result, SizingMode,
};

/// `align-self`, or the parent's `align-items` when auto. Column parents
/// have no baseline, so baseline degrades to flex-start.
pub(crate) fn resolve_child_alignment(parent: &Node, child: &Node) -> Align {
    let align = if child.style.align_self() == Align::Auto {
        parent.style.align_items()
    } else {
        child.style.align_self()
    };
    if align == Align::Baseline && is_column(parent.style.flex_direction()) {
        return Align::FlexStart;
    }
    align
}

/// Alignment used when there is negative free space.
pub(crate) fn fallback_align(align: Align) -> Align {
    match align {
        Align::SpaceBetween | Align::Stretch | Align::SpaceAround | Align::SpaceEvenly => Align::FlexStart,
        other => other,
    }
}

/// Justification used when there is negative free space.
pub(crate) fn fallback_justify(justify: Justify) -> Justify {
    match justify {
        Justify::SpaceBetween | Justify::SpaceAround | Justify::SpaceEvenly => Justify::FlexStart,
        other => other,
    }
}

/// Position each item of `line` on the cross axis, relaying out stretched
/// items against the line's cross size.
pub(crate) fn align_line_cross_axis(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    container: &FlexContainer,
    line: &FlexLine,
    container_cross_axis: f32,
    total_line_cross_dim: f32,
) -> Result<()> {
    let c = container;
    let cross_edge = flex_start_edge(c.cross_axis);

    for &child_id in &line.items_in_flow {
        let parent = &tree.nodes[c.node];
        let child = &tree.nodes[child_id];
        let mut leading_cross_dim = c.leading_padding_and_border_cross;

        let align_item = resolve_child_alignment(parent, child);
        let start_margin_auto = child.style.flex_start_margin_is_auto(c.cross_axis, c.direction);
        let end_margin_auto = child.style.flex_end_margin_is_auto(c.cross_axis, c.direction);

        if align_item == Align::Stretch && !start_margin_auto && !end_margin_auto {
            // A definite cross size is never stretched
            if !child.has_definite_length(dimension(c.cross_axis), c.available_inner_cross_dim) {
                let mut child_main_size = child.layout.measured_dimension(dimension(c.main_axis));
                let child_cross_size = match child.style.aspect_ratio() {
                    Some(ratio) => {
                        child.style.compute_margin_for_axis(c.cross_axis, c.available_inner_width)
                            + if c.is_main_axis_row {
                                child_main_size / ratio
                            } else {
                                child_main_size * ratio
                            }
                    }
                    None => line.layout.cross_dim,
                };
                child_main_size += child.style.compute_margin_for_axis(c.main_axis, c.available_inner_width);

                let (_, child_main_size) = constrain_max_size_for_mode(
                    child,
                    c.main_axis,
                    c.available_inner_main_dim,
                    c.available_inner_width,
                    SizingMode::StretchFit,
                    child_main_size,
                );
                let (_, child_cross_size) = constrain_max_size_for_mode(
                    child,
                    c.cross_axis,
                    c.available_inner_cross_dim,
                    c.available_inner_width,
                    SizingMode::StretchFit,
                    child_cross_size,
                );

                let (child_width, child_height) = if c.is_main_axis_row {
                    (child_main_size, child_cross_size)
                } else {
                    (child_cross_size, child_main_size)
                };

                let cross_axis_does_not_grow = parent.style.align_content() != Align::Stretch && c.is_node_flex_wrap;
                let width_sizing_mode = if child_width.is_nan() || (!c.is_main_axis_row && cross_axis_does_not_grow) {
                    SizingMode::MaxContent
                } else {
                    SizingMode::StretchFit
                };
                let height_sizing_mode = if child_height.is_nan() || (c.is_main_axis_row && cross_axis_does_not_grow) {
                    SizingMode::MaxContent
                } else {
                    SizingMode::StretchFit
                };

                calculate_layout_internal(
                    tree,
                    ctx,
                    child_id,
                    LayoutRequest {
                        available_width: child_width,
                        available_height: child_height,
                        owner_direction: c.direction,
                        width_sizing_mode,
                        height_sizing_mode,
                        owner_width: c.available_inner_width,
                        owner_height: c.available_inner_height,
                        perform_layout: true,
                        reason: LayoutPassReason::Stretch,
                    },
                    c.depth,
                )?;
            }
        } else {
            let remaining_cross_dim =
                container_cross_axis - child.dimension_with_margin(c.cross_axis, c.available_inner_width);

            if start_margin_auto && end_margin_auto {
                leading_cross_dim += max_or_defined(0.0, remaining_cross_dim / 2.0);
            } else if end_margin_auto {
                // Trailing auto margin absorbs the space
            } else if start_margin_auto {
                leading_cross_dim += max_or_defined(0.0, remaining_cross_dim);
            } else if align_item == Align::FlexStart {
                // Already at the start
            } else if align_item == Align::Center {
                leading_cross_dim += remaining_cross_dim / 2.0;
            } else {
                leading_cross_dim += remaining_cross_dim;
            }
        }

        let layout = &mut tree.nodes[child_id].layout;
        layout.set_position(cross_edge, layout.position(cross_edge) + total_line_cross_dim + leading_cross_dim);
    }
    Ok(())
}

/// Distribute free cross-axis space between lines (`align-content`) and
/// place every in-flow child within its line.
pub(crate) fn align_lines(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    container: &FlexContainer,
    line_count: usize,
    total_line_cross_dim: f32,
    cross_axis_gap: f32,
) -> Result<()> {
    let c = container;
    let cross_dimension = dimension(c.cross_axis);
    let cross_edge = flex_start_edge(c.cross_axis);

    let unclamped_cross_dim = {
        let entry = &tree.nodes[c.node];
        if c.sizing_mode_cross_dim == SizingMode::StretchFit {
            c.available_inner_cross_dim + c.padding_and_border_axis_cross
        } else if entry.has_definite_length(cross_dimension, c.cross_axis_owner_size) {
            entry.resolved_dimension(cross_dimension).resolve_or_undefined(c.cross_axis_owner_size)
        } else {
            total_line_cross_dim + c.padding_and_border_axis_cross
        }
    };
    let inner_cross_dim = bound_axis(
        &tree.nodes[c.node],
        c.cross_axis,
        c.direction,
        unclamped_cross_dim,
        c.cross_axis_owner_size,
        c.owner_width,
    ) - c.padding_and_border_axis_cross;
    let remaining_align_content_dim = inner_cross_dim - total_line_cross_dim;

    let style_align_content = tree.nodes[c.node].style.align_content();
    let align_content = if remaining_align_content_dim >= 0.0 {
        style_align_content
    } else {
        fallback_align(style_align_content)
    };

    let lines = line_count as f32;
    let mut current_lead = c.leading_padding_and_border_cross;
    let mut lead_per_line = 0.0;
    let mut extra_space_per_line = 0.0;
    match align_content {
        Align::FlexEnd => current_lead += remaining_align_content_dim,
        Align::Center => current_lead += remaining_align_content_dim / 2.0,
        Align::Stretch => extra_space_per_line = remaining_align_content_dim / lines,
        Align::SpaceAround => {
            current_lead += remaining_align_content_dim / (2.0 * lines);
            lead_per_line = remaining_align_content_dim / lines;
        }
        Align::SpaceEvenly => {
            current_lead += remaining_align_content_dim / (lines + 1.0);
            lead_per_line = remaining_align_content_dim / (lines + 1.0);
        }
        Align::SpaceBetween => {
            if line_count > 1 {
                lead_per_line = remaining_align_content_dim / (lines - 1.0);
            }
        }
        Align::Auto | Align::FlexStart | Align::Baseline => {}
    }

    let children = tree.nodes[c.node].children.clone();
    let mut end_index = 0;
    for line in 0..line_count {
        let start_index = end_index;

        // Line height and end index
        let mut line_height: f32 = 0.0;
        let mut max_ascent: f32 = 0.0;
        let mut max_descent: f32 = 0.0;
        let mut index = start_index;
        while index < children.len() {
            let child = &tree.nodes[children[index]];
            if child.style.display() == Display::None || child.style.position_type() == PositionType::Absolute {
                index += 1;
                continue;
            }
            if child.line_index != line {
                break;
            }
            if child.is_layout_dimension_defined(cross_dimension) {
                line_height = max_or_defined(
                    line_height,
                    child.dimension_with_margin(c.cross_axis, c.available_inner_width),
                );
            }
            if resolve_child_alignment(&tree.nodes[c.node], child) == Align::Baseline {
                let ascent = calculate_baseline(tree, children[index])?
                    + child.style.compute_flex_start_margin(FlexDirection::Column, c.direction, c.available_inner_width);
                let descent = child.layout.measured_dimension(Dimension::Height)
                    + child.style.compute_margin_for_axis(FlexDirection::Column, c.available_inner_width)
                    - ascent;
                max_ascent = max_or_defined(max_ascent, ascent);
                max_descent = max_or_defined(max_descent, descent);
            }
            index += 1;
        }
        end_index = index;

        if line != 0 {
            current_lead += cross_axis_gap;
        }
        line_height = max_or_defined(line_height, max_ascent + max_descent);
        line_height += extra_space_per_line;

        for &child_id in &children[start_index..end_index] {
            let child = &tree.nodes[child_id];
            if child.style.display() == Display::None || child.style.position_type() == PositionType::Absolute {
                continue;
            }

            match resolve_child_alignment(&tree.nodes[c.node], child) {
                Align::FlexStart => {
                    let position = current_lead
                        + child.style.compute_flex_start_margin(c.cross_axis, c.direction, c.available_inner_width);
                    tree.nodes[child_id].layout.set_position(cross_edge, position);
                }
                Align::FlexEnd => {
                    let position = current_lead + line_height
                        - child.style.compute_flex_end_margin(c.cross_axis, c.direction, c.available_inner_width)
                        - child.layout.measured_dimension(cross_dimension);
                    tree.nodes[child_id].layout.set_position(cross_edge, position);
                }
                Align::Center => {
                    let child_size = child.layout.measured_dimension(cross_dimension);
                    let position = current_lead + (line_height - child_size) / 2.0;
                    tree.nodes[child_id].layout.set_position(cross_edge, position);
                }
                Align::Stretch => {
                    let position = current_lead
                        + child.style.compute_flex_start_margin(c.cross_axis, c.direction, c.available_inner_width);
                    let definite = child.has_definite_length(cross_dimension, c.available_inner_cross_dim);
                    let measured_width = child.layout.measured_dimension(Dimension::Width);
                    let measured_height = child.layout.measured_dimension(Dimension::Height);
                    let main_margin = child.style.compute_margin_for_axis(c.main_axis, c.available_inner_width);
                    tree.nodes[child_id].layout.set_position(cross_edge, position);

                    // Items were only measured against the container so far
                    if !definite {
                        let (child_width, child_height) = if c.is_main_axis_row {
                            (measured_width + main_margin, line_height)
                        } else {
                            (line_height, measured_height + main_margin)
                        };

                        if !(inexact_equals(child_width, measured_width) && inexact_equals(child_height, measured_height)) {
                            calculate_layout_internal(
                                tree,
                                ctx,
                                child_id,
                                LayoutRequest {
                                    available_width: child_width,
                                    available_height: child_height,
                                    owner_direction: c.direction,
                                    width_sizing_mode: SizingMode::StretchFit,
                                    height_sizing_mode: SizingMode::StretchFit,
                                    owner_width: c.available_inner_width,
                                    owner_height: c.available_inner_height,
                                    perform_layout: true,
                                    reason: LayoutPassReason::MultilineStretch,
                                },
                                c.depth,
                            )?;
                        }
                    }
                }
                Align::Baseline => {
                    let position = current_lead + max_ascent - calculate_baseline(tree, child_id)?
                        + child.style.compute_flex_start_position(
                            FlexDirection::Column,
                            c.direction,
                            c.available_inner_cross_dim,
                        );
                    tree.nodes[child_id].layout.set_position(PhysicalEdge::Top, position);
                }
                Align::Auto | Align::SpaceBetween | Align::SpaceAround | Align::SpaceEvenly => {}
            }
        }

        current_lead += lead_per_line + line_height;
    }
    Ok(())
}
