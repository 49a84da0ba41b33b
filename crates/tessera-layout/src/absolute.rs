// crates/tessera-layout/src/absolute.rs
//
// Absolutely positioned children are laid out by their containing block
// after the block has its final size. Insets resolve against the containing
// block; children without insets fall back to the justify/align rules of
// their parent.

use crate::align::resolve_child_alignment;
use crate::calculate::calculate_layout_internal;
use crate::constraints::bound_axis;
use crate::context::{LayoutContext, LayoutPassReason, LayoutRequest};
use crate::flex_direction::{
    dimension, flex_end_edge, flex_start_edge, inline_start_edge, is_row, resolve_cross_direction, resolve_direction,
};
use crate::trailing::{needs_trailing_position, set_child_trailing_position};
use crate::{LayoutTree, NodeId};
use tessera_core::{
    is_defined, Align, Dimension, Direction, Display, Errata, FlexDirection, Justify, PhysicalEdge, PositionType,
    Result, SizingMode, Wrap, UNDEFINED,
};

/// Whether the child positions against the parent's padding box edge.
fn includes_padding(tree: &LayoutTree, child: NodeId) -> bool {
    !tree.nodes[child].has_errata(Errata::ABSOLUTE_POSITION_WITHOUT_INSETS_EXCLUDES_PADDING)
}

fn position_of_opposite_edge(
    tree: &LayoutTree,
    position: f32,
    axis: FlexDirection,
    containing: NodeId,
    child: NodeId,
) -> f32 {
    tree.nodes[containing].layout.measured_dimension(dimension(axis))
        - tree.nodes[child].layout.measured_dimension(dimension(axis))
        - position
}

fn set_flex_start_layout_position(
    tree: &mut LayoutTree,
    parent: NodeId,
    child: NodeId,
    direction: Direction,
    axis: FlexDirection,
    containing_block_width: f32,
) {
    let start = flex_start_edge(axis);
    let parent_layout = &tree.nodes[parent].layout;
    let mut position = tree.nodes[child].style.compute_flex_start_margin(axis, direction, containing_block_width)
        + parent_layout.border(start);
    if includes_padding(tree, child) {
        position += parent_layout.padding(start);
    }
    tree.nodes[child].layout.set_position(start, position);
}

fn set_flex_end_layout_position(
    tree: &mut LayoutTree,
    parent: NodeId,
    child: NodeId,
    direction: Direction,
    axis: FlexDirection,
    containing_block_width: f32,
) {
    let end = flex_end_edge(axis);
    let parent_layout = &tree.nodes[parent].layout;
    let mut flex_end_position = parent_layout.border(end)
        + tree.nodes[child].style.compute_flex_end_margin(axis, direction, containing_block_width);
    if includes_padding(tree, child) {
        flex_end_position += parent_layout.padding(end);
    }
    let position = position_of_opposite_edge(tree, flex_end_position, axis, parent, child);
    tree.nodes[child].layout.set_position(flex_start_edge(axis), position);
}

fn set_center_layout_position(
    tree: &mut LayoutTree,
    parent: NodeId,
    child: NodeId,
    direction: Direction,
    axis: FlexDirection,
    containing_block_width: f32,
) {
    let start = flex_start_edge(axis);
    let end = flex_end_edge(axis);
    let padding = includes_padding(tree, child);
    let parent_layout = &tree.nodes[parent].layout;
    let child_entry = &tree.nodes[child];

    let mut parent_content_box_size =
        parent_layout.measured_dimension(dimension(axis)) - parent_layout.border(start) - parent_layout.border(end);
    if padding {
        parent_content_box_size -= parent_layout.padding(start) + parent_layout.padding(end);
    }
    let child_outer_size = child_entry.layout.measured_dimension(dimension(axis))
        + child_entry.style.compute_margin_for_axis(axis, containing_block_width);

    let mut position = (parent_content_box_size - child_outer_size) / 2.0
        + parent_layout.border(start)
        + child_entry.style.compute_flex_start_margin(axis, direction, containing_block_width);
    if padding {
        position += parent_layout.padding(start);
    }
    tree.nodes[child].layout.set_position(start, position);
}

fn justify_absolute_child(
    tree: &mut LayoutTree,
    parent: NodeId,
    child: NodeId,
    direction: Direction,
    main_axis: FlexDirection,
    containing_block_width: f32,
) {
    match tree.nodes[parent].style.justify_content() {
        Justify::FlexStart | Justify::SpaceBetween => {
            set_flex_start_layout_position(tree, parent, child, direction, main_axis, containing_block_width)
        }
        Justify::FlexEnd => {
            set_flex_end_layout_position(tree, parent, child, direction, main_axis, containing_block_width)
        }
        Justify::Center | Justify::SpaceAround | Justify::SpaceEvenly => {
            set_center_layout_position(tree, parent, child, direction, main_axis, containing_block_width)
        }
    }
}

fn align_absolute_child(
    tree: &mut LayoutTree,
    parent: NodeId,
    child: NodeId,
    direction: Direction,
    cross_axis: FlexDirection,
    containing_block_width: f32,
) {
    let parent_entry = &tree.nodes[parent];
    let mut item_align = resolve_child_alignment(parent_entry, &tree.nodes[child]);
    if parent_entry.style.flex_wrap() == Wrap::WrapReverse {
        item_align = match item_align {
            Align::FlexEnd => Align::FlexStart,
            Align::Center => Align::Center,
            _ => Align::FlexEnd,
        };
    }

    match item_align {
        Align::FlexEnd => {
            set_flex_end_layout_position(tree, parent, child, direction, cross_axis, containing_block_width)
        }
        Align::Center => {
            set_center_layout_position(tree, parent, child, direction, cross_axis, containing_block_width)
        }
        Align::Auto
        | Align::FlexStart
        | Align::Baseline
        | Align::SpaceAround
        | Align::SpaceBetween
        | Align::Stretch
        | Align::SpaceEvenly => {
            set_flex_start_layout_position(tree, parent, child, direction, cross_axis, containing_block_width)
        }
    }
}

/// Place `child` on `axis`: from its start inset, else its end inset, else
/// by the parent's justify (main axis) or align (cross axis) rules.
#[allow(clippy::too_many_arguments)]
fn position_absolute_child(
    tree: &mut LayoutTree,
    containing: NodeId,
    parent: NodeId,
    child: NodeId,
    direction: Direction,
    axis: FlexDirection,
    is_main_axis: bool,
    containing_block: (f32, f32),
) {
    let (containing_block_width, containing_block_height) = containing_block;
    let containing_block_size = if is_row(axis) { containing_block_width } else { containing_block_height };
    let start = flex_start_edge(axis);
    let flips = inline_start_edge(axis, direction) != start;

    let child_style = &tree.nodes[child].style;
    let containing_entry = &tree.nodes[containing];

    let inline_start_position = if child_style.is_inline_start_position_defined(axis, direction)
        && !child_style.is_inline_start_position_auto(axis, direction)
    {
        Some(
            child_style.compute_inline_start_position(axis, direction, containing_block_size)
                + containing_entry.style.compute_inline_start_border(axis, direction)
                + child_style.compute_inline_start_margin(axis, direction, containing_block_size),
        )
    } else if child_style.is_inline_end_position_defined(axis, direction)
        && !child_style.is_inline_end_position_auto(axis, direction)
    {
        Some(
            containing_entry.layout.measured_dimension(dimension(axis))
                - tree.nodes[child].layout.measured_dimension(dimension(axis))
                - containing_entry.style.compute_inline_end_border(axis, direction)
                - child_style.compute_inline_end_margin(axis, direction, containing_block_size)
                - child_style.compute_inline_end_position(axis, direction, containing_block_size),
        )
    } else {
        None
    };

    match inline_start_position {
        Some(position) => {
            let position = if flips {
                position_of_opposite_edge(tree, position, axis, containing, child)
            } else {
                position
            };
            tree.nodes[child].layout.set_position(start, position);
        }
        None if is_main_axis => {
            justify_absolute_child(tree, parent, child, direction, axis, containing_block_width)
        }
        None => align_absolute_child(tree, parent, child, direction, axis, containing_block_width),
    }
}

/// Size from both insets of an axis, when both are set and not auto.
fn size_from_insets(
    tree: &LayoutTree,
    containing: NodeId,
    child: NodeId,
    axis: FlexDirection,
    direction: Direction,
    containing_block_size: f32,
) -> Option<f32> {
    let style = &tree.nodes[child].style;
    let defined = style.is_flex_start_position_defined(axis, direction)
        && style.is_flex_end_position_defined(axis, direction)
        && !style.is_flex_start_position_auto(axis, direction)
        && !style.is_flex_end_position_auto(axis, direction);
    if !defined {
        return None;
    }
    let containing_entry = &tree.nodes[containing];
    Some(
        containing_entry.layout.measured_dimension(dimension(axis))
            - (containing_entry.style.compute_flex_start_border(axis, direction)
                + containing_entry.style.compute_flex_end_border(axis, direction))
            - (style.compute_flex_start_position(axis, direction, containing_block_size)
                + style.compute_flex_end_position(axis, direction, containing_block_size)),
    )
}

#[allow(clippy::too_many_arguments)]
fn layout_absolute_child(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    containing: NodeId,
    parent: NodeId,
    child: NodeId,
    containing_block: (f32, f32),
    width_mode: SizingMode,
    direction: Direction,
    depth: u32,
) -> Result<()> {
    let (containing_block_width, containing_block_height) = containing_block;
    let main_axis = resolve_direction(tree.nodes[parent].style.flex_direction(), direction);
    let cross_axis = resolve_cross_direction(main_axis, direction);
    let is_main_axis_row = is_row(main_axis);

    let entry = &tree.nodes[child];
    let margin_row = entry.style.compute_margin_for_axis(FlexDirection::Row, containing_block_width);
    let margin_column = entry.style.compute_margin_for_axis(FlexDirection::Column, containing_block_width);

    let mut child_width = UNDEFINED;
    if entry.has_definite_length(Dimension::Width, containing_block_width) {
        child_width =
            entry.resolved_dimension(Dimension::Width).resolve_or_undefined(containing_block_width) + margin_row;
    } else if let Some(width) =
        size_from_insets(tree, containing, child, FlexDirection::Row, direction, containing_block_width)
    {
        child_width = bound_axis(
            entry,
            FlexDirection::Row,
            direction,
            width,
            containing_block_width,
            containing_block_width,
        );
    }

    let mut child_height = UNDEFINED;
    if entry.has_definite_length(Dimension::Height, containing_block_height) {
        child_height =
            entry.resolved_dimension(Dimension::Height).resolve_or_undefined(containing_block_height) + margin_column;
    } else if let Some(height) =
        size_from_insets(tree, containing, child, FlexDirection::Column, direction, containing_block_height)
    {
        child_height = bound_axis(
            entry,
            FlexDirection::Column,
            direction,
            height,
            containing_block_height,
            containing_block_width,
        );
    }

    // Aspect ratio needs exactly one side as the anchor
    if let Some(ratio) = entry.style.aspect_ratio() {
        if child_width.is_nan() && is_defined(child_height) {
            child_width = margin_row + (child_height - margin_column) * ratio;
        } else if child_height.is_nan() && is_defined(child_width) {
            child_height = margin_column + (child_width - margin_row) / ratio;
        }
    }

    if child_width.is_nan() || child_height.is_nan() {
        let mut child_width_sizing_mode = if child_width.is_nan() {
            SizingMode::MaxContent
        } else {
            SizingMode::StretchFit
        };
        let child_height_sizing_mode = if child_height.is_nan() {
            SizingMode::MaxContent
        } else {
            SizingMode::StretchFit
        };

        // Let content wrap to the containing block in column layouts
        if !is_main_axis_row
            && child_width.is_nan()
            && width_mode != SizingMode::MaxContent
            && is_defined(containing_block_width)
            && containing_block_width > 0.0
        {
            child_width = containing_block_width;
            child_width_sizing_mode = SizingMode::FitContent;
        }

        calculate_layout_internal(
            tree,
            ctx,
            child,
            LayoutRequest {
                available_width: child_width,
                available_height: child_height,
                owner_direction: direction,
                width_sizing_mode: child_width_sizing_mode,
                height_sizing_mode: child_height_sizing_mode,
                owner_width: containing_block_width,
                owner_height: containing_block_height,
                perform_layout: false,
                reason: LayoutPassReason::AbsMeasureChild,
            },
            depth,
        )?;

        let entry = &tree.nodes[child];
        child_width = entry.layout.measured_dimension(Dimension::Width)
            + entry.style.compute_margin_for_axis(FlexDirection::Row, containing_block_width);
        child_height = entry.layout.measured_dimension(Dimension::Height)
            + entry.style.compute_margin_for_axis(FlexDirection::Column, containing_block_width);
    }

    calculate_layout_internal(
        tree,
        ctx,
        child,
        LayoutRequest {
            available_width: child_width,
            available_height: child_height,
            owner_direction: direction,
            width_sizing_mode: SizingMode::StretchFit,
            height_sizing_mode: SizingMode::StretchFit,
            owner_width: containing_block_width,
            owner_height: containing_block_height,
            perform_layout: true,
            reason: LayoutPassReason::AbsLayout,
        },
        depth,
    )?;

    position_absolute_child(tree, containing, parent, child, direction, main_axis, true, containing_block);
    position_absolute_child(tree, containing, parent, child, direction, cross_axis, false, containing_block);
    Ok(())
}

/// Lay out every absolute descendant of `current` whose containing block
/// is `containing`, descending through static children.
///
/// `offset` is the position of `current` relative to `containing`;
/// `available_inner` is the inner size of `containing`. Returns whether any
/// descendant received a new layout.
#[allow(clippy::too_many_arguments)]
pub(crate) fn layout_absolute_descendants(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    containing: NodeId,
    current: NodeId,
    width_sizing_mode: SizingMode,
    current_direction: Direction,
    depth: u32,
    offset: (f32, f32),
    available_inner: (f32, f32),
) -> Result<bool> {
    let (current_left_offset, current_top_offset) = offset;
    let mut has_new_layout = false;
    let children = tree.nodes[current].children.clone();

    for child in children {
        let child_entry = &tree.nodes[child];
        if child_entry.style.display() == Display::None {
            continue;
        }

        match child_entry.style.position_type() {
            PositionType::Absolute => {
                let containing_entry = &tree.nodes[containing];
                let containing_block = if tree.nodes[current].has_errata(Errata::ABSOLUTE_PERCENT_AGAINST_INNER_SIZE) {
                    available_inner
                } else {
                    (
                        containing_entry.layout.measured_dimension(Dimension::Width)
                            - containing_entry.style.compute_border_for_axis(FlexDirection::Row),
                        containing_entry.layout.measured_dimension(Dimension::Height)
                            - containing_entry.style.compute_border_for_axis(FlexDirection::Column),
                    )
                };

                layout_absolute_child(
                    tree,
                    ctx,
                    containing,
                    current,
                    child,
                    containing_block,
                    width_sizing_mode,
                    current_direction,
                    depth,
                )?;
                has_new_layout = has_new_layout || tree.nodes[child].has_new_layout;

                // Positions are on the parent's flex-start edges so far. With
                // insets they are relative to the containing block instead.
                let parent_main_axis = resolve_direction(tree.nodes[current].style.flex_direction(), current_direction);
                let parent_cross_axis = resolve_cross_direction(parent_main_axis, current_direction);
                for axis in [parent_main_axis, parent_cross_axis] {
                    if needs_trailing_position(axis) {
                        let style = &tree.nodes[child].style;
                        let insets_defined = if is_row(axis) {
                            style.horizontal_insets_defined()
                        } else {
                            style.vertical_insets_defined()
                        };
                        let relative_to = if insets_defined { containing } else { current };
                        set_child_trailing_position(tree, relative_to, child, axis);
                    }
                }

                let child_entry = &mut tree.nodes[child];
                let left = child_entry.layout.position(PhysicalEdge::Left);
                let top = child_entry.layout.position(PhysicalEdge::Top);
                if child_entry.style.horizontal_insets_defined() {
                    child_entry.layout.set_position(PhysicalEdge::Left, left - current_left_offset);
                }
                if child_entry.style.vertical_insets_defined() {
                    child_entry.layout.set_position(PhysicalEdge::Top, top - current_top_offset);
                }
            }
            PositionType::Static if !child_entry.always_forms_containing_block => {
                let child_direction = child_entry.resolve_direction(current_direction);
                let child_offset = (
                    current_left_offset + child_entry.layout.position(PhysicalEdge::Left),
                    current_top_offset + child_entry.layout.position(PhysicalEdge::Top),
                );

                has_new_layout = layout_absolute_descendants(
                    tree,
                    ctx,
                    containing,
                    child,
                    width_sizing_mode,
                    child_direction,
                    depth + 1,
                    child_offset,
                    available_inner,
                )? || has_new_layout;

                // Static children may not have been relaid out themselves
                if has_new_layout {
                    tree.nodes[child].has_new_layout = true;
                }
            }
            _ => {}
        }
    }

    Ok(has_new_layout)
}
