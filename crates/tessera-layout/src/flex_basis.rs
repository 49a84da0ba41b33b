// crates/tessera-layout/src/flex_basis.rs

use crate::align::resolve_child_alignment;
use crate::calculate::{calculate_layout_internal, set_position, zero_out_layout_recursively};
use crate::constraints::{constrain_max_size_for_mode, padding_and_border_for_axis};
use crate::context::{LayoutContext, LayoutPassReason, LayoutRequest};
use crate::flex_direction::{dimension, is_row, resolve_direction};
use crate::{LayoutTree, NodeId};
use tessera_core::{
    inexact_equals, is_defined, max_or_defined, Align, Dimension, Direction, Display, ExperimentalFeatures,
    FlexDirection, Overflow, PositionType, Result, SizingMode, UNDEFINED,
};

/// Available space and sizing modes of the container whose children are
/// being based.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BasisConstraints {
    pub width: f32,
    pub width_sizing_mode: SizingMode,
    pub height: f32,
    pub height_sizing_mode: SizingMode,
    pub direction: Direction,
    pub depth: u32,
}

/// Compute and store the flex basis of `child` inside `node`.
pub(crate) fn compute_flex_basis_for_child(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    node: NodeId,
    child_id: NodeId,
    constraints: BasisConstraints,
) -> Result<()> {
    let BasisConstraints { width, width_sizing_mode, height, height_sizing_mode, direction, depth } = constraints;
    // Children resolve percentages against the container's inner size
    let owner_width = width;
    let owner_height = height;

    let parent = &tree.nodes[node];
    let child = &tree.nodes[child_id];
    let main_axis = resolve_direction(parent.style.flex_direction(), direction);
    let is_main_axis_row = is_row(main_axis);
    let main_axis_size = if is_main_axis_row { width } else { height };
    let main_axis_owner_size = if is_main_axis_row { owner_width } else { owner_height };

    let resolved_flex_basis = child.process_flex_basis().resolve(main_axis_owner_size);
    let is_row_style_dim_defined = child.has_definite_length(Dimension::Width, owner_width);
    let is_column_style_dim_defined = child.has_definite_length(Dimension::Height, owner_height);

    match resolved_flex_basis {
        Some(basis) if is_defined(main_axis_size) => {
            let stale = child.config.is_experimental_feature_enabled(ExperimentalFeatures::WEB_FLEX_BASIS)
                && child.layout.computed_flex_basis_generation != ctx.generation;
            if child.layout.computed_flex_basis.is_none() || stale {
                let padding_and_border = padding_and_border_for_axis(child, main_axis, direction, owner_width);
                tree.nodes[child_id].layout.computed_flex_basis = Some(max_or_defined(basis, padding_and_border));
            }
        }
        _ if is_main_axis_row && is_row_style_dim_defined => {
            let padding_and_border = padding_and_border_for_axis(child, FlexDirection::Row, direction, owner_width);
            let width = child.resolved_dimension(Dimension::Width).resolve_or_undefined(owner_width);
            tree.nodes[child_id].layout.computed_flex_basis = Some(max_or_defined(width, padding_and_border));
        }
        _ if !is_main_axis_row && is_column_style_dim_defined => {
            let padding_and_border = padding_and_border_for_axis(child, FlexDirection::Column, direction, owner_width);
            let height = child.resolved_dimension(Dimension::Height).resolve_or_undefined(owner_height);
            tree.nodes[child_id].layout.computed_flex_basis = Some(max_or_defined(height, padding_and_border));
        }
        _ => {
            // Measure the hypothetical main size
            let mut child_width = UNDEFINED;
            let mut child_height = UNDEFINED;
            let mut child_width_sizing_mode = SizingMode::MaxContent;
            let mut child_height_sizing_mode = SizingMode::MaxContent;

            let margin_row = child.style.compute_margin_for_axis(FlexDirection::Row, owner_width);
            let margin_column = child.style.compute_margin_for_axis(FlexDirection::Column, owner_width);

            if is_row_style_dim_defined {
                child_width = child.resolved_dimension(Dimension::Width).resolve_or_undefined(owner_width) + margin_row;
                child_width_sizing_mode = SizingMode::StretchFit;
            }
            if is_column_style_dim_defined {
                child_height =
                    child.resolved_dimension(Dimension::Height).resolve_or_undefined(owner_height) + margin_column;
                child_height_sizing_mode = SizingMode::StretchFit;
            }

            // Scroll containers do not constrain children along the main axis
            let overflow = parent.style.overflow();
            if ((!is_main_axis_row && overflow == Overflow::Scroll) || overflow != Overflow::Scroll)
                && child_width.is_nan()
                && is_defined(width)
            {
                child_width = width;
                child_width_sizing_mode = SizingMode::FitContent;
            }
            if ((is_main_axis_row && overflow == Overflow::Scroll) || overflow != Overflow::Scroll)
                && child_height.is_nan()
                && is_defined(height)
            {
                child_height = height;
                child_height_sizing_mode = SizingMode::FitContent;
            }

            let aspect_ratio = child.style.aspect_ratio();
            if let Some(ratio) = aspect_ratio {
                if !is_main_axis_row && child_width_sizing_mode == SizingMode::StretchFit {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                    child_height_sizing_mode = SizingMode::StretchFit;
                } else if is_main_axis_row && child_height_sizing_mode == SizingMode::StretchFit {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                    child_width_sizing_mode = SizingMode::StretchFit;
                }
            }

            // Stretched items take the container's exact cross size
            let stretches = resolve_child_alignment(parent, child) == Align::Stretch;
            let has_exact_width = is_defined(width) && width_sizing_mode == SizingMode::StretchFit;
            let child_width_stretch = stretches && child_width_sizing_mode != SizingMode::StretchFit;
            if !is_main_axis_row && !is_row_style_dim_defined && has_exact_width && child_width_stretch {
                child_width = width;
                child_width_sizing_mode = SizingMode::StretchFit;
                if let Some(ratio) = aspect_ratio {
                    child_height = (child_width - margin_row) / ratio;
                    child_height_sizing_mode = SizingMode::StretchFit;
                }
            }

            let has_exact_height = is_defined(height) && height_sizing_mode == SizingMode::StretchFit;
            let child_height_stretch = stretches && child_height_sizing_mode != SizingMode::StretchFit;
            if is_main_axis_row && !is_column_style_dim_defined && has_exact_height && child_height_stretch {
                child_height = height;
                child_height_sizing_mode = SizingMode::StretchFit;
                if let Some(ratio) = aspect_ratio {
                    child_width = (child_height - margin_column) * ratio;
                    child_width_sizing_mode = SizingMode::StretchFit;
                }
            }

            let (child_width_sizing_mode, child_width) = constrain_max_size_for_mode(
                child,
                FlexDirection::Row,
                owner_width,
                owner_width,
                child_width_sizing_mode,
                child_width,
            );
            let (child_height_sizing_mode, child_height) = constrain_max_size_for_mode(
                child,
                FlexDirection::Column,
                owner_height,
                owner_width,
                child_height_sizing_mode,
                child_height,
            );

            calculate_layout_internal(
                tree,
                ctx,
                child_id,
                LayoutRequest {
                    available_width: child_width,
                    available_height: child_height,
                    owner_direction: direction,
                    width_sizing_mode: child_width_sizing_mode,
                    height_sizing_mode: child_height_sizing_mode,
                    owner_width,
                    owner_height,
                    perform_layout: false,
                    reason: LayoutPassReason::MeasureChild,
                },
                depth,
            )?;

            let child = &tree.nodes[child_id];
            let basis = max_or_defined(
                child.layout.measured_dimension(dimension(main_axis)),
                padding_and_border_for_axis(child, main_axis, direction, owner_width),
            );
            tree.nodes[child_id].layout.computed_flex_basis = Some(basis);
        }
    }

    tree.nodes[child_id].layout.computed_flex_basis_generation = ctx.generation;
    Ok(())
}

/// Compute the flex basis of every in-flow child of `node` and return the
/// sum of bases plus main-axis margins.
pub(crate) fn compute_flex_basis_for_children(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    node: NodeId,
    constraints: BasisConstraints,
    perform_layout: bool,
) -> Result<f32> {
    let direction = constraints.direction;
    let main_axis = resolve_direction(tree.nodes[node].style.flex_direction(), direction);
    let sizing_mode_main_dim = if is_row(main_axis) {
        constraints.width_sizing_mode
    } else {
        constraints.height_sizing_mode
    };
    let children = tree.nodes[node].children.clone();

    // A lone child that can both grow and shrink fills the container
    // exactly, so measuring it is unnecessary.
    let mut single_flex_child = None;
    if sizing_mode_main_dim == SizingMode::StretchFit {
        for &child_id in &children {
            let child = &tree.nodes[child_id];
            if child.is_flexible() {
                if single_flex_child.is_some()
                    || inexact_equals(child.resolve_flex_grow(), 0.0)
                    || inexact_equals(child.resolve_flex_shrink(), 0.0)
                {
                    single_flex_child = None;
                    break;
                }
                single_flex_child = Some(child_id);
            }
        }
    }

    let mut total_outer_flex_basis = 0.0;
    for child_id in children {
        tree.nodes[child_id].resolve_dimension();
        if tree.nodes[child_id].style.display() == Display::None {
            zero_out_layout_recursively(tree, child_id);
            tree.nodes[child_id].has_new_layout = true;
            tree.set_dirty(child_id, false);
            continue;
        }

        if perform_layout {
            let child_direction = tree.nodes[child_id].resolve_direction(direction);
            set_position(tree, child_id, child_direction, constraints.width, constraints.height);
        }

        if tree.nodes[child_id].style.position_type() == PositionType::Absolute {
            continue;
        }

        if Some(child_id) == single_flex_child {
            let layout = &mut tree.nodes[child_id].layout;
            layout.computed_flex_basis_generation = ctx.generation;
            layout.computed_flex_basis = Some(0.0);
        } else {
            compute_flex_basis_for_child(tree, ctx, node, child_id, constraints)?;
        }

        let child = &tree.nodes[child_id];
        total_outer_flex_basis += child.layout.computed_flex_basis().unwrap_or(f32::NAN)
            + child.style.compute_margin_for_axis(main_axis, constraints.width);
    }
    Ok(total_outer_flex_basis)
}
