// crates/tessera-layout/src/flexible_length.rs
//
// Free space is resolved in two passes rather than the iterative CSS
// procedure. Layouts built against that behaviour depend on it.

use crate::align::resolve_child_alignment;
use crate::calculate::{calculate_layout_internal, FlexContainer};
use crate::constraints::{bound_axis, bound_axis_within_min_and_max, constrain_max_size_for_mode};
use crate::context::{LayoutContext, LayoutPassReason, LayoutRequest};
use crate::flex_direction::dimension;
use crate::flex_line::FlexLine;
use crate::LayoutTree;
use tessera_core::{is_defined, Align, Result, SizingMode};

/// First pass: find items whose min/max clamps their flexed size and take
/// them, with their factors, out of the shared pool.
fn distribute_free_space_first_pass(tree: &LayoutTree, container: &FlexContainer, line: &mut FlexLine) {
    let c = container;
    let mut delta_free_space = 0.0;

    for &child_id in &line.items_in_flow {
        let child = &tree.nodes[child_id];
        let flex_basis = child.layout.computed_flex_basis().unwrap_or(f32::NAN);
        let child_flex_basis = bound_axis_within_min_and_max(child, c.main_axis, flex_basis, c.main_axis_owner_size);
        let remaining_free_space = line.layout.remaining_free_space;

        if remaining_free_space < 0.0 {
            let flex_shrink_scaled_factor = -child.resolve_flex_shrink() * child_flex_basis;
            if is_defined(flex_shrink_scaled_factor) && flex_shrink_scaled_factor != 0.0 {
                let base_main_size = child_flex_basis
                    + remaining_free_space / line.layout.total_flex_shrink_scaled_factors * flex_shrink_scaled_factor;
                let bound_main_size = bound_axis(
                    child,
                    c.main_axis,
                    c.direction,
                    base_main_size,
                    c.available_inner_main_dim,
                    c.available_inner_width,
                );
                if is_defined(base_main_size) && is_defined(bound_main_size) && base_main_size != bound_main_size {
                    delta_free_space += bound_main_size - child_flex_basis;
                    line.layout.total_flex_shrink_scaled_factors -= -child.resolve_flex_shrink() * flex_basis;
                }
            }
        } else if is_defined(remaining_free_space) && remaining_free_space > 0.0 {
            let flex_grow_factor = child.resolve_flex_grow();
            if is_defined(flex_grow_factor) && flex_grow_factor != 0.0 {
                let base_main_size =
                    child_flex_basis + remaining_free_space / line.layout.total_flex_grow_factors * flex_grow_factor;
                let bound_main_size = bound_axis(
                    child,
                    c.main_axis,
                    c.direction,
                    base_main_size,
                    c.available_inner_main_dim,
                    c.available_inner_width,
                );
                if is_defined(base_main_size) && is_defined(bound_main_size) && base_main_size != bound_main_size {
                    delta_free_space += bound_main_size - child_flex_basis;
                    line.layout.total_flex_grow_factors -= flex_grow_factor;
                }
            }
        }
    }

    line.layout.remaining_free_space -= delta_free_space;
}

/// Second pass: size every item from the remaining pool, pick its
/// cross-axis sizing mode and lay it out. Returns the space handed out.
fn distribute_free_space_second_pass(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    container: &FlexContainer,
    line: &FlexLine,
) -> Result<f32> {
    let c = container;
    let mut delta_free_space = 0.0;
    let remaining_free_space = line.layout.remaining_free_space;
    let cross_dimension = dimension(c.cross_axis);

    for &child_id in &line.items_in_flow {
        let parent = &tree.nodes[c.node];
        let child = &tree.nodes[child_id];
        let flex_basis = child.layout.computed_flex_basis().unwrap_or(f32::NAN);
        let child_flex_basis = bound_axis_within_min_and_max(child, c.main_axis, flex_basis, c.main_axis_owner_size);
        let mut updated_main_size = child_flex_basis;

        if is_defined(remaining_free_space) && remaining_free_space < 0.0 {
            let flex_shrink_scaled_factor = -child.resolve_flex_shrink() * child_flex_basis;
            if flex_shrink_scaled_factor != 0.0 {
                let total = line.layout.total_flex_shrink_scaled_factors;
                let child_size = if is_defined(total) && total == 0.0 {
                    child_flex_basis + flex_shrink_scaled_factor
                } else {
                    child_flex_basis + (remaining_free_space / total) * flex_shrink_scaled_factor
                };
                updated_main_size = bound_axis(
                    child,
                    c.main_axis,
                    c.direction,
                    child_size,
                    c.available_inner_main_dim,
                    c.available_inner_width,
                );
            }
        } else if is_defined(remaining_free_space) && remaining_free_space > 0.0 {
            let flex_grow_factor = child.resolve_flex_grow();
            if !flex_grow_factor.is_nan() && flex_grow_factor != 0.0 {
                updated_main_size = bound_axis(
                    child,
                    c.main_axis,
                    c.direction,
                    child_flex_basis
                        + remaining_free_space / line.layout.total_flex_grow_factors * flex_grow_factor,
                    c.available_inner_main_dim,
                    c.available_inner_width,
                );
            }
        }

        delta_free_space += updated_main_size - child_flex_basis;

        let margin_main = child.style.compute_margin_for_axis(c.main_axis, c.available_inner_width);
        let margin_cross = child.style.compute_margin_for_axis(c.cross_axis, c.available_inner_width);

        let child_main_size = updated_main_size + margin_main;
        let stretches = resolve_child_alignment(parent, child) == Align::Stretch
            && !child.style.flex_start_margin_is_auto(c.cross_axis, c.direction)
            && !child.style.flex_end_margin_is_auto(c.cross_axis, c.direction);
        let has_definite_cross = child.has_definite_length(cross_dimension, c.available_inner_cross_dim);

        let (child_cross_sizing_mode, child_cross_size) = if let Some(ratio) = child.style.aspect_ratio() {
            let cross = if c.is_main_axis_row {
                (child_main_size - margin_main) / ratio
            } else {
                (child_main_size - margin_main) * ratio
            };
            (SizingMode::StretchFit, cross + margin_cross)
        } else if !c.available_inner_cross_dim.is_nan()
            && !has_definite_cross
            && c.sizing_mode_cross_dim == SizingMode::StretchFit
            && !(c.is_node_flex_wrap && c.main_axis_overflows)
            && stretches
        {
            (SizingMode::StretchFit, c.available_inner_cross_dim)
        } else if !has_definite_cross {
            let mode = if c.available_inner_cross_dim.is_nan() {
                SizingMode::MaxContent
            } else {
                SizingMode::FitContent
            };
            (mode, c.available_inner_cross_dim)
        } else {
            let size = child.resolved_dimension(cross_dimension).resolve_or_undefined(c.available_inner_cross_dim)
                + margin_cross;
            let is_loose_percentage_measurement = child.resolved_dimension(cross_dimension).is_percent()
                && c.sizing_mode_cross_dim != SizingMode::StretchFit;
            let mode = if size.is_nan() || is_loose_percentage_measurement {
                SizingMode::MaxContent
            } else {
                SizingMode::StretchFit
            };
            (mode, size)
        };

        let (child_main_sizing_mode, child_main_size) = constrain_max_size_for_mode(
            child,
            c.main_axis,
            c.available_inner_main_dim,
            c.available_inner_width,
            SizingMode::StretchFit,
            child_main_size,
        );
        let (child_cross_sizing_mode, child_cross_size) = constrain_max_size_for_mode(
            child,
            c.cross_axis,
            c.available_inner_cross_dim,
            c.available_inner_width,
            child_cross_sizing_mode,
            child_cross_size,
        );

        // Stretched items get their full layout from the cross-axis pass
        let requires_stretch_layout = !has_definite_cross && stretches;

        let (child_width, child_height, width_sizing_mode, height_sizing_mode) = if c.is_main_axis_row {
            (child_main_size, child_cross_size, child_main_sizing_mode, child_cross_sizing_mode)
        } else {
            (child_cross_size, child_main_size, child_cross_sizing_mode, child_main_sizing_mode)
        };

        let is_layout_pass = c.perform_layout && !requires_stretch_layout;
        let owner_direction = parent.layout.direction();
        calculate_layout_internal(
            tree,
            ctx,
            child_id,
            LayoutRequest {
                available_width: child_width,
                available_height: child_height,
                owner_direction,
                width_sizing_mode,
                height_sizing_mode,
                owner_width: c.available_inner_width,
                owner_height: c.available_inner_height,
                perform_layout: is_layout_pass,
                reason: if is_layout_pass {
                    LayoutPassReason::FlexLayout
                } else {
                    LayoutPassReason::FlexMeasure
                },
            },
            c.depth,
        )?;

        if tree.nodes[child_id].layout.had_overflow() {
            tree.nodes[c.node].layout.had_overflow = true;
        }
    }

    Ok(delta_free_space)
}

/// Resolve the main-axis size of every flexible item on `line`.
pub(crate) fn resolve_flexible_length(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    container: &FlexContainer,
    line: &mut FlexLine,
) -> Result<()> {
    let original_free_space = line.layout.remaining_free_space;
    distribute_free_space_first_pass(tree, container, line);
    let distributed_free_space = distribute_free_space_second_pass(tree, ctx, container, line)?;
    line.layout.remaining_free_space = original_free_space - distributed_free_space;
    Ok(())
}
