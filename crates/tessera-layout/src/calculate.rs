// crates/tessera-layout/src/calculate.rs
//
// Memoized layout driver and the flex algorithm proper. Every size passed
// around here is an outer size (margin box) unless it is called "inner".

use crate::absolute::layout_absolute_descendants;
use crate::align::{align_line_cross_axis, align_lines};
use crate::baseline::is_baseline_layout;
use crate::cache::{can_use_cached_measurement, matches_request, AxisRequest};
use crate::constraints::{
    bound_axis, bound_axis_within_min_and_max, calculate_available_inner_dimension, padding_and_border_for_axis,
};
use crate::context::{LayoutContext, LayoutPassReason, LayoutRequest};
use crate::flex_basis::{compute_flex_basis_for_children, BasisConstraints};
use crate::flex_direction::{
    dimension, flex_start_edge, inline_end_edge, inline_start_edge, is_row, resolve_cross_direction,
    resolve_direction,
};
use crate::flex_line::calculate_flex_line;
use crate::flexible_length::resolve_flexible_length;
use crate::justify::justify_main_axis;
use crate::results::{CachedMeasurement, LayoutResults};
use crate::rounding::round_layout_results_to_pixel_grid;
use crate::trailing::{needs_trailing_position, set_child_trailing_position};
use crate::{LayoutTree, NodeId};
use tessera_core::{
    is_defined, max_or_defined, min_or_defined, Dimension, Direction, Display, Errata, FlexDirection, Overflow,
    PhysicalEdge, PositionType, Result, SizingMode, TesseraError, Wrap, UNDEFINED,
};
use tracing::{debug, trace};

/// Geometry of a container while its children are being laid out.
///
/// `available_inner_main_dim` and `sizing_mode_main_dim` may be adjusted
/// per line, so each line works on its own copy.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlexContainer {
    pub node: NodeId,
    pub direction: Direction,
    pub main_axis: FlexDirection,
    pub cross_axis: FlexDirection,
    pub is_main_axis_row: bool,
    pub is_node_flex_wrap: bool,
    pub owner_width: f32,
    pub main_axis_owner_size: f32,
    pub cross_axis_owner_size: f32,
    pub available_inner_width: f32,
    pub available_inner_height: f32,
    pub available_inner_main_dim: f32,
    pub available_inner_cross_dim: f32,
    pub sizing_mode_main_dim: SizingMode,
    pub sizing_mode_cross_dim: SizingMode,
    pub padding_and_border_axis_main: f32,
    pub padding_and_border_axis_cross: f32,
    pub leading_padding_and_border_cross: f32,
    pub main_axis_overflows: bool,
    pub perform_layout: bool,
    pub depth: u32,
}

impl LayoutTree {
    /// Lay out the tree rooted at `root` inside the given owner size.
    ///
    /// Pass `UNDEFINED` for an owner dimension to size the root to its
    /// content along that axis. Returns whether anything was recomputed;
    /// unchanged trees are answered from the layout cache.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        owner_width: f32,
        owner_height: f32,
        owner_direction: Direction,
    ) -> Result<bool> {
        self.node(root)?;
        self.generation = self.generation.wrapping_add(1);
        let mut ctx = LayoutContext::new(self.generation);

        let entry = &mut self.nodes[root];
        entry.resolve_dimension();

        let (width, width_sizing_mode) = if entry.has_definite_length(Dimension::Width, owner_width) {
            (
                entry.resolved_dimension(Dimension::Width).resolve_or_undefined(owner_width)
                    + entry.style.compute_margin_for_axis(FlexDirection::Row, owner_width),
                SizingMode::StretchFit,
            )
        } else if is_defined(entry.style.resolved_max_dimension(Dimension::Width, owner_width)) {
            (
                entry.style.resolved_max_dimension(Dimension::Width, owner_width),
                SizingMode::FitContent,
            )
        } else if is_defined(owner_width) {
            (owner_width, SizingMode::StretchFit)
        } else {
            (owner_width, SizingMode::MaxContent)
        };

        let (height, height_sizing_mode) = if entry.has_definite_length(Dimension::Height, owner_height) {
            (
                entry.resolved_dimension(Dimension::Height).resolve_or_undefined(owner_height)
                    + entry.style.compute_margin_for_axis(FlexDirection::Column, owner_width),
                SizingMode::StretchFit,
            )
        } else if is_defined(entry.style.resolved_max_dimension(Dimension::Height, owner_height)) {
            (
                entry.style.resolved_max_dimension(Dimension::Height, owner_height),
                SizingMode::FitContent,
            )
        } else if is_defined(owner_height) {
            (owner_height, SizingMode::StretchFit)
        } else {
            (owner_height, SizingMode::MaxContent)
        };

        debug!(
            "Layout pass {} for root {:?}: {}x{} ({} / {})",
            ctx.generation, root, width, height, width_sizing_mode, height_sizing_mode
        );

        let changed = calculate_layout_internal(
            self,
            &mut ctx,
            root,
            LayoutRequest {
                available_width: width,
                available_height: height,
                owner_direction,
                width_sizing_mode,
                height_sizing_mode,
                owner_width,
                owner_height,
                perform_layout: true,
                reason: LayoutPassReason::Initial,
            },
            0,
        )?;

        if changed {
            let direction = self.nodes[root].layout.direction();
            set_position(self, root, direction, owner_width, owner_height);
            round_layout_results_to_pixel_grid(self, root, 0.0, 0.0);
        }

        let stats = ctx.stats;
        debug!(
            "Layout pass {} done (changed: {}): {} layouts, {} measures, {} cached layouts, {} cached measures, {} measure callbacks",
            ctx.generation,
            changed,
            stats.layouts,
            stats.measures,
            stats.cached_layouts,
            stats.cached_measures,
            stats.measure_callbacks
        );
        self.last_stats = stats;
        Ok(changed)
    }
}

/// Earlier result of this node that answers `request`, if any.
fn find_cached_result(tree: &LayoutTree, node: NodeId, request: &LayoutRequest) -> Option<CachedMeasurement> {
    let entry = &tree.nodes[node];
    let layout = &entry.layout;
    let width = AxisRequest {
        mode: request.width_sizing_mode,
        available: request.available_width,
        margin: entry.style.compute_margin_for_axis(FlexDirection::Row, request.owner_width),
    };
    let height = AxisRequest {
        mode: request.height_sizing_mode,
        available: request.available_height,
        margin: entry.style.compute_margin_for_axis(FlexDirection::Column, request.owner_width),
    };
    let recent = &layout.cached_measurements[..layout.next_cached_measurements_index];

    if entry.measure.is_some() {
        // Measured leaves can reuse any compatible size, layout or not
        let scale = entry.config.point_scale_factor();
        if can_use_cached_measurement(width, height, &layout.cached_layout, scale) {
            return Some(layout.cached_layout);
        }
        recent
            .iter()
            .find(|cached| can_use_cached_measurement(width, height, cached, scale))
            .copied()
    } else if request.perform_layout {
        matches_request(width, height, &layout.cached_layout).then_some(layout.cached_layout)
    } else {
        recent.iter().find(|cached| matches_request(width, height, cached)).copied()
    }
}

/// Memoized entry point for sizing (and, with `perform_layout`, placing
/// the children of) one node. Returns whether the node was recomputed.
pub(crate) fn calculate_layout_internal(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    node: NodeId,
    request: LayoutRequest,
    depth: u32,
) -> Result<bool> {
    let depth = depth + 1;

    let need_to_visit_node = {
        let entry = &mut tree.nodes[node];
        entry.config.mark_used_in_layout();
        let layout = &entry.layout;
        let need = (entry.is_dirty && layout.generation_count != ctx.generation)
            || layout.config_version != entry.config.version()
            || layout.last_owner_direction != request.owner_direction;
        if need {
            entry.layout.invalidate_cache();
        }
        need
    };

    let cached_result = find_cached_result(tree, node, &request);

    match cached_result {
        Some(cached) if !need_to_visit_node => {
            let layout = &mut tree.nodes[node].layout;
            layout.set_measured_dimension(Dimension::Width, cached.computed_width);
            layout.set_measured_dimension(Dimension::Height, cached.computed_height);
            if request.perform_layout {
                ctx.stats.cached_layouts += 1;
            } else {
                ctx.stats.cached_measures += 1;
            }
            trace!(
                "{:?} cache hit ({:?}, depth {}): {}x{}",
                node,
                request.reason,
                depth,
                cached.computed_width,
                cached.computed_height
            );
        }
        _ => {
            trace!(
                "{:?} {} ({:?}, depth {}): available {}x{} ({} / {})",
                node,
                if request.perform_layout { "layout" } else { "measure" },
                request.reason,
                depth,
                request.available_width,
                request.available_height,
                request.width_sizing_mode,
                request.height_sizing_mode
            );
            calculate_layout_impl(tree, ctx, node, &request, depth)?;

            let entry = &mut tree.nodes[node];
            entry.layout.last_owner_direction = request.owner_direction;
            entry.layout.config_version = entry.config.version();

            if cached_result.is_none() {
                ctx.stats.max_measure_cache =
                    ctx.stats.max_measure_cache.max(entry.layout.next_cached_measurements_index + 1);

                let measurement = CachedMeasurement {
                    available_width: request.available_width,
                    available_height: request.available_height,
                    width_sizing_mode: request.width_sizing_mode,
                    height_sizing_mode: request.height_sizing_mode,
                    computed_width: entry.layout.measured_dimension(Dimension::Width),
                    computed_height: entry.layout.measured_dimension(Dimension::Height),
                };
                if request.perform_layout {
                    entry.layout.cached_layout = measurement;
                } else {
                    *entry.layout.next_measurement_slot() = measurement;
                }
            }
        }
    }

    let recomputed = need_to_visit_node || cached_result.is_none();

    if request.perform_layout {
        let entry = &mut tree.nodes[node];
        let width = entry.layout.measured_dimension(Dimension::Width);
        let height = entry.layout.measured_dimension(Dimension::Height);
        entry.layout.set_dimension(Dimension::Width, width);
        entry.layout.set_dimension(Dimension::Height, height);
        // A cached root keeps the flag its host cleared
        if recomputed || depth > 1 {
            entry.has_new_layout = true;
        }
        tree.set_dirty(node, false);
    }

    tree.nodes[node].layout.generation_count = ctx.generation;
    Ok(recomputed)
}

fn invariant(holds: bool, message: &str) -> Result<()> {
    if holds {
        Ok(())
    } else {
        Err(TesseraError::InvariantViolation(message.to_string()))
    }
}

/// Resolve direction and box edges into the layout, then size the node.
fn calculate_layout_impl(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    node: NodeId,
    request: &LayoutRequest,
    depth: u32,
) -> Result<()> {
    invariant(
        is_defined(request.available_width) || request.width_sizing_mode == SizingMode::MaxContent,
        "available width is indefinite so width sizing mode must be max-content",
    )?;
    invariant(
        is_defined(request.available_height) || request.height_sizing_mode == SizingMode::MaxContent,
        "available height is indefinite so height sizing mode must be max-content",
    )?;

    if request.perform_layout {
        ctx.stats.layouts += 1;
    } else {
        ctx.stats.measures += 1;
    }

    let owner_width = request.owner_width;
    let entry = &mut tree.nodes[node];
    let direction = entry.resolve_direction(request.owner_direction);
    let flex_row_direction = resolve_direction(FlexDirection::Row, direction);
    let flex_column_direction = resolve_direction(FlexDirection::Column, direction);
    let (start_edge, end_edge) = if direction == Direction::Rtl {
        (PhysicalEdge::Right, PhysicalEdge::Left)
    } else {
        (PhysicalEdge::Left, PhysicalEdge::Right)
    };

    let style = &entry.style;
    let margins = [
        (start_edge, style.compute_inline_start_margin(flex_row_direction, direction, owner_width)),
        (end_edge, style.compute_inline_end_margin(flex_row_direction, direction, owner_width)),
        (PhysicalEdge::Top, style.compute_inline_start_margin(flex_column_direction, direction, owner_width)),
        (PhysicalEdge::Bottom, style.compute_inline_end_margin(flex_column_direction, direction, owner_width)),
    ];
    let borders = [
        (start_edge, style.compute_inline_start_border(flex_row_direction, direction)),
        (end_edge, style.compute_inline_end_border(flex_row_direction, direction)),
        (PhysicalEdge::Top, style.compute_inline_start_border(flex_column_direction, direction)),
        (PhysicalEdge::Bottom, style.compute_inline_end_border(flex_column_direction, direction)),
    ];
    let paddings = [
        (start_edge, style.compute_inline_start_padding(flex_row_direction, direction, owner_width)),
        (end_edge, style.compute_inline_end_padding(flex_row_direction, direction, owner_width)),
        (PhysicalEdge::Top, style.compute_inline_start_padding(flex_column_direction, direction, owner_width)),
        (PhysicalEdge::Bottom, style.compute_inline_end_padding(flex_column_direction, direction, owner_width)),
    ];
    let margin_axis_row = style.compute_margin_for_axis(FlexDirection::Row, owner_width);
    let margin_axis_column = style.compute_margin_for_axis(FlexDirection::Column, owner_width);

    entry.layout.direction = direction;
    for (edge, value) in margins {
        entry.layout.set_margin(edge, value);
    }
    for (edge, value) in borders {
        entry.layout.set_border(edge, value);
    }
    for (edge, value) in paddings {
        entry.layout.set_padding(edge, value);
    }

    let available_width = request.available_width - margin_axis_row;
    let available_height = request.available_height - margin_axis_column;

    if entry.measure.is_some() {
        return measure_node_with_measure_func(tree, ctx, node, direction, available_width, available_height, request);
    }

    if entry.children.is_empty() {
        measure_node_without_children(tree, node, direction, available_width, available_height, request);
        return Ok(());
    }

    // Nodes whose size is fully determined by the request skip their children
    if !request.perform_layout
        && measure_node_with_fixed_size(tree, node, direction, available_width, available_height, request)
    {
        return Ok(());
    }

    layout_flex_container(tree, ctx, node, direction, request, depth)
}

/// Steps 1 to 11 of the flex algorithm for a node with children.
fn layout_flex_container(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    node: NodeId,
    direction: Direction,
    request: &LayoutRequest,
    depth: u32,
) -> Result<()> {
    let owner_width = request.owner_width;
    let owner_height = request.owner_height;
    let perform_layout = request.perform_layout;

    // STEP 1: axes and box edges
    let entry = &mut tree.nodes[node];
    entry.layout.had_overflow = false;

    let main_axis = resolve_direction(entry.style.flex_direction(), direction);
    let cross_axis = resolve_cross_direction(main_axis, direction);
    let is_main_axis_row = is_row(main_axis);
    let is_node_flex_wrap = entry.style.flex_wrap() != Wrap::NoWrap;

    let main_axis_owner_size = if is_main_axis_row { owner_width } else { owner_height };
    let cross_axis_owner_size = if is_main_axis_row { owner_height } else { owner_width };

    let padding_and_border_axis_main = padding_and_border_for_axis(entry, main_axis, direction, owner_width);
    let padding_and_border_axis_cross = padding_and_border_for_axis(entry, cross_axis, direction, owner_width);
    let leading_padding_and_border_cross =
        entry.style.compute_flex_start_padding_and_border(cross_axis, direction, owner_width);

    let mut sizing_mode_main_dim = if is_main_axis_row {
        request.width_sizing_mode
    } else {
        request.height_sizing_mode
    };
    let sizing_mode_cross_dim = if is_main_axis_row {
        request.height_sizing_mode
    } else {
        request.width_sizing_mode
    };

    let (padding_and_border_axis_row, padding_and_border_axis_column) = if is_main_axis_row {
        (padding_and_border_axis_main, padding_and_border_axis_cross)
    } else {
        (padding_and_border_axis_cross, padding_and_border_axis_main)
    };

    // STEP 2: available space for children
    let margin_axis_row = entry.style.compute_margin_for_axis(FlexDirection::Row, owner_width);
    let margin_axis_column = entry.style.compute_margin_for_axis(FlexDirection::Column, owner_width);
    let available_inner_width = calculate_available_inner_dimension(
        entry,
        Dimension::Width,
        request.available_width - margin_axis_row,
        padding_and_border_axis_row,
        owner_width,
    );
    let available_inner_height = calculate_available_inner_dimension(
        entry,
        Dimension::Height,
        request.available_height - margin_axis_column,
        padding_and_border_axis_column,
        owner_height,
    );
    let mut available_inner_main_dim = if is_main_axis_row { available_inner_width } else { available_inner_height };
    let available_inner_cross_dim = if is_main_axis_row { available_inner_height } else { available_inner_width };

    // STEP 3: flex basis of every child
    let mut total_main_dim = compute_flex_basis_for_children(
        tree,
        ctx,
        node,
        BasisConstraints {
            width: available_inner_width,
            width_sizing_mode: request.width_sizing_mode,
            height: available_inner_height,
            height_sizing_mode: request.height_sizing_mode,
            direction,
            depth,
        },
        perform_layout,
    )?;

    let entry = &tree.nodes[node];
    let child_count = entry.children.len();
    if child_count > 1 {
        total_main_dim +=
            entry.style.compute_gap_for_axis(main_axis, available_inner_main_dim) * (child_count - 1) as f32;
    }

    let main_axis_overflows = sizing_mode_main_dim != SizingMode::MaxContent && total_main_dim > available_inner_main_dim;
    if is_node_flex_wrap && main_axis_overflows && sizing_mode_main_dim == SizingMode::FitContent {
        sizing_mode_main_dim = SizingMode::StretchFit;
    }

    let cross_axis_gap = entry.style.compute_gap_for_axis(cross_axis, available_inner_cross_dim);
    let min_inner_width =
        entry.style.resolved_min_dimension(Dimension::Width, owner_width) - padding_and_border_axis_row;
    let max_inner_width =
        entry.style.resolved_max_dimension(Dimension::Width, owner_width) - padding_and_border_axis_row;
    let min_inner_height =
        entry.style.resolved_min_dimension(Dimension::Height, owner_height) - padding_and_border_axis_column;
    let max_inner_height =
        entry.style.resolved_max_dimension(Dimension::Height, owner_height) - padding_and_border_axis_column;
    let (min_inner_main_dim, max_inner_main_dim) = if is_main_axis_row {
        (min_inner_width, max_inner_width)
    } else {
        (min_inner_height, max_inner_height)
    };
    let use_legacy_stretch_behaviour = entry.has_errata(Errata::STRETCH_FLEX_BASIS);
    let node_flex_grow = entry.resolve_flex_grow();

    // STEP 4: collect lines
    let mut start_of_line_index = 0;
    let mut line_count = 0;
    let mut total_line_cross_dim = 0.0;
    let mut max_line_main_dim: f32 = 0.0;

    while start_of_line_index < child_count {
        let mut line = calculate_flex_line(
            tree,
            node,
            request.owner_direction,
            main_axis_owner_size,
            available_inner_width,
            available_inner_main_dim,
            start_of_line_index,
            line_count,
        );

        // Measuring against an exact cross size needs no flexing
        let can_skip_flex = !perform_layout && sizing_mode_cross_dim == SizingMode::StretchFit;

        // STEP 5: resolve flexible lengths
        let mut size_based_on_content = false;
        if sizing_mode_main_dim != SizingMode::StretchFit {
            if is_defined(min_inner_main_dim) && line.size_consumed < min_inner_main_dim {
                available_inner_main_dim = min_inner_main_dim;
            } else if is_defined(max_inner_main_dim) && line.size_consumed > max_inner_main_dim {
                available_inner_main_dim = max_inner_main_dim;
            } else {
                if !use_legacy_stretch_behaviour
                    && (line.layout.total_flex_grow_factors == 0.0 || node_flex_grow == 0.0)
                {
                    // Nothing can grow, so the container wraps its content
                    available_inner_main_dim = line.size_consumed;
                }
                size_based_on_content = !use_legacy_stretch_behaviour;
            }
        }

        if !size_based_on_content && is_defined(available_inner_main_dim) {
            line.layout.remaining_free_space = available_inner_main_dim - line.size_consumed;
        } else if line.size_consumed < 0.0 {
            // Negative margins can leave the container with space to fill
            line.layout.remaining_free_space = -line.size_consumed;
        }

        let container = FlexContainer {
            node,
            direction,
            main_axis,
            cross_axis,
            is_main_axis_row,
            is_node_flex_wrap,
            owner_width,
            main_axis_owner_size,
            cross_axis_owner_size,
            available_inner_width,
            available_inner_height,
            available_inner_main_dim,
            available_inner_cross_dim,
            sizing_mode_main_dim,
            sizing_mode_cross_dim,
            padding_and_border_axis_main,
            padding_and_border_axis_cross,
            leading_padding_and_border_cross,
            main_axis_overflows,
            perform_layout,
            depth,
        };

        if !can_skip_flex {
            resolve_flexible_length(tree, ctx, &container, &mut line)?;
        }

        if line.layout.remaining_free_space < 0.0 {
            tree.nodes[node].layout.had_overflow = true;
        }

        // STEP 6: main-axis justification and cross-axis size of the line
        justify_main_axis(tree, &container, &mut line)?;

        let entry = &tree.nodes[node];
        let container_cross_axis = if sizing_mode_cross_dim == SizingMode::StretchFit {
            available_inner_cross_dim
        } else {
            bound_axis(
                entry,
                cross_axis,
                direction,
                line.layout.cross_dim + padding_and_border_axis_cross,
                cross_axis_owner_size,
                owner_width,
            ) - padding_and_border_axis_cross
        };

        if !is_node_flex_wrap {
            if sizing_mode_cross_dim == SizingMode::StretchFit {
                line.layout.cross_dim = available_inner_cross_dim;
            }
            line.layout.cross_dim = bound_axis(
                entry,
                cross_axis,
                direction,
                line.layout.cross_dim + padding_and_border_axis_cross,
                cross_axis_owner_size,
                owner_width,
            ) - padding_and_border_axis_cross;
        }

        // STEP 7: cross-axis alignment within the line
        if perform_layout {
            align_line_cross_axis(tree, ctx, &container, &line, container_cross_axis, total_line_cross_dim)?;
        }

        let applied_cross_gap = if line_count != 0 { cross_axis_gap } else { 0.0 };
        total_line_cross_dim += line.layout.cross_dim + applied_cross_gap;
        max_line_main_dim = max_or_defined(max_line_main_dim, line.layout.main_dim);

        line_count += 1;
        start_of_line_index = line.end_index;
    }

    let container = FlexContainer {
        node,
        direction,
        main_axis,
        cross_axis,
        is_main_axis_row,
        is_node_flex_wrap,
        owner_width,
        main_axis_owner_size,
        cross_axis_owner_size,
        available_inner_width,
        available_inner_height,
        available_inner_main_dim,
        available_inner_cross_dim,
        sizing_mode_main_dim,
        sizing_mode_cross_dim,
        padding_and_border_axis_main,
        padding_and_border_axis_cross,
        leading_padding_and_border_cross,
        main_axis_overflows,
        perform_layout,
        depth,
    };

    // STEP 8: multi-line content alignment
    if perform_layout && (is_node_flex_wrap || is_baseline_layout(tree, node)) {
        align_lines(tree, ctx, &container, line_count, total_line_cross_dim, cross_axis_gap)?;
    }

    // STEP 9: final dimensions
    let entry = &mut tree.nodes[node];
    let overflow = entry.style.overflow();
    let measured_width = bound_axis(
        entry,
        FlexDirection::Row,
        direction,
        request.available_width - margin_axis_row,
        owner_width,
        owner_width,
    );
    let measured_height = bound_axis(
        entry,
        FlexDirection::Column,
        direction,
        request.available_height - margin_axis_column,
        owner_height,
        owner_width,
    );
    entry.layout.set_measured_dimension(Dimension::Width, measured_width);
    entry.layout.set_measured_dimension(Dimension::Height, measured_height);

    let main_size = if sizing_mode_main_dim == SizingMode::MaxContent
        || (overflow != Overflow::Scroll && sizing_mode_main_dim == SizingMode::FitContent)
    {
        Some(bound_axis(entry, main_axis, direction, max_line_main_dim, main_axis_owner_size, owner_width))
    } else if sizing_mode_main_dim == SizingMode::FitContent && overflow == Overflow::Scroll {
        Some(max_or_defined(
            min_or_defined(
                available_inner_main_dim + padding_and_border_axis_main,
                bound_axis_within_min_and_max(entry, main_axis, max_line_main_dim, main_axis_owner_size),
            ),
            padding_and_border_axis_main,
        ))
    } else {
        None
    };
    if let Some(size) = main_size {
        entry.layout.set_measured_dimension(dimension(main_axis), size);
    }

    let cross_size = if sizing_mode_cross_dim == SizingMode::MaxContent
        || (overflow != Overflow::Scroll && sizing_mode_cross_dim == SizingMode::FitContent)
    {
        Some(bound_axis(
            entry,
            cross_axis,
            direction,
            total_line_cross_dim + padding_and_border_axis_cross,
            cross_axis_owner_size,
            owner_width,
        ))
    } else if sizing_mode_cross_dim == SizingMode::FitContent && overflow == Overflow::Scroll {
        Some(max_or_defined(
            min_or_defined(
                available_inner_cross_dim + padding_and_border_axis_cross,
                bound_axis_within_min_and_max(
                    entry,
                    cross_axis,
                    total_line_cross_dim + padding_and_border_axis_cross,
                    cross_axis_owner_size,
                ),
            ),
            padding_and_border_axis_cross,
        ))
    } else {
        None
    };
    if let Some(size) = cross_size {
        entry.layout.set_measured_dimension(dimension(cross_axis), size);
    }

    if !perform_layout {
        return Ok(());
    }

    let children = tree.nodes[node].children.clone();

    // Lines were stacked in normal order; mirror them for wrap-reverse
    if tree.nodes[node].style.flex_wrap() == Wrap::WrapReverse {
        let cross_dimension = dimension(cross_axis);
        let cross_edge = flex_start_edge(cross_axis);
        let container_cross = tree.nodes[node].layout.measured_dimension(cross_dimension);
        for &child_id in &children {
            let child = &mut tree.nodes[child_id];
            if child.style.position_type() == PositionType::Absolute {
                continue;
            }
            let position = container_cross
                - child.layout.position(cross_edge)
                - child.layout.measured_dimension(cross_dimension);
            child.layout.set_position(cross_edge, position);
        }
    }

    // STEP 10: trailing positions on reversed axes
    let needs_main_trailing_pos = needs_trailing_position(main_axis);
    let needs_cross_trailing_pos = needs_trailing_position(cross_axis);
    if needs_main_trailing_pos || needs_cross_trailing_pos {
        for &child_id in &children {
            let style = &tree.nodes[child_id].style;
            // Absolute children are placed by their containing block
            if style.display() == Display::None || style.position_type() == PositionType::Absolute {
                continue;
            }
            if needs_main_trailing_pos {
                set_child_trailing_position(tree, node, child_id, main_axis);
            }
            if needs_cross_trailing_pos {
                set_child_trailing_position(tree, node, child_id, cross_axis);
            }
        }
    }

    // STEP 11: absolute descendants of this containing block
    let entry = &tree.nodes[node];
    if entry.style.position_type() != PositionType::Static || entry.always_forms_containing_block || depth == 1 {
        layout_absolute_descendants(
            tree,
            ctx,
            node,
            node,
            if is_main_axis_row { sizing_mode_main_dim } else { sizing_mode_cross_dim },
            direction,
            depth,
            (0.0, 0.0),
            (available_inner_width, available_inner_height),
        )?;
    }

    Ok(())
}

/// Leaf with a measure callback. The callback sees the content box.
fn measure_node_with_measure_func(
    tree: &mut LayoutTree,
    ctx: &mut LayoutContext,
    node: NodeId,
    direction: Direction,
    available_width: f32,
    available_height: f32,
    request: &LayoutRequest,
) -> Result<()> {
    let width_sizing_mode = request.width_sizing_mode;
    let height_sizing_mode = request.height_sizing_mode;
    let available_width = if width_sizing_mode == SizingMode::MaxContent { UNDEFINED } else { available_width };
    let available_height = if height_sizing_mode == SizingMode::MaxContent { UNDEFINED } else { available_height };

    let entry = &tree.nodes[node];
    let padding_and_border_axis_row = layout_padding_and_border(&entry.layout, PhysicalEdge::Left, PhysicalEdge::Right);
    let padding_and_border_axis_column =
        layout_padding_and_border(&entry.layout, PhysicalEdge::Top, PhysicalEdge::Bottom);

    let (width, height) = if width_sizing_mode == SizingMode::StretchFit && height_sizing_mode == SizingMode::StretchFit
    {
        // Both sides are forced, the content cannot change anything
        (available_width, available_height)
    } else {
        // Never hand a negative size to the callback
        let inner_width = if available_width.is_nan() {
            available_width
        } else {
            max_or_defined(0.0, available_width - padding_and_border_axis_row)
        };
        let inner_height = if available_height.is_nan() {
            available_height
        } else {
            max_or_defined(0.0, available_height - padding_and_border_axis_column)
        };

        let measured = match &entry.measure {
            Some(measure) => measure(inner_width, width_sizing_mode, inner_height, height_sizing_mode),
            None => return Err(TesseraError::InvariantViolation("node has no measure function".to_string())),
        };
        ctx.stats.measure_callbacks += 1;
        trace!(
            "{:?} measured {}x{} for {}x{} ({} / {})",
            node,
            measured.width,
            measured.height,
            inner_width,
            inner_height,
            width_sizing_mode,
            height_sizing_mode
        );

        let invalid = |value: f32| !value.is_finite() || value < 0.0;
        if invalid(measured.width) || invalid(measured.height) {
            return Err(TesseraError::InvalidMeasurement {
                width: measured.width,
                height: measured.height,
            });
        }

        let content_sized = |mode: SizingMode| matches!(mode, SizingMode::MaxContent | SizingMode::FitContent);
        (
            if content_sized(width_sizing_mode) {
                measured.width + padding_and_border_axis_row
            } else {
                available_width
            },
            if content_sized(height_sizing_mode) {
                measured.height + padding_and_border_axis_column
            } else {
                available_height
            },
        )
    };

    let width = bound_axis(entry, FlexDirection::Row, direction, width, request.owner_width, request.owner_width);
    let height = bound_axis(
        entry,
        FlexDirection::Column,
        direction,
        height,
        request.owner_height,
        request.owner_width,
    );
    let layout = &mut tree.nodes[node].layout;
    layout.set_measured_dimension(Dimension::Width, width);
    layout.set_measured_dimension(Dimension::Height, height);
    Ok(())
}

fn layout_padding_and_border(layout: &LayoutResults, start: PhysicalEdge, end: PhysicalEdge) -> f32 {
    layout.padding(start) + layout.padding(end) + layout.border(start) + layout.border(end)
}

/// Childless node without content: padding and border are its content size.
fn measure_node_without_children(
    tree: &mut LayoutTree,
    node: NodeId,
    direction: Direction,
    available_width: f32,
    available_height: f32,
    request: &LayoutRequest,
) {
    let entry = &tree.nodes[node];
    let content_sized = |mode: SizingMode| matches!(mode, SizingMode::MaxContent | SizingMode::FitContent);

    let width = if content_sized(request.width_sizing_mode) {
        layout_padding_and_border(&entry.layout, PhysicalEdge::Left, PhysicalEdge::Right)
    } else {
        available_width
    };
    let height = if content_sized(request.height_sizing_mode) {
        layout_padding_and_border(&entry.layout, PhysicalEdge::Top, PhysicalEdge::Bottom)
    } else {
        available_height
    };

    let width = bound_axis(entry, FlexDirection::Row, direction, width, request.owner_width, request.owner_width);
    let height = bound_axis(
        entry,
        FlexDirection::Column,
        direction,
        height,
        request.owner_height,
        request.owner_width,
    );
    let layout = &mut tree.nodes[node].layout;
    layout.set_measured_dimension(Dimension::Width, width);
    layout.set_measured_dimension(Dimension::Height, height);
}

/// Size the node straight from the request when its children cannot
/// influence the result. Returns false when a full pass is needed.
fn measure_node_with_fixed_size(
    tree: &mut LayoutTree,
    node: NodeId,
    direction: Direction,
    available_width: f32,
    available_height: f32,
    request: &LayoutRequest,
) -> bool {
    let width_sizing_mode = request.width_sizing_mode;
    let height_sizing_mode = request.height_sizing_mode;
    let collapsed = |available: f32, mode: SizingMode| {
        is_defined(available) && mode == SizingMode::FitContent && available <= 0.0
    };

    if !(collapsed(available_width, width_sizing_mode)
        || collapsed(available_height, height_sizing_mode)
        || (width_sizing_mode == SizingMode::StretchFit && height_sizing_mode == SizingMode::StretchFit))
    {
        return false;
    }

    let clamp_to_zero = |available: f32, mode: SizingMode| {
        if available.is_nan() || (mode == SizingMode::FitContent && available < 0.0) {
            0.0
        } else {
            available
        }
    };

    let entry = &tree.nodes[node];
    let width = bound_axis(
        entry,
        FlexDirection::Row,
        direction,
        clamp_to_zero(available_width, width_sizing_mode),
        request.owner_width,
        request.owner_width,
    );
    let height = bound_axis(
        entry,
        FlexDirection::Column,
        direction,
        clamp_to_zero(available_height, height_sizing_mode),
        request.owner_height,
        request.owner_width,
    );
    let layout = &mut tree.nodes[node].layout;
    layout.set_measured_dimension(Dimension::Width, width);
    layout.set_measured_dimension(Dimension::Height, height);
    true
}

/// Reset the layout of a hidden subtree to an empty box at the origin.
pub(crate) fn zero_out_layout_recursively(tree: &mut LayoutTree, node: NodeId) {
    let entry = &mut tree.nodes[node];
    entry.layout = LayoutResults::default();
    entry.layout.set_dimension(Dimension::Width, 0.0);
    entry.layout.set_dimension(Dimension::Height, 0.0);
    entry.has_new_layout = true;

    let children = entry.children.clone();
    for child in children {
        zero_out_layout_recursively(tree, child);
    }
}

/// Offset from the `position: relative` insets along `axis`. The start
/// inset wins over the end inset.
fn relative_position(tree: &LayoutTree, node: NodeId, axis: FlexDirection, direction: Direction, axis_size: f32) -> f32 {
    let style = &tree.nodes[node].style;
    if style.position_type() == PositionType::Static {
        return 0.0;
    }
    if style.is_inline_start_position_defined(axis, direction) && !style.is_inline_start_position_auto(axis, direction)
    {
        return style.compute_inline_start_position(axis, direction, axis_size);
    }
    -style.compute_inline_end_position(axis, direction, axis_size)
}

/// Write the margin and relative offset of `node` into its layout
/// position. Percent insets resolve against the owner size of their axis.
pub(crate) fn set_position(
    tree: &mut LayoutTree,
    node: NodeId,
    direction: Direction,
    owner_width: f32,
    owner_height: f32,
) {
    let entry = &tree.nodes[node];
    // Roots are always laid out LTR so positions stay non-negative
    let direction_respecting_root = if entry.is_root() { Direction::Ltr } else { direction };
    let main_axis = resolve_direction(entry.style.flex_direction(), direction_respecting_root);
    let cross_axis = resolve_cross_direction(main_axis, direction_respecting_root);
    let axis_size = |axis: FlexDirection| if is_row(axis) { owner_width } else { owner_height };

    let relative_position_main =
        relative_position(tree, node, main_axis, direction_respecting_root, axis_size(main_axis));
    let relative_position_cross =
        relative_position(tree, node, cross_axis, direction_respecting_root, axis_size(cross_axis));

    let style = &entry.style;
    let positions = [
        (
            inline_start_edge(main_axis, direction),
            style.compute_inline_start_margin(main_axis, direction, owner_width) + relative_position_main,
        ),
        (
            inline_end_edge(main_axis, direction),
            style.compute_inline_end_margin(main_axis, direction, owner_width) + relative_position_main,
        ),
        (
            inline_start_edge(cross_axis, direction),
            style.compute_inline_start_margin(cross_axis, direction, owner_width) + relative_position_cross,
        ),
        (
            inline_end_edge(cross_axis, direction),
            style.compute_inline_end_margin(cross_axis, direction, owner_width) + relative_position_cross,
        ),
    ];

    let layout = &mut tree.nodes[node].layout;
    for (edge, value) in positions {
        layout.set_position(edge, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Size;
    use tessera_core::{Edge, Value};

    fn request(width: f32, width_mode: SizingMode, height: f32, height_mode: SizingMode) -> LayoutRequest {
        LayoutRequest {
            available_width: width,
            available_height: height,
            owner_direction: Direction::Ltr,
            width_sizing_mode: width_mode,
            height_sizing_mode: height_mode,
            owner_width: width,
            owner_height: height,
            perform_layout: true,
            reason: LayoutPassReason::Initial,
        }
    }

    #[test]
    fn test_indefinite_size_requires_max_content() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        let mut ctx = LayoutContext::new(1);
        let result = calculate_layout_internal(
            &mut tree,
            &mut ctx,
            node,
            request(UNDEFINED, SizingMode::StretchFit, 10.0, SizingMode::StretchFit),
            0,
        );
        assert!(matches!(result, Err(TesseraError::InvariantViolation(_))));
    }

    #[test]
    fn test_negative_measurement_is_fatal() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.set_measure_func(node, Some(Box::new(|_, _, _, _| Size::new(-1.0, 5.0)))).unwrap();
        let result = tree.calculate_layout(node, UNDEFINED, UNDEFINED, Direction::Ltr);
        assert!(matches!(result, Err(TesseraError::InvalidMeasurement { .. })));
    }

    #[test]
    fn test_measure_callback_sees_content_box() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.update_style(node, |s| {
            s.set_padding(Edge::All, Value::Point(5.0));
            s.set_max_dimension(Dimension::Width, Value::Point(100.0));
        })
        .unwrap();
        tree.set_measure_func(
            node,
            Some(Box::new(|width, width_mode, _, _| {
                assert_eq!(width_mode, SizingMode::FitContent);
                Size::new(width, 20.0)
            })),
        )
        .unwrap();

        tree.calculate_layout(node, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
        assert_eq!(tree.computed_width(node), 100.0);
        assert_eq!(tree.computed_height(node), 30.0);
        assert_eq!(tree.last_layout_stats().measure_callbacks, 1);
    }

    #[test]
    fn test_fixed_size_measure_skips_children() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        let child = tree.new_node();
        tree.add_child(node, child).unwrap();
        let mut ctx = LayoutContext::new(1);
        let mut req = request(40.0, SizingMode::StretchFit, 30.0, SizingMode::StretchFit);
        req.perform_layout = false;
        req.reason = LayoutPassReason::MeasureChild;

        calculate_layout_internal(&mut tree, &mut ctx, node, req, 0).unwrap();
        assert_eq!(tree.nodes[node].layout.measured_dimension(Dimension::Width), 40.0);
        assert_eq!(tree.nodes[node].layout.measured_dimension(Dimension::Height), 30.0);
        assert_eq!(ctx.stats.measures, 1);
        assert_eq!(tree.nodes[node].layout.next_cached_measurements_index, 1);
    }

    #[test]
    fn test_measure_results_fill_the_ring() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        let mut ctx = LayoutContext::new(1);
        for width in [10.0, 20.0, 10.0] {
            let mut req = request(width, SizingMode::FitContent, 10.0, SizingMode::FitContent);
            req.perform_layout = false;
            calculate_layout_internal(&mut tree, &mut ctx, node, req, 0).unwrap();
        }
        // Third request is answered by the first entry
        assert_eq!(ctx.stats.measures, 2);
        assert_eq!(ctx.stats.cached_measures, 1);
        assert_eq!(ctx.stats.max_measure_cache, 2);
    }

    #[test]
    fn test_zero_out_hidden_subtree() {
        let mut tree = LayoutTree::new();
        let parent = tree.new_node();
        let child = tree.new_node();
        tree.add_child(parent, child).unwrap();
        tree.nodes[child].layout.set_dimension(Dimension::Width, 50.0);
        tree.nodes[child].has_new_layout = false;

        zero_out_layout_recursively(&mut tree, parent);
        assert_eq!(tree.nodes[child].layout.dimension(Dimension::Width), 0.0);
        assert!(tree.nodes[child].has_new_layout);
    }

    #[test]
    fn test_relative_insets_resolve_per_axis() {
        let mut tree = LayoutTree::new();
        let parent = tree.new_node();
        let child = tree.new_node();
        tree.add_child(parent, child).unwrap();
        tree.update_style(child, |s| {
            s.set_position(Edge::Left, Value::Percent(10.0));
            s.set_position(Edge::Bottom, Value::Percent(10.0));
        })
        .unwrap();

        set_position(&mut tree, child, Direction::Ltr, 200.0, 100.0);
        assert_eq!(tree.nodes[child].layout.position(PhysicalEdge::Left), 20.0);
        assert_eq!(tree.nodes[child].layout.position(PhysicalEdge::Top), -10.0);
    }
}
