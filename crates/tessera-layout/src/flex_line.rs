// crates/tessera-layout/src/flex_line.rs

use crate::constraints::bound_axis_within_min_and_max;
use crate::flex_direction::resolve_direction;
use crate::{LayoutTree, NodeId};
use tessera_core::{Direction, Display, PositionType, Wrap};

/// Running totals updated while a line is flexed and justified.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FlexLineRunningLayout {
    pub total_flex_grow_factors: f32,
    pub total_flex_shrink_scaled_factors: f32,
    pub remaining_free_space: f32,
    pub main_dim: f32,
    pub cross_dim: f32,
}

#[derive(Debug)]
pub(crate) struct FlexLine {
    /// In-flow items of this line, in document order.
    pub items_in_flow: Vec<NodeId>,
    /// Sum of clamped flex bases, main-axis margins and gaps.
    pub size_consumed: f32,
    pub number_of_auto_margins: usize,
    /// Child index where the next line starts.
    pub end_index: usize,
    pub layout: FlexLineRunningLayout,
}

/// Collect children of `node` starting at `start_index` into one line.
///
/// On a wrapping container an item that would push the line past
/// `available_inner_main_dim` starts the next line, unless the line is
/// still empty.
#[allow(clippy::too_many_arguments)]
pub(crate) fn calculate_flex_line(
    tree: &mut LayoutTree,
    node: NodeId,
    owner_direction: Direction,
    main_axis_owner_size: f32,
    available_inner_width: f32,
    available_inner_main_dim: f32,
    start_index: usize,
    line_count: usize,
) -> FlexLine {
    let entry = &tree.nodes[node];
    let direction = entry.resolve_direction(owner_direction);
    let main_axis = resolve_direction(entry.style.flex_direction(), direction);
    let is_node_flex_wrap = entry.style.flex_wrap() != Wrap::NoWrap;
    let gap = entry.style.compute_gap_for_axis(main_axis, available_inner_main_dim);
    let child_count = entry.children.len();

    let mut items_in_flow = Vec::with_capacity(child_count);
    let mut size_consumed = 0.0;
    let mut total_flex_grow_factors = 0.0;
    let mut total_flex_shrink_scaled_factors = 0.0;
    let mut number_of_auto_margins = 0;

    let mut index = start_index;
    while index < child_count {
        let child_id = tree.nodes[node].children[index];
        let child = &tree.nodes[child_id];
        if child.style.display() == Display::None || child.style.position_type() == PositionType::Absolute {
            index += 1;
            continue;
        }

        if child.style.flex_start_margin_is_auto(main_axis, direction) {
            number_of_auto_margins += 1;
        }
        if child.style.flex_end_margin_is_auto(main_axis, direction) {
            number_of_auto_margins += 1;
        }

        let child_margin_main_axis = child.style.compute_margin_for_axis(main_axis, available_inner_width);
        let child_leading_gap_main_axis = if items_in_flow.is_empty() { 0.0 } else { gap };
        let flex_basis = child.layout.computed_flex_basis().unwrap_or(f32::NAN);
        let flex_basis_with_min_and_max =
            bound_axis_within_min_and_max(child, main_axis, flex_basis, main_axis_owner_size);
        let outer_size = flex_basis_with_min_and_max + child_margin_main_axis + child_leading_gap_main_axis;

        if size_consumed + outer_size > available_inner_main_dim && is_node_flex_wrap && !items_in_flow.is_empty() {
            break;
        }
        size_consumed += outer_size;

        if child.is_flexible() {
            total_flex_grow_factors += child.resolve_flex_grow();
            // Shrink is weighted by the item's basis
            total_flex_shrink_scaled_factors += -child.resolve_flex_shrink() * flex_basis;
        }

        tree.nodes[child_id].line_index = line_count;
        items_in_flow.push(child_id);
        index += 1;
    }

    if total_flex_grow_factors > 0.0 && total_flex_grow_factors < 1.0 {
        total_flex_grow_factors = 1.0;
    }
    if total_flex_shrink_scaled_factors > 0.0 && total_flex_shrink_scaled_factors < 1.0 {
        total_flex_shrink_scaled_factors = 1.0;
    }

    FlexLine {
        items_in_flow,
        size_consumed,
        number_of_auto_margins,
        end_index: index,
        layout: FlexLineRunningLayout {
            total_flex_grow_factors,
            total_flex_shrink_scaled_factors,
            ..Default::default()
        },
    }
}
