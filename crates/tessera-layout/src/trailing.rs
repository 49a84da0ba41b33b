// crates/tessera-layout/src/trailing.rs

use crate::flex_direction::{dimension, flex_end_edge, flex_start_edge};
use crate::{LayoutTree, NodeId};
use tessera_core::FlexDirection;

/// Reversed axes place children from their far edge, which is only known
/// once the container has its final size.
pub(crate) fn needs_trailing_position(axis: FlexDirection) -> bool {
    matches!(axis, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
}

/// Mirror the flex-start offset of `child` inside `node` onto the opposite edge.
pub(crate) fn set_child_trailing_position(tree: &mut LayoutTree, node: NodeId, child: NodeId, axis: FlexDirection) {
    let size = tree.nodes[child].layout.measured_dimension(dimension(axis));
    let container_size = tree.nodes[node].layout.measured_dimension(dimension(axis));
    let layout = &mut tree.nodes[child].layout;
    let position = container_size - size - layout.position(flex_start_edge(axis));
    layout.set_position(flex_end_edge(axis), position);
}
