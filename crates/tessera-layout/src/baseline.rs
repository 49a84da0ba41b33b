// crates/tessera-layout/src/baseline.rs

use crate::align::resolve_child_alignment;
use crate::flex_direction::is_column;
use crate::{LayoutTree, NodeId};
use tessera_core::{Align, Dimension, PhysicalEdge, PositionType, Result, TesseraError};

/// Distance from the node's top edge to its first baseline.
pub(crate) fn calculate_baseline(tree: &LayoutTree, node: NodeId) -> Result<f32> {
    let entry = &tree.nodes[node];
    if let Some(baseline) = &entry.baseline {
        let value = baseline(
            entry.layout.measured_dimension(Dimension::Width),
            entry.layout.measured_dimension(Dimension::Height),
        );
        if value.is_nan() {
            return Err(TesseraError::BaselineIsNaN);
        }
        return Ok(value);
    }

    let mut baseline_child = None;
    for &child_id in &entry.children {
        let child = &tree.nodes[child_id];
        if child.line_index > 0 {
            break;
        }
        if child.style.position_type() == PositionType::Absolute {
            continue;
        }
        if resolve_child_alignment(entry, child) == Align::Baseline || child.is_reference_baseline {
            baseline_child = Some(child_id);
            break;
        }
        if baseline_child.is_none() {
            baseline_child = Some(child_id);
        }
    }

    match baseline_child {
        None => Ok(entry.layout.measured_dimension(Dimension::Height)),
        Some(child_id) => {
            let baseline = calculate_baseline(tree, child_id)?;
            Ok(baseline + tree.nodes[child_id].layout.position(PhysicalEdge::Top))
        }
    }
}

/// Row containers whose items (or any one item) align on baselines.
pub(crate) fn is_baseline_layout(tree: &LayoutTree, node: NodeId) -> bool {
    let entry = &tree.nodes[node];
    if is_column(entry.style.flex_direction()) {
        return false;
    }
    if entry.style.align_items() == Align::Baseline {
        return true;
    }
    entry.children.iter().any(|child_id| {
        let child = &tree.nodes[*child_id];
        child.style.position_type() != PositionType::Absolute && child.style.align_self() == Align::Baseline
    })
}
