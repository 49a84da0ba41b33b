// crates/tessera-layout/src/flex_direction.rs
use tessera_core::{Dimension, Direction, FlexDirection, PhysicalEdge};

#[inline]
pub fn is_row(axis: FlexDirection) -> bool {
    matches!(axis, FlexDirection::Row | FlexDirection::RowReverse)
}

#[inline]
pub fn is_column(axis: FlexDirection) -> bool {
    matches!(axis, FlexDirection::Column | FlexDirection::ColumnReverse)
}

/// Mirrors row axes under RTL.
pub fn resolve_direction(axis: FlexDirection, direction: Direction) -> FlexDirection {
    if direction == Direction::Rtl {
        match axis {
            FlexDirection::Row => return FlexDirection::RowReverse,
            FlexDirection::RowReverse => return FlexDirection::Row,
            _ => {}
        }
    }
    axis
}

pub fn resolve_cross_direction(axis: FlexDirection, direction: Direction) -> FlexDirection {
    if is_column(axis) {
        resolve_direction(FlexDirection::Row, direction)
    } else {
        FlexDirection::Column
    }
}

pub fn flex_start_edge(axis: FlexDirection) -> PhysicalEdge {
    match axis {
        FlexDirection::Column => PhysicalEdge::Top,
        FlexDirection::ColumnReverse => PhysicalEdge::Bottom,
        FlexDirection::Row => PhysicalEdge::Left,
        FlexDirection::RowReverse => PhysicalEdge::Right,
    }
}

pub fn flex_end_edge(axis: FlexDirection) -> PhysicalEdge {
    match axis {
        FlexDirection::Column => PhysicalEdge::Bottom,
        FlexDirection::ColumnReverse => PhysicalEdge::Top,
        FlexDirection::Row => PhysicalEdge::Right,
        FlexDirection::RowReverse => PhysicalEdge::Left,
    }
}

pub fn inline_start_edge(axis: FlexDirection, direction: Direction) -> PhysicalEdge {
    if is_row(axis) {
        if direction == Direction::Rtl {
            PhysicalEdge::Right
        } else {
            PhysicalEdge::Left
        }
    } else {
        PhysicalEdge::Top
    }
}

pub fn inline_end_edge(axis: FlexDirection, direction: Direction) -> PhysicalEdge {
    if is_row(axis) {
        if direction == Direction::Rtl {
            PhysicalEdge::Left
        } else {
            PhysicalEdge::Right
        }
    } else {
        PhysicalEdge::Bottom
    }
}

pub fn dimension(axis: FlexDirection) -> Dimension {
    if is_row(axis) {
        Dimension::Width
    } else {
        Dimension::Height
    }
}
