// crates/tessera-layout/src/context.rs

use tessera_core::{Direction, SizingMode};

/// Counters collected over one `calculate_layout` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub layouts: u32,
    pub measures: u32,
    pub cached_layouts: u32,
    pub cached_measures: u32,
    pub measure_callbacks: u32,
    pub max_measure_cache: usize,
}

/// Why the driver was asked to size a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LayoutPassReason {
    Initial,
    AbsLayout,
    Stretch,
    MultilineStretch,
    FlexLayout,
    MeasureChild,
    AbsMeasureChild,
    FlexMeasure,
}

/// State threaded through one layout pass in place of process globals.
#[derive(Debug)]
pub(crate) struct LayoutContext {
    pub generation: u32,
    pub stats: LayoutStats,
}

impl LayoutContext {
    pub(crate) fn new(generation: u32) -> Self {
        Self {
            generation,
            stats: LayoutStats::default(),
        }
    }
}

/// Inputs to one visit of the layout driver.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutRequest {
    pub available_width: f32,
    pub available_height: f32,
    pub owner_direction: Direction,
    pub width_sizing_mode: SizingMode,
    pub height_sizing_mode: SizingMode,
    pub owner_width: f32,
    pub owner_height: f32,
    /// Full layout writes positions; otherwise only measured sizes.
    pub perform_layout: bool,
    pub reason: LayoutPassReason,
}
