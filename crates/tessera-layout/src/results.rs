// crates/tessera-layout/src/results.rs

use tessera_core::{Dimension, Direction, PhysicalEdge, SizingMode, UNDEFINED};

/// Capacity of the per-node measurement ring.
pub const MAX_CACHED_MEASUREMENTS: usize = 8;

/// Inputs and outcome of one earlier measurement of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedMeasurement {
    pub available_width: f32,
    pub available_height: f32,
    pub width_sizing_mode: SizingMode,
    pub height_sizing_mode: SizingMode,
    pub computed_width: f32,
    pub computed_height: f32,
}

impl Default for CachedMeasurement {
    fn default() -> Self {
        Self {
            available_width: -1.0,
            available_height: -1.0,
            width_sizing_mode: SizingMode::MaxContent,
            height_sizing_mode: SizingMode::MaxContent,
            computed_width: -1.0,
            computed_height: -1.0,
        }
    }
}

/// Everything the layout algorithm writes for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResults {
    pub(crate) position: [f32; 4],
    pub(crate) dimensions: [f32; 2],
    pub(crate) margin: [f32; 4],
    pub(crate) border: [f32; 4],
    pub(crate) padding: [f32; 4],
    pub(crate) direction: Direction,
    pub(crate) had_overflow: bool,

    pub(crate) computed_flex_basis_generation: u32,
    pub(crate) computed_flex_basis: Option<f32>,

    // Stamps checked by the memoized driver
    pub(crate) generation_count: u32,
    pub(crate) config_version: u32,
    pub(crate) last_owner_direction: Direction,

    pub(crate) next_cached_measurements_index: usize,
    pub(crate) cached_measurements: [CachedMeasurement; MAX_CACHED_MEASUREMENTS],
    pub(crate) cached_layout: CachedMeasurement,
    pub(crate) measured_dimensions: [f32; 2],
}

impl Default for LayoutResults {
    fn default() -> Self {
        Self {
            position: [0.0; 4],
            dimensions: [UNDEFINED; 2],
            margin: [0.0; 4],
            border: [0.0; 4],
            padding: [0.0; 4],
            direction: Direction::Inherit,
            had_overflow: false,
            computed_flex_basis_generation: 0,
            computed_flex_basis: None,
            generation_count: 0,
            config_version: 0,
            last_owner_direction: Direction::Inherit,
            next_cached_measurements_index: 0,
            cached_measurements: [CachedMeasurement::default(); MAX_CACHED_MEASUREMENTS],
            cached_layout: CachedMeasurement::default(),
            measured_dimensions: [UNDEFINED; 2],
        }
    }
}

impl LayoutResults {
    pub fn position(&self, edge: PhysicalEdge) -> f32 {
        self.position[edge.index()]
    }

    pub(crate) fn set_position(&mut self, edge: PhysicalEdge, value: f32) {
        self.position[edge.index()] = value;
    }

    pub fn dimension(&self, dimension: Dimension) -> f32 {
        self.dimensions[dimension.index()]
    }

    pub(crate) fn set_dimension(&mut self, dimension: Dimension, value: f32) {
        self.dimensions[dimension.index()] = value;
    }

    pub fn measured_dimension(&self, dimension: Dimension) -> f32 {
        self.measured_dimensions[dimension.index()]
    }

    pub(crate) fn set_measured_dimension(&mut self, dimension: Dimension, value: f32) {
        self.measured_dimensions[dimension.index()] = value;
    }

    pub fn margin(&self, edge: PhysicalEdge) -> f32 {
        self.margin[edge.index()]
    }

    pub(crate) fn set_margin(&mut self, edge: PhysicalEdge, value: f32) {
        self.margin[edge.index()] = value;
    }

    pub fn border(&self, edge: PhysicalEdge) -> f32 {
        self.border[edge.index()]
    }

    pub(crate) fn set_border(&mut self, edge: PhysicalEdge, value: f32) {
        self.border[edge.index()] = value;
    }

    pub fn padding(&self, edge: PhysicalEdge) -> f32 {
        self.padding[edge.index()]
    }

    pub(crate) fn set_padding(&mut self, edge: PhysicalEdge, value: f32) {
        self.padding[edge.index()] = value;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn had_overflow(&self) -> bool {
        self.had_overflow
    }

    pub fn computed_flex_basis(&self) -> Option<f32> {
        self.computed_flex_basis
    }

    /// Drops every cached measurement so the next request recomputes.
    pub(crate) fn invalidate_cache(&mut self) {
        self.next_cached_measurements_index = 0;
        self.cached_layout = CachedMeasurement::default();
    }

    /// Slot for the next measurement, wrapping over the oldest entry.
    pub(crate) fn next_measurement_slot(&mut self) -> &mut CachedMeasurement {
        if self.next_cached_measurements_index == MAX_CACHED_MEASUREMENTS {
            self.next_cached_measurements_index = 0;
        }
        let index = self.next_cached_measurements_index;
        self.next_cached_measurements_index += 1;
        &mut self.cached_measurements[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_undefined_sizes() {
        let layout = LayoutResults::default();
        assert!(layout.dimension(Dimension::Width).is_nan());
        assert!(layout.measured_dimension(Dimension::Height).is_nan());
        assert_eq!(layout.position(PhysicalEdge::Left), 0.0);
        assert_eq!(layout.computed_flex_basis(), None);
    }

    #[test]
    fn test_measurement_ring_wraps() {
        let mut layout = LayoutResults::default();
        for i in 0..MAX_CACHED_MEASUREMENTS {
            layout.next_measurement_slot().computed_width = i as f32;
        }
        assert_eq!(layout.next_cached_measurements_index, MAX_CACHED_MEASUREMENTS);

        // Ninth entry overwrites the oldest
        layout.next_measurement_slot().computed_width = 99.0;
        assert_eq!(layout.next_cached_measurements_index, 1);
        assert_eq!(layout.cached_measurements[0].computed_width, 99.0);
        assert_eq!(layout.cached_measurements[1].computed_width, 1.0);
    }

    #[test]
    fn test_invalidate_cache() {
        let mut layout = LayoutResults::default();
        layout.next_measurement_slot();
        layout.cached_layout.computed_width = 10.0;
        layout.invalidate_cache();
        assert_eq!(layout.next_cached_measurements_index, 0);
        assert_eq!(layout.cached_layout, CachedMeasurement::default());
    }
}
