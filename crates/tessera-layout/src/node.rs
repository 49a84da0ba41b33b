// crates/tessera-layout/src/node.rs

use crate::results::LayoutResults;
use crate::style::Style;
use std::fmt;
use std::rc::Rc;
use crate::flex_direction::dimension;
use tessera_core::{Config, Dimension, Direction, Errata, FlexDirection, NodeType, PositionType, Value};

slotmap::new_key_type! {
    /// Stable handle to a node stored in a [`crate::LayoutTree`].
    pub struct NodeId;
}

/// Intrinsic size reported by a measure callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// `(width, width_mode, height, height_mode) -> size` for leaf content.
pub type MeasureFunc = Box<dyn Fn(f32, tessera_core::SizingMode, f32, tessera_core::SizingMode) -> Size>;

/// `(width, height) -> baseline offset from the top`.
pub type BaselineFunc = Box<dyn Fn(f32, f32) -> f32>;

/// Called with the node id whenever a clean node becomes dirty.
pub type DirtiedFunc = Box<dyn Fn(NodeId)>;

pub(crate) struct Node {
    pub(crate) style: Style,
    pub(crate) layout: LayoutResults,
    pub(crate) owner: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) config: Rc<Config>,
    pub(crate) measure: Option<MeasureFunc>,
    pub(crate) baseline: Option<BaselineFunc>,
    pub(crate) dirtied: Option<DirtiedFunc>,
    pub(crate) node_type: NodeType,
    pub(crate) is_dirty: bool,
    pub(crate) has_new_layout: bool,
    pub(crate) is_reference_baseline: bool,
    pub(crate) always_forms_containing_block: bool,
    pub(crate) line_index: usize,
    pub(crate) resolved_dimensions: [Value; 2],
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("owner", &self.owner)
            .field("children", &self.children)
            .field("has_measure", &self.measure.is_some())
            .field("has_baseline", &self.baseline.is_some())
            .field("is_dirty", &self.is_dirty)
            .finish()
    }
}

impl Node {
    pub(crate) fn new(config: Rc<Config>) -> Self {
        let style = if config.use_web_defaults() {
            Style::web_defaults()
        } else {
            Style::default()
        };
        Self {
            style,
            layout: LayoutResults::default(),
            owner: None,
            children: Vec::new(),
            config,
            measure: None,
            baseline: None,
            dirtied: None,
            node_type: NodeType::Default,
            // New nodes have never been laid out
            is_dirty: true,
            has_new_layout: true,
            is_reference_baseline: false,
            always_forms_containing_block: false,
            line_index: 0,
            resolved_dimensions: [Value::Auto; 2],
        }
    }

    pub(crate) fn resolve_direction(&self, owner_direction: Direction) -> Direction {
        if self.style.direction() == Direction::Inherit {
            if owner_direction != Direction::Inherit {
                owner_direction
            } else {
                Direction::Ltr
            }
        } else {
            self.style.direction()
        }
    }

    /// Width/height to use for layout. A max equal to the min replaces the
    /// dimension so later clamping sees a single definite length.
    pub(crate) fn resolve_dimension(&mut self) {
        for dimension in [Dimension::Width, Dimension::Height] {
            let max = self.style.max_dimension(dimension);
            self.resolved_dimensions[dimension.index()] =
                if max.is_defined() && max.inexact_equals(&self.style.min_dimension(dimension)) {
                    max
                } else {
                    self.style.dimension(dimension)
                };
        }
    }

    pub(crate) fn resolved_dimension(&self, dimension: Dimension) -> Value {
        self.resolved_dimensions[dimension.index()]
    }

    /// True when the resolved dimension is a non-negative length.
    pub(crate) fn has_definite_length(&self, dimension: Dimension, owner_size: f32) -> bool {
        matches!(self.resolved_dimension(dimension).resolve(owner_size), Some(value) if value >= 0.0)
    }

    pub(crate) fn is_layout_dimension_defined(&self, dimension: Dimension) -> bool {
        let value = self.layout.measured_dimension(dimension);
        !value.is_nan() && value >= 0.0
    }

    /// Flex basis to use when the style leaves it at `auto`.
    pub(crate) fn process_flex_basis(&self) -> Value {
        let basis = self.style.flex_basis();
        if !basis.is_auto() && !basis.is_undefined() {
            return basis;
        }
        match self.style.flex() {
            Some(flex) if flex > 0.0 => {
                if self.config.use_web_defaults() {
                    Value::Auto
                } else {
                    Value::Point(0.0)
                }
            }
            _ => Value::Auto,
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        self.owner.is_none()
    }

    pub(crate) fn has_errata(&self, errata: Errata) -> bool {
        self.config.has_errata(errata)
    }

    pub(crate) fn resolve_flex_grow(&self) -> f32 {
        // Root nodes never grow
        if self.is_root() {
            return 0.0;
        }
        if let Some(grow) = self.style.flex_grow() {
            return grow;
        }
        match self.style.flex() {
            Some(flex) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    pub(crate) fn resolve_flex_shrink(&self) -> f32 {
        if self.is_root() {
            return 0.0;
        }
        if let Some(shrink) = self.style.flex_shrink() {
            return shrink;
        }
        let web_defaults = self.config.use_web_defaults();
        match self.style.flex() {
            Some(flex) if !web_defaults && flex < 0.0 => -flex,
            _ if web_defaults => 1.0,
            _ => 0.0,
        }
    }

    /// In-flow item with a non-zero grow or shrink factor.
    pub(crate) fn is_flexible(&self) -> bool {
        self.style.position_type() != PositionType::Absolute
            && (self.resolve_flex_grow() != 0.0 || self.resolve_flex_shrink() != 0.0)
    }

    /// Measured size along `axis` plus the margins on that axis.
    pub(crate) fn dimension_with_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.layout.measured_dimension(dimension(axis)) + self.style.compute_margin_for_axis(axis, width_size)
    }
}
