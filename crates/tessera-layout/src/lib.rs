// crates/tessera-layout/src/lib.rs
//! Flexbox layout over a tree of styled boxes.
//!
//! Build nodes in a [`LayoutTree`], set their [`Style`], then call
//! [`LayoutTree::calculate_layout`] on a root. Results are read back with the
//! `computed_*` accessors, relative to each node's parent and snapped to the
//! pixel grid of the node's config.

mod absolute;
mod align;
mod baseline;
mod cache;
mod calculate;
mod constraints;
mod context;
mod flex_basis;
mod flex_direction;
mod flex_line;
mod flexible_length;
mod justify;
mod node;
mod results;
mod rounding;
mod style;
mod trailing;
mod tree;

pub use context::LayoutStats;
pub use node::{BaselineFunc, DirtiedFunc, MeasureFunc, NodeId, Size};
pub use results::{CachedMeasurement, LayoutResults, MAX_CACHED_MEASUREMENTS};
pub use style::Style;
pub use tree::LayoutTree;

pub use tessera_core::{
    Align, Config, Dimension, Direction, Display, Edge, Errata, ExperimentalFeatures, FlexDirection, Gutter,
    Justify, NodeType, Overflow, PhysicalEdge, PositionType, Result, SizingMode, TesseraError, Value, Wrap,
    UNDEFINED,
};
