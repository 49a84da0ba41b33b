// crates/tessera-layout/src/style.rs

use crate::flex_direction::{flex_end_edge, flex_start_edge, inline_end_edge, inline_start_edge, is_row};
use tessera_core::{
    max_or_defined, Align, Dimension, Direction, Display, Edge, Edges, FlexDirection, Gutter, Justify,
    Overflow, PhysicalEdge, PositionType, Value, Wrap,
};

/// Style properties of one node.
///
/// Setters normalise their input (NaN factors become unset, a zero or
/// infinite aspect ratio becomes unset, non-finite lengths become unset). Changing a style through
/// `LayoutTree::update_style` marks the node dirty only when the style
/// actually differs afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    direction: Direction,
    flex_direction: FlexDirection,
    justify_content: Justify,
    align_content: Align,
    align_items: Align,
    align_self: Align,
    position_type: PositionType,
    flex_wrap: Wrap,
    overflow: Overflow,
    display: Display,
    flex: Option<f32>,
    flex_grow: Option<f32>,
    flex_shrink: Option<f32>,
    flex_basis: Value,
    margin: Edges<Value>,
    position: Edges<Value>,
    padding: Edges<Value>,
    border: Edges<Value>,
    gap: [Value; 3],
    dimensions: [Value; 2],
    min_dimensions: [Value; 2],
    max_dimensions: [Value; 2],
    aspect_ratio: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Value::Auto,
            margin: Edges::default(),
            position: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            gap: [Value::Undefined; 3],
            dimensions: [Value::Auto; 2],
            min_dimensions: [Value::Undefined; 2],
            max_dimensions: [Value::Undefined; 2],
            aspect_ratio: None,
        }
    }
}

fn finite_factor(value: f32) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

fn compute_left_edge(edges: &Edges<Value>, direction: Direction) -> Value {
    if direction == Direction::Ltr && edges.get(Edge::Start).is_defined() {
        edges.get(Edge::Start)
    } else if direction == Direction::Rtl && edges.get(Edge::End).is_defined() {
        edges.get(Edge::End)
    } else if edges.get(Edge::Left).is_defined() {
        edges.get(Edge::Left)
    } else if edges.get(Edge::Horizontal).is_defined() {
        edges.get(Edge::Horizontal)
    } else {
        edges.get(Edge::All)
    }
}

fn compute_right_edge(edges: &Edges<Value>, direction: Direction) -> Value {
    if direction == Direction::Ltr && edges.get(Edge::End).is_defined() {
        edges.get(Edge::End)
    } else if direction == Direction::Rtl && edges.get(Edge::Start).is_defined() {
        edges.get(Edge::Start)
    } else if edges.get(Edge::Right).is_defined() {
        edges.get(Edge::Right)
    } else if edges.get(Edge::Horizontal).is_defined() {
        edges.get(Edge::Horizontal)
    } else {
        edges.get(Edge::All)
    }
}

fn compute_vertical_edge(edges: &Edges<Value>, edge: Edge) -> Value {
    if edges.get(edge).is_defined() {
        edges.get(edge)
    } else if edges.get(Edge::Vertical).is_defined() {
        edges.get(Edge::Vertical)
    } else {
        edges.get(Edge::All)
    }
}

/// Value applying to a physical edge after logical and shorthand edges
/// are taken into account.
fn physical_edge_value(edges: &Edges<Value>, edge: PhysicalEdge, direction: Direction) -> Value {
    match edge {
        PhysicalEdge::Left => compute_left_edge(edges, direction),
        PhysicalEdge::Right => compute_right_edge(edges, direction),
        PhysicalEdge::Top => compute_vertical_edge(edges, Edge::Top),
        PhysicalEdge::Bottom => compute_vertical_edge(edges, Edge::Bottom),
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used when the config asks for web-compatible behaviour.
    pub fn web_defaults() -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Self::default()
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn flex_direction(&self) -> FlexDirection {
        self.flex_direction
    }

    pub fn set_flex_direction(&mut self, flex_direction: FlexDirection) {
        self.flex_direction = flex_direction;
    }

    pub fn justify_content(&self) -> Justify {
        self.justify_content
    }

    pub fn set_justify_content(&mut self, justify: Justify) {
        self.justify_content = justify;
    }

    pub fn align_content(&self) -> Align {
        self.align_content
    }

    pub fn set_align_content(&mut self, align: Align) {
        self.align_content = align;
    }

    pub fn align_items(&self) -> Align {
        self.align_items
    }

    pub fn set_align_items(&mut self, align: Align) {
        self.align_items = align;
    }

    pub fn align_self(&self) -> Align {
        self.align_self
    }

    pub fn set_align_self(&mut self, align: Align) {
        self.align_self = align;
    }

    pub fn position_type(&self) -> PositionType {
        self.position_type
    }

    pub fn set_position_type(&mut self, position_type: PositionType) {
        self.position_type = position_type;
    }

    pub fn flex_wrap(&self) -> Wrap {
        self.flex_wrap
    }

    pub fn set_flex_wrap(&mut self, wrap: Wrap) {
        self.flex_wrap = wrap;
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    pub fn set_overflow(&mut self, overflow: Overflow) {
        self.overflow = overflow;
    }

    pub fn display(&self) -> Display {
        self.display
    }

    pub fn set_display(&mut self, display: Display) {
        self.display = display;
    }

    pub fn flex(&self) -> Option<f32> {
        self.flex
    }

    pub fn set_flex(&mut self, flex: f32) {
        self.flex = finite_factor(flex);
    }

    pub fn flex_grow(&self) -> Option<f32> {
        self.flex_grow
    }

    pub fn set_flex_grow(&mut self, grow: f32) {
        self.flex_grow = finite_factor(grow);
    }

    pub fn flex_shrink(&self) -> Option<f32> {
        self.flex_shrink
    }

    pub fn set_flex_shrink(&mut self, shrink: f32) {
        self.flex_shrink = finite_factor(shrink);
    }

    pub fn flex_basis(&self) -> Value {
        self.flex_basis
    }

    pub fn set_flex_basis(&mut self, basis: Value) {
        self.flex_basis = basis.normalized();
    }

    pub fn margin(&self, edge: Edge) -> Value {
        self.margin.get(edge)
    }

    pub fn set_margin(&mut self, edge: Edge, value: Value) {
        self.margin.set(edge, value.normalized());
    }

    pub fn position(&self, edge: Edge) -> Value {
        self.position.get(edge)
    }

    pub fn set_position(&mut self, edge: Edge, value: Value) {
        self.position.set(edge, value.normalized());
    }

    pub fn padding(&self, edge: Edge) -> Value {
        self.padding.get(edge)
    }

    /// `Auto` is not a valid padding and is stored as unset.
    pub fn set_padding(&mut self, edge: Edge, value: Value) {
        let value = value.normalized();
        self.padding.set(edge, if value.is_auto() { Value::Undefined } else { value });
    }

    pub fn border(&self, edge: Edge) -> Value {
        self.border.get(edge)
    }

    /// Borders are point lengths; anything else is stored as unset.
    pub fn set_border(&mut self, edge: Edge, value: Value) {
        let value = match value.normalized() {
            value @ Value::Point(_) => value,
            _ => Value::Undefined,
        };
        self.border.set(edge, value);
    }

    pub fn gap(&self, gutter: Gutter) -> Value {
        self.gap[gutter.index()]
    }

    pub fn set_gap(&mut self, gutter: Gutter, value: Value) {
        let value = value.normalized();
        self.gap[gutter.index()] = if value.is_auto() { Value::Undefined } else { value };
    }

    pub fn dimension(&self, dimension: Dimension) -> Value {
        self.dimensions[dimension.index()]
    }

    pub fn set_dimension(&mut self, dimension: Dimension, value: Value) {
        self.dimensions[dimension.index()] = value.normalized();
    }

    pub fn width(&self) -> Value {
        self.dimension(Dimension::Width)
    }

    pub fn set_width(&mut self, value: Value) {
        self.set_dimension(Dimension::Width, value);
    }

    pub fn height(&self) -> Value {
        self.dimension(Dimension::Height)
    }

    pub fn set_height(&mut self, value: Value) {
        self.set_dimension(Dimension::Height, value);
    }

    pub fn min_dimension(&self, dimension: Dimension) -> Value {
        self.min_dimensions[dimension.index()]
    }

    pub fn set_min_dimension(&mut self, dimension: Dimension, value: Value) {
        self.min_dimensions[dimension.index()] = value.normalized();
    }

    pub fn max_dimension(&self, dimension: Dimension) -> Value {
        self.max_dimensions[dimension.index()]
    }

    pub fn set_max_dimension(&mut self, dimension: Dimension, value: Value) {
        self.max_dimensions[dimension.index()] = value.normalized();
    }

    pub fn aspect_ratio(&self) -> Option<f32> {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, ratio: f32) {
        self.aspect_ratio = if ratio == 0.0 || !ratio.is_finite() {
            None
        } else {
            Some(ratio)
        };
    }

    // Computed edges

    pub(crate) fn resolved_min_dimension(&self, dimension: Dimension, reference: f32) -> f32 {
        self.min_dimension(dimension).resolve_or_undefined(reference)
    }

    pub(crate) fn resolved_max_dimension(&self, dimension: Dimension, reference: f32) -> f32 {
        self.max_dimension(dimension).resolve_or_undefined(reference)
    }

    fn position_at(&self, edge: PhysicalEdge, direction: Direction) -> Value {
        physical_edge_value(&self.position, edge, direction)
    }

    fn margin_at(&self, edge: PhysicalEdge, direction: Direction) -> Value {
        physical_edge_value(&self.margin, edge, direction)
    }

    fn padding_at(&self, edge: PhysicalEdge, direction: Direction) -> Value {
        physical_edge_value(&self.padding, edge, direction)
    }

    fn border_at(&self, edge: PhysicalEdge, direction: Direction) -> Value {
        physical_edge_value(&self.border, edge, direction)
    }

    pub(crate) fn is_flex_start_position_defined(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(flex_start_edge(axis), direction).is_defined()
    }

    pub(crate) fn is_flex_end_position_defined(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(flex_end_edge(axis), direction).is_defined()
    }

    pub(crate) fn is_flex_start_position_auto(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(flex_start_edge(axis), direction).is_auto()
    }

    pub(crate) fn is_flex_end_position_auto(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(flex_end_edge(axis), direction).is_auto()
    }

    pub(crate) fn is_inline_start_position_defined(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(inline_start_edge(axis, direction), direction).is_defined()
    }

    pub(crate) fn is_inline_end_position_defined(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(inline_end_edge(axis, direction), direction).is_defined()
    }

    pub(crate) fn is_inline_start_position_auto(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(inline_start_edge(axis, direction), direction).is_auto()
    }

    pub(crate) fn is_inline_end_position_auto(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.position_at(inline_end_edge(axis, direction), direction).is_auto()
    }

    pub(crate) fn compute_flex_start_position(&self, axis: FlexDirection, direction: Direction, axis_size: f32) -> f32 {
        self.position_at(flex_start_edge(axis), direction).resolve_or(axis_size, 0.0)
    }

    pub(crate) fn compute_flex_end_position(&self, axis: FlexDirection, direction: Direction, axis_size: f32) -> f32 {
        self.position_at(flex_end_edge(axis), direction).resolve_or(axis_size, 0.0)
    }

    pub(crate) fn compute_inline_start_position(&self, axis: FlexDirection, direction: Direction, axis_size: f32) -> f32 {
        self.position_at(inline_start_edge(axis, direction), direction).resolve_or(axis_size, 0.0)
    }

    pub(crate) fn compute_inline_end_position(&self, axis: FlexDirection, direction: Direction, axis_size: f32) -> f32 {
        self.position_at(inline_end_edge(axis, direction), direction).resolve_or(axis_size, 0.0)
    }

    pub(crate) fn compute_flex_start_margin(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.margin_at(flex_start_edge(axis), direction).resolve_or(width_size, 0.0)
    }

    pub(crate) fn compute_flex_end_margin(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.margin_at(flex_end_edge(axis), direction).resolve_or(width_size, 0.0)
    }

    pub(crate) fn compute_inline_start_margin(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.margin_at(inline_start_edge(axis, direction), direction).resolve_or(width_size, 0.0)
    }

    pub(crate) fn compute_inline_end_margin(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.margin_at(inline_end_edge(axis, direction), direction).resolve_or(width_size, 0.0)
    }

    pub(crate) fn compute_flex_start_border(&self, axis: FlexDirection, direction: Direction) -> f32 {
        self.border_at(flex_start_edge(axis), direction).resolve_or_max(0.0, 0.0)
    }

    pub(crate) fn compute_flex_end_border(&self, axis: FlexDirection, direction: Direction) -> f32 {
        self.border_at(flex_end_edge(axis), direction).resolve_or_max(0.0, 0.0)
    }

    pub(crate) fn compute_inline_start_border(&self, axis: FlexDirection, direction: Direction) -> f32 {
        self.border_at(inline_start_edge(axis, direction), direction).resolve_or_max(0.0, 0.0)
    }

    pub(crate) fn compute_inline_end_border(&self, axis: FlexDirection, direction: Direction) -> f32 {
        self.border_at(inline_end_edge(axis, direction), direction).resolve_or_max(0.0, 0.0)
    }

    pub(crate) fn compute_flex_start_padding(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.padding_at(flex_start_edge(axis), direction).resolve_or_max(width_size, 0.0)
    }

    pub(crate) fn compute_flex_end_padding(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.padding_at(flex_end_edge(axis), direction).resolve_or_max(width_size, 0.0)
    }

    pub(crate) fn compute_inline_start_padding(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.padding_at(inline_start_edge(axis, direction), direction).resolve_or_max(width_size, 0.0)
    }

    pub(crate) fn compute_inline_end_padding(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.padding_at(inline_end_edge(axis, direction), direction).resolve_or_max(width_size, 0.0)
    }

    pub(crate) fn compute_flex_start_padding_and_border(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.compute_flex_start_padding(axis, direction, width_size) + self.compute_flex_start_border(axis, direction)
    }

    pub(crate) fn compute_flex_end_padding_and_border(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.compute_flex_end_padding(axis, direction, width_size) + self.compute_flex_end_border(axis, direction)
    }

    pub(crate) fn compute_inline_start_padding_and_border(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.compute_inline_start_padding(axis, direction, width_size) + self.compute_inline_start_border(axis, direction)
    }

    pub(crate) fn compute_inline_end_padding_and_border(&self, axis: FlexDirection, direction: Direction, width_size: f32) -> f32 {
        self.compute_inline_end_padding(axis, direction, width_size) + self.compute_inline_end_border(axis, direction)
    }

    /// Total border along an axis. Direction cannot change the sum, so LTR is used.
    pub(crate) fn compute_border_for_axis(&self, axis: FlexDirection) -> f32 {
        self.compute_inline_start_border(axis, Direction::Ltr) + self.compute_inline_end_border(axis, Direction::Ltr)
    }

    /// Total margin along an axis. Direction cannot change the sum, so LTR is used.
    pub(crate) fn compute_margin_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.compute_inline_start_margin(axis, Direction::Ltr, width_size)
            + self.compute_inline_end_margin(axis, Direction::Ltr, width_size)
    }

    fn compute_column_gap(&self) -> Value {
        if self.gap[Gutter::Column.index()].is_defined() {
            self.gap[Gutter::Column.index()]
        } else {
            self.gap[Gutter::All.index()]
        }
    }

    fn compute_row_gap(&self) -> Value {
        if self.gap[Gutter::Row.index()].is_defined() {
            self.gap[Gutter::Row.index()]
        } else {
            self.gap[Gutter::All.index()]
        }
    }

    /// Gap between items laid out along `axis`, never negative.
    pub(crate) fn compute_gap_for_axis(&self, axis: FlexDirection, owner_size: f32) -> f32 {
        let gap = if is_row(axis) {
            self.compute_column_gap()
        } else {
            self.compute_row_gap()
        };
        max_or_defined(gap.resolve_or_undefined(owner_size), 0.0)
    }

    pub(crate) fn flex_start_margin_is_auto(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.margin_at(flex_start_edge(axis), direction).is_auto()
    }

    pub(crate) fn flex_end_margin_is_auto(&self, axis: FlexDirection, direction: Direction) -> bool {
        self.margin_at(flex_end_edge(axis), direction).is_auto()
    }

    pub(crate) fn horizontal_insets_defined(&self) -> bool {
        [Edge::Left, Edge::Right, Edge::All, Edge::Horizontal, Edge::Start, Edge::End]
            .iter()
            .any(|edge| self.position.get(*edge).is_defined())
    }

    pub(crate) fn vertical_insets_defined(&self) -> bool {
        [Edge::Top, Edge::Bottom, Edge::All, Edge::Vertical]
            .iter()
            .any(|edge| self.position.get(*edge).is_defined())
    }
}
