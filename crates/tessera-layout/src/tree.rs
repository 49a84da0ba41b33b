// crates/tessera-layout/src/tree.rs

use crate::context::LayoutStats;
use crate::node::{BaselineFunc, DirtiedFunc, MeasureFunc, Node, NodeId};
use crate::results::LayoutResults;
use crate::style::Style;
use glam::Vec2;
use slotmap::SlotMap;
use std::rc::Rc;
use tessera_core::{Config, Dimension, Direction, Edge, NodeType, PhysicalEdge, Result, TesseraError, UNDEFINED};
use tracing::{trace, warn};

/// Arena owning every node of one or more layout trees.
///
/// Nodes are addressed by [`NodeId`]. A node has at most one owner, and a
/// node with a measure callback never has children. The tree is meant to be
/// driven from a single thread; mutating it while a layout pass runs is not
/// possible through this API, and sharing it across threads requires
/// external locking by the caller.
#[derive(Debug)]
pub struct LayoutTree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    config: Rc<Config>,
    pub(crate) generation: u32,
    pub(crate) last_stats: LayoutStats,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_config(Rc::new(Config::new()))
    }

    /// Tree whose new nodes share `config`.
    pub fn with_config(config: Rc<Config>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            config,
            generation: 0,
            last_stats: LayoutStats::default(),
        }
    }

    /// Config assigned to nodes created with [`LayoutTree::new_node`].
    pub fn config(&self) -> &Rc<Config> {
        &self.config
    }

    pub fn new_node(&mut self) -> NodeId {
        let config = Rc::clone(&self.config);
        self.new_node_with_config(config)
    }

    pub fn new_node_with_config(&mut self, config: Rc<Config>) -> NodeId {
        self.nodes.insert(Node::new(config))
    }

    /// New node with `style` applied.
    pub fn new_node_with_style(&mut self, style: Style) -> NodeId {
        let id = self.new_node();
        self.nodes[id].style = style;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub(crate) fn node(&self, node: NodeId) -> Result<&Node> {
        self.nodes.get(node).ok_or(TesseraError::NodeNotFound)
    }

    pub(crate) fn node_mut(&mut self, node: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(node).ok_or(TesseraError::NodeNotFound)
    }

    /// Detach `node` from its owner and children, then free it. The former
    /// children become roots.
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        let owner = self.node(node)?.owner;
        if let Some(owner) = owner {
            self.remove_child(owner, node)?;
        }

        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.owner = None;
            }
        }

        self.nodes.remove(node);
        trace!("Removed node {:?}", node);
        Ok(())
    }

    /// Free `node` and every descendant it owns.
    pub fn remove_node_recursive(&mut self, node: NodeId) -> Result<()> {
        let children = self.node(node)?.children.clone();
        for child in children {
            if self.nodes.get(child).is_some_and(|entry| entry.owner == Some(node)) {
                self.remove_node_recursive(child)?;
            }
        }
        self.remove_node(node)
    }

    /// Restore default style and layout on a detached, childless node.
    pub fn reset_node(&mut self, node: NodeId) -> Result<()> {
        let entry = self.node_mut(node)?;
        if entry.owner.is_some() || !entry.children.is_empty() {
            return Err(TesseraError::ResetAttachedNode);
        }
        *entry = Node::new(Rc::clone(&entry.config));
        Ok(())
    }

    // Hierarchy

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, child, index)
    }

    /// Insert `child` at `index`. Rejected without mutation when the child
    /// already has an owner, would close a cycle, or the parent has a
    /// measure callback.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let count = self.node(parent)?.children.len();
        if self.node(child)?.owner.is_some() {
            warn!("Rejected insert of node {:?}: already owned", child);
            return Err(TesseraError::ChildAlreadyHasOwner);
        }
        if self.is_ancestor_or_self(child, parent) {
            warn!("Rejected insert of node {:?}: it is an ancestor of {:?}", child, parent);
            return Err(TesseraError::ChildIsAncestor);
        }
        if self.node(parent)?.measure.is_some() {
            warn!("Rejected insert into node {:?}: has a measure function", parent);
            return Err(TesseraError::MeasureFuncHasChildren);
        }
        if index > count {
            return Err(TesseraError::ChildIndexOutOfBounds { index, count });
        }

        self.nodes[parent].children.insert(index, child);
        self.nodes[child].owner = Some(parent);
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    /// Walks owner links up from `node` looking for `ancestor`.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|entry| entry.owner);
        }
        false
    }

    /// Detach `child` from `parent`, resetting the child's layout. Does
    /// nothing when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let Some(position) = self.node(parent)?.children.iter().position(|c| *c == child) else {
            return Ok(());
        };
        self.nodes[parent].children.remove(position);

        if let Some(entry) = self.nodes.get_mut(child) {
            if entry.owner == Some(parent) {
                entry.layout = LayoutResults::default();
                entry.owner = None;
            }
        }
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        if children.is_empty() {
            return Ok(());
        }
        for child in children {
            if let Some(entry) = self.nodes.get_mut(child) {
                if entry.owner == Some(parent) {
                    entry.layout = LayoutResults::default();
                    entry.owner = None;
                }
            }
        }
        self.mark_dirty_and_propagate(parent);
        Ok(())
    }

    pub fn children(&self, parent: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(parent)?.children)
    }

    pub fn child_count(&self, parent: NodeId) -> Result<usize> {
        Ok(self.node(parent)?.children.len())
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        let children = &self.node(parent)?.children;
        children.get(index).copied().ok_or(TesseraError::ChildIndexOutOfBounds {
            index,
            count: children.len(),
        })
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.owner)
    }

    // Style

    pub fn style(&self, node: NodeId) -> Result<&Style> {
        Ok(&self.node(node)?.style)
    }

    pub fn set_style(&mut self, node: NodeId, style: Style) -> Result<()> {
        self.update_style(node, |current| *current = style)
    }

    /// Apply `f` to the node's style, marking the node dirty when the
    /// style changed.
    pub fn update_style(&mut self, node: NodeId, f: impl FnOnce(&mut Style)) -> Result<()> {
        let entry = self.node_mut(node)?;
        let mut style = entry.style.clone();
        f(&mut style);
        if style != entry.style {
            entry.style = style;
            self.mark_dirty_and_propagate(node);
        }
        Ok(())
    }

    // Callbacks and flags

    /// Attach or clear the measure callback. Attaching makes the node a
    /// text node and is rejected when it has children.
    pub fn set_measure_func(&mut self, node: NodeId, measure: Option<MeasureFunc>) -> Result<()> {
        let entry = self.node_mut(node)?;
        match measure {
            Some(measure) => {
                if !entry.children.is_empty() {
                    return Err(TesseraError::ChildrenPreventMeasureFunc);
                }
                entry.node_type = NodeType::Text;
                entry.measure = Some(measure);
            }
            None => {
                entry.node_type = NodeType::Default;
                entry.measure = None;
            }
        }
        Ok(())
    }

    pub fn has_measure_func(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.measure.is_some())
    }

    pub fn set_baseline_func(&mut self, node: NodeId, baseline: Option<BaselineFunc>) -> Result<()> {
        self.node_mut(node)?.baseline = baseline;
        Ok(())
    }

    pub fn has_baseline_func(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.baseline.is_some())
    }

    pub fn set_dirtied_func(&mut self, node: NodeId, dirtied: Option<DirtiedFunc>) -> Result<()> {
        self.node_mut(node)?.dirtied = dirtied;
        Ok(())
    }

    pub fn node_type(&self, node: NodeId) -> Result<NodeType> {
        Ok(self.node(node)?.node_type)
    }

    pub fn set_node_type(&mut self, node: NodeId, node_type: NodeType) -> Result<()> {
        self.node_mut(node)?.node_type = node_type;
        Ok(())
    }

    /// Use this child as the baseline source of its parent.
    pub fn set_is_reference_baseline(&mut self, node: NodeId, is_reference: bool) -> Result<()> {
        let entry = self.node_mut(node)?;
        if entry.is_reference_baseline != is_reference {
            entry.is_reference_baseline = is_reference;
            self.mark_dirty_and_propagate(node);
        }
        Ok(())
    }

    pub fn is_reference_baseline(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.is_reference_baseline)
    }

    /// Make the node a containing block for absolute descendants even when
    /// it is statically positioned.
    pub fn set_always_forms_containing_block(&mut self, node: NodeId, always: bool) -> Result<()> {
        self.node_mut(node)?.always_forms_containing_block = always;
        Ok(())
    }

    // Config

    pub fn node_config(&self, node: NodeId) -> Result<&Rc<Config>> {
        Ok(&self.node(node)?.config)
    }

    /// Swap the node's config. A semantically different config invalidates
    /// the node; an equivalent one keeps its cached layout warm.
    pub fn set_config(&mut self, node: NodeId, config: Rc<Config>) -> Result<()> {
        let entry = self.node_mut(node)?;
        if entry.config.use_web_defaults() != config.use_web_defaults() {
            warn!("Rejected config swap on node {:?}: UseWebDefaults differs", node);
            return Err(TesseraError::UseWebDefaultsMismatch);
        }

        if entry.config.update_invalidates_layout(&config) {
            entry.config = config;
            self.mark_dirty_and_propagate(node);
            self.nodes[node].layout.config_version = 0;
        } else {
            entry.layout.config_version = config.version();
            entry.config = config;
        }
        Ok(())
    }

    // Dirty tracking

    pub fn is_dirty(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.is_dirty)
    }

    /// Signal that externally measured content changed. Only allowed on
    /// nodes with a measure callback.
    pub fn mark_dirty(&mut self, node: NodeId) -> Result<()> {
        if self.node(node)?.measure.is_none() {
            return Err(TesseraError::MarkDirtyWithoutMeasureFunc);
        }
        self.mark_dirty_and_propagate(node);
        Ok(())
    }

    pub(crate) fn set_dirty(&mut self, node: NodeId, dirty: bool) {
        let entry = &mut self.nodes[node];
        if entry.is_dirty == dirty {
            return;
        }
        entry.is_dirty = dirty;
        if dirty {
            if let Some(dirtied) = &entry.dirtied {
                dirtied(node);
            }
        }
    }

    /// Mark `node` and its ancestors dirty, stopping at the first ancestor
    /// that is already dirty.
    pub(crate) fn mark_dirty_and_propagate(&mut self, node: NodeId) {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.nodes[id].is_dirty {
                break;
            }
            self.set_dirty(id, true);
            let entry = &mut self.nodes[id];
            entry.layout.computed_flex_basis = None;
            current = entry.owner;
        }
    }

    pub fn has_new_layout(&self, node: NodeId) -> Result<bool> {
        Ok(self.node(node)?.has_new_layout)
    }

    /// Hosts clear the flag after consuming the results.
    pub fn set_has_new_layout(&mut self, node: NodeId, has_new_layout: bool) -> Result<()> {
        self.node_mut(node)?.has_new_layout = has_new_layout;
        Ok(())
    }

    // Computed layout
    //
    // The accessors below index the arena directly and panic on a removed
    // node id, like slice indexing.

    pub fn layout(&self, node: NodeId) -> &LayoutResults {
        &self.nodes[node].layout
    }

    pub fn computed_left(&self, node: NodeId) -> f32 {
        self.layout(node).position(PhysicalEdge::Left)
    }

    pub fn computed_top(&self, node: NodeId) -> f32 {
        self.layout(node).position(PhysicalEdge::Top)
    }

    pub fn computed_right(&self, node: NodeId) -> f32 {
        self.layout(node).position(PhysicalEdge::Right)
    }

    pub fn computed_bottom(&self, node: NodeId) -> f32 {
        self.layout(node).position(PhysicalEdge::Bottom)
    }

    pub fn computed_width(&self, node: NodeId) -> f32 {
        self.layout(node).dimension(Dimension::Width)
    }

    pub fn computed_height(&self, node: NodeId) -> f32 {
        self.layout(node).dimension(Dimension::Height)
    }

    pub fn computed_position(&self, node: NodeId) -> Vec2 {
        Vec2::new(self.computed_left(node), self.computed_top(node))
    }

    pub fn computed_size(&self, node: NodeId) -> Vec2 {
        Vec2::new(self.computed_width(node), self.computed_height(node))
    }

    pub fn computed_direction(&self, node: NodeId) -> Direction {
        self.layout(node).direction()
    }

    pub fn had_overflow(&self, node: NodeId) -> bool {
        self.layout(node).had_overflow()
    }

    /// Physical edge for a computed-layout query. Start and end follow the
    /// node's resolved direction; shorthand edges have no single value.
    fn layout_edge(&self, node: NodeId, edge: Edge) -> Option<PhysicalEdge> {
        let rtl = self.computed_direction(node) == Direction::Rtl;
        match edge {
            Edge::Left => Some(PhysicalEdge::Left),
            Edge::Top => Some(PhysicalEdge::Top),
            Edge::Right => Some(PhysicalEdge::Right),
            Edge::Bottom => Some(PhysicalEdge::Bottom),
            Edge::Start => Some(if rtl { PhysicalEdge::Right } else { PhysicalEdge::Left }),
            Edge::End => Some(if rtl { PhysicalEdge::Left } else { PhysicalEdge::Right }),
            Edge::Horizontal | Edge::Vertical | Edge::All => None,
        }
    }

    /// Computed margin, `UNDEFINED` for shorthand edges.
    pub fn computed_margin(&self, node: NodeId, edge: Edge) -> f32 {
        self.layout_edge(node, edge)
            .map_or(UNDEFINED, |edge| self.layout(node).margin(edge))
    }

    /// Computed padding, `UNDEFINED` for shorthand edges.
    pub fn computed_padding(&self, node: NodeId, edge: Edge) -> f32 {
        self.layout_edge(node, edge)
            .map_or(UNDEFINED, |edge| self.layout(node).padding(edge))
    }

    /// Computed border, `UNDEFINED` for shorthand edges.
    pub fn computed_border(&self, node: NodeId, edge: Edge) -> f32 {
        self.layout_edge(node, edge)
            .map_or(UNDEFINED, |edge| self.layout(node).border(edge))
    }

    /// Counters recorded by the most recent `calculate_layout` call.
    pub fn last_layout_stats(&self) -> LayoutStats {
        self.last_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Size;
    use std::cell::Cell;
    use tessera_core::{Errata, Value};

    #[test]
    fn test_insert_rejects_owned_child() {
        let mut tree = LayoutTree::new();
        let a = tree.new_node();
        let b = tree.new_node();
        let child = tree.new_node();
        tree.add_child(a, child).unwrap();

        assert!(matches!(tree.add_child(b, child), Err(TesseraError::ChildAlreadyHasOwner)));
        assert_eq!(tree.child_count(b).unwrap(), 0);
        assert_eq!(tree.parent(child).unwrap(), Some(a));
    }

    #[test]
    fn test_insert_rejects_measured_parent() {
        let mut tree = LayoutTree::new();
        let leaf = tree.new_node();
        let child = tree.new_node();
        tree.set_measure_func(leaf, Some(Box::new(|_, _, _, _| Size::new(1.0, 1.0)))).unwrap();

        assert!(matches!(tree.add_child(leaf, child), Err(TesseraError::MeasureFuncHasChildren)));
        assert_eq!(tree.parent(child).unwrap(), None);
    }

    #[test]
    fn test_measure_func_rejected_with_children() {
        let mut tree = LayoutTree::new();
        let parent = tree.new_node();
        let child = tree.new_node();
        tree.add_child(parent, child).unwrap();

        let result = tree.set_measure_func(parent, Some(Box::new(|_, _, _, _| Size::default())));
        assert!(matches!(result, Err(TesseraError::ChildrenPreventMeasureFunc)));
        assert!(!tree.has_measure_func(parent).unwrap());
    }

    #[test]
    fn test_insert_order() {
        let mut tree = LayoutTree::new();
        let parent = tree.new_node();
        let a = tree.new_node();
        let b = tree.new_node();
        let c = tree.new_node();
        tree.add_child(parent, a).unwrap();
        tree.add_child(parent, c).unwrap();
        tree.insert_child(parent, b, 1).unwrap();

        assert_eq!(tree.children(parent).unwrap(), &[a, b, c]);

        let d = tree.new_node();
        assert!(matches!(
            tree.insert_child(parent, d, 9),
            Err(TesseraError::ChildIndexOutOfBounds { index: 9, count: 3 })
        ));
    }

    #[test]
    fn test_remove_child_resets_layout() {
        let mut tree = LayoutTree::new();
        let parent = tree.new_node();
        let child = tree.new_node();
        tree.add_child(parent, child).unwrap();
        tree.nodes[child].layout.set_dimension(Dimension::Width, 10.0);
        tree.nodes[parent].is_dirty = false;

        tree.remove_child(parent, child).unwrap();
        assert_eq!(tree.parent(child).unwrap(), None);
        assert!(tree.computed_width(child).is_nan());
        assert!(tree.is_dirty(parent).unwrap());
    }

    #[test]
    fn test_dirty_propagation_stops_at_dirty_ancestor() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let mid = tree.new_node();
        let leaf = tree.new_node();
        tree.add_child(root, mid).unwrap();
        tree.add_child(mid, leaf).unwrap();
        for id in [root, mid, leaf] {
            tree.nodes[id].is_dirty = false;
        }

        // Root stays clean because mid is already dirty
        tree.nodes[mid].is_dirty = true;
        tree.update_style(leaf, |s| s.set_width(Value::Point(5.0))).unwrap();
        assert!(tree.is_dirty(leaf).unwrap());
        assert!(!tree.is_dirty(root).unwrap());
    }

    #[test]
    fn test_unchanged_style_does_not_dirty() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.update_style(node, |s| s.set_width(Value::Point(5.0))).unwrap();
        tree.nodes[node].is_dirty = false;

        tree.update_style(node, |s| s.set_width(Value::Point(5.0))).unwrap();
        assert!(!tree.is_dirty(node).unwrap());
    }

    #[test]
    fn test_dirtied_callback_fires_once() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.nodes[node].is_dirty = false;
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        tree.set_dirtied_func(node, Some(Box::new(move |_| counter.set(counter.get() + 1)))).unwrap();

        tree.update_style(node, |s| s.set_flex_grow(1.0)).unwrap();
        tree.update_style(node, |s| s.set_flex_grow(2.0)).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_mark_dirty_requires_measure_func() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        assert!(matches!(tree.mark_dirty(node), Err(TesseraError::MarkDirtyWithoutMeasureFunc)));
    }

    #[test]
    fn test_remove_node_orphans_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let node = tree.new_node();
        let child = tree.new_node();
        tree.add_child(root, node).unwrap();
        tree.add_child(node, child).unwrap();

        tree.remove_node(node).unwrap();
        assert!(!tree.contains(node));
        assert_eq!(tree.parent(child).unwrap(), None);
        assert_eq!(tree.child_count(root).unwrap(), 0);
    }

    #[test]
    fn test_remove_node_recursive() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        let grandchild = tree.new_node();
        tree.add_child(root, child).unwrap();
        tree.add_child(child, grandchild).unwrap();

        tree.remove_node_recursive(root).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_reset_requires_detached_node() {
        let mut tree = LayoutTree::new();
        let parent = tree.new_node();
        let child = tree.new_node();
        tree.add_child(parent, child).unwrap();
        assert!(matches!(tree.reset_node(child), Err(TesseraError::ResetAttachedNode)));

        tree.remove_child(parent, child).unwrap();
        tree.update_style(child, |s| s.set_width(Value::Point(3.0))).unwrap();
        tree.reset_node(child).unwrap();
        assert_eq!(tree.style(child).unwrap().width(), Value::Auto);
    }

    #[test]
    fn test_set_config_equivalent_keeps_cache() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        tree.nodes[node].is_dirty = false;

        let other = Rc::new(Config::new());
        other.set_point_scale_factor(2.0).unwrap();
        other.set_point_scale_factor(1.0).unwrap();
        tree.set_config(node, Rc::clone(&other)).unwrap();
        assert!(!tree.is_dirty(node).unwrap());
        assert_eq!(tree.layout(node).config_version, other.version());

        let legacy = Rc::new(Config::new());
        legacy.set_errata(Errata::CLASSIC);
        tree.set_config(node, legacy).unwrap();
        assert!(tree.is_dirty(node).unwrap());
        assert_eq!(tree.layout(node).config_version, 0);
    }

    #[test]
    fn test_set_config_rejects_web_default_change() {
        let mut tree = LayoutTree::new();
        let node = tree.new_node();
        let web = Rc::new(Config::new());
        web.set_use_web_defaults(true).unwrap();
        assert!(matches!(
            tree.set_config(node, web),
            Err(TesseraError::UseWebDefaultsMismatch)
        ));
    }

    #[test]
    fn test_insert_rejects_ancestor() {
        let mut tree = LayoutTree::new();
        let a = tree.new_node();
        let b = tree.new_node();
        let c = tree.new_node();
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();

        assert!(matches!(tree.add_child(c, a), Err(TesseraError::ChildIsAncestor)));
        let lone = tree.new_node();
        assert!(matches!(tree.add_child(lone, lone), Err(TesseraError::ChildIsAncestor)));
        assert_eq!(tree.child_count(lone).unwrap(), 0);
        assert_eq!(tree.child_count(c).unwrap(), 0);
        assert_eq!(tree.parent(a).unwrap(), None);
    }
}
