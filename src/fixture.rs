// src/fixture.rs
//! Textual layout fixtures.
//!
//! One node per line, nested by two spaces of indentation:
//!
//! ```text
//! node width=150 flex-direction=row align-items=baseline
//!   node width=50 height=50
//!   node width=50 height=40 baseline=0.5
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fmt::Write;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use tessera_layout::{Config, Dimension, Edge, Gutter, LayoutTree, NodeId, Size, Style, Value};

const INDENT: usize = 2;

/// A parsed fixture: the tree plus its nodes in document order.
#[derive(Debug)]
pub struct Fixture {
    pub tree: LayoutTree,
    pub root: NodeId,
    nodes: Vec<(NodeId, usize)>,
}

impl Fixture {
    pub fn parse(source: &str, config: Rc<Config>) -> Result<Self> {
        let mut tree = LayoutTree::with_config(config);
        let mut nodes = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root = None;

        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let indent = line.len() - trimmed.len();
            if indent % INDENT != 0 {
                bail!("line {}: indentation must be a multiple of {} spaces", line_number, INDENT);
            }
            let depth = indent / INDENT;
            if depth > stack.len() {
                bail!("line {}: nested too deep for its parent", line_number);
            }
            stack.truncate(depth);

            let node = parse_node(&mut tree, trimmed).with_context(|| format!("line {}", line_number))?;
            match stack.last() {
                Some(&parent) => tree
                    .add_child(parent, node)
                    .with_context(|| format!("line {}", line_number))?,
                None if root.is_none() => root = Some(node),
                None => bail!("line {}: a fixture has exactly one root node", line_number),
            }
            stack.push(node);
            nodes.push((node, depth));
        }

        let root = root.ok_or_else(|| anyhow!("fixture has no nodes"))?;
        Ok(Self { tree, root, nodes })
    }

    /// `left top width height` per node, indented like the source.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &(node, depth) in &self.nodes {
            let _ = writeln!(
                out,
                "{:indent$}{} {} {} {}",
                "",
                self.tree.computed_left(node),
                self.tree.computed_top(node),
                self.tree.computed_width(node),
                self.tree.computed_height(node),
                indent = depth * INDENT
            );
        }
        out
    }
}

fn parse_node(tree: &mut LayoutTree, line: &str) -> Result<NodeId> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("node") => {}
        Some(other) => bail!("expected `node`, found `{}`", other),
        None => bail!("empty node line"),
    }

    let node = tree.new_node();
    // Starts from the node's defaults so web defaults carry over
    let mut style = tree.style(node)?.clone();
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, found `{}`", token))?;
        match key {
            "measure" => {
                let size = parse_size(value)?;
                tree.set_measure_func(node, Some(Box::new(move |_, _, _, _| size)))?;
            }
            "baseline" => {
                let ratio = parse_number(value)?;
                tree.set_baseline_func(node, Some(Box::new(move |_, height| height * ratio)))?;
            }
            "reference-baseline" => tree.set_is_reference_baseline(node, parse_bool(value)?)?,
            "contains-absolute" => tree.set_always_forms_containing_block(node, parse_bool(value)?)?,
            _ => apply_style(&mut style, key, value).with_context(|| format!("in `{}`", token))?,
        }
    }
    tree.set_style(node, style)?;
    Ok(node)
}

fn apply_style(style: &mut Style, key: &str, value: &str) -> Result<()> {
    match key {
        "direction" => style.set_direction(value.parse()?),
        "flex-direction" => style.set_flex_direction(value.parse()?),
        "justify-content" => style.set_justify_content(value.parse()?),
        "align-content" => style.set_align_content(value.parse()?),
        "align-items" => style.set_align_items(value.parse()?),
        "align-self" => style.set_align_self(value.parse()?),
        "position" => style.set_position_type(value.parse()?),
        "flex-wrap" => style.set_flex_wrap(value.parse()?),
        "overflow" => style.set_overflow(value.parse()?),
        "display" => style.set_display(value.parse()?),
        "flex" => style.set_flex(parse_number(value)?),
        "flex-grow" => style.set_flex_grow(parse_number(value)?),
        "flex-shrink" => style.set_flex_shrink(parse_number(value)?),
        "flex-basis" => style.set_flex_basis(parse_value(value)?),
        "aspect-ratio" => style.set_aspect_ratio(parse_number(value)?),
        "width" => style.set_width(parse_value(value)?),
        "height" => style.set_height(parse_value(value)?),
        "gap" => style.set_gap(Gutter::All, parse_value(value)?),
        "row-gap" => style.set_gap(Gutter::Row, parse_value(value)?),
        "column-gap" => style.set_gap(Gutter::Column, parse_value(value)?),
        "margin" => style.set_margin(Edge::All, parse_value(value)?),
        "padding" => style.set_padding(Edge::All, parse_value(value)?),
        "border" => style.set_border(Edge::All, parse_value(value)?),
        _ => {
            if let Some(dimension) = key.strip_prefix("min-") {
                style.set_min_dimension(Dimension::from_str(dimension)?, parse_value(value)?);
            } else if let Some(dimension) = key.strip_prefix("max-") {
                style.set_max_dimension(Dimension::from_str(dimension)?, parse_value(value)?);
            } else if let Some(edge) = key.strip_prefix("margin-") {
                style.set_margin(edge.parse()?, parse_value(value)?);
            } else if let Some(edge) = key.strip_prefix("padding-") {
                style.set_padding(edge.parse()?, parse_value(value)?);
            } else if let Some(edge) = key.strip_prefix("border-") {
                style.set_border(edge.parse()?, parse_value(value)?);
            } else if let Ok(edge) = Edge::from_str(key) {
                style.set_position(edge, parse_value(value)?);
            } else {
                bail!("unknown property `{}`", key);
            }
        }
    }
    Ok(())
}

fn parse_value(value: &str) -> Result<Value> {
    Value::from_string(value).ok_or_else(|| anyhow!("invalid length `{}`", value))
}

fn parse_number(value: &str) -> Result<f32> {
    value.parse().with_context(|| format!("invalid number `{}`", value))
}

fn parse_bool(value: &str) -> Result<bool> {
    value.parse().with_context(|| format!("invalid boolean `{}`", value))
}

fn parse_size(value: &str) -> Result<Size> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| anyhow!("measure must be WIDTHxHEIGHT, found `{}`", value))?;
    Ok(Size::new(parse_number(width)?, parse_number(height)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_layout::{Direction, FlexDirection, PositionType, UNDEFINED};

    fn parse(source: &str) -> Result<Fixture> {
        Fixture::parse(source, Rc::new(Config::new()))
    }

    #[test]
    fn test_parse_nesting() {
        let fixture = parse("node width=100\n  node height=10\n    node\n  node\n").unwrap();
        let tree = &fixture.tree;
        let children = tree.children(fixture.root).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(tree.child_count(children[0]).unwrap(), 1);
        assert_eq!(tree.style(fixture.root).unwrap().width(), Value::Point(100.0));
    }

    #[test]
    fn test_parse_style_keys() {
        let fixture =
            parse("node flex-direction=row-reverse position=absolute margin-start=10% max-width=50 left=3\n").unwrap();
        let style = fixture.tree.style(fixture.root).unwrap();
        assert_eq!(style.flex_direction(), FlexDirection::RowReverse);
        assert_eq!(style.position_type(), PositionType::Absolute);
        assert_eq!(style.margin(Edge::Start), Value::Percent(10.0));
        assert_eq!(style.max_dimension(Dimension::Width), Value::Point(50.0));
        assert_eq!(style.position(Edge::Left), Value::Point(3.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("node\nnode\n").is_err());
        assert!(parse("node\n    node\n").is_err());
        assert!(parse("node\n node\n").is_err());
        assert!(parse("node width=wide\n").is_err());
        assert!(parse("node color=red\n").is_err());
        assert!(parse("box\n").is_err());
        assert!(parse("node measure=10\n").is_err());
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let fixture = parse("# header\n\nnode width=10 height=10\n  # child\n  node\n").unwrap();
        assert_eq!(fixture.tree.child_count(fixture.root).unwrap(), 1);
    }

    #[test]
    fn test_render_indents_like_source() {
        let mut fixture = parse("node width=100 height=20 flex-direction=row\n  node measure=30x10\n").unwrap();
        fixture.tree.calculate_layout(fixture.root, UNDEFINED, UNDEFINED, Direction::Ltr).unwrap();
        assert_eq!(fixture.render(), "0 0 100 20\n  0 0 30 20\n");
    }
}
