//! Nested outlines reconstructed from flat document text.
//!
//! An [`OutlineNode`] owns the lines inside a heading's or checklist item's
//! fold scope. [`structurize`] builds the tree in a single left-to-right pass
//! and [`destructure`] flattens it again; the two are exact inverses for any
//! line sequence.

use super::line::{checklist_level, heading_level, is_checklist, is_heading};

/// An entry in an [`OutlineNode`]'s children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// A nested fold scope.
    Node(OutlineNode),
    /// A line that opens no scope of its own.
    Line(String),
}

impl Child {
    /// The number of source lines this child accounts for.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Node(node) => node.size,
            Self::Line(_) => 1,
        }
    }

    /// Returns the nested node, if this child is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&OutlineNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Line(_) => None,
        }
    }

    /// Whether this child is a node labelled by a heading.
    #[must_use]
    pub fn is_heading_node(&self) -> bool {
        self.as_node()
            .and_then(OutlineNode::label)
            .is_some_and(is_heading)
    }

    /// Whether this child is a node labelled by a heading or checklist item.
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }
}

/// A fold scope: the label line that opens it and everything it contains.
///
/// `size` always equals one for the label (if any) plus the sizes of all
/// children, where a [`Child::Line`] counts as one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineNode {
    label: Option<String>,
    children: Vec<Child>,
    size: usize,
}

impl OutlineNode {
    /// Creates the synthetic, label-less root of an outline.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            label: None,
            children: Vec::new(),
            size: 0,
        }
    }

    /// Creates an empty scope opened by `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            children: Vec::new(),
            size: 1,
        }
    }

    /// Appends a plain line, keeping `size` in step.
    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.push_line(line);
        self
    }

    /// Appends a nested node, keeping `size` in step.
    #[must_use]
    pub fn with_node(mut self, node: Self) -> Self {
        self.push_node(node);
        self
    }

    /// Appends a plain line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.children.push(Child::Line(line.into()));
        self.size += 1;
    }

    /// Appends a nested node.
    pub fn push_node(&mut self, node: Self) {
        self.size += node.size;
        self.children.push(Child::Node(node));
    }

    /// The line that opens this scope, or `None` for the root.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The ordered contents of this scope.
    #[must_use]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Child> {
        &mut self.children
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Vec<Child>) {
        (self.label, self.children)
    }

    /// The number of source lines in this subtree, label included.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn grow(&mut self, lines: usize) {
        self.size += lines;
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the first child node labelled exactly `label`.
    ///
    /// Sibling labels are assumed unique; when they are not, the first match
    /// wins.
    #[must_use]
    pub fn find_child(&self, label: &str) -> Option<&Self> {
        self.children
            .iter()
            .filter_map(Child::as_node)
            .find(|node| node.label() == Some(label))
    }

    pub(crate) fn find_child_mut(&mut self, label: Option<&str>) -> Option<&mut Self> {
        self.children.iter_mut().find_map(|child| match child {
            Child::Node(node) if node.label.as_deref() == label => Some(node),
            _ => None,
        })
    }

    /// Recomputes `size` for this node and all of its descendants.
    pub fn recompute_size(&mut self) -> usize {
        let mut size = usize::from(self.label.is_some());
        for child in &mut self.children {
            size += match child {
                Child::Node(node) => node.recompute_size(),
                Child::Line(_) => 1,
            };
        }
        self.size = size;
        size
    }

    /// Flattens this subtree back into lines.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        destructure(self)
    }
}

/// Builds an outline from `lines` according to fold scope.
///
/// `label` is the line that opened the scope being built; pass `None` for a
/// whole document. Scanning stops at the first line that closes the scope:
/// a heading of equal or lesser level, any heading inside a checklist item,
/// or a checklist item of equal or lesser indentation. The returned node's
/// `size` tells the caller how many lines were consumed.
#[must_use]
pub fn structurize(lines: &[String], label: Option<&str>) -> OutlineNode {
    let (heading, checklist) = label.map_or((0, 0), |label| {
        (heading_level(label), checklist_level(label))
    });
    let in_checklist = checklist > 0;

    let mut node = label.map_or_else(OutlineNode::root, |label| OutlineNode::new(label));
    let mut index = 0;
    while let Some(line) = lines.get(index) {
        let line_heading = heading_level(line);
        let line_checklist = checklist_level(line);

        if line_heading > 0 && (in_checklist || line_heading <= heading) {
            break;
        }
        if line_checklist > 0 && line_checklist <= checklist {
            break;
        }

        if line_heading > 0 || line_checklist > 0 {
            let child = structurize(&lines[index + 1..], Some(line));
            index += child.size;
            node.push_node(child);
        } else {
            node.push_line(line.clone());
            index += 1;
        }
    }
    node
}

/// Flattens an outline into lines, pre-order.
#[must_use]
pub fn destructure(node: &OutlineNode) -> Vec<String> {
    let mut lines = Vec::with_capacity(node.size);
    flatten_into(node, &mut lines);
    lines
}

fn flatten_into(node: &OutlineNode, lines: &mut Vec<String>) {
    if let Some(label) = &node.label {
        lines.push(label.clone());
    }
    for child in &node.children {
        match child {
            Child::Node(child) => flatten_into(child, lines),
            Child::Line(line) => lines.push(line.clone()),
        }
    }
}

/// Whether `node` is opened by a checklist item.
pub(crate) fn is_checklist_label(node: &OutlineNode) -> bool {
    node.label().is_some_and(is_checklist)
}
