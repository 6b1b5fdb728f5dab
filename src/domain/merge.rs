//! Structural merge of yesterday's outline into today's.
//!
//! The destination (today's template) always wins ordering and structure.
//! The source (the carried-forward note) only contributes what the
//! destination lacks: unknown scopes are grafted in, and plain lines are
//! copied unless an identical line is already present.

use thiserror::Error;
use tracing::debug;

use super::outline::{Child, OutlineNode, is_checklist_label};

/// Errors that can occur when merging outlines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The two roots open different scopes, so neither can absorb the other.
    #[error("cannot merge scope {source_label:?} into differently labelled scope {destination_label:?}")]
    AmbiguousMerge {
        /// Label of the destination root.
        destination_label: Option<String>,
        /// Label of the source root.
        source_label: Option<String>,
    },
}

/// Merges `source` into `destination` in place.
///
/// Child nodes are matched by exact label text; when several siblings share
/// a label, the first one wins. Merging is not commutative.
///
/// New plain lines are inserted before the first child node of any kind,
/// heading or checklist item, so that they are not folded into that node
/// when the result is structurized again. New checklist items are inserted
/// before the first heading and other new nodes are appended. Indentation is
/// never rewritten: a new indented checklist item placed after a less
/// indented sibling becomes that sibling's child on the next structurize.
///
/// # Errors
///
/// Returns [`MergeError::AmbiguousMerge`] if the two roots have different
/// labels. `destination` is left untouched in that case.
pub fn merge(destination: &mut OutlineNode, source: OutlineNode) -> Result<(), MergeError> {
    if destination.label() != source.label() {
        return Err(MergeError::AmbiguousMerge {
            destination_label: destination.label().map(ToString::to_string),
            source_label: source.label().map(ToString::to_string),
        });
    }
    merge_children(destination, source);
    Ok(())
}

/// Merges `source` into `destination`, or places both side by side under a
/// new label-less root when their labels differ.
#[must_use]
pub fn merge_or_wrap(mut destination: OutlineNode, source: OutlineNode) -> OutlineNode {
    if destination.label() == source.label() {
        merge_children(&mut destination, source);
        return destination;
    }

    debug!(
        destination = ?destination.label(),
        source = ?source.label(),
        "root labels differ, wrapping both outlines"
    );
    OutlineNode::root()
        .with_node(destination)
        .with_node(source)
}

fn merge_children(destination: &mut OutlineNode, source: OutlineNode) {
    let (_, children) = source.into_parts();

    for child in children {
        match child {
            Child::Node(node) => {
                if let Some(existing) = destination.find_child_mut(node.label()) {
                    let before = existing.size();
                    merge_children(existing, node);
                    let grown = existing.size() - before;
                    destination.grow(grown);
                } else {
                    let size = node.size();
                    // Checklist items must stay above sub-headings, or the
                    // next structurize would fold them into the heading.
                    if is_checklist_label(&node) {
                        let position = first_heading(destination.children());
                        destination.children_mut().insert(position, Child::Node(node));
                    } else {
                        debug!(label = ?node.label(), "grafting carried scope");
                        destination.children_mut().push(Child::Node(node));
                    }
                    destination.grow(size);
                }
            }
            Child::Line(line) => {
                let duplicate = destination
                    .children()
                    .iter()
                    .any(|existing| matches!(existing, Child::Line(text) if *text == line));
                if duplicate {
                    continue;
                }
                // Plain lines after any scope would be folded into it.
                let position = first_scope(destination.children());
                destination.children_mut().insert(position, Child::Line(line));
                destination.grow(1);
            }
        }
    }
}

fn first_heading(children: &[Child]) -> usize {
    children
        .iter()
        .position(Child::is_heading_node)
        .unwrap_or(children.len())
}

fn first_scope(children: &[Child]) -> usize {
    children
        .iter()
        .position(Child::is_node)
        .unwrap_or(children.len())
}
