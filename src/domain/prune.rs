//! Removal of finished to-dos and empty headings.
//!
//! Pruning walks the outline post-order, so a heading only counts as empty
//! after everything beneath it has been pruned.

use tracing::debug;

use super::{
    line::{is_blank, is_checked, is_checklist, is_heading},
    outline::{Child, OutlineNode},
};

/// Controls what [`prune`] is allowed to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrunePolicy {
    /// Delete headings that contain nothing but whitespace.
    pub delete_empty_headings: bool,

    /// Only delete a checklist item once it and every checklist item beneath
    /// it are checked. Checked items nested under an unfinished parent are
    /// kept until the parent is finished too.
    pub keep_until_parent_complete: bool,
}

/// Prunes `node` in place according to `policy` and recomputes its size.
///
/// Checked checklist lines with no scope of their own are always deleted.
/// A checked checklist item with nested content survives for as long as any
/// non-blank part of that content does. Blank lines inside a deleted item
/// are kept in its place.
pub fn prune(node: &mut OutlineNode, policy: PrunePolicy) {
    prune_children(node, policy);
    node.recompute_size();
}

fn prune_children(node: &mut OutlineNode, policy: PrunePolicy) {
    let children = std::mem::take(node.children_mut());
    let mut kept = Vec::with_capacity(children.len());
    for child in children {
        prune_child(child, policy, &mut kept);
    }
    *node.children_mut() = kept;
}

/// Prunes `child`, pushing whatever survives of it onto `kept`.
fn prune_child(child: Child, policy: PrunePolicy, kept: &mut Vec<Child>) {
    let mut node = match child {
        Child::Line(line) if is_checked(&line) => return,
        Child::Line(line) => {
            kept.push(Child::Line(line));
            return;
        }
        Child::Node(node) => node,
    };

    let label = node.label().unwrap_or_default();
    let heading = is_heading(label);
    let checklist = is_checklist(label);
    let checked = is_checked(label);

    if checklist && policy.keep_until_parent_complete {
        if is_complete(&node) {
            debug!(label = node.label(), "dropping completed to-do");
            keep_blank_lines(node, kept);
        } else {
            drop_checked_lines(&mut node);
            kept.push(Child::Node(node));
        }
        return;
    }

    prune_children(&mut node, policy);

    if checked && !has_content(&node) {
        debug!(label = node.label(), "dropping checked to-do");
        keep_blank_lines(node, kept);
        return;
    }
    if heading && policy.delete_empty_headings && !has_content(&node) {
        debug!(label = node.label(), "dropping empty heading");
        return;
    }
    kept.push(Child::Node(node));
}

/// Moves the blank lines directly under a dropped node into its parent.
fn keep_blank_lines(node: OutlineNode, kept: &mut Vec<Child>) {
    let (_, children) = node.into_parts();
    kept.extend(
        children
            .into_iter()
            .filter(|child| matches!(child, Child::Line(line) if is_blank(line))),
    );
}

/// Whether `node` and every checklist item beneath it are checked.
fn is_complete(node: &OutlineNode) -> bool {
    node.label().is_some_and(is_checked)
        && node.children().iter().all(|child| match child {
            Child::Node(child) => is_complete(child),
            Child::Line(line) => !is_checklist(line) || is_checked(line),
        })
}

fn drop_checked_lines(node: &mut OutlineNode) {
    node.children_mut().retain_mut(|child| match child {
        Child::Line(line) => !is_checked(line),
        Child::Node(child) => {
            drop_checked_lines(child);
            true
        }
    });
}

fn has_content(node: &OutlineNode) -> bool {
    node.children().iter().any(|child| match child {
        Child::Node(_) => true,
        Child::Line(line) => !is_blank(line),
    })
}
