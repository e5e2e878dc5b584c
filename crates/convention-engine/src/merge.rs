//! Folding one convention subtree into another.
//!
//! Merging is ordered: the source is read-only and the target absorbs it.
//! A source description replaces the target's only when the source was
//! declared later (higher priority) or the target has none, so the result
//! for a position is the latest declaration no matter which order
//! alternatives arrive in.

use crate::tree::{ConventionNode, ConventionTree, NodeId};

/// Merges the subtree at `source_id` into the node `target_id`.
pub fn merge_into(
    target: &mut ConventionTree,
    target_id: NodeId,
    source: &ConventionTree,
    source_id: NodeId,
) {
    merge_payload(target.node_mut(target_id), source.node(source_id));

    for source_child in source.children(source_id) {
        let raw = &source.node(source_child).notation.raw;
        let target_child = target.child_or_insert(target_id, raw);
        merge_into(target, target_child, source, source_child);
    }
}

/// Merges `source` into `target` root to root.
pub fn merge_tree(target: &mut ConventionTree, source: &ConventionTree) {
    let root = target.root();
    merge_into(target, root, source, source.root());
}

/// Places `source` under `parent` at the position named by its root
/// notation, merging with whatever is already there.
pub fn graft(target: &mut ConventionTree, parent: NodeId, source: &ConventionTree) -> NodeId {
    let source_root = source.root();
    let position = target.child_or_insert(parent, &source.node(source_root).notation.raw);
    merge_into(target, position, source, source_root);
    position
}

pub(crate) fn merge_payload(target: &mut ConventionNode, source: &ConventionNode) {
    let source_wins = source.priority > target.priority;

    if source.has_description() && (source_wins || !target.has_description()) {
        target.description = source.description.clone();
        target.priority = source.priority;
        target.alertable = source.alertable;
        target.announceable = source.announceable;
        if source.alert_tag.is_some() {
            target.alert_tag = source.alert_tag.clone();
        }
    }

    if !source.steps.is_empty() && (source_wins || target.steps.is_empty()) {
        target.steps = source.steps.clone();
    }

    target.macros.extend_unique(&source.macros);
}
