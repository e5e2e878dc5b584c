//! Removing positions that are not legal auctions or that say nothing.

use crate::tree::{ConventionTree, NodeId, NodeKey};
use bridge_core::AuctionState;
use tracing::debug;

/// Prunes `tree` in place and returns the number of nodes removed.
///
/// Walks post-order with the auction state threaded down, so each position
/// is checked once against the calls that lead to it. A child is removed if
/// its call is illegal at that point, if it never resolved to a concrete
/// call, or if after pruning its own children it has neither a description
/// nor children left. Running it twice removes nothing the second time.
pub fn prune(tree: &mut ConventionTree) -> usize {
    let root = tree.root();
    prune_children(tree, root, AuctionState::new())
}

fn prune_children(tree: &mut ConventionTree, id: NodeId, state: AuctionState) -> usize {
    let mut removed = 0;
    let children: Vec<NodeId> = tree.children(id).collect();

    for child in children {
        let key = tree.node(child).key();
        let call = match &key {
            NodeKey::Call(call) => *call,
            NodeKey::Pending(raw) => {
                debug!(sequence = %tree.sequence_string(child), raw = %raw, "pruned unresolved notation");
                removed += detach(tree, id, &key, child);
                continue;
            }
        };

        let mut next = state;
        if let Err(reason) = next.apply(call) {
            debug!(sequence = %tree.sequence_string(child), %reason, "pruned illegal call");
            removed += detach(tree, id, &key, child);
            continue;
        }

        removed += prune_children(tree, child, next);

        let node = tree.node(child);
        if !node.has_description() && !node.has_children() {
            debug!(sequence = %tree.sequence_string(child), "pruned empty position");
            removed += detach(tree, id, &key, child);
        }
    }
    removed
}

fn detach(tree: &mut ConventionTree, parent: NodeId, key: &NodeKey, child: NodeId) -> usize {
    let size = tree.descendants(child).len();
    tree.remove_child(parent, key);
    size
}
