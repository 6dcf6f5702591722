use serde::{Deserialize, Serialize};

use crate::model::tree::{NodeId, NodeMap};

/// Structural events forwarded from the tree observer. The MRU tracker keeps
/// its per-node orderings in sync with these so its membership never diverges
/// from the visual child lists.
#[derive(Copy, Clone)]
pub enum TreeEvent {
    AddedToForest(NodeId),
    AddedToParent(NodeId),
    RemovingFromParent(NodeId),
    RemovedFromForest(NodeId),
}

/// Most-recently-used ordering over the direct children of every internal
/// node, most recently focused first.
///
/// Invariant: for any node with an entry here, the entry holds exactly the
/// same set of ids as the node's visual child list. Insertion and removal go
/// through [`Self::handle_event`] in the same observer callbacks that mutate
/// the visual list, so the two can never be observed out of sync.
#[derive(Default, Serialize, Deserialize)]
pub struct MruTracker {
    nodes: slotmap::SecondaryMap<NodeId, Vec<NodeId>>,
}

impl MruTracker {
    /// The most recently focused direct child, if any.
    pub fn most_recent_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|order| order.first().copied())
    }

    /// Recency order over `node`'s children, head first. Read-only; used by
    /// the debug walker and tests.
    pub fn mru_children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|order| order.as_slice()).unwrap_or(&[])
    }

    /// Records that `node` was focused: every ancestor promotes the child it
    /// was reached through to the front of its recency order. Idempotent, and
    /// never touches visual order.
    pub fn record_focus(&mut self, map: &NodeMap, node: NodeId) {
        for (child, parent) in node.ancestors_with_parent(map) {
            let Some(parent) = parent else { break };
            self.promote(parent, child);
        }
    }

    fn promote(&mut self, parent: NodeId, child: NodeId) {
        let Some(order) = self.nodes.get_mut(parent) else {
            debug_assert!(false, "promote on untracked parent {parent:?}");
            return;
        };
        let Some(idx) = order.iter().position(|&c| c == child) else {
            debug_assert!(false, "promote on child {child:?} missing from MRU of {parent:?}");
            return;
        };
        if idx != 0 {
            let child = order.remove(idx);
            order.insert(0, child);
        }
    }

    pub fn handle_event(&mut self, map: &NodeMap, event: TreeEvent) {
        use TreeEvent::*;
        match event {
            AddedToForest(node) => {
                self.nodes.insert(node, Vec::new());
            }
            // New children start least-recently-used. A focus-driven insert
            // is followed by record_focus, which promotes it.
            AddedToParent(node) => {
                let parent = node.parent(map).expect("added_to_parent on node without parent");
                self.nodes
                    .get_mut(parent)
                    .expect("parent not tracked; added_to_forest must precede added_to_parent")
                    .push(node);
            }
            RemovingFromParent(node) => {
                let parent =
                    node.parent(map).expect("removing_from_parent on node without parent");
                if let Some(order) = self.nodes.get_mut(parent) {
                    order.retain(|&c| c != node);
                }
            }
            RemovedFromForest(node) => {
                self.nodes.remove(node);
            }
        }
    }
}
