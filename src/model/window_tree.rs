use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::collections::{BTreeMap, HashMap};
use crate::model::mru::{MruTracker, TreeEvent};
use crate::model::node::{LayoutKind, NodeKind};
use crate::model::tree::{self, NodeId, NodeMap, OwnedNode, Tree};
use crate::sys::app::WindowId;

/// The window tree: workspaces at the roots, containers inside, windows at
/// the leaves. Every internal node carries an MRU ordering over its direct
/// children, maintained through tree observer events so it can never diverge
/// from the visual child list.
#[derive(Default, Serialize, Deserialize)]
pub struct WindowTree {
    tree: Tree<Components>,
    workspaces: BTreeMap<String, OwnedNode>,
    windows: HashMap<WindowId, NodeId>,
}

#[derive(Default, Serialize, Deserialize)]
struct Components {
    kinds: slotmap::SecondaryMap<NodeId, NodeKind>,
    mru: MruTracker,
}

impl tree::Observer for Components {
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.mru.handle_event(map, TreeEvent::AddedToForest(node));
    }

    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.mru.handle_event(map, TreeEvent::AddedToParent(node));
    }

    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId) {
        self.mru.handle_event(map, TreeEvent::RemovingFromParent(node));
    }

    fn removed_child(tree: &mut Tree<Self>, parent: NodeId) {
        // Empty containers are pruned as soon as they lose their last child.
        // Workspaces stay; they are allowed to be empty.
        if matches!(tree.data.kinds.get(parent), Some(NodeKind::Container { .. }))
            && parent.is_empty(&tree.map)
        {
            parent.detach(tree).remove();
        }
    }

    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId) {
        self.mru.handle_event(map, TreeEvent::RemovedFromForest(node));
        self.kinds.remove(node);
    }
}

impl Default for Tree<Components> {
    fn default() -> Self {
        Tree::with_observer(Components::default())
    }
}

impl Drop for WindowTree {
    fn drop(&mut self) {
        // Workspace roots are owned; release them so the OwnedNode guard is
        // satisfied when the whole tree goes away.
        for (_, mut root) in std::mem::take(&mut self.workspaces) {
            root.remove(&mut self.tree);
        }
    }
}

impl WindowTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self) -> &NodeMap {
        &self.tree.map
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.tree.data.kinds.get(node)
    }

    /// Workspaces in stable alphabetical order.
    pub fn workspaces(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.workspaces.iter().map(|(name, root)| (name.as_str(), root.id()))
    }

    pub fn workspace(&self, name: &str) -> Option<NodeId> {
        self.workspaces.get(name).map(|root| root.id())
    }

    pub fn window_node(&self, wid: WindowId) -> Option<NodeId> {
        self.windows.get(&wid).copied()
    }

    /// The workspace root above `node`.
    pub fn workspace_of(&self, node: NodeId) -> Option<NodeId> {
        node.ancestors(&self.tree.map)
            .find(|&n| matches!(self.kind(n), Some(NodeKind::Workspace { .. })))
    }

    pub fn workspace_name(&self, node: NodeId) -> Option<&str> {
        match self.kind(self.workspace_of(node)?)? {
            NodeKind::Workspace { name } => Some(name),
            _ => None,
        }
    }

    pub fn create_workspace(&mut self, name: &str) -> NodeId {
        if let Some(existing) = self.workspaces.get(name) {
            warn!(?name, "workspace already exists");
            return existing.id();
        }
        let root = self.tree.mk_node().make_root(name);
        let id = root.id();
        self.tree.data.kinds.insert(id, NodeKind::Workspace { name: name.to_owned() });
        self.workspaces.insert(name.to_owned(), root);
        id
    }

    pub fn remove_workspace(&mut self, name: &str) -> bool {
        let Some(mut root) = self.workspaces.remove(name) else {
            return false;
        };
        let root_id = root.id();
        self.windows.retain(|_, &mut node| {
            !node.ancestors(&self.tree.map).any(|a| a == root_id)
        });
        root.remove(&mut self.tree);
        true
    }

    pub fn add_container(&mut self, parent: NodeId, layout: LayoutKind) -> NodeId {
        debug_assert!(
            !matches!(self.kind(parent), Some(NodeKind::Window { .. })),
            "cannot nest under a window leaf"
        );
        let node = self.tree.mk_node().push_back(parent);
        self.tree.data.kinds.insert(node, NodeKind::container(layout));
        node
    }

    /// Inserts a window at the back of `parent`'s visual and MRU orders. A
    /// focus-driven insertion is expected to be followed by
    /// [`Self::record_focus`].
    pub fn add_window(&mut self, parent: NodeId, wid: WindowId, is_floating: bool) -> NodeId {
        debug_assert!(
            !self.windows.contains_key(&wid),
            "window {wid} is already tracked"
        );
        let node = self.tree.mk_node().push_back(parent);
        self.tree.data.kinds.insert(node, NodeKind::Window { wid, is_floating });
        self.windows.insert(wid, node);
        node
    }

    /// Splices the window out of both of its parent's orderings. Containers
    /// emptied by the removal are pruned.
    pub fn remove_window(&mut self, wid: WindowId) -> bool {
        let Some(node) = self.windows.remove(&wid) else {
            return false;
        };
        node.detach(&mut self.tree).remove();
        true
    }

    /// Moves a node (and subtree) under a new parent, at the back of both
    /// orderings.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        node.detach(&mut self.tree).push_back(new_parent);
    }

    /// Bubbles a focus event from the window up to its workspace root.
    pub fn record_focus(&mut self, wid: WindowId) -> bool {
        let Some(node) = self.window_node(wid) else {
            warn!(%wid, "record_focus for untracked window");
            return false;
        };
        self.tree.data.mru.record_focus(&self.tree.map, node);
        true
    }

    /// Descends from `node` through the head of each level's MRU order until
    /// a window leaf is reached. Returns `None` if any level is empty.
    pub fn most_recent_window_recursive(&self, node: NodeId) -> Option<WindowId> {
        let mut current = node;
        loop {
            if let Some(wid) = self.kind(current).and_then(NodeKind::window_id) {
                return Some(wid);
            }
            current = self.tree.data.mru.most_recent_child(current)?;
        }
    }

    /// Recency order over `node`'s children, head first. Read-only.
    pub fn mru_children(&self, node: NodeId) -> &[NodeId] {
        self.tree.data.mru.mru_children(node)
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.tree.map)
    }
}
