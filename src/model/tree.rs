use std::ops::{Deref, DerefMut, Index, IndexMut};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// N-ary forest. Multiple roots can live in the same map, which keeps
/// reparenting a branch between workspaces cheap.
#[derive(Serialize, Deserialize)]
pub struct Tree<O> {
    pub map: NodeMap,
    pub data: O,
}

impl<O: Observer> Tree<O> {
    pub fn with_observer(data: O) -> Self {
        Tree { map: NodeMap::new(), data }
    }

    pub fn mk_node(&mut self) -> UnattachedNode<'_, O> {
        let id = self.map.map.insert(Node::default());
        self.data.added_to_forest(&self.map, id);
        UnattachedNode { id, tree: self }
    }
}

/// Map that holds the structure of the forest.
#[derive(Serialize, Deserialize)]
pub struct NodeMap {
    map: SlotMap<NodeId, Node>,
}

impl NodeMap {
    fn new() -> NodeMap {
        NodeMap { map: SlotMap::default() }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.map.contains_key(id)
    }
}

impl Index<NodeId> for NodeMap {
    type Output = Node;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.map[index]
    }
}

impl IndexMut<NodeId> for NodeMap {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.map[index]
    }
}

/// Visual order of children is insertion order. The MRU order lives in a
/// separate component and only ever reorders the same membership.
#[derive(Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

slotmap::new_key_type! {
    /// Represents a node somewhere in the forest.
    pub struct NodeId;
}

/// Represents ownership of a root node.
///
/// Roots must be removed manually, because removal requires a reference to
/// the tree. If a value of this type is dropped without [`OwnedNode::remove`]
/// being called, it panics in debug builds. Every `OwnedNode` has a name used
/// in the panic message.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnedNode(Option<NodeId>, String);

impl OwnedNode {
    /// Creates a new root node.
    pub fn new_root_in(tree: &mut Tree<impl Observer>, name: &str) -> Self {
        let node = tree.mk_node();
        Self::own(node.id, name)
    }

    pub fn own(node: NodeId, name: &str) -> Self {
        OwnedNode(Some(node), name.to_owned())
    }

    pub fn id(&self) -> NodeId {
        self.0.expect("OwnedNode::id called on removed OwnedNode")
    }

    pub fn is_removed(&self) -> bool {
        self.0.is_none()
    }

    #[track_caller]
    pub fn remove(&mut self, tree: &mut Tree<impl Observer>) {
        if let Some(id) = self.0.take() {
            UnattachedNode { id, tree }.remove()
        }
    }
}

impl Deref for OwnedNode {
    type Target = NodeId;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref().expect("OwnedNode deref on removed OwnedNode")
    }
}

impl DerefMut for OwnedNode {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut().expect("OwnedNode deref_mut on removed OwnedNode")
    }
}

impl Drop for OwnedNode {
    fn drop(&mut self) {
        if cfg!(debug_assertions) {
            if let Some(node) = self.0 {
                panic!(
                    "OwnedNode {name:?} dropped without OwnedNode::remove being called: {node:?}",
                    name = self.1,
                );
            }
        }
    }
}

impl NodeId {
    #[track_caller]
    pub fn detach<'a, O: Observer>(self, tree: &'a mut Tree<O>) -> DetachedNode<'a, O> {
        DetachedNode { id: self, tree }
    }

    pub fn parent(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.parent)
    }

    pub fn children(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        map.map.get(self).map(|n| n.children.as_slice()).unwrap_or(&[]).iter().copied()
    }

    pub fn first_child(self, map: &NodeMap) -> Option<NodeId> {
        map.map.get(self).and_then(|n| n.children.first().copied())
    }

    pub fn is_empty(self, map: &NodeMap) -> bool {
        map.map.get(self).map(|n| n.children.is_empty()).unwrap_or(true)
    }

    /// Returns an iterator over all ancestors of the current node, including
    /// itself.
    pub fn ancestors(self, map: &NodeMap) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| map.map.get(n).and_then(|nd| nd.parent));
            node
        })
    }

    /// Like [`Self::ancestors`], but yields each node together with its
    /// parent. This is the shape the MRU promotion walk wants.
    pub fn ancestors_with_parent(
        self,
        map: &NodeMap,
    ) -> impl Iterator<Item = (NodeId, Option<NodeId>)> + '_ {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let node = next;
            next = node.and_then(|n| map.map.get(n).and_then(|nd| nd.parent));
            node.map(|n| (n, next))
        })
    }

    fn link_under_back(self, parent: NodeId, map: &mut NodeMap) {
        if self == parent || !map.contains(self) || !map.contains(parent) {
            return;
        }
        map.map[self].parent = Some(parent);
        map.map[parent].children.push(self);
    }

    #[track_caller]
    fn link_before(self, sibling: NodeId, map: &mut NodeMap) {
        let parent = sibling
            .parent(map)
            .expect("cannot make a sibling of a root node or invalid sibling");
        if self == sibling || !map.contains(self) {
            return;
        }
        map.map[self].parent = Some(parent);
        let children = &mut map.map[parent].children;
        let idx = children
            .iter()
            .position(|&c| c == sibling)
            .expect("sibling not present in its parent's child list");
        children.insert(idx, self);
    }
}

/// Synchronizes auxiliary per-node state with structural mutation.
///
/// `removing_from_parent` fires while the child is still linked, so handlers
/// can still see the old parent. `removed_child` fires on the parent after
/// the unlink completes and may mutate the tree further (e.g. prune).
pub trait Observer
where Self: Sized
{
    fn added_to_forest(&mut self, map: &NodeMap, node: NodeId);
    fn added_to_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removing_from_parent(&mut self, map: &NodeMap, node: NodeId);
    fn removed_child(tree: &mut Tree<Self>, parent: NodeId);
    fn removed_from_forest(&mut self, map: &NodeMap, node: NodeId);
}

impl Observer for () {
    fn added_to_forest(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn added_to_parent(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn removing_from_parent(&mut self, _map: &NodeMap, _node: NodeId) {}

    fn removed_child(_tree: &mut Tree<Self>, _parent: NodeId) {}

    fn removed_from_forest(&mut self, _map: &NodeMap, _node: NodeId) {}
}

#[must_use = "Unattached nodes should be inserted into the tree or made a root with OwnedNode"]
pub struct UnattachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> UnattachedNode<'a, O> {
    pub fn make_root(self, name: &str) -> OwnedNode {
        OwnedNode::own(self.id, name)
    }

    #[track_caller]
    pub fn push_back(self, parent: NodeId) -> NodeId {
        self.attach_with(|this| this.id.link_under_back(parent, &mut this.tree.map))
    }

    #[track_caller]
    pub fn insert_before(self, sibling: NodeId) -> NodeId {
        self.attach_with(|this| this.id.link_before(sibling, &mut this.tree.map))
    }

    #[track_caller]
    pub fn remove(self) {
        debug_assert!(self.id.parent(&self.tree.map).is_none());
        if let Some(node) = self.tree.map.map.remove(self.id) {
            node.delete_recursive(self.tree, self.id);
        }
    }

    fn attach_with(mut self, attach: impl FnOnce(&mut Self)) -> NodeId {
        attach(&mut self);
        self.tree.data.added_to_parent(&self.tree.map, self.id);
        self.id
    }
}

#[must_use = "Detached nodes should be reattached to the tree or removed"]
pub struct DetachedNode<'a, O> {
    id: NodeId,
    tree: &'a mut Tree<O>,
}

impl<'a, O: Observer> DetachedNode<'a, O> {
    /// Moves this node (and its subtree) under a new parent, appending it at
    /// the back of the visual child list.
    #[track_caller]
    pub fn push_back(self, new_parent: NodeId) -> NodeId {
        let old_parent = self.id.parent(&self.tree.map);
        if old_parent.is_some() && old_parent != Some(new_parent) {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
        }
        self.tree.map.unlink(self.id);
        self.id.link_under_back(new_parent, &mut self.tree.map);
        if old_parent != Some(new_parent) {
            self.tree.data.added_to_parent(&self.tree.map, self.id);
        }
        if let Some(old) = old_parent {
            if old != new_parent {
                O::removed_child(self.tree, old);
            }
        }
        self.id
    }

    /// Removes this node and its whole subtree from the forest.
    #[track_caller]
    pub fn remove(self) {
        let parent = self.id.parent(&self.tree.map);
        if parent.is_some() {
            self.tree.data.removing_from_parent(&self.tree.map, self.id);
        }
        self.tree.map.unlink(self.id);
        if let Some(node) = self.tree.map.map.remove(self.id) {
            node.delete_recursive(self.tree, self.id);
        }
        if let Some(parent) = parent {
            O::removed_child(self.tree, parent);
        }
    }
}

impl NodeMap {
    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.map.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.map.get_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.map.get_mut(id) {
            node.parent = None;
        }
    }
}

impl Node {
    fn delete_recursive(&self, cx: &mut Tree<impl Observer>, id: NodeId) {
        cx.data.removed_from_forest(&cx.map, id);
        for &child in &self.children {
            if let Some(node) = cx.map.map.remove(child) {
                node.delete_recursive(cx, child);
            }
        }
    }
}
