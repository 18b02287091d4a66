// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena tree of event-dispatching nodes.

use alloc::rc::Rc;
use alloc::vec::Vec;

use super::dispatcher::Dispatcher;
use super::id::{INVALID, NodeId};
use super::traverse::{Ancestors, Children};
use super::tree::EventTree;

/// Arena storage for a tree of nodes, each with its own [`Dispatcher`].
///
/// Nodes are addressed by [`NodeId`] handles. Topology lives in parallel
/// arrays (parent, first child, sibling links); destroyed slots are recycled
/// through a free list, and generation counters make stale handles fail
/// loudly instead of aliasing a newer node.
///
/// `NodeStore` implements [`EventTree`], so events dispatched on a node
/// propagate through its ancestors.
#[derive(Debug, Default)]
pub struct NodeStore {
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    dispatchers: Vec<Rc<Dispatcher<NodeId>>>,
    pub(crate) generation: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,
}

impl NodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Creates a parentless node with no listeners.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.dispatchers[i] = Rc::new(Dispatcher::new());
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.dispatchers.push(Rc::new(Dispatcher::new()));
            self.generation.push(0);
            idx
        };
        self.id_at(idx)
    }

    /// Destroys a node, dropping its listeners and freeing its slot.
    ///
    /// A node still attached to a parent is detached first.
    ///
    /// # Panics
    ///
    /// Panics if the node has children or the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        self.dispatchers[idx as usize].remove_all_listeners(None);
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Appends `child` to `parent`'s children.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, `child` already has a parent, or
    /// `parent` is `child` or one of its descendants.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        self.assert_acyclic(parent.idx, child.idx);
        self.link_last(parent.idx, child.idx);
    }

    /// Detaches `child` from its parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "node has no parent"
        );
        self.unlink_from_parent(child.idx);
    }

    /// Moves `child` to the end of `new_parent`'s children, detaching it from
    /// its current parent if it has one.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `new_parent` is `child` or one of
    /// its descendants.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        self.assert_acyclic(new_parent.idx, child.idx);
        if self.parent[child.idx as usize] != INVALID {
            self.unlink_from_parent(child.idx);
        }
        self.link_last(new_parent.idx, child.idx);
    }

    /// The parent of a node, if any.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Direct children of a node, in insertion order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Ancestors of a node, nearest first, not including the node itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// All live parentless nodes, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| {
                self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx)
            })
            .map(|idx| self.id_at(idx))
            .collect()
    }

    /// The listener tables of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn listeners(&self, id: NodeId) -> &Dispatcher<NodeId> {
        self.validate(id);
        &self.dispatchers[id.idx as usize]
    }

    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn assert_acyclic(&self, parent: u32, child: u32) {
        let mut cursor = parent;
        while cursor != INVALID {
            assert!(cursor != child, "node cannot become its own ancestor");
            cursor = self.parent[cursor as usize];
        }
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
            return;
        }
        let mut last = self.first_child[p as usize];
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        self.next_sibling[last as usize] = c;
        self.prev_sibling[c as usize] = last;
    }

    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}

impl EventTree for NodeStore {
    type Key = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Self::parent(self, node)
    }

    fn dispatcher(&self, node: NodeId) -> Option<Rc<Dispatcher<NodeId>>> {
        self.validate(node);
        Some(Rc::clone(&self.dispatchers[node.idx as usize]))
    }

    fn has_listener(&self, node: NodeId, event_type: &str) -> bool {
        self.listeners(node).has_listener(event_type)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::event::{Event, Listener};

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert!(store.is_alive(id));
        assert_eq!(store.live_count(), 1);
        store.destroy_node(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut store = NodeStore::new();
        let old = store.create_node();
        store.destroy_node(old);
        let new = store.create_node();
        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert!(!store.is_alive(old));
        assert!(store.is_alive(new));
    }

    #[test]
    fn reused_slot_starts_without_listeners() {
        let mut store = NodeStore::new();
        let old = store.create_node();
        store.listeners(old).add_listener("x", Listener::new(|_| {}), false);
        store.destroy_node(old);
        let new = store.create_node();
        assert!(!store.has_listener(new, "x"));
    }

    #[test]
    fn children_in_insertion_order() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        store.add_child(parent, a);
        store.add_child(parent, b);

        assert_eq!(store.children(parent).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(store.parent(b), Some(parent));
    }

    #[test]
    fn remove_middle_child_relinks_siblings() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        store.add_child(parent, a);
        store.add_child(parent, b);
        store.add_child(parent, c);

        store.remove_from_parent(b);
        assert_eq!(store.children(parent).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(store.parent(b), None);
    }

    #[test]
    fn reparent_moves_subtree() {
        let mut store = NodeStore::new();
        let p1 = store.create_node();
        let p2 = store.create_node();
        let child = store.create_node();
        let grandchild = store.create_node();
        store.add_child(p1, child);
        store.add_child(child, grandchild);

        store.reparent(child, p2);
        assert!(store.children(p1).next().is_none());
        assert_eq!(
            store.ancestors(grandchild).collect::<Vec<_>>(),
            vec![child, p2]
        );
    }

    #[test]
    fn roots_are_parentless_live_nodes() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        let gone = store.create_node();
        store.add_child(a, c);
        store.destroy_node(gone);

        assert_eq!(store.roots(), vec![a, b]);
    }

    #[test]
    fn destroyed_node_leaves_parent() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.destroy_node(child);
        assert!(store.children(parent).next().is_none());
    }

    #[test]
    fn dispatch_through_store() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let leaf = store.create_node();
        store.add_child(root, leaf);
        store.listeners(root).add_listener(
            "x",
            Listener::new(|e: &mut Event<NodeId>| {
                e.prevent_default();
            }),
            false,
        );

        assert!(!store.dispatch_type(leaf, "x", true, true));
        assert!(store.dispatch_type(leaf, "x", false, true));
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn double_attach_panics() {
        let mut store = NodeStore::new();
        let p1 = store.create_node();
        let p2 = store.create_node();
        let child = store.create_node();
        store.add_child(p1, child);
        store.add_child(p2, child);
    }

    #[test]
    #[should_panic(expected = "node cannot become its own ancestor")]
    fn reparent_under_descendant_panics() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        store.add_child(a, b);
        store.reparent(a, b);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn stale_handle_panics_on_listeners() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.destroy_node(id);
        let _ = store.listeners(id);
    }
}
