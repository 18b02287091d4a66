// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Iterators over [`NodeStore`] topology.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// Direct children of a node, in insertion order.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    next: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self { store, next: first }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next == INVALID {
            return None;
        }
        let idx = self.next;
        self.next = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// A node's ancestors, nearest first.
///
/// Created by [`NodeStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a NodeStore,
    next: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self { store, next: first }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next == INVALID {
            return None;
        }
        let idx = self.next;
        self.next = self.store.parent[idx as usize];
        Some(self.store.id_at(idx))
    }
}
