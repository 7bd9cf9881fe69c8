// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node, in insertion order.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// An iterator from a node's parent up to its root.
///
/// Created by [`NodeStore::ancestors`]. Does not yield the starting node.
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a NodeStore,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(store: &'a NodeStore, start: u32) -> Self {
        Self {
            store,
            current: store.parent[start as usize],
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.parent[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// A depth-first pre-order walk of a subtree, starting with its root.
///
/// Created by [`NodeStore::descendants`]. Uses an explicit stack, so deep
/// trees do not grow the call stack.
#[derive(Debug)]
pub struct Descendants<'a> {
    store: &'a NodeStore,
    stack: Vec<u32>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(store: &'a NodeStore, root: u32) -> Self {
        let mut stack = Vec::new();
        stack.push(root);
        Self { store, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        // Push children in reverse so the first child is visited next.
        let mark = self.stack.len();
        let mut child = self.store.first_child[idx as usize];
        while child != INVALID {
            self.stack.push(child);
            child = self.store.next_sibling[child as usize];
        }
        self.stack[mark..].reverse();
        Some(self.store.id_at(idx))
    }
}
