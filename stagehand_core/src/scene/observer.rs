// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits invoked by the scene.
//!
//! [`SceneObserver`] receives one call per structural or transform change.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine. Every method is handed the [`NodeStore`] so the
//! observer can read current state; world translations and eager properties
//! are already up to date when a call arrives.
//!
//! [`IdentifierRegistry`] answers whether a label is taken. The scene never
//! enforces uniqueness itself.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::string::String;

use crate::node::{NodeId, NodeStore};
use crate::property::PropertyKind;

/// Receiver of scene notifications.
///
/// Calls are synchronous and happen in mutation order. An observer cannot
/// mutate the scene from inside a callback.
pub trait SceneObserver {
    /// `node` was attached under a parent by
    /// [`add_node`](super::SceneGraph::add_node) or a reparent.
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        _ = (nodes, node);
    }

    /// `node` was detached from its parent. Its subtree is left intact.
    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        _ = (nodes, node);
    }

    /// `node` moved under `new_parent`.
    ///
    /// Follows the `node_removed`/`node_added` pair of the same move.
    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        _ = (nodes, node, new_parent);
    }

    /// The local transform of `node` changed.
    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        _ = (nodes, node);
    }

    /// The value of `property` on `node` changed.
    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        _ = (nodes, node, property);
    }
}

/// An observer that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SceneObserver for NoopObserver {}

impl<T: SceneObserver + ?Sized> SceneObserver for &mut T {
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        (**self).node_added(nodes, node);
    }

    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        (**self).node_removed(nodes, node);
    }

    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        (**self).node_reparented(nodes, node, new_parent);
    }

    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        (**self).node_transform_changed(nodes, node);
    }

    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        (**self).property_changed(nodes, node, property);
    }
}

impl<T: SceneObserver + ?Sized> SceneObserver for Box<T> {
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        (**self).node_added(nodes, node);
    }

    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        (**self).node_removed(nodes, node);
    }

    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        (**self).node_reparented(nodes, node, new_parent);
    }

    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        (**self).node_transform_changed(nodes, node);
    }

    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        (**self).property_changed(nodes, node, property);
    }
}

/// Answers whether a candidate identifier is already taken.
pub trait IdentifierRegistry {
    /// Returns `true` if `candidate` is in use.
    fn is_identifier_used(&self, candidate: &str) -> bool;
}

impl IdentifierRegistry for BTreeSet<String> {
    fn is_identifier_used(&self, candidate: &str) -> bool {
        self.contains(candidate)
    }
}
