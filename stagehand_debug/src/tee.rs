// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observer fan-out.

use stagehand_core::node::{NodeId, NodeStore};
use stagehand_core::property::PropertyKind;
use stagehand_core::scene::SceneObserver;

/// Forwards every notification to `A`, then to `B`.
///
/// Nest tees to reach more than two observers.
#[derive(Clone, Debug, Default)]
pub struct Tee<A, B> {
    /// Receives each notification first.
    pub first: A,
    /// Receives each notification second.
    pub second: B,
}

impl<A, B> Tee<A, B> {
    /// Pairs two observers.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Splits the tee back into its observers.
    #[must_use]
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: SceneObserver, B: SceneObserver> SceneObserver for Tee<A, B> {
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        self.first.node_added(nodes, node);
        self.second.node_added(nodes, node);
    }

    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        self.first.node_removed(nodes, node);
        self.second.node_removed(nodes, node);
    }

    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        self.first.node_reparented(nodes, node, new_parent);
        self.second.node_reparented(nodes, node, new_parent);
    }

    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        self.first.node_transform_changed(nodes, node);
        self.second.node_transform_changed(nodes, node);
    }

    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        self.first.property_changed(nodes, node, property);
        self.second.property_changed(nodes, node, property);
    }
}
