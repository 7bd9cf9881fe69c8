// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording observer shared by the scene tests.

use alloc::vec::Vec;

use super::SceneObserver;
use crate::node::{NodeId, NodeStore};
use crate::property::PropertyKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Added(NodeId),
    Removed(NodeId),
    Reparented(NodeId, NodeId),
    Transform(NodeId),
    Property(NodeId, PropertyKind),
}

/// Records every event, and how far any cached world translation was from the
/// from-scratch composition when a notification arrived.
#[derive(Debug, Default)]
pub(crate) struct Log {
    pub(crate) events: Vec<Event>,
    pub(crate) max_world_error_sq: f64,
}

impl Log {
    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.max_world_error_sq = 0.0;
    }

    pub(crate) fn property_events(&self, property: PropertyKind) -> Vec<NodeId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Property(node, p) if *p == property => Some(*node),
                _ => None,
            })
            .collect()
    }

    fn check_world(&mut self, nodes: &NodeStore) {
        for root in nodes.roots() {
            for node in nodes.descendants(root) {
                let cached = nodes.world_translation(node);
                let fresh = nodes.world_transform(node).translation;
                self.max_world_error_sq = self.max_world_error_sq.max(cached.distance_squared(fresh));
            }
        }
    }
}

impl SceneObserver for Log {
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        self.check_world(nodes);
        self.events.push(Event::Added(node));
    }

    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        self.check_world(nodes);
        self.events.push(Event::Removed(node));
    }

    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        self.check_world(nodes);
        self.events.push(Event::Reparented(node, new_parent));
    }

    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        self.check_world(nodes);
        self.events.push(Event::Transform(node));
    }

    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        self.check_world(nodes);
        self.events.push(Event::Property(node, property));
    }
}
