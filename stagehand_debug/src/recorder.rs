// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory recording of scene notifications.
//!
//! [`RecordingObserver`] stores each notification as a [`SceneEvent`] along
//! with a snapshot of the state the observer could read when it arrived. The
//! events serialize with `serde`, see [`json::export`](crate::json::export).

use serde::Serialize;

use stagehand_core::node::{NodeId, NodeStore};
use stagehand_core::property::{PropertyKind, PropertyValue};
use stagehand_core::scene::SceneObserver;

/// A node handle as recorded: slot index and generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    /// Slot index.
    pub index: u32,
    /// Generation of the slot when the event was recorded.
    pub generation: u32,
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        Self {
            index: id.index(),
            generation: id.generation(),
        }
    }
}

/// A property value as recorded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordedValue {
    /// A vector, as `[x, y, z]`.
    Vector([f64; 3]),
    /// A quaternion, as `[x, y, z, w]`.
    Quaternion([f64; 4]),
    /// A box, as its two corners.
    Bounds {
        /// Minimum corner.
        min: [f64; 3],
        /// Maximum corner.
        max: [f64; 3],
    },
}

impl From<PropertyValue> for RecordedValue {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Vector(v) => Self::Vector(v.to_array()),
            PropertyValue::Quaternion(q) => Self::Quaternion(q.to_array()),
            PropertyValue::Bounds(b) => Self::Bounds {
                min: b.min.to_array(),
                max: b.max.to_array(),
            },
        }
    }
}

/// One recorded notification.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    /// [`SceneObserver::node_added`].
    NodeAdded {
        /// The attached node.
        node: NodeRef,
        /// Its parent at notification time.
        parent: Option<NodeRef>,
    },
    /// [`SceneObserver::node_removed`].
    NodeRemoved {
        /// The detached node.
        node: NodeRef,
    },
    /// [`SceneObserver::node_reparented`].
    NodeReparented {
        /// The moved node.
        node: NodeRef,
        /// Its new parent.
        new_parent: NodeRef,
    },
    /// [`SceneObserver::node_transform_changed`].
    TransformChanged {
        /// The node.
        node: NodeRef,
        /// Local translation after the change.
        translation: [f64; 3],
        /// Euler angles after the change, in degrees.
        euler: [f64; 3],
        /// World translation after the change.
        world_translation: [f64; 3],
    },
    /// [`SceneObserver::property_changed`].
    PropertyChanged {
        /// The node.
        node: NodeRef,
        /// Which property.
        #[serde(skip)]
        kind: PropertyKind,
        /// Storage key of the property.
        property: String,
        /// Value after the change, if already derived.
        value: Option<RecordedValue>,
        /// World translation at notification time.
        world_translation: [f64; 3],
    },
}

impl SceneEvent {
    /// The node the event is about.
    #[must_use]
    pub fn node(&self) -> NodeRef {
        match self {
            Self::NodeAdded { node, .. }
            | Self::NodeRemoved { node }
            | Self::NodeReparented { node, .. }
            | Self::TransformChanged { node, .. }
            | Self::PropertyChanged { node, .. } => *node,
        }
    }
}

/// An observer that records every notification.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    events: Vec<SceneEvent>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in notification order.
    #[must_use]
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Property events for one node and property, in notification order.
    pub fn property_events(
        &self,
        node: NodeId,
        kind: PropertyKind,
    ) -> impl Iterator<Item = &SceneEvent> + '_ {
        let node = NodeRef::from(node);
        self.events.iter().filter(move |e| {
            matches!(e, SceneEvent::PropertyChanged { node: n, kind: k, .. } if *n == node && *k == kind)
        })
    }

    /// Drops everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<SceneEvent> {
        self.events
    }
}

/// The descriptor key of `kind` on `node`, or its debug name.
fn property_key(nodes: &NodeStore, node: NodeId, kind: PropertyKind) -> String {
    nodes
        .properties(node)
        .iter()
        .find(|d| d.kind() == kind)
        .map_or_else(|| format!("{kind:?}"), |d| d.key().to_string())
}

impl SceneObserver for RecordingObserver {
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        self.events.push(SceneEvent::NodeAdded {
            node: node.into(),
            parent: nodes.parent(node).map(NodeRef::from),
        });
    }

    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        _ = nodes;
        self.events.push(SceneEvent::NodeRemoved { node: node.into() });
    }

    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        _ = nodes;
        self.events.push(SceneEvent::NodeReparented {
            node: node.into(),
            new_parent: new_parent.into(),
        });
    }

    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        self.events.push(SceneEvent::TransformChanged {
            node: node.into(),
            translation: nodes.local_translation(node).to_array(),
            euler: nodes.local_euler(node).to_array(),
            world_translation: nodes.world_translation(node).to_array(),
        });
    }

    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        self.events.push(SceneEvent::PropertyChanged {
            node: node.into(),
            kind: property,
            property: property_key(nodes, node, property),
            value: nodes.cached_property(node, property).map(RecordedValue::from),
            world_translation: nodes.world_translation(node).to_array(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::node::GroupNode;
    use stagehand_core::scene::SceneGraph;
    use stagehand_core::vector::Vec3;

    #[test]
    fn records_world_translation_snapshots() {
        let mut scene = SceneGraph::new(RecordingObserver::new());
        let root = scene.create_node(GroupNode::new("R"));
        let child = scene.create_node(GroupNode::new("C"));
        scene.add_node(root, child).unwrap();
        scene.set_local_translation(child, Vec3::new(1.0, 0.0, 0.0));
        scene.observer_mut().clear();

        scene.set_local_translation(root, Vec3::new(5.0, 0.0, 0.0));
        let child_moves: Vec<_> = scene
            .observer()
            .property_events(child, PropertyKind::WorldTranslation)
            .collect();
        assert_eq!(child_moves.len(), 1);
        let SceneEvent::PropertyChanged {
            property,
            value,
            world_translation,
            ..
        } = child_moves[0]
        else {
            panic!("expected a property event");
        };
        assert_eq!(property, "world_translation");
        assert_eq!(*value, Some(RecordedValue::Vector([6.0, 0.0, 0.0])));
        assert_eq!(*world_translation, [6.0, 0.0, 0.0]);
    }

    #[test]
    fn added_event_sees_parent() {
        let mut scene = SceneGraph::new(RecordingObserver::new());
        let root = scene.create_node(GroupNode::new("R"));
        let child = scene.create_node(GroupNode::new("C"));
        scene.add_node(root, child).unwrap();
        assert_eq!(
            scene.observer().events(),
            [SceneEvent::NodeAdded {
                node: child.into(),
                parent: Some(root.into()),
            }]
        );
        assert_eq!(scene.observer().events()[0].node(), NodeRef::from(child));
    }
}
