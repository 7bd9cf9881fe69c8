// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The mutation surface of the node tree.
//!
//! [`SceneGraph`] owns a [`NodeStore`] and a [`SceneObserver`]. Every
//! structural or spatial edit goes through it so that:
//!
//! - cached world translations and eager properties are recomputed for the
//!   edited node and its whole subtree before anyone is notified, and
//! - the observer hears about each logical change exactly once.
//!
//! # Notification order
//!
//! A local transform write emits, in order: one
//! [`node_transform_changed`](SceneObserver::node_transform_changed), then one
//! [`property_changed`](SceneObserver::property_changed) per local property
//! that moved (translation, rotation, Euler), then one world-translation
//! `property_changed` per node in the subtree whose world translation moved.
//! A write that changes nothing emits nothing.
//!
//! # Detached nodes
//!
//! Nodes made with [`create_detached_node`](SceneGraph::create_detached_node)
//! belong to no scene yet. Edits to them succeed and keep every cache
//! consistent, but their notifications are dropped with a `log` warning.
//! Attaching such a node under a scene node, or calling
//! [`attach_to_scene`](SceneGraph::attach_to_scene), brings its subtree into
//! the scene.

mod dispatch;
mod observer;
mod topology;
mod transform;

#[cfg(test)]
mod testing;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::bounds::Aabb3;
use crate::node::{NodeId, NodeKind, NodeStore};
use crate::property::PropertyKind;

pub use dispatch::PropertyEdit;
pub use observer::{IdentifierRegistry, NoopObserver, SceneObserver};

/// Squared distance below which a direct property write counts as a no-op.
///
/// Applies to [`set_local_translation`](SceneGraph::set_local_translation),
/// [`set_local_rotation`](SceneGraph::set_local_rotation),
/// [`set_local_euler`](SceneGraph::set_local_euler),
/// [`set_world_translation`](SceneGraph::set_world_translation), and to world
/// translations moved by reparenting. Any write that changes a component by
/// more than this reports
/// [`node_transform_changed`](SceneObserver::node_transform_changed).
pub const CHANGE_EPSILON_SQ: f64 = 1e-18;

/// Squared distance below which a component written through a combined
/// transform or matrix counts as unchanged.
///
/// Absorbs the round-trip noise of matrix decomposition so that re-applying
/// the current transform does not notify.
pub const NOISE_EPSILON_SQ: f64 = 1e-4;

/// A change about to be reported to the observer.
#[derive(Clone, Copy, Debug)]
enum Notice {
    Added(NodeId),
    Removed(NodeId),
    Reparented(NodeId, NodeId),
    TransformChanged(NodeId),
    PropertyChanged(NodeId, PropertyKind),
}

/// A node tree plus the observer that hears about its changes.
pub struct SceneGraph<O = NoopObserver> {
    nodes: NodeStore,
    observer: O,
    identifiers: Option<Box<dyn IdentifierRegistry>>,
}

impl<O> fmt::Debug for SceneGraph<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGraph")
            .field("nodes", &self.nodes)
            .field("has_identifier_registry", &self.identifiers.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SceneGraph<NoopObserver> {
    fn default() -> Self {
        Self::new(NoopObserver)
    }
}

impl<O: SceneObserver> SceneGraph<O> {
    /// Creates an empty scene reporting to `observer`.
    #[must_use]
    pub fn new(observer: O) -> Self {
        Self {
            nodes: NodeStore::new(),
            observer,
            identifiers: None,
        }
    }

    /// Creates an empty scene that consults `registry` for identifier use.
    #[must_use]
    pub fn with_identifiers(observer: O, registry: impl IdentifierRegistry + 'static) -> Self {
        Self {
            nodes: NodeStore::new(),
            observer,
            identifiers: Some(Box::new(registry)),
        }
    }

    /// Replaces the identifier registry. `None` treats every label as free.
    pub fn set_identifier_registry(&mut self, registry: Option<Box<dyn IdentifierRegistry>>) {
        self.identifiers = registry;
    }

    /// Read access to every node.
    #[must_use]
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// The observer.
    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer, e.g. to drain what it recorded.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Splits the scene into its store and observer.
    #[must_use]
    pub fn into_parts(self) -> (NodeStore, O) {
        (self.nodes, self.observer)
    }

    // -- Lifecycle --

    /// Creates a parentless node that belongs to this scene.
    pub fn create_node(&mut self, kind: impl NodeKind + 'static) -> NodeId {
        let id = self.nodes.allocate(Box::new(kind), true);
        log::trace!("created node {id} ({})", self.nodes.kind_name(id));
        id
    }

    /// Creates a parentless node outside of any scene.
    ///
    /// It behaves normally except that notifications about it are dropped.
    pub fn create_detached_node(&mut self, kind: impl NodeKind + 'static) -> NodeId {
        let id = self.nodes.allocate(Box::new(kind), false);
        log::trace!("created detached node {id} ({})", self.nodes.kind_name(id));
        id
    }

    /// Brings `id` and its subtree into the scene.
    pub fn attach_to_scene(&mut self, id: NodeId) {
        self.adopt_subtree(id);
    }

    /// Detaches `id` from its parent, then frees it and its whole subtree.
    ///
    /// The parent sees one [`node_removed`](SceneObserver::node_removed);
    /// nodes inside the subtree are freed silently.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.nodes.validate(id);
        if let Some(parent) = self.nodes.parent(id) {
            self.detach(id);
            self.emit(parent, Notice::Removed(id));
        }
        self.nodes.free_subtree(id);
        log::trace!("destroyed node {id}");
    }

    // -- Labels --

    /// Assigns or clears the node's identifier label.
    ///
    /// Uniqueness is not checked; see [`suggest_identifier`](Self::suggest_identifier).
    pub fn set_identifier(&mut self, id: NodeId, identifier: Option<String>) {
        self.nodes.validate(id);
        self.nodes.identifier[id.idx as usize] = identifier;
    }

    /// Asks the identifier registry whether `candidate` is taken.
    ///
    /// Without a registry, nothing is taken.
    #[must_use]
    pub fn is_identifier_used(&self, candidate: &str) -> bool {
        self.identifiers
            .as_ref()
            .is_some_and(|registry| registry.is_identifier_used(candidate))
    }

    /// Returns `prefix` if it is free, otherwise the first free `prefix1`,
    /// `prefix2`, and so on.
    #[must_use]
    pub fn suggest_identifier(&self, prefix: &str) -> String {
        if !self.is_identifier_used(prefix) {
            return String::from(prefix);
        }
        (1_u32..)
            .map(|n| format!("{prefix}{n}"))
            .find(|candidate| !self.is_identifier_used(candidate))
            .unwrap_or_else(|| String::from(prefix))
    }

    // -- Variant state --

    /// Sets the local bounds used by bounds-deriving properties.
    ///
    /// Lazy properties of the node and its subtree are recomputed on their
    /// next read.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Aabb3) {
        self.nodes.validate(id);
        self.nodes.local_bounds[id.idx as usize] = bounds;
        self.nodes.invalidate_derived(id.idx);
    }

    // -- Internal helpers --

    /// Marks `id` and its subtree as belonging to the scene.
    fn adopt_subtree(&mut self, id: NodeId) {
        let members: Vec<u32> = self.nodes.descendants(id).map(|n| n.idx).collect();
        for idx in members {
            self.nodes.in_scene[idx as usize] = true;
        }
    }

    /// Reports `notice` to the observer if `scene_of` belongs to the scene.
    fn emit(&mut self, scene_of: NodeId, notice: Notice) {
        if !self.nodes.in_scene[scene_of.idx as usize] {
            log::warn!("node {scene_of} has no scene; dropping {notice:?}");
            return;
        }
        let nodes = &self.nodes;
        let observer = &mut self.observer;
        match notice {
            Notice::Added(node) => observer.node_added(nodes, node),
            Notice::Removed(node) => observer.node_removed(nodes, node),
            Notice::Reparented(node, new_parent) => {
                observer.node_reparented(nodes, node, new_parent);
            }
            Notice::TransformChanged(node) => observer.node_transform_changed(nodes, node),
            Notice::PropertyChanged(node, property) => {
                observer.property_changed(nodes, node, property);
            }
        }
    }

    /// Emits a world-translation change for each moved slot.
    fn emit_world_moves(&mut self, moved: Vec<u32>) {
        for idx in moved {
            let node = self.nodes.id_at(idx);
            self.emit(node, Notice::PropertyChanged(node, PropertyKind::WorldTranslation));
        }
    }
}
