// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and derived state.
//!
//! [`NodeStore`] is the data half of a scene. It exposes read-only queries to
//! everyone; all mutation goes through [`SceneGraph`](crate::scene::SceneGraph),
//! which keeps caches consistent and notifies the observer.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::bounds::Aabb3;
use crate::capability::Capabilities;
use crate::dirty;
use crate::property::{
    PropertyDescriptor, PropertyKind, PropertyListBuilder, PropertyTable, PropertyValue,
    UpdateContext, UpdateMode,
};
use crate::quat::Quat;
use crate::rigid::RigidTransform;
use crate::transform::Transform3d;
use crate::vector::Vec3;

use super::id::{INVALID, NodeId};
use super::kind::NodeKind;
use super::traverse::{Ancestors, Children, Descendants};

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies a
/// slot in parallel arrays. Destroyed nodes are recycled via a free list, and
/// generation counters prevent stale handle access.
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local state (set through the scene) --
    pub(crate) local_translation: Vec<Vec3>,
    pub(crate) local_rotation: Vec<Quat>,
    pub(crate) local_euler: Vec<Vec3>,
    pub(crate) local_bounds: Vec<Aabb3>,

    // -- Derived state (written by the cascade) --
    pub(crate) world_translation: Vec<Vec3>,
    pub(crate) properties: Vec<PropertyTable>,

    // -- Identity --
    /// `None` marks a freed slot.
    pub(crate) kind: Vec<Option<Box<dyn NodeKind>>>,
    pub(crate) capabilities: Vec<Capabilities>,
    pub(crate) identifier: Vec<Option<String>>,
    pub(crate) in_scene: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("slots", &self.len)
            .field("live", &self.live_count())
            .field("free", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_translation: Vec::new(),
            local_rotation: Vec::new(),
            local_euler: Vec::new(),
            local_bounds: Vec::new(),
            world_translation: Vec::new(),
            properties: Vec::new(),
            kind: Vec::new(),
            capabilities: Vec::new(),
            identifier: Vec::new(),
            in_scene: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    // -- Allocation --

    /// Allocates a parentless node with an identity transform.
    ///
    /// The property table is built here: base transform properties first, then
    /// whatever `kind` registers.
    pub(crate) fn allocate(&mut self, kind: Box<dyn NodeKind>, in_scene: bool) -> NodeId {
        let mut builder = PropertyListBuilder::with_base();
        kind.register_properties(&mut builder);
        let table = builder.finish();
        let capabilities = kind.capabilities();
        let has_lazy = table.has_mode(UpdateMode::Lazy);

        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_translation[i] = Vec3::ZERO;
            self.local_rotation[i] = Quat::IDENTITY;
            self.local_euler[i] = Vec3::ZERO;
            self.local_bounds[i] = Aabb3::EMPTY;
            self.world_translation[i] = Vec3::ZERO;
            self.properties[i] = table;
            self.kind[i] = Some(kind);
            self.capabilities[i] = capabilities;
            self.identifier[i] = None;
            self.in_scene[i] = in_scene;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_translation.push(Vec3::ZERO);
            self.local_rotation.push(Quat::IDENTITY);
            self.local_euler.push(Vec3::ZERO);
            self.local_bounds.push(Aabb3::EMPTY);
            self.world_translation.push(Vec3::ZERO);
            self.properties.push(table);
            self.kind.push(Some(kind));
            self.capabilities.push(capabilities);
            self.identifier.push(None);
            self.in_scene.push(in_scene);
            self.generation.push(0);
            idx
        };

        // Lazy values have never been computed.
        if has_lazy {
            self.dirty.mark(idx, dirty::DERIVED);
        }

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Frees `id` and every node in its subtree.
    ///
    /// The caller detaches `id` from its parent first.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        self.validate(id);
        debug_assert!(
            self.parent[id.idx as usize] == INVALID,
            "free_subtree called on an attached node"
        );
        let doomed: Vec<u32> = self.descendants(id).map(|n| n.idx).collect();
        for idx in doomed {
            let i = idx as usize;
            self.dirty.remove_key(idx);
            // Bump generation so old handles immediately fail validation.
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = None;
            self.properties[i] = PropertyTable::default();
            self.identifier[i] = None;
            self.in_scene[i] = false;
            self.free_list.push(idx);
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.kind[id.idx as usize].is_some()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count()
    }

    /// Returns `true` if the store holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    // -- Topology queries --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator from the node's parent up to its root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, id.idx)
    }

    /// Returns a pre-order iterator over the subtree rooted at `id`,
    /// including `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        self.validate(id);
        Descendants::new(self, id.idx)
    }

    /// Returns whether `other` is `node` or lies anywhere below it.
    #[must_use]
    pub fn contains(&self, node: NodeId, other: NodeId) -> bool {
        self.validate(node);
        node == other || self.ancestors(other).any(|a| a == node)
    }

    /// Returns whether `ancestor` is `node` or one of its ancestors.
    ///
    /// The inverse view of [`contains`](Self::contains).
    #[must_use]
    pub fn is_child_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.contains(ancestor, node)
    }

    /// Returns all live nodes without a parent, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| {
                self.parent[idx as usize] == INVALID && self.kind[idx as usize].is_some()
            })
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Local state --

    /// Local translation relative to the parent.
    #[must_use]
    pub fn local_translation(&self, id: NodeId) -> Vec3 {
        self.validate(id);
        self.local_translation[id.idx as usize]
    }

    /// Local rotation relative to the parent. Always unit length.
    #[must_use]
    pub fn local_rotation(&self, id: NodeId) -> Quat {
        self.validate(id);
        self.local_rotation[id.idx as usize]
    }

    /// Euler view of the local rotation, in degrees.
    #[must_use]
    pub fn local_euler(&self, id: NodeId) -> Vec3 {
        self.validate(id);
        self.local_euler[id.idx as usize]
    }

    /// Local translation and rotation as one transform.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> RigidTransform {
        self.validate(id);
        self.local_transform_at(id.idx)
    }

    /// Local transform as a 4×4 matrix.
    #[must_use]
    pub fn local_matrix(&self, id: NodeId) -> Transform3d {
        self.local_transform(id).to_matrix()
    }

    /// Local bounds, used by bounds-deriving properties.
    #[must_use]
    pub fn local_bounds(&self, id: NodeId) -> Aabb3 {
        self.validate(id);
        self.local_bounds[id.idx as usize]
    }

    // -- World state --

    /// Composes the local transforms from the root down to `id`.
    ///
    /// Always recomputed from scratch; never reads a cache.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> RigidTransform {
        self.validate(id);
        self.world_transform_at(id.idx)
    }

    /// Cached world translation.
    ///
    /// Current after every scene mutation, including at the time any
    /// observer notification fires.
    #[must_use]
    pub fn world_translation(&self, id: NodeId) -> Vec3 {
        self.validate(id);
        self.world_translation[id.idx as usize]
    }

    /// Local bounds mapped through the node's world transform.
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Aabb3 {
        self.local_bounds(id).transformed(&self.world_transform(id))
    }

    // -- Identity --

    /// Capability set fixed at creation.
    #[must_use]
    pub fn capabilities(&self, id: NodeId) -> Capabilities {
        self.validate(id);
        self.capabilities[id.idx as usize]
    }

    /// The node's identifier label, if one was assigned.
    #[must_use]
    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.identifier[id.idx as usize].as_deref()
    }

    /// The variant this node was created from.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &dyn NodeKind {
        self.validate(id);
        match &self.kind[id.idx as usize] {
            Some(kind) => kind.as_ref(),
            None => unreachable!("validated node has no kind"),
        }
    }

    /// Display name of the node's variant.
    #[must_use]
    pub fn kind_name(&self, id: NodeId) -> &str {
        self.kind(id).name()
    }

    /// Ordered property descriptors, base set first.
    #[must_use]
    pub fn properties(&self, id: NodeId) -> &[PropertyDescriptor] {
        self.validate(id);
        &self.properties[id.idx as usize].descriptors
    }

    /// Whether notifications about this node reach the observer.
    #[must_use]
    pub fn is_in_scene(&self, id: NodeId) -> bool {
        self.validate(id);
        self.in_scene[id.idx as usize]
    }

    /// Returns the current value of a property without refreshing lazy state.
    ///
    /// Lazy properties read back `None` until first derived. Use
    /// [`SceneGraph::read_property`](crate::scene::SceneGraph::read_property)
    /// for an up-to-date value.
    #[must_use]
    pub fn cached_property(&self, id: NodeId, kind: PropertyKind) -> Option<PropertyValue> {
        self.validate(id);
        let i = id.idx as usize;
        let slot = self.properties[i].index_of(kind)?;
        match kind {
            PropertyKind::Translation => Some(PropertyValue::Vector(self.local_translation[i])),
            PropertyKind::Rotation => Some(PropertyValue::Quaternion(self.local_rotation[i])),
            PropertyKind::Euler => Some(PropertyValue::Vector(self.local_euler[i])),
            PropertyKind::WorldTranslation => {
                Some(PropertyValue::Vector(self.world_translation[i]))
            }
            _ => self.properties[i].derived[slot],
        }
    }

    // -- Raw-slot helpers --

    /// Builds a handle for a live slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn local_transform_at(&self, idx: u32) -> RigidTransform {
        RigidTransform::new(
            self.local_translation[idx as usize],
            self.local_rotation[idx as usize],
        )
    }

    pub(crate) fn world_transform_at(&self, idx: u32) -> RigidTransform {
        let mut world = self.local_transform_at(idx);
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            world = self.local_transform_at(p) * world;
            p = self.parent[p as usize];
        }
        world
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Raw topology edits (no notifications) --

    /// Appends `c` as the last child of `p` and adds dependency edges.
    pub(crate) fn link_child(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(c, p, dirty::WORLD);
        let _ = self.dirty.add_dependency(c, p, dirty::DERIVED);
    }

    /// Removes `idx` from its parent's child list.
    ///
    /// The parent back-reference is left in place; see
    /// [`clear_parent_link`](Self::clear_parent_link).
    pub(crate) fn unlink_sibling(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Clears the parent back-reference and its dependency edges.
    pub(crate) fn clear_parent_link(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }
        self.dirty.remove_dependency(idx, p, dirty::WORLD);
        self.dirty.remove_dependency(idx, p, dirty::DERIVED);
        self.parent[idx as usize] = INVALID;
    }

    // -- Derived state --

    /// Runs the updaters of `mode` for slot `idx`, given its world transform.
    ///
    /// The world-translation updater writes the translation cache; the rest
    /// write the table's derived slots.
    pub(crate) fn run_updaters(&mut self, idx: u32, world: RigidTransform, mode: UpdateMode) {
        let table = &self.properties[idx as usize];
        if !table.has_mode(mode) {
            return;
        }
        let cx = UpdateContext {
            nodes: self,
            node: self.id_at(idx),
            world,
        };
        let outputs: Vec<(usize, PropertyKind, PropertyValue)> = table
            .descriptors
            .iter()
            .enumerate()
            .filter_map(|(slot, d)| {
                let updater = d.updater().filter(|u| u.mode == mode)?;
                Some((slot, d.kind(), (updater.recompute)(&cx)))
            })
            .collect();

        for (slot, kind, value) in outputs {
            if kind == PropertyKind::WorldTranslation {
                if let Some(v) = value.as_vector() {
                    self.world_translation[idx as usize] = v;
                }
            } else {
                self.properties[idx as usize].derived[slot] = Some(value);
            }
        }
    }

    /// Marks lazy values of `idx` and its descendants stale.
    pub(crate) fn invalidate_derived(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::DERIVED, &EagerPolicy);
    }

    /// Recomputes every stale lazy value.
    pub(crate) fn refresh_derived(&mut self) {
        let stale: Vec<u32> = self
            .dirty
            .drain(dirty::DERIVED)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in stale {
            if self.kind[idx as usize].is_none() {
                continue;
            }
            let world = self.world_transform_at(idx);
            self.run_updaters(idx, world, UpdateMode::Lazy);
        }
    }
}
