// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-level reads and edits, as issued by a binding layer.

use crate::node::NodeId;
use crate::property::{PropertyKind, PropertyValue};
use crate::quat::Quat;
use crate::vector::Vec3;

use super::{SceneGraph, SceneObserver};

/// An edit to one of the base transform properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyEdit {
    /// New local translation.
    Translation(Vec3),
    /// New local rotation; normalized before it is stored.
    Rotation(Quat),
    /// New Euler angles in degrees; the rotation is derived from them.
    Euler(Vec3),
    /// New world translation; solved back into a local transform.
    WorldTranslation(Vec3),
}

impl PropertyEdit {
    /// The property this edit targets.
    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        match self {
            Self::Translation(_) => PropertyKind::Translation,
            Self::Rotation(_) => PropertyKind::Rotation,
            Self::Euler(_) => PropertyKind::Euler,
            Self::WorldTranslation(_) => PropertyKind::WorldTranslation,
        }
    }
}

impl<O: SceneObserver> SceneGraph<O> {
    /// Applies a property edit.
    ///
    /// Each edit is routed to the matching transform setter, which stores the
    /// synchronized value directly. Resynchronizing rotation from Euler (or
    /// the reverse) never re-enters this dispatch, so an edit cannot loop.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn edit_property(&mut self, id: NodeId, edit: PropertyEdit) {
        log::debug!("edit {:?} on node {id}", edit.kind());
        match edit {
            PropertyEdit::Translation(t) => self.set_local_translation(id, t),
            PropertyEdit::Rotation(q) => self.set_local_rotation(id, q),
            PropertyEdit::Euler(e) => self.set_local_euler(id, e),
            PropertyEdit::WorldTranslation(t) => self.set_world_translation(id, t),
        }
    }

    /// Returns the current value of `kind` on `id`, or `None` if the node
    /// has no such property.
    ///
    /// Stale lazy properties anywhere in the scene are recomputed first.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn read_property(&mut self, id: NodeId, kind: PropertyKind) -> Option<PropertyValue> {
        self.nodes.validate(id);
        self.nodes.refresh_derived();
        self.nodes.cached_property(id, kind)
    }
}
