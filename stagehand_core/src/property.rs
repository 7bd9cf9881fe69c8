// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptors: the introspection surface of a node.
//!
//! Every node exposes an ordered, immutable list of [`PropertyDescriptor`]s.
//! The list is built once at creation by a [`PropertyListBuilder`]: the base
//! transform properties are registered first, then the node's
//! [`NodeKind`](crate::node::NodeKind) appends its own.
//!
//! A descriptor may carry an [`Updater`], a pure recompute function plus an
//! [`UpdateMode`]:
//!
//! - [`Eager`](UpdateMode::Eager) updaters run inside the world-translation
//!   cascade, so their value is current at the moment any transform or
//!   reparenting notification fires.
//! - [`Lazy`](UpdateMode::Lazy) updaters are only marked dirty by the
//!   cascade and run on the next
//!   [`read_property`](crate::scene::SceneGraph::read_property).
//!
//! Descriptors are identified by their [`PropertyKind`] tag, compared by value.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::bounds::Aabb3;
use crate::node::{NodeId, NodeStore};
use crate::quat::Quat;
use crate::rigid::RigidTransform;
use crate::vector::Vec3;

/// Stable tag identifying which property a descriptor describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    /// Local translation.
    Translation,
    /// Local rotation quaternion.
    Rotation,
    /// Euler view of the local rotation, in degrees.
    Euler,
    /// Translation of the composed parent-chain transform.
    WorldTranslation,
    /// Local bounds mapped into world space.
    WorldBounds,
    /// A property defined by a node kind outside this crate.
    Custom(u16),
}

/// A property value as seen by the binding layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// A three-component vector (translations, Euler angles).
    Vector(Vec3),
    /// A rotation quaternion.
    Quaternion(Quat),
    /// An axis-aligned box.
    Bounds(Aabb3),
}

impl PropertyValue {
    /// Returns the vector payload, if this is a vector.
    #[must_use]
    pub const fn as_vector(&self) -> Option<Vec3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the quaternion payload, if this is a quaternion.
    #[must_use]
    pub const fn as_quaternion(&self) -> Option<Quat> {
        match self {
            Self::Quaternion(q) => Some(*q),
            _ => None,
        }
    }

    /// Returns the bounds payload, if this is a box.
    #[must_use]
    pub const fn as_bounds(&self) -> Option<Aabb3> {
        match self {
            Self::Bounds(b) => Some(*b),
            _ => None,
        }
    }
}

/// Binding-layer flags of a property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PropertyFlags {
    /// The UI may write this property.
    pub editable: bool,
    /// The property may be keyed by animation tools.
    pub animatable: bool,
}

impl PropertyFlags {
    /// Neither editable nor animatable.
    pub const READ_ONLY: Self = Self {
        editable: false,
        animatable: false,
    };
    /// Editable but not animatable.
    pub const EDITABLE: Self = Self {
        editable: true,
        animatable: false,
    };
    /// Editable and animatable.
    pub const ANIMATABLE: Self = Self {
        editable: true,
        animatable: true,
    };
}

/// When an [`Updater`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// During the cascade that invalidated it.
    Eager,
    /// On the next read after it was invalidated.
    Lazy,
}

/// Inputs handed to a recompute function.
#[derive(Clone, Copy, Debug)]
pub struct UpdateContext<'a> {
    /// The store being updated. Parent-chain state is already current.
    pub nodes: &'a NodeStore,
    /// The node whose property is recomputed.
    pub node: NodeId,
    /// The node's composed world transform.
    pub world: RigidTransform,
}

/// Pure function deriving a property value from node state.
pub type RecomputeFn = fn(&UpdateContext<'_>) -> PropertyValue;

/// Registration-table entry pairing a recompute function with its mode.
#[derive(Clone, Copy, Debug)]
pub struct Updater {
    /// Derives the value.
    pub recompute: RecomputeFn,
    /// When to run `recompute`.
    pub mode: UpdateMode,
}

/// Metadata and optional recompute logic for one node property.
#[derive(Clone, Copy, Debug)]
pub struct PropertyDescriptor {
    kind: PropertyKind,
    name: &'static str,
    key: &'static str,
    flags: PropertyFlags,
    updater: Option<Updater>,
}

impl PropertyDescriptor {
    /// Creates a descriptor without an updater.
    #[must_use]
    pub const fn new(
        kind: PropertyKind,
        name: &'static str,
        key: &'static str,
        flags: PropertyFlags,
    ) -> Self {
        Self {
            kind,
            name,
            key,
            flags,
            updater: None,
        }
    }

    /// Attaches a recompute function.
    #[must_use]
    pub const fn with_updater(mut self, recompute: RecomputeFn, mode: UpdateMode) -> Self {
        self.updater = Some(Updater { recompute, mode });
        self
    }

    /// The property's tag.
    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Storage key used by serializers and bindings.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Binding flags.
    #[must_use]
    pub const fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Whether the UI may write the property.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.flags.editable
    }

    /// Whether animation tools may key the property.
    #[must_use]
    pub const fn is_animatable(&self) -> bool {
        self.flags.animatable
    }

    /// The recompute registration, if any.
    #[must_use]
    pub const fn updater(&self) -> Option<Updater> {
        self.updater
    }

    /// Whether this property has an updater with the given mode.
    #[must_use]
    pub fn updates(&self, mode: UpdateMode) -> bool {
        self.updater.is_some_and(|u| u.mode == mode)
    }
}

fn world_translation(cx: &UpdateContext<'_>) -> PropertyValue {
    PropertyValue::Vector(cx.world.translation)
}

/// Recompute function for [`PropertyKind::WorldBounds`].
pub fn world_bounds(cx: &UpdateContext<'_>) -> PropertyValue {
    PropertyValue::Bounds(cx.nodes.local_bounds(cx.node).transformed(&cx.world))
}

/// Collects descriptors while a node is being created.
#[derive(Debug)]
pub struct PropertyListBuilder {
    descriptors: Vec<PropertyDescriptor>,
}

impl PropertyListBuilder {
    /// Starts a list holding the base transform properties.
    pub(crate) fn with_base() -> Self {
        let mut builder = Self {
            descriptors: Vec::new(),
        };
        builder
            .add(PropertyDescriptor::new(
                PropertyKind::Translation,
                "Translation",
                "translation",
                PropertyFlags::ANIMATABLE,
            ))
            .add(PropertyDescriptor::new(
                PropertyKind::Rotation,
                "Rotation",
                "rotation",
                PropertyFlags::READ_ONLY,
            ))
            .add(PropertyDescriptor::new(
                PropertyKind::Euler,
                "Euler",
                "euler",
                PropertyFlags::EDITABLE,
            ))
            .add(
                PropertyDescriptor::new(
                    PropertyKind::WorldTranslation,
                    "WorldTranslation",
                    "world_translation",
                    PropertyFlags::ANIMATABLE,
                )
                .with_updater(world_translation, UpdateMode::Eager),
            );
        builder
    }

    /// Appends a descriptor.
    ///
    /// # Panics
    ///
    /// Panics if a descriptor of the same kind was already registered.
    pub fn add(&mut self, descriptor: PropertyDescriptor) -> &mut Self {
        assert!(
            !self.descriptors.iter().any(|d| d.kind == descriptor.kind),
            "duplicate property registration: {:?}",
            descriptor.kind
        );
        self.descriptors.push(descriptor);
        self
    }

    /// Number of descriptors registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub(crate) fn finish(self) -> PropertyTable {
        let derived = self.descriptors.iter().map(|_| None).collect();
        PropertyTable {
            descriptors: self.descriptors.into_boxed_slice(),
            derived,
        }
    }
}

/// A node's frozen descriptor list plus cached updater outputs.
#[derive(Debug, Default)]
pub(crate) struct PropertyTable {
    pub(crate) descriptors: Box<[PropertyDescriptor]>,
    /// Last value produced by each descriptor's updater, by index.
    pub(crate) derived: Box<[Option<PropertyValue>]>,
}

impl PropertyTable {
    pub(crate) fn index_of(&self, kind: PropertyKind) -> Option<usize> {
        self.descriptors.iter().position(|d| d.kind == kind)
    }

    pub(crate) fn has_mode(&self, mode: UpdateMode) -> bool {
        self.descriptors.iter().any(|d| d.updates(mode))
    }
}
