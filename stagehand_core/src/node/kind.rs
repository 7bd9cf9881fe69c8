// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node variants.
//!
//! A [`NodeKind`] is the factory-side description of a node: its display
//! name, its fixed [`Capabilities`], and the properties it adds on top of the
//! base transform set. The store consults it exactly once, at creation.

use alloc::string::String;
use core::fmt;

use crate::capability::Capabilities;
use crate::property::{
    PropertyDescriptor, PropertyFlags, PropertyKind, PropertyListBuilder, UpdateMode, world_bounds,
};

/// Behavior shared by every node variant.
pub trait NodeKind: fmt::Debug {
    /// Display name shown in outlines and diagnostics.
    fn name(&self) -> &str;

    /// Capability set, fixed for the node's lifetime.
    fn capabilities(&self) -> Capabilities;

    /// Appends variant-specific descriptors after the base transform set.
    fn register_properties(&self, properties: &mut PropertyListBuilder) {
        _ = properties;
    }
}

/// A named container. Supports every capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupNode {
    name: String,
}

impl GroupNode {
    /// Creates a group with the given display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NodeKind for GroupNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }
}

/// A placed instance of some prototype resource. Leaf only.
///
/// Exposes a lazily derived [`WorldBounds`](PropertyKind::WorldBounds)
/// property computed from the node's local bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceNode {
    prototype: String,
}

impl InstanceNode {
    /// Creates an instance of `prototype` (typically a resource path).
    #[must_use]
    pub fn new(prototype: impl Into<String>) -> Self {
        Self {
            prototype: prototype.into(),
        }
    }

    /// The prototype this node instantiates.
    #[must_use]
    pub fn prototype(&self) -> &str {
        &self.prototype
    }
}

impl NodeKind for InstanceNode {
    fn name(&self) -> &str {
        &self.prototype
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::TRANSFORMABLE | Capabilities::SELECTABLE | Capabilities::LABEL_EDITABLE
    }

    fn register_properties(&self, properties: &mut PropertyListBuilder) {
        properties.add(
            PropertyDescriptor::new(
                PropertyKind::WorldBounds,
                "WorldBounds",
                "world_bounds",
                PropertyFlags::READ_ONLY,
            )
            .with_updater(world_bounds, UpdateMode::Lazy),
        );
    }
}
