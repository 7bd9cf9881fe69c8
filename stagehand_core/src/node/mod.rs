// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node tree data model.
//!
//! A *node* is an element of the editor's scene tree. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first-child, and sibling links forming an ordered tree.
//!   A node owns its children; destroying it destroys the whole subtree.
//! - **Local state**: translation, unit rotation, and the Euler view of that
//!   rotation, all relative to the parent.
//! - **Derived state**: the cached world translation (kept current by the
//!   scene after every mutation) and the values of any property updaters.
//! - A [`NodeKind`] fixing its display name, [`Capabilities`], and extra
//!   properties.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//!
//! [`Capabilities`]: crate::capability::Capabilities

mod error;
mod id;
mod kind;
mod store;
mod traverse;

pub use error::NodeError;
pub use id::{INVALID, NodeId};
pub use kind::{GroupNode, InstanceNode, NodeKind};
pub use store::NodeStore;
pub use traverse::{Ancestors, Children, Descendants};
