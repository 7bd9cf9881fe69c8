// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-node tree and transform reconciliation for 3D content editors.
//!
//! `stagehand_core` keeps a tree of positioned nodes with local
//! translation/rotation and an always-current cache of each node's world
//! translation. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with generational index handles.
//!
//! # Architecture
//!
//! ```text
//!   editor / binding layer
//!       │  set_local_*, set_world_*, edit_property, add_node, set_parent
//!       ▼
//!   SceneGraph ──► NodeStore (write, then WORLD cascade)
//!       │
//!       ▼
//!   SceneObserver (node_added, node_transform_changed, property_changed, ...)
//! ```
//!
//! **[`node`]**: struct-of-arrays node tree with generational handles, node
//! variants, and read-only queries.
//!
//! **[`scene`]**: [`SceneGraph`](scene::SceneGraph), the only mutation
//! surface. Applies writes, runs the world-translation cascade, and notifies
//! the [`SceneObserver`](scene::SceneObserver).
//!
//! **[`property`]**: ordered property descriptors per node, with eager and
//! lazy recompute registrations.
//!
//! **[`dirty`]**: dirty-tracking channels (via `understory_dirty`) that turn
//! a node edit into the worklist of nodes to re-derive.
//!
//! **[`capability`]**: per-node capability flags.
//!
//! **[`vector`]**, **[`quat`]**, **[`rigid`]**, **[`transform`]**,
//! **[`bounds`]**: the math the tree is built on.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod bounds;
pub mod capability;
pub mod dirty;
pub mod node;
pub mod property;
pub mod quat;
pub mod rigid;
pub mod scene;
pub mod transform;
pub mod vector;
