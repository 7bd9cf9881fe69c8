// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Stagehand uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! turn "this node's effective transform changed" into an ordered worklist of
//! every node whose derived state must be recomputed.
//!
//! Every child has a dependency edge on its parent in both channels, added on
//! attach and removed on detach.
//!
//! - [`WORLD`] is marked with [`EagerPolicy`](understory_dirty::EagerPolicy)
//!   and drained immediately by the mutation that marked it. The drain yields
//!   the mutated node and all of its descendants; the scene recomputes their
//!   world translation and eager properties and notifies the observer. This
//!   replaces recursion over the subtree, so stack use does not grow with
//!   tree depth.
//!
//! - [`DERIVED`] is marked the same way but drained only when a lazy property
//!   is read (see [`UpdateMode::Lazy`](crate::property::UpdateMode::Lazy)).

use understory_dirty::Channel;

/// Effective transform changed; world translation and eager properties of the
/// node and its descendants are stale.
pub const WORLD: Channel = Channel::new(0);

/// Lazy property values of the node and its descendants are stale.
pub const DERIVED: Channel = Channel::new(1);
