// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node capability flags.

use bitflags::bitflags;

bitflags! {
    /// Which structural and UI operations a node supports.
    ///
    /// Fixed by the node's [`NodeKind`](crate::node::NodeKind) at creation.
    /// Only [`CAN_HAVE_CHILDREN`](Self::CAN_HAVE_CHILDREN) is enforced by the
    /// core; the rest tell the editor which tools apply.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Manipulators may move and rotate the node.
        const TRANSFORMABLE = 1 << 0;
        /// The node can be picked and selected.
        const SELECTABLE = 1 << 1;
        /// The node accepts [`add_node`](crate::scene::SceneGraph::add_node).
        const CAN_HAVE_CHILDREN = 1 << 2;
        /// The identifier label can be edited in place.
        const LABEL_EDITABLE = 1 << 3;
    }
}
