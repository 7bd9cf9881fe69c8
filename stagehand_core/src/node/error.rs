// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by structural mutations.

use core::fmt;

use super::id::NodeId;

/// A structural operation the node tree refused.
///
/// Both variants indicate a caller bug; the tree is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeError {
    /// The node's kind does not have
    /// [`CAN_HAVE_CHILDREN`](crate::capability::Capabilities::CAN_HAVE_CHILDREN).
    CapabilityViolation {
        /// Node the operation was attempted on.
        node: NodeId,
        /// Name of the refused operation.
        operation: &'static str,
    },
    /// Reparenting would make `node` its own ancestor.
    ParentCycle {
        /// Node being moved.
        node: NodeId,
        /// Requested parent, which is `node` or one of its descendants.
        new_parent: NodeId,
    },
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityViolation { node, operation } => {
                write!(f, "{operation} is not supported for node {node}")
            }
            Self::ParentCycle { node, new_parent } => {
                write!(
                    f,
                    "cannot parent node {node} under {new_parent}: it would contain itself"
                )
            }
        }
    }
}

impl core::error::Error for NodeError {}
