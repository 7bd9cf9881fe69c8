// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable notification output.
//!
//! [`PrettyPrintObserver`] implements [`SceneObserver`] and writes one line
//! per notification to a [`Write`](std::io::Write) destination (default:
//! stderr). Write errors are ignored.

use std::io::Write;

use stagehand_core::node::{NodeId, NodeStore};
use stagehand_core::property::{PropertyKind, PropertyValue};
use stagehand_core::scene::SceneObserver;
use stagehand_core::vector::Vec3;

/// Writes human-readable notification lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintObserver<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintObserver<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintObserver").finish_non_exhaustive()
    }
}

impl PrettyPrintObserver {
    /// Creates an observer that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates an observer that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintObserver<W> {
    /// Creates an observer that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

fn value(v: PropertyValue) -> String {
    match v {
        PropertyValue::Vector(v) => vec3(v),
        PropertyValue::Quaternion(q) => {
            format!("[{:.4}, {:.4}, {:.4}, {:.4}]", q.x, q.y, q.z, q.w)
        }
        PropertyValue::Bounds(b) if b.is_empty() => "empty".to_string(),
        PropertyValue::Bounds(b) => format!("{}..{}", vec3(b.min), vec3(b.max)),
    }
}

/// `#3 "arm"`, or `#3 <dead>` for a handle that went stale.
fn label(nodes: &NodeStore, node: NodeId) -> String {
    if nodes.is_alive(node) {
        format!("{node} {:?}", nodes.kind_name(node))
    } else {
        format!("{node} <dead>")
    }
}

impl<W: Write> SceneObserver for PrettyPrintObserver<W> {
    fn node_added(&mut self, nodes: &NodeStore, node: NodeId) {
        let parent = nodes
            .parent(node)
            .map_or_else(|| "-".to_string(), |p| label(nodes, p));
        let _ = writeln!(
            self.writer,
            "[added] {} under {parent}",
            label(nodes, node)
        );
    }

    fn node_removed(&mut self, nodes: &NodeStore, node: NodeId) {
        let _ = writeln!(self.writer, "[removed] {}", label(nodes, node));
    }

    fn node_reparented(&mut self, nodes: &NodeStore, node: NodeId, new_parent: NodeId) {
        let _ = writeln!(
            self.writer,
            "[reparented] {} -> {}",
            label(nodes, node),
            label(nodes, new_parent),
        );
    }

    fn node_transform_changed(&mut self, nodes: &NodeStore, node: NodeId) {
        let _ = writeln!(
            self.writer,
            "[transform] {} local={} euler={} world={}",
            label(nodes, node),
            vec3(nodes.local_translation(node)),
            vec3(nodes.local_euler(node)),
            vec3(nodes.world_translation(node)),
        );
    }

    fn property_changed(&mut self, nodes: &NodeStore, node: NodeId, property: PropertyKind) {
        let shown = nodes
            .cached_property(node, property)
            .map_or_else(|| "?".to_string(), value);
        let _ = writeln!(
            self.writer,
            "[property] {} {property:?} = {shown}",
            label(nodes, node),
        );
    }
}
