// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree mutation: attach, detach, and reparent.
//!
//! Structural edits are validated up front, applied to the store, and
//! followed by a world-translation cascade over the moved subtree. The
//! observer is notified only once the store is consistent again, so it sees
//! the new parent links and the new world translations.

use crate::capability::Capabilities;
use crate::node::{INVALID, NodeError, NodeId};

use super::{CHANGE_EPSILON_SQ, Notice, SceneGraph, SceneObserver};

impl<O: SceneObserver> SceneGraph<O> {
    /// Appends `child` as the last child of `parent`.
    ///
    /// If `parent` belongs to the scene, so does `child`'s subtree afterwards.
    ///
    /// # Errors
    ///
    /// - [`NodeError::CapabilityViolation`] if `parent` cannot have children.
    /// - [`NodeError::ParentCycle`] if `parent` is `child` or lies below it.
    ///
    /// Nothing is mutated on error.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_node(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        self.nodes.validate(parent);
        self.nodes.validate(child);
        self.check_can_have_children(parent, "add_node")?;
        self.check_no_cycle(child, parent)?;
        assert!(
            self.nodes.parent[child.idx as usize] == INVALID,
            "node {child} already has a parent"
        );

        log::debug!("add node {child} under {parent}");
        self.attach(parent, child);
        let moved = self.cascade(child.idx, CHANGE_EPSILON_SQ);
        self.emit(parent, Notice::Added(child));
        self.emit_world_moves(moved);
        Ok(())
    }

    /// Detaches `child` from `parent`. The detached subtree stays alive as a
    /// new root.
    ///
    /// # Errors
    ///
    /// [`NodeError::CapabilityViolation`] if `parent` cannot have children.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` is not a child of
    /// `parent`.
    pub fn remove_node(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        self.nodes.validate(parent);
        self.nodes.validate(child);
        self.check_can_have_children(parent, "remove_node")?;
        assert!(
            self.nodes.parent[child.idx as usize] == parent.idx,
            "node {child} is not a child of {parent}"
        );

        log::debug!("remove node {child} from {parent}");
        self.detach(child);
        let moved = self.cascade(child.idx, CHANGE_EPSILON_SQ);
        self.emit(parent, Notice::Removed(child));
        self.emit_world_moves(moved);
        Ok(())
    }

    /// Moves `node` under `new_parent`, keeping its local transform.
    ///
    /// Does nothing if `new_parent` already is the parent. Otherwise the
    /// observer hears `node_removed` (if `node` had a parent), `node_added`,
    /// then `node_reparented`, followed by world-translation changes for the
    /// moved subtree.
    ///
    /// # Errors
    ///
    /// - [`NodeError::CapabilityViolation`] if `new_parent` cannot have
    ///   children.
    /// - [`NodeError::ParentCycle`] if `new_parent` is `node` or lies below it.
    ///
    /// Nothing is mutated on error.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn set_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), NodeError> {
        self.nodes.validate(node);
        self.nodes.validate(new_parent);
        if self.nodes.parent[node.idx as usize] == new_parent.idx {
            return Ok(());
        }
        self.check_can_have_children(new_parent, "set_parent")?;
        self.check_no_cycle(node, new_parent)?;

        let old_parent = self.nodes.parent(node);
        log::debug!("reparent node {node} under {new_parent}");
        if old_parent.is_some() {
            self.detach(node);
        }
        self.attach(new_parent, node);
        let moved = self.cascade(node.idx, CHANGE_EPSILON_SQ);

        if let Some(old) = old_parent {
            self.emit(old, Notice::Removed(node));
        }
        self.emit(new_parent, Notice::Added(node));
        self.emit(node, Notice::Reparented(node, new_parent));
        self.emit_world_moves(moved);
        Ok(())
    }

    /// Detaches `node` from its parent, if it has one.
    ///
    /// # Errors
    ///
    /// Never fails in practice: a node with a child can always have children.
    /// The result mirrors [`remove_node`](Self::remove_node).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn clear_parent(&mut self, node: NodeId) -> Result<(), NodeError> {
        match self.nodes.parent(node) {
            Some(parent) => self.remove_node(parent, node),
            None => Ok(()),
        }
    }

    // -- Internal helpers --

    fn check_can_have_children(
        &self,
        node: NodeId,
        operation: &'static str,
    ) -> Result<(), NodeError> {
        if self
            .nodes
            .capabilities(node)
            .contains(Capabilities::CAN_HAVE_CHILDREN)
        {
            Ok(())
        } else {
            Err(NodeError::CapabilityViolation { node, operation })
        }
    }

    fn check_no_cycle(&self, node: NodeId, new_parent: NodeId) -> Result<(), NodeError> {
        if self.nodes.contains(node, new_parent) {
            Err(NodeError::ParentCycle { node, new_parent })
        } else {
            Ok(())
        }
    }

    /// Links `child` under `parent` without notifying.
    pub(super) fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes.link_child(parent.idx, child.idx);
        if self.nodes.in_scene[parent.idx as usize] {
            self.adopt_subtree(child);
        }
    }

    /// Unlinks `child` from its parent without notifying.
    pub(super) fn detach(&mut self, child: NodeId) {
        self.nodes.unlink_sibling(child.idx);
        self.nodes.clear_parent_link(child.idx);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::super::testing::{Event, Log};
    use super::*;
    use crate::node::{GroupNode, InstanceNode};
    use crate::property::PropertyKind;
    use crate::vector::Vec3;

    fn scene() -> SceneGraph<Log> {
        SceneGraph::new(Log::default())
    }

    #[test]
    fn add_node_appends_and_notifies() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let a = scene.create_node(GroupNode::new("a"));
        let b = scene.create_node(GroupNode::new("b"));
        scene.add_node(root, a).unwrap();
        scene.add_node(root, b).unwrap();

        let kids: Vec<_> = scene.nodes().children(root).collect();
        assert_eq!(kids, vec![a, b]);
        assert_eq!(scene.nodes().parent(a), Some(root));
        assert_eq!(scene.observer().events, [Event::Added(a), Event::Added(b)]);
    }

    #[test]
    fn add_node_on_leaf_fails_without_mutating() {
        let mut scene = scene();
        let leaf = scene.create_node(InstanceNode::new("/crate.model"));
        let child = scene.create_node(GroupNode::new("child"));

        let err = scene.add_node(leaf, child).unwrap_err();
        assert_eq!(
            err,
            NodeError::CapabilityViolation {
                node: leaf,
                operation: "add_node",
            }
        );
        assert_eq!(scene.nodes().children(leaf).count(), 0);
        assert_eq!(scene.nodes().parent(child), None);
        assert!(scene.observer().events.is_empty());
    }

    #[test]
    fn remove_node_on_leaf_fails_without_mutating() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let leaf = scene.create_node(InstanceNode::new("/crate.model"));
        scene.add_node(root, leaf).unwrap();
        scene.observer_mut().clear();

        let err = scene.remove_node(leaf, root).unwrap_err();
        assert!(matches!(err, NodeError::CapabilityViolation { .. }));
        assert_eq!(scene.nodes().parent(leaf), Some(root));
        assert!(scene.observer().events.is_empty());
    }

    #[test]
    fn remove_node_detaches_but_keeps_subtree() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let arm = scene.create_node(GroupNode::new("arm"));
        let hand = scene.create_node(GroupNode::new("hand"));
        scene.add_node(root, arm).unwrap();
        scene.add_node(arm, hand).unwrap();
        scene.observer_mut().clear();

        scene.remove_node(root, arm).unwrap();
        assert_eq!(scene.nodes().parent(arm), None);
        assert_eq!(scene.nodes().parent(hand), Some(arm));
        assert_eq!(scene.nodes().children(root).count(), 0);
        assert_eq!(scene.observer().events, [Event::Removed(arm)]);
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn duplicate_insertion_panics() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let child = scene.create_node(GroupNode::new("child"));
        scene.add_node(root, child).unwrap();
        let _ = scene.add_node(root, child);
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn removing_a_stranger_panics() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let other = scene.create_node(GroupNode::new("other"));
        let _ = scene.remove_node(root, other);
    }

    #[test]
    fn set_parent_moves_exactly_once() {
        let mut scene = scene();
        let p1 = scene.create_node(GroupNode::new("p1"));
        let p2 = scene.create_node(GroupNode::new("p2"));
        let sibling = scene.create_node(GroupNode::new("sibling"));
        let n = scene.create_node(GroupNode::new("n"));
        scene.add_node(p1, n).unwrap();
        scene.add_node(p2, sibling).unwrap();
        scene.observer_mut().clear();

        scene.set_parent(n, p2).unwrap();
        assert_eq!(scene.nodes().children(p1).count(), 0);
        let kids: Vec<_> = scene.nodes().children(p2).collect();
        assert_eq!(kids, vec![sibling, n]);
        assert_eq!(scene.nodes().parent(n), Some(p2));
        assert_eq!(
            scene.observer().events,
            [
                Event::Removed(n),
                Event::Added(n),
                Event::Reparented(n, p2),
            ]
        );
    }

    #[test]
    fn set_parent_to_current_parent_is_a_no_op() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let child = scene.create_node(GroupNode::new("child"));
        scene.add_node(root, child).unwrap();
        scene.observer_mut().clear();

        scene.set_parent(child, root).unwrap();
        assert!(scene.observer().events.is_empty());
        assert_eq!(scene.nodes().children(root).count(), 1);
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let child = scene.create_node(GroupNode::new("child"));
        let grandchild = scene.create_node(GroupNode::new("grandchild"));
        scene.add_node(root, child).unwrap();
        scene.add_node(child, grandchild).unwrap();
        scene.observer_mut().clear();

        assert_eq!(
            scene.set_parent(root, grandchild),
            Err(NodeError::ParentCycle {
                node: root,
                new_parent: grandchild,
            })
        );
        assert_eq!(
            scene.set_parent(child, child),
            Err(NodeError::ParentCycle {
                node: child,
                new_parent: child,
            })
        );
        assert_eq!(scene.nodes().parent(root), None);
        assert_eq!(scene.nodes().parent(child), Some(root));
        assert!(scene.observer().events.is_empty());
    }

    #[test]
    fn add_node_rejects_cycles() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let child = scene.create_node(GroupNode::new("child"));
        scene.add_node(root, child).unwrap();

        assert!(matches!(
            scene.add_node(child, root),
            Err(NodeError::ParentCycle { .. })
        ));
    }

    #[test]
    fn reparent_rederives_world_translation() {
        let mut scene = scene();
        let p1 = scene.create_node(GroupNode::new("p1"));
        let p2 = scene.create_node(GroupNode::new("p2"));
        let n = scene.create_node(GroupNode::new("n"));
        let leaf = scene.create_node(GroupNode::new("leaf"));
        scene.set_local_translation(p2, Vec3::new(0.0, 10.0, 0.0));
        scene.add_node(p1, n).unwrap();
        scene.add_node(n, leaf).unwrap();
        scene.set_local_translation(n, Vec3::X);
        scene.observer_mut().clear();

        scene.set_parent(n, p2).unwrap();
        assert_eq!(
            scene.nodes().world_translation(n),
            Vec3::new(1.0, 10.0, 0.0)
        );
        assert_eq!(
            scene.nodes().world_translation(leaf),
            Vec3::new(1.0, 10.0, 0.0)
        );
        let mut moved = scene
            .observer()
            .property_events(PropertyKind::WorldTranslation);
        moved.sort();
        assert_eq!(moved, vec![n, leaf]);
        assert_eq!(scene.observer().max_world_error_sq, 0.0);
    }

    #[test]
    fn clear_parent_makes_a_root() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let child = scene.create_node(GroupNode::new("child"));
        scene.set_local_translation(root, Vec3::new(3.0, 0.0, 0.0));
        scene.add_node(root, child).unwrap();
        assert_eq!(scene.nodes().world_translation(child), Vec3::new(3.0, 0.0, 0.0));

        scene.clear_parent(child).unwrap();
        assert_eq!(scene.nodes().parent(child), None);
        assert_eq!(scene.nodes().world_translation(child), Vec3::ZERO);
        assert!(scene.nodes().roots().contains(&child));
        scene.clear_parent(child).unwrap();
    }
}
