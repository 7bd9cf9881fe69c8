// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local and world transform mutation.
//!
//! Every setter funnels into one write path:
//!
//! 1. Apply the new translation and/or rotation. Rotations are normalized,
//!    and the Euler view is resynchronized from whichever of rotation or
//!    Euler was written.
//! 2. Run the cascade: mark the node's [`WORLD`](dirty::WORLD) channel with
//!    eager propagation, drain it, and recompute world translation and eager
//!    properties for every drained node. Lazy properties are marked stale.
//! 3. Compare before/after values against a threshold and notify only for
//!    what moved.
//!
//! Direct setters and [`set_world_translation`](SceneGraph::set_world_translation)
//! use [`CHANGE_EPSILON_SQ`]. Writes through a combined transform or matrix
//! use [`NOISE_EPSILON_SQ`] for the per-property notices, which swallows
//! decomposition round-trip noise; there Euler is reported with rotation.
//! `node_transform_changed` fires whenever anything moved past
//! [`CHANGE_EPSILON_SQ`].

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use understory_dirty::EagerPolicy;

use crate::dirty;
use crate::node::{INVALID, NodeId};
use crate::property::{PropertyKind, UpdateMode};
use crate::quat::Quat;
use crate::rigid::RigidTransform;
use crate::transform::Transform3d;
use crate::vector::Vec3;

use super::{CHANGE_EPSILON_SQ, NOISE_EPSILON_SQ, Notice, SceneGraph, SceneObserver};

/// How a write decides which components changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChangeTest {
    /// Each component is compared against [`CHANGE_EPSILON_SQ`].
    Exact,
    /// Translation and rotation are compared against [`NOISE_EPSILON_SQ`];
    /// Euler is reported together with rotation.
    Noise,
}

impl ChangeTest {
    fn threshold_sq(self) -> f64 {
        match self {
            Self::Exact => CHANGE_EPSILON_SQ,
            Self::Noise => NOISE_EPSILON_SQ,
        }
    }
}

/// Which rotation representation a write supplies.
#[derive(Clone, Copy, Debug)]
enum RotationWrite {
    Keep,
    Quaternion(Quat),
    Euler(Vec3),
}

impl<O: SceneObserver> SceneGraph<O> {
    /// Sets the translation relative to the parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_local_translation(&mut self, id: NodeId, translation: Vec3) {
        self.write_local(id, Some(translation), RotationWrite::Keep, ChangeTest::Exact);
    }

    /// Sets the rotation relative to the parent.
    ///
    /// The quaternion is normalized before it is stored; a zero or non-finite
    /// quaternion becomes the identity. Rotation and Euler changes are both
    /// reported, since normalization may alter the value independently of the
    /// caller's edit.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.write_local(
            id,
            None,
            RotationWrite::Quaternion(rotation),
            ChangeTest::Exact,
        );
    }

    /// Sets the rotation from `(bank, heading, attitude)` degrees.
    ///
    /// The Euler value is stored as given; the quaternion is derived from it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_local_euler(&mut self, id: NodeId, euler: Vec3) {
        self.write_local(id, None, RotationWrite::Euler(euler), ChangeTest::Exact);
    }

    /// Sets translation and rotation together.
    ///
    /// Translation and rotation notify only if they moved by more than
    /// [`NOISE_EPSILON_SQ`], and Euler notifies together with rotation.
    /// Smaller changes are still stored and announced through
    /// [`node_transform_changed`](SceneObserver::node_transform_changed).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_local_transform(&mut self, id: NodeId, transform: RigidTransform) {
        self.write_local(
            id,
            Some(transform.translation),
            RotationWrite::Quaternion(transform.rotation),
            ChangeTest::Noise,
        );
    }

    /// Sets the local transform from a rotation + translation matrix.
    ///
    /// Scale in the matrix is discarded. Notifies like
    /// [`set_local_transform`](Self::set_local_transform).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_local_matrix(&mut self, id: NodeId, matrix: Transform3d) {
        self.set_local_transform(id, RigidTransform::from_matrix(matrix));
    }

    /// Right-multiplies the local transform by `delta`.
    ///
    /// `delta` is expressed in the node's own frame. Notifies like
    /// [`set_local_transform`](Self::set_local_transform).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn transform_local(&mut self, id: NodeId, delta: RigidTransform) {
        let local = self.nodes.local_transform(id);
        self.set_local_transform(id, local * delta);
    }

    /// Right-multiplies the local matrix by `delta`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn transform_local_matrix(&mut self, id: NodeId, delta: Transform3d) {
        let local = self.nodes.local_matrix(id);
        self.set_local_matrix(id, local * delta);
    }

    /// Places the node at `world` by solving for its local transform through
    /// the inverse of the parent chain.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_world_transform(&mut self, id: NodeId, world: RigidTransform) {
        let parent_world = self
            .nodes
            .parent(id)
            .map_or(RigidTransform::IDENTITY, |p| self.nodes.world_transform(p));
        self.set_local_transform(id, parent_world.inverse() * world);
    }

    /// Moves the node so its world translation becomes `translation`, keeping
    /// its rotation.
    ///
    /// Notifies like [`set_local_translation`](Self::set_local_translation),
    /// so small nudges are reported too.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_world_translation(&mut self, id: NodeId, translation: Vec3) {
        self.nodes.validate(id);
        let local = match self.nodes.parent(id) {
            Some(p) => self.nodes.world_transform(p).inverse().transform_point(translation),
            None => translation,
        };
        self.write_local(id, Some(local), RotationWrite::Keep, ChangeTest::Exact);
    }

    // -- Internal helpers --

    fn write_local(
        &mut self,
        id: NodeId,
        translation: Option<Vec3>,
        rotation: RotationWrite,
        test: ChangeTest,
    ) {
        self.nodes.validate(id);
        let i = id.idx as usize;
        let before_translation = self.nodes.local_translation[i];
        let before_rotation = self.nodes.local_rotation[i];
        let before_euler = self.nodes.local_euler[i];

        if let Some(t) = translation {
            self.nodes.local_translation[i] = t;
        }
        match rotation {
            RotationWrite::Keep => {}
            RotationWrite::Quaternion(q) => {
                let q = q.normalize();
                self.nodes.local_rotation[i] = q;
                self.nodes.local_euler[i] = q.to_euler();
            }
            RotationWrite::Euler(e) => {
                self.nodes.local_euler[i] = e;
                self.nodes.local_rotation[i] = Quat::from_euler(e).normalize();
            }
        }

        let threshold_sq = test.threshold_sq();
        let moved = self.cascade(id.idx, threshold_sq);

        let translation_delta = before_translation.distance_squared(self.nodes.local_translation[i]);
        let rotation_delta =
            before_rotation.distance_squared_unsigned(self.nodes.local_rotation[i]);
        let euler_delta = before_euler.distance_squared(self.nodes.local_euler[i]);

        let changed = translation_delta > CHANGE_EPSILON_SQ
            || rotation_delta > CHANGE_EPSILON_SQ
            || euler_delta > CHANGE_EPSILON_SQ;
        let translation_moved = translation_delta > threshold_sq;
        let rotation_moved = rotation_delta > threshold_sq;
        let euler_moved = match test {
            ChangeTest::Exact => euler_delta > threshold_sq,
            ChangeTest::Noise => rotation_moved,
        };

        if changed {
            self.emit(id, Notice::TransformChanged(id));
            if translation_moved {
                self.emit(id, Notice::PropertyChanged(id, PropertyKind::Translation));
            }
            if rotation_moved {
                self.emit(id, Notice::PropertyChanged(id, PropertyKind::Rotation));
            }
            if euler_moved {
                self.emit(id, Notice::PropertyChanged(id, PropertyKind::Euler));
            }
        }
        self.emit_world_moves(moved);
    }

    /// Recomputes world translation and eager properties for slot `idx` and
    /// its subtree, returning the slots whose world translation moved by more
    /// than `threshold_sq`.
    pub(super) fn cascade(&mut self, idx: u32, threshold_sq: f64) -> Vec<u32> {
        let nodes = &mut self.nodes;
        nodes.dirty.mark_with(idx, dirty::WORLD, &EagerPolicy);
        nodes.invalidate_derived(idx);

        let order: Vec<u32> = nodes
            .dirty
            .drain(dirty::WORLD)
            .affected()
            .deterministic()
            .run()
            .collect();

        // World transforms computed during this pass. A node whose parent
        // was not recomputed here composes its parent chain from scratch.
        let mut worlds: BTreeMap<u32, RigidTransform> = BTreeMap::new();
        let mut moved = Vec::new();
        for n in order {
            if nodes.kind[n as usize].is_none() {
                continue;
            }
            let p = nodes.parent[n as usize];
            let parent_world = if p == INVALID {
                RigidTransform::IDENTITY
            } else {
                match worlds.get(&p) {
                    Some(world) => *world,
                    None => nodes.world_transform_at(p),
                }
            };
            let world = parent_world * nodes.local_transform_at(n);
            worlds.insert(n, world);

            let before = nodes.world_translation[n as usize];
            nodes.run_updaters(n, world, UpdateMode::Eager);
            if before.distance_squared(nodes.world_translation[n as usize]) > threshold_sq {
                moved.push(n);
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::super::testing::{Event, Log};
    use super::*;
    use crate::node::GroupNode;

    const EPS: f64 = 1e-9;

    fn scene() -> SceneGraph<Log> {
        SceneGraph::new(Log::default())
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance_squared(b) < EPS
    }

    #[test]
    fn parent_translation_moves_child_world_translation() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("R"));
        let child = scene.create_node(GroupNode::new("C"));
        scene.add_node(root, child).unwrap();
        scene.set_local_translation(child, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(
            scene.nodes().world_translation(child),
            Vec3::new(1.0, 0.0, 0.0)
        );
        scene.observer_mut().clear();

        scene.set_local_translation(root, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(
            scene.nodes().world_translation(child),
            Vec3::new(6.0, 0.0, 0.0)
        );
        let child_events = scene
            .observer()
            .events
            .iter()
            .filter(|e| **e == Event::Property(child, PropertyKind::WorldTranslation))
            .count();
        assert_eq!(child_events, 1, "exactly one world-translation change for C");
    }

    #[test]
    fn translation_write_notifies_in_order() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_translation(node, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(node),
                Event::Property(node, PropertyKind::Translation),
                Event::Property(node, PropertyKind::WorldTranslation),
            ]
        );
    }

    #[test]
    fn redundant_write_emits_nothing() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_translation(node, Vec3::new(0.0, 2.0, 0.0));
        scene.observer_mut().clear();

        scene.set_local_translation(node, Vec3::new(0.0, 2.0, 0.0));
        scene.set_local_rotation(node, Quat::IDENTITY);
        scene.set_local_euler(node, Vec3::ZERO);
        assert!(scene.observer().events.is_empty());
    }

    #[test]
    fn non_unit_rotation_is_normalized_and_reported_twice() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_rotation(node, Quat::new(2.0, 0.0, 0.0, 0.0));

        assert_eq!(
            scene.nodes().local_rotation(node),
            Quat::new(1.0, 0.0, 0.0, 0.0)
        );
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(node),
                Event::Property(node, PropertyKind::Rotation),
                Event::Property(node, PropertyKind::Euler),
            ]
        );
    }

    #[test]
    fn degenerate_rotation_becomes_identity() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_rotation(node, Quat::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(scene.nodes().local_rotation(node), Quat::IDENTITY);
        scene.set_local_rotation(node, Quat::new(f64::NAN, 0.0, 0.0, 1.0));
        assert_eq!(scene.nodes().local_rotation(node), Quat::IDENTITY);
    }

    #[test]
    fn euler_write_derives_rotation() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_euler(node, Vec3::new(0.0, 90.0, 0.0));

        let q = scene.nodes().local_rotation(node);
        let expected = Quat::from_axis_angle(Vec3::Y, core::f64::consts::FRAC_PI_2);
        assert!(q.distance_squared_unsigned(expected) < EPS, "{q:?}");
        assert_eq!(scene.nodes().local_euler(node), Vec3::new(0.0, 90.0, 0.0));
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(node),
                Event::Property(node, PropertyKind::Rotation),
                Event::Property(node, PropertyKind::Euler),
            ]
        );
    }

    #[test]
    fn rotation_stays_unit_length_on_every_path() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        let unit = |scene: &SceneGraph<Log>| {
            (scene.nodes().local_rotation(node).length_squared() - 1.0).abs() < EPS
        };

        scene.set_local_rotation(node, Quat::new(0.3, -1.2, 0.5, 2.0));
        assert!(unit(&scene));
        scene.set_local_euler(node, Vec3::new(12.0, 250.0, -40.0));
        assert!(unit(&scene));
        let m = Transform3d::from_rotation(Quat::new(1.0, 1.0, 0.0, 0.0).normalize())
            * Transform3d::from_scale(2.0, 2.0, 2.0);
        scene.set_local_matrix(node, m);
        assert!(unit(&scene));
        scene.transform_local(
            node,
            RigidTransform::from_rotation(Quat::from_axis_angle(Vec3::Z, 0.7)),
        );
        assert!(unit(&scene));
    }

    #[test]
    fn matrix_round_trip_is_quiet() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_transform(
            node,
            RigidTransform::new(
                Vec3::new(1.0, 2.0, 3.0),
                Quat::from_axis_angle(Vec3::new(0.0, 0.6, 0.8), 1.1),
            ),
        );
        scene.observer_mut().clear();

        let m = scene.nodes().local_matrix(node);
        scene.set_local_matrix(node, m);
        assert!(
            scene.observer().events.is_empty(),
            "round-trip noise must not notify: {:?}",
            scene.observer().events
        );
    }

    #[test]
    fn combined_write_reports_only_moved_components() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_transform(node, RigidTransform::from_translation(Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(node),
                Event::Property(node, PropertyKind::Translation),
                Event::Property(node, PropertyKind::WorldTranslation),
            ]
        );
    }

    #[test]
    fn combined_write_reports_rotation_and_euler_together() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));

        // Half a degree is below the noise floor for the property notices.
        let nudge = Quat::from_axis_angle(Vec3::Y, 0.5 * core::f64::consts::PI / 180.0);
        scene.transform_local(node, RigidTransform::from_rotation(nudge));
        assert_eq!(scene.observer().events, [Event::Transform(node)]);
        assert!(close(
            scene.nodes().local_euler(node),
            Vec3::new(0.0, 0.5, 0.0)
        ));
        scene.observer_mut().clear();

        let turn = Quat::from_axis_angle(Vec3::Y, 0.5);
        scene.transform_local(node, RigidTransform::from_rotation(turn));
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(node),
                Event::Property(node, PropertyKind::Rotation),
                Event::Property(node, PropertyKind::Euler),
            ]
        );
    }

    #[test]
    fn scaled_matrix_keeps_orientation() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        let q = Quat::from_axis_angle(Vec3::Z, core::f64::consts::FRAC_PI_2);
        let m = Transform3d::from_translation(Vec3::new(1.0, 0.0, 0.0))
            * Transform3d::from_rotation(q)
            * Transform3d::from_scale(2.0, 2.0, 2.0);
        scene.set_local_matrix(node, m);

        let stored = scene.nodes().local_rotation(node);
        assert!(
            stored.distance_squared_unsigned(q) < EPS,
            "scale leaked into the rotation: {stored:?}"
        );
        assert!(close(
            scene.nodes().local_euler(node),
            Vec3::new(0.0, 0.0, 90.0)
        ));
        assert!(close(
            scene.nodes().local_translation(node),
            Vec3::new(1.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn small_world_nudge_notifies() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let hand = scene.create_node(GroupNode::new("hand"));
        scene.add_node(root, hand).unwrap();
        scene.set_local_rotation(root, Quat::from_axis_angle(Vec3::Z, 0.3));
        scene.observer_mut().clear();

        let target = scene.nodes().world_translation(hand) + Vec3::new(0.005, 0.0, 0.0);
        scene.set_world_translation(hand, target);
        assert!(close(scene.nodes().world_translation(hand), target));
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(hand),
                Event::Property(hand, PropertyKind::Translation),
                Event::Property(hand, PropertyKind::WorldTranslation),
            ]
        );

        scene.observer_mut().clear();
        scene.set_world_translation(hand, target);
        assert!(scene.observer().events.is_empty());
    }

    #[test]
    fn world_cache_matches_composition_after_ancestor_edits() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let arm = scene.create_node(GroupNode::new("arm"));
        let hand = scene.create_node(GroupNode::new("hand"));
        scene.add_node(root, arm).unwrap();
        scene.add_node(arm, hand).unwrap();
        scene.set_local_translation(arm, Vec3::new(2.0, 0.0, 0.0));
        scene.set_local_translation(hand, Vec3::new(0.0, 1.0, 0.0));

        scene.set_local_euler(root, Vec3::new(30.0, 45.0, 10.0));
        scene.set_local_rotation(arm, Quat::from_axis_angle(Vec3::X, 0.4));
        scene.set_local_translation(root, Vec3::new(-3.0, 1.0, 7.0));

        for node in [root, arm, hand] {
            let cached = scene.nodes().world_translation(node);
            let fresh = scene.nodes().world_transform(node).translation;
            assert!(close(cached, fresh), "{node:?}: {cached:?} vs {fresh:?}");
        }
        assert!(scene.observer().max_world_error_sq < EPS);
    }

    #[test]
    fn cascade_reaches_every_descendant_and_no_sibling() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let a = scene.create_node(GroupNode::new("a"));
        let a1 = scene.create_node(GroupNode::new("a1"));
        let a2 = scene.create_node(GroupNode::new("a2"));
        let a1x = scene.create_node(GroupNode::new("a1x"));
        let other = scene.create_node(GroupNode::new("other"));
        let other_child = scene.create_node(GroupNode::new("other_child"));
        scene.add_node(root, a).unwrap();
        scene.add_node(a, a1).unwrap();
        scene.add_node(a, a2).unwrap();
        scene.add_node(a1, a1x).unwrap();
        scene.add_node(other, other_child).unwrap();
        scene.observer_mut().clear();

        scene.set_local_translation(root, Vec3::new(0.0, 0.0, 1.0));
        let mut moved = scene
            .observer()
            .property_events(PropertyKind::WorldTranslation);
        moved.sort();
        let mut expected = vec![root, a, a1, a2, a1x];
        expected.sort();
        assert_eq!(moved, expected);
    }

    #[test]
    fn world_translation_drag_keeps_world_rotation() {
        let mut scene = scene();
        let root = scene.create_node(GroupNode::new("root"));
        let hand = scene.create_node(GroupNode::new("hand"));
        scene.add_node(root, hand).unwrap();
        scene.set_local_translation(root, Vec3::new(10.0, 0.0, 0.0));
        scene.set_local_rotation(root, Quat::from_axis_angle(Vec3::Z, core::f64::consts::FRAC_PI_2));
        scene.set_local_rotation(hand, Quat::from_axis_angle(Vec3::X, 0.3));
        let world_rotation = scene.nodes().world_transform(hand).rotation;
        scene.observer_mut().clear();

        scene.set_world_translation(hand, Vec3::new(10.0, 5.0, 0.0));
        assert!(close(
            scene.nodes().world_translation(hand),
            Vec3::new(10.0, 5.0, 0.0)
        ));
        // Parent rotates +X onto +Y, so the local offset is along +X.
        assert!(close(
            scene.nodes().local_translation(hand),
            Vec3::new(5.0, 0.0, 0.0)
        ));
        let after = scene.nodes().world_transform(hand).rotation;
        assert!(after.distance_squared_unsigned(world_rotation) < EPS);
        assert_eq!(
            scene.observer().events,
            [
                Event::Transform(hand),
                Event::Property(hand, PropertyKind::Translation),
                Event::Property(hand, PropertyKind::WorldTranslation),
            ]
        );
    }

    #[test]
    fn transform_local_applies_delta_in_local_frame() {
        let mut scene = scene();
        let node = scene.create_node(GroupNode::new("n"));
        scene.set_local_rotation(node, Quat::from_axis_angle(Vec3::Z, core::f64::consts::FRAC_PI_2));
        scene.transform_local(node, RigidTransform::from_translation(Vec3::X));
        assert!(close(
            scene.nodes().local_translation(node),
            Vec3::new(0.0, 1.0, 0.0)
        ));

        scene.transform_local_matrix(node, Transform3d::from_translation(Vec3::X));
        assert!(close(
            scene.nodes().local_translation(node),
            Vec3::new(0.0, 2.0, 0.0)
        ));
    }
}
