// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Translation + rotation transform.
//!
//! [`RigidTransform`] is the decomposed form nodes store locally. Composition
//! `a * b` maps a point through `b` first and then `a`, so the world transform
//! of a node is `root * ... * parent * local`.

use core::ops::Mul;

use crate::quat::Quat;
use crate::transform::Transform3d;
use crate::vector::Vec3;

/// A rotation followed by a translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidTransform {
    /// Translation applied after the rotation.
    pub translation: Vec3,
    /// Unit rotation.
    pub rotation: Quat,
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a transform from its parts.
    #[inline]
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Creates a pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Creates a pure rotation.
    #[inline]
    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Returns the inverse transform.
    #[must_use]
    pub fn inverse(self) -> Self {
        let rotation = self.rotation.inverse();
        Self::new(-rotation.rotate(self.translation), rotation)
    }

    /// Maps a point through this transform.
    #[inline]
    #[must_use]
    pub fn transform_point(self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.translation
    }

    /// Returns the equivalent 4×4 matrix.
    #[inline]
    #[must_use]
    pub fn to_matrix(self) -> Transform3d {
        Transform3d::from_rigid(self)
    }

    /// Decomposes a rotation + translation matrix.
    ///
    /// Scale in the upper 3×3 is dropped and the rotation is normalized
    /// after extraction. Shear is not supported.
    #[must_use]
    pub fn from_matrix(m: Transform3d) -> Self {
        Self::new(m.translation(), m.rotation().normalize())
    }
}

impl Default for RigidTransform {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for RigidTransform {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.translation + self.rotation.rotate(rhs.translation),
            self.rotation * rhs.rotation,
        )
    }
}
