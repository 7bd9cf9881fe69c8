// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! This is the combined-matrix form used by tooling that hands the editor a
//! full matrix (gizmos, importers). Nodes never store it; they decompose it
//! into translation + rotation through [`RigidTransform::from_matrix`].

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::quat::Quat;
use crate::rigid::RigidTransform;
use crate::vector::Vec3;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix; column 3 holds the
/// translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns the columns as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn to_cols_array_2d(self) -> [[f64; 4]; 4] {
        self.cols
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(t: Vec3) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [t.x, t.y, t.z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation matrix from a unit quaternion.
    #[must_use]
    pub fn from_rotation(q: Quat) -> Self {
        let Quat { x, y, z, w } = q;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (xw, yw, zw) = (x * w, y * w, z * w);
        Self {
            cols: [
                [1.0 - 2.0 * (yy + zz), 2.0 * (xy + zw), 2.0 * (xz - yw), 0.0],
                [2.0 * (xy - zw), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + xw), 0.0],
                [2.0 * (xz + yw), 2.0 * (yz - xw), 1.0 - 2.0 * (xx + yy), 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates the matrix of a [`RigidTransform`].
    #[must_use]
    pub fn from_rigid(t: RigidTransform) -> Self {
        let mut m = Self::from_rotation(t.rotation);
        m.cols[3] = [t.translation.x, t.translation.y, t.translation.z, 1.0];
        m
    }

    /// Returns the translation column.
    #[inline]
    #[must_use]
    pub const fn translation(self) -> Vec3 {
        let c = self.cols[3];
        Vec3::new(c[0], c[1], c[2])
    }

    /// Extracts the rotation of the upper 3×3 block.
    ///
    /// Each basis column is scaled to unit length first, so per-axis scale
    /// does not leak into the result. Shear is not removed. The result is not
    /// normalized.
    #[must_use]
    pub fn rotation(self) -> Quat {
        let mut basis = [[0.0; 3]; 3];
        for (out, col) in basis.iter_mut().zip(&self.cols) {
            let len = (col[0] * col[0] + col[1] * col[1] + col[2] * col[2]).sqrt();
            let inv = if len > f64::EPSILON { 1.0 / len } else { 1.0 };
            *out = [col[0] * inv, col[1] * inv, col[2] * inv];
        }
        // m(row, col)
        let m = |r: usize, c: usize| basis[c][r];
        let trace = m(0, 0) + m(1, 1) + m(2, 2);
        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Quat::new(
                (m(2, 1) - m(1, 2)) / s,
                (m(0, 2) - m(2, 0)) / s,
                (m(1, 0) - m(0, 1)) / s,
                0.25 * s,
            )
        } else if m(0, 0) > m(1, 1) && m(0, 0) > m(2, 2) {
            let s = (1.0 + m(0, 0) - m(1, 1) - m(2, 2)).sqrt() * 2.0;
            Quat::new(
                0.25 * s,
                (m(0, 1) + m(1, 0)) / s,
                (m(0, 2) + m(2, 0)) / s,
                (m(2, 1) - m(1, 2)) / s,
            )
        } else if m(1, 1) > m(2, 2) {
            let s = (1.0 + m(1, 1) - m(0, 0) - m(2, 2)).sqrt() * 2.0;
            Quat::new(
                (m(0, 1) + m(1, 0)) / s,
                0.25 * s,
                (m(1, 2) + m(2, 1)) / s,
                (m(0, 2) - m(2, 0)) / s,
            )
        } else {
            let s = (1.0 + m(2, 2) - m(0, 0) - m(1, 1)).sqrt() * 2.0;
            Quat::new(
                (m(0, 2) + m(2, 0)) / s,
                (m(1, 2) + m(2, 1)) / s,
                0.25 * s,
                (m(1, 0) - m(0, 1)) / s,
            )
        }
    }

    /// Maps a point (implicit `w = 1`) through this matrix.
    #[must_use]
    pub fn transform_point(self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1],
            c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2],
        )
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let t = Transform3d::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Transform3d::IDENTITY * t, t);
        assert_eq!(t * Transform3d::IDENTITY, t);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Transform3d::from_translation(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!((a * b).col(3), [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_extraction_round_trips() {
        // One sample per Shepperd branch: positive trace and each dominant axis.
        let samples = [
            Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.4),
            Quat::from_axis_angle(Vec3::X, 3.0),
            Quat::from_axis_angle(Vec3::Y, 3.0),
            Quat::from_axis_angle(Vec3::Z, 3.0),
        ];
        for q in samples {
            let back = Transform3d::from_rotation(q).rotation();
            assert!(
                back.distance_squared_unsigned(q) < EPS,
                "{q:?} extracted as {back:?}"
            );
        }
    }

    #[test]
    fn rotation_extraction_ignores_scale() {
        let q = Quat::from_axis_angle(Vec3::Z, core::f64::consts::FRAC_PI_2);
        let uniform = Transform3d::from_rotation(q) * Transform3d::from_scale(2.0, 2.0, 2.0);
        let back = uniform.rotation();
        assert!(
            back.distance_squared_unsigned(q) < EPS,
            "uniform scale changed the rotation: {back:?}"
        );

        let q = Quat::from_axis_angle(Vec3::new(1.0, -2.0, 0.5), 0.9);
        let skewed = Transform3d::from_rotation(q) * Transform3d::from_scale(0.5, 3.0, 7.0);
        let back = skewed.rotation();
        assert!(
            back.distance_squared_unsigned(q) < EPS,
            "per-axis scale changed the rotation: {back:?}"
        );
    }

    #[test]
    fn matrix_and_quaternion_rotate_alike() {
        let q = Quat::from_axis_angle(Vec3::new(0.3, -1.0, 0.5), 1.1);
        let m = Transform3d::from_rotation(q);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(m.transform_point(p).distance_squared(q.rotate(p)) < EPS);
    }

    #[test]
    fn matrix_product_matches_rigid_composition() {
        let a = RigidTransform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::Z, 0.5),
        );
        let b = RigidTransform::new(
            Vec3::new(0.0, 3.0, 0.0),
            Quat::from_axis_angle(Vec3::X, -0.25),
        );
        let via_matrix = RigidTransform::from_matrix(a.to_matrix() * b.to_matrix());
        let direct = a * b;
        assert!(via_matrix.translation.distance_squared(direct.translation) < EPS);
        assert!(via_matrix.rotation.distance_squared_unsigned(direct.rotation) < EPS);
    }

    #[test]
    fn scale() {
        let s = Transform3d::from_scale(2.0, 3.0, 4.0);
        assert_eq!(s.col(0)[0], 2.0);
        assert_eq!(s.col(1)[1], 3.0);
        assert_eq!(s.col(2)[2], 4.0);
        assert_eq!(s.translation(), Vec3::ZERO);
    }

    #[test]
    fn infinity_detected() {
        assert!(Transform3d::IDENTITY.is_finite());
        let mut t = Transform3d::IDENTITY;
        t.cols[0][3] = f64::INFINITY;
        assert!(!t.is_finite());
    }
}
