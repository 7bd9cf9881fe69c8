// Copyright 2026 the Stagehand Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotation quaternion and Euler-angle conversion.
//!
//! Euler angles are expressed in **degrees** and stored in a [`Vec3`] as
//! `(bank, heading, attitude)`:
//!
//! - `x`: bank, rotation about the X axis (applied first),
//! - `z`: attitude, rotation about the Z axis (applied second),
//! - `y`: heading, rotation about the Y axis (applied last).
//!
//! That is, `from_euler(e) == Ry(e.y) * Rz(e.z) * Rx(e.x)`.
//!
//! # Gimbal lock
//!
//! At ±90° attitude the bank and heading axes coincide and only their sum is
//! observable. [`Quat::to_euler`] detects this with [`GIMBAL_LOCK_THRESHOLD`]
//! and folds the whole rotation into heading with a zero bank. The rotation
//! survives the round trip, but the original angle triple does not. Attitudes
//! short of the pole, even by a fraction of a degree, take the general path and
//! round-trip exactly.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::vector::Vec3;

/// Singularity test bound for Euler extraction.
///
/// `x*y + z*w` reaches `0.5` at ±90° attitude; past this fraction of it the
/// extraction switches to the gimbal-locked branch. The band spans less than
/// 0.004° around each pole.
pub const GIMBAL_LOCK_THRESHOLD: f64 = 0.5 - 1e-9;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// A quaternion `(x, y, z, w)` with `w` as the scalar part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    /// X component of the vector part.
    pub x: f64,
    /// Y component of the vector part.
    pub y: f64,
    /// Z component of the vector part.
    pub z: f64,
    /// Scalar part.
    pub w: f64,
}

impl Quat {
    /// The identity rotation.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a quaternion from raw components. No normalization happens.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a rotation of `radians` about `axis`.
    ///
    /// A zero-length axis yields the identity.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, radians: f64) -> Self {
        let len_sq = axis.length_squared();
        if len_sq <= f64::EPSILON {
            return Self::IDENTITY;
        }
        let axis = axis * (1.0 / len_sq.sqrt());
        let half = radians * 0.5;
        let (s, c) = (half.sin(), half.cos());
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Returns the components as `[x, y, z, w]`.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Four-component dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    /// Squared norm.
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Returns the unit quaternion pointing the same way.
    ///
    /// Zero-length and non-finite input collapse to [`IDENTITY`](Self::IDENTITY)
    /// so the stored rotation always stays a valid rotation.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.length_squared();
        if !(len_sq.is_finite() && len_sq > f64::EPSILON * f64::EPSILON) {
            return Self::IDENTITY;
        }
        let inv = 1.0 / len_sq.sqrt();
        Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Conjugate; the inverse of a unit quaternion.
    #[inline]
    #[must_use]
    pub const fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse.
    #[must_use]
    pub fn inverse(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq <= f64::EPSILON * f64::EPSILON {
            return Self::IDENTITY;
        }
        let c = self.conjugate();
        let inv = 1.0 / len_sq;
        Self::new(c.x * inv, c.y * inv, c.z * inv, c.w * inv)
    }

    /// Rotates `v` by this (unit) quaternion.
    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Squared distance to `other`, treating `q` and `-q` as the same rotation.
    #[must_use]
    pub fn distance_squared_unsigned(self, other: Self) -> f64 {
        let same = Self::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        );
        let flipped = Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        );
        same.length_squared().min(flipped.length_squared())
    }

    /// Is every component [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Builds a rotation from `(bank, heading, attitude)` degrees.
    ///
    /// See the [module documentation](self) for the axis convention.
    #[must_use]
    pub fn from_euler(euler: Vec3) -> Self {
        let heading = euler.y * DEG_TO_RAD * 0.5;
        let attitude = euler.z * DEG_TO_RAD * 0.5;
        let bank = euler.x * DEG_TO_RAD * 0.5;
        let (s1, c1) = (heading.sin(), heading.cos());
        let (s2, c2) = (attitude.sin(), attitude.cos());
        let (s3, c3) = (bank.sin(), bank.cos());
        Self::new(
            s1 * s2 * c3 + c1 * c2 * s3,
            s1 * c2 * c3 + c1 * s2 * s3,
            c1 * s2 * c3 - s1 * c2 * s3,
            c1 * c2 * c3 - s1 * s2 * s3,
        )
    }

    /// Extracts `(bank, heading, attitude)` degrees.
    ///
    /// Works on non-unit input. Inside the gimbal-lock band the bank is
    /// reported as zero; see the [module documentation](self).
    #[must_use]
    pub fn to_euler(self) -> Vec3 {
        let Self { x, y, z, w } = self;
        let (sqx, sqy, sqz, sqw) = (x * x, y * y, z * z, w * w);
        let unit = sqx + sqy + sqz + sqw;
        if unit <= f64::EPSILON {
            return Vec3::ZERO;
        }
        let test = x * y + z * w;

        if test > GIMBAL_LOCK_THRESHOLD * unit {
            let heading = wrap_angle(2.0 * x.atan2(w));
            return Vec3::new(0.0, heading * RAD_TO_DEG, 90.0);
        }
        if test < -GIMBAL_LOCK_THRESHOLD * unit {
            let heading = wrap_angle(-2.0 * x.atan2(w));
            return Vec3::new(0.0, heading * RAD_TO_DEG, -90.0);
        }

        let heading = (2.0 * y * w - 2.0 * x * z).atan2(sqx - sqy - sqz + sqw);
        let sin_attitude = 2.0 * test / unit;
        let cos_attitude = (1.0 - sin_attitude * sin_attitude).max(0.0).sqrt();
        let attitude = sin_attitude.atan2(cos_attitude);
        let bank = (2.0 * x * w - 2.0 * y * z).atan2(-sqx + sqy - sqz + sqw);

        Vec3::new(bank * RAD_TO_DEG, heading * RAD_TO_DEG, attitude * RAD_TO_DEG)
    }
}

/// Maps radians into `(-π, π]`, so `q` and `-q` report the same heading.
fn wrap_angle(radians: f64) -> f64 {
    use core::f64::consts::{PI, TAU};
    if radians > PI {
        radians - TAU
    } else if radians <= -PI {
        radians + TAU
    } else {
        radians
    }
}

impl Default for Quat {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Self;

    /// Hamilton product; `a * b` applies `b` first, then `a`.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = self;
        let b = rhs;
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }
}
