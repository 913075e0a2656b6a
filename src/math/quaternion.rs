//! Quaternions for 3-D orientation.

use crate::math::vector::Vector;

use std::ops::{Add, Mul, MulAssign, Neg, Sub};

/// A quaternion `w + xi + yj + zk` with the scalar part in `w`.
///
/// [`new`](Self::new) takes the scalar part first; multiplication is the
/// Hamilton product, so composing rotations reads right-to-left like matrix
/// application.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Quaternion<T> {
    pub x: T,
    pub y: T,
    pub z: T,
    pub w: T,
}

impl<T> Quaternion<T> {
    /// Builds `w + xi + yj + zk`, scalar part first.
    pub const fn new(w: T, x: T, y: T, z: T) -> Self {
        Self { x, y, z, w }
    }
}

impl<T: Copy> Quaternion<T> {
    /// The imaginary components as a vector.
    pub fn vector_part(self) -> Vector<T, 3> {
        Vector::new([self.x, self.y, self.z])
    }

    /// Conjugate: negated imaginary components.
    pub fn conjugate(self) -> Self
    where
        T: Neg<Output = T>,
    {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Squared norm `w² + x² + y² + z²`.
    pub fn norm_squared(self) -> T
    where
        T: Add<Output = T> + Mul<Output = T>,
    {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }
}

impl<T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Output = T>> Mul for Quaternion<T> {
    type Output = Self;

    /// Hamilton product.
    fn mul(self, rhs: Self) -> Self {
        let (w1, x1, y1, z1) = (self.w, self.x, self.y, self.z);
        let (w2, x2, y2, z2) = (rhs.w, rhs.x, rhs.y, rhs.z);
        Self {
            w: w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
            x: w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
            y: w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
            z: w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
        }
    }
}

impl<T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Output = T>> MulAssign for Quaternion<T> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

macro_rules! impl_float_quaternion {
    ($t:ty) => {
        impl Quaternion<$t> {
            /// The rotation-less quaternion `1 + 0i + 0j + 0k`.
            pub const fn identity() -> Self {
                Self::new(1.0, 0.0, 0.0, 0.0)
            }

            /// Norm of the four components.
            pub fn norm(self) -> $t {
                self.norm_squared().sqrt()
            }

            /// Unit quaternion in the same direction. A zero quaternion is
            /// returned unchanged rather than dividing by zero.
            pub fn normalize(self) -> Self {
                let n = self.norm();
                if n == 0.0 {
                    self
                } else {
                    Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
                }
            }

            /// Rotates `v` by this quaternion (assumed unit), expanding the
            /// equivalent rotation matrix.
            pub fn rotate(self, v: Vector<$t, 3>) -> Vector<$t, 3> {
                let (w, x, y, z) = (self.w, self.x, self.y, self.z);

                let m00 = 1.0 - 2.0 * (y * y + z * z);
                let m01 = 2.0 * (x * y - w * z);
                let m02 = 2.0 * (x * z + w * y);
                let m10 = 2.0 * (x * y + w * z);
                let m11 = 1.0 - 2.0 * (x * x + z * z);
                let m12 = 2.0 * (y * z - w * x);
                let m20 = 2.0 * (x * z - w * y);
                let m21 = 2.0 * (y * z + w * x);
                let m22 = 1.0 - 2.0 * (x * x + y * y);

                Vector::new([
                    m00 * v.x() + m01 * v.y() + m02 * v.z(),
                    m10 * v.x() + m11 * v.y() + m12 * v.z(),
                    m20 * v.x() + m21 * v.y() + m22 * v.z(),
                ])
            }

            /// Rotation about a unit `axis` by `angle` radians.
            pub fn from_axis_angle(axis: Vector<$t, 3>, angle: $t) -> Self {
                let half = angle * 0.5;
                let s = half.sin();
                Self::new(half.cos(), axis.x() * s, axis.y() * s, axis.z() * s)
            }
        }

        impl Default for Quaternion<$t> {
            fn default() -> Self {
                Self::identity()
            }
        }
    };
}

impl_float_quaternion!(f32);
impl_float_quaternion!(f64);

pub type Quaternionf = Quaternion<f32>;
pub type Quaterniond = Quaternion<f64>;

// =============================================================================
// TESTS
// =============================================================================
