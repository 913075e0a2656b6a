//! Fixed-dimension vectors over an inline array.

use std::array;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// An `N`-dimensional vector with inline storage.
///
/// Arithmetic is element-wise, including [`dot`](Self::dot); the scalar
/// inner product is [`scalar_dot`](Self::scalar_dot).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Vector<T, const N: usize> {
    elems: [T; N],
}

impl<T, const N: usize> Vector<T, N> {
    pub const fn new(elems: [T; N]) -> Self {
        Self { elems }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.elems
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elems
    }

    #[inline]
    pub fn into_array(self) -> [T; N] {
        self.elems
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<T: Copy + Default, const N: usize> Vector<T, N> {
    /// The zero vector.
    pub fn zero() -> Self {
        Self {
            elems: [T::default(); N],
        }
    }
}

impl<T: Copy, const N: usize> Vector<T, N> {
    /// Element-wise product, as in `dot(a, b)[i] == a[i] * b[i]`.
    ///
    /// Note this returns a vector; the conventional inner product is
    /// [`scalar_dot`](Self::scalar_dot).
    pub fn dot(self, rhs: Self) -> Self
    where
        T: Mul<Output = T>,
    {
        Self {
            elems: array::from_fn(|i| self.elems[i] * rhs.elems[i]),
        }
    }

    /// Conventional inner product: the sum of element-wise products.
    pub fn scalar_dot(self, rhs: Self) -> T
    where
        T: Default + Add<Output = T> + Mul<Output = T>,
    {
        self.dot(rhs).sum()
    }

    /// Element-wise square: `dot(self, self)`.
    pub fn square(self) -> Self
    where
        T: Mul<Output = T>,
    {
        self.dot(self)
    }

    /// Sum of all elements.
    pub fn sum(self) -> T
    where
        T: Default + Add<Output = T>,
    {
        self.elems
            .into_iter()
            .fold(T::default(), |acc, e| acc + e)
    }

    /// Squared Euclidean length.
    pub fn norm_squared(self) -> T
    where
        T: Default + Add<Output = T> + Mul<Output = T>,
    {
        self.scalar_dot(self)
    }
}

impl<T: Copy, const N: usize> Vector<T, N> {
    fn map(self, f: impl Fn(T) -> T) -> Self {
        Self {
            elems: array::from_fn(|i| f(self.elems[i])),
        }
    }
}

// -----------------------------------------------------------------------------
// Component accessors for the common dimensions
// -----------------------------------------------------------------------------

impl<T: Copy> Vector<T, 2> {
    pub const fn x(&self) -> T {
        self.elems[0]
    }

    pub const fn y(&self) -> T {
        self.elems[1]
    }
}

impl<T: Copy> Vector<T, 3> {
    pub const fn x(&self) -> T {
        self.elems[0]
    }

    pub const fn y(&self) -> T {
        self.elems[1]
    }

    pub const fn z(&self) -> T {
        self.elems[2]
    }

    /// Cross product, right-handed.
    pub fn cross(self, rhs: Self) -> Self
    where
        T: Mul<Output = T> + Sub<Output = T>,
    {
        let [ax, ay, az] = self.elems;
        let [bx, by, bz] = rhs.elems;
        Self {
            elems: [
                ay * bz - az * by,
                az * bx - ax * bz,
                ax * by - ay * bx,
            ],
        }
    }
}

impl<T: Copy> Vector<T, 4> {
    pub const fn x(&self) -> T {
        self.elems[0]
    }

    pub const fn y(&self) -> T {
        self.elems[1]
    }

    pub const fn z(&self) -> T {
        self.elems[2]
    }

    pub const fn w(&self) -> T {
        self.elems[3]
    }
}

// -----------------------------------------------------------------------------
// Conversions and indexing
// -----------------------------------------------------------------------------

impl<T, const N: usize> From<[T; N]> for Vector<T, N> {
    fn from(elems: [T; N]) -> Self {
        Self { elems }
    }
}

impl<T, const N: usize> From<Vector<T, N>> for [T; N] {
    fn from(v: Vector<T, N>) -> Self {
        v.elems
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.elems[i]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.elems[i]
    }
}

impl<T: Copy + Default, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zero()
    }
}

// -----------------------------------------------------------------------------
// Element-wise and scalar arithmetic
// -----------------------------------------------------------------------------

impl<T: Copy + Add<Output = T>, const N: usize> Add for Vector<T, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            elems: array::from_fn(|i| self.elems[i] + rhs.elems[i]),
        }
    }
}

impl<T: Copy + Add<Output = T>, const N: usize> AddAssign for Vector<T, N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Copy + Sub<Output = T>, const N: usize> Sub for Vector<T, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            elems: array::from_fn(|i| self.elems[i] - rhs.elems[i]),
        }
    }
}

impl<T: Copy + Sub<Output = T>, const N: usize> SubAssign for Vector<T, N> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<T: Copy + Neg<Output = T>, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|e| -e)
    }
}

impl<T: Copy + Mul<Output = T>, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|e| e * rhs)
    }
}

impl<T: Copy + Mul<Output = T>, const N: usize> MulAssign<T> for Vector<T, N> {
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

impl<T: Copy + Div<Output = T>, const N: usize> Div<T> for Vector<T, N> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|e| e / rhs)
    }
}

impl<T: Copy + Div<Output = T>, const N: usize> DivAssign<T> for Vector<T, N> {
    fn div_assign(&mut self, rhs: T) {
        *self = *self / rhs;
    }
}

// -----------------------------------------------------------------------------
// Float-only operations
// -----------------------------------------------------------------------------

macro_rules! impl_float_vector {
    ($t:ty) => {
        impl<const N: usize> Vector<$t, N> {
            /// Euclidean length.
            pub fn norm(self) -> $t {
                self.norm_squared().sqrt()
            }

            /// Unit vector in the same direction. A zero vector is returned
            /// unchanged rather than dividing by zero.
            pub fn normalize(self) -> Self {
                let nrm = self.norm();
                if nrm == 0.0 {
                    self
                } else {
                    self / nrm
                }
            }

            /// Element-wise absolute value.
            pub fn abs(self) -> Self {
                self.map(<$t>::abs)
            }

            /// Element-wise square root.
            pub fn sqrt(self) -> Self {
                self.map(<$t>::sqrt)
            }
        }

        impl<const N: usize> Mul<Vector<$t, N>> for $t {
            type Output = Vector<$t, N>;

            fn mul(self, rhs: Vector<$t, N>) -> Vector<$t, N> {
                rhs * self
            }
        }
    };
}

impl_float_vector!(f32);
impl_float_vector!(f64);

// -----------------------------------------------------------------------------
// Aliases
// -----------------------------------------------------------------------------

pub type Vector2f = Vector<f32, 2>;
pub type Vector2d = Vector<f64, 2>;
pub type Vector2i = Vector<i32, 2>;
pub type Vector2u = Vector<u32, 2>;

pub type Vector3f = Vector<f32, 3>;
pub type Vector3d = Vector<f64, 3>;
pub type Vector3i = Vector<i32, 3>;
pub type Vector3u = Vector<u32, 3>;

pub type Vector4f = Vector<f32, 4>;
pub type Vector4d = Vector<f64, 4>;
pub type Vector4i = Vector<i32, 4>;
pub type Vector4u = Vector<u32, 4>;

// =============================================================================
// TESTS
// =============================================================================
