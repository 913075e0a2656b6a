//! Small fixed-size linear algebra for control and pose math.
//!
//! [`Vector<T, N>`] and [`Quaternion<T>`] are plain inline-array types with
//! no allocation, sized for the dimensions that show up in sensor fusion and
//! kinematics (2–4 components). Aliases like [`Vector3f`] and
//! [`Quaternionf`] name the common instantiations.

pub mod quaternion;
pub mod vector;

pub use quaternion::{Quaternion, Quaterniond, Quaternionf};
pub use vector::{
    Vector, Vector2d, Vector2f, Vector2i, Vector2u, Vector3d, Vector3f, Vector3i, Vector3u,
    Vector4d, Vector4f, Vector4i, Vector4u,
};
