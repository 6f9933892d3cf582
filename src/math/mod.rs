//! Pure linear-algebra kernel: 3×3/4×4 matrices, vectors and quaternions.
//!
//! Everything here is a value type. Operations never mutate their inputs and
//! have no side effects, so the kernel can be shared freely between threads.
//!
//! # Conventions
//!
//! Matrices are row-major and act on row vectors (`p' = p · M`).
//! `a.multiply(&b)` therefore means "apply `a`, then `b`". The byte layout
//! matches what WebGL/wgpu shaders and [`glam`] expect for column vectors,
//! so matrices can be handed to a renderer without transposing.

mod mat3;
mod mat4;
mod quat;
mod vec3;

pub use mat3::Matrix3;
pub use mat4::Matrix4;
pub use quat::Quaternion;
pub use vec3::Vector3;

/// Vectors shorter than this normalize to zero.
pub const NORMALIZE_EPSILON: f32 = 1e-5;

/// A determinant smaller than this fraction of the product of the row
/// lengths is treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-10;

/// Minimum length of the look-at view direction and side axis.
pub const DEGENERACY_EPSILON: f32 = 1e-6;
