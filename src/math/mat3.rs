use bytemuck::{Pod, Zeroable};

use super::{Matrix4, Vector3};

/// A 3×3 matrix stored row-major.
///
/// Used for 2D affine construction (row-vector convention, translation in
/// elements 6 and 7) and as an intermediate when deriving an axis-angle
/// rotation. The transform graph never stores one.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Matrix3(pub [f32; 9]);

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ]);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Returns `self · other`.
    pub fn multiply(&self, other: &Self) -> Self {
        let a = &self.0;
        let b = &other.0;
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        Self(out)
    }

    /// Multiplies every element by `c`.
    pub fn scale_by(&self, c: f32) -> Self {
        Self(self.0.map(|e| e * c))
    }

    /// Element-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.0;
        for (o, e) in out.iter_mut().zip(other.0) {
            *o += e;
        }
        Self(out)
    }

    #[rustfmt::skip]
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self([
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            tx,  ty,  1.0,
        ])
    }

    /// Counter-clockwise 2D rotation about the origin.
    #[rustfmt::skip]
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            c,   s,   0.0,
            -s,  c,   0.0,
            0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self([
            sx,  0.0, 0.0,
            0.0, sy,  0.0,
            0.0, 0.0, 1.0,
        ])
    }

    /// Returns `self · v` with `v` treated as a column vector.
    pub fn mul_vec3(&self, v: Vector3) -> Vector3 {
        let m = &self.0;
        Vector3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[3] * v.x + m[4] * v.y + m[5] * v.z,
            m[6] * v.x + m[7] * v.y + m[8] * v.z,
        )
    }

    /// The skew-symmetric matrix `K` with `K.mul_vec3(v) == k.cross(v)`.
    #[rustfmt::skip]
    pub fn cross_matrix(k: Vector3) -> Self {
        Self([
            0.0,  -k.z, k.y,
            k.z,  0.0,  -k.x,
            -k.y, k.x,  0.0,
        ])
    }

    /// Rotation of `angle` radians about `axis` via the Rodrigues formula.
    ///
    /// The result is laid out for row vectors, so it agrees with
    /// [`Quaternion::to_matrix`](super::Quaternion::to_matrix) for the same
    /// unit axis. Like the quaternion path, the axis is not renormalized.
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let k = Self::cross_matrix(axis);
        // Row-vector form is the transpose of I + sK + (1-c)K², and Kᵀ = -K.
        Self::IDENTITY
            .add(&k.scale_by(-s))
            .add(&k.multiply(&k).scale_by(1.0 - c))
    }

    /// Embeds this matrix in the upper-left of a 4×4 identity.
    #[rustfmt::skip]
    pub fn to_matrix4(&self) -> Matrix4 {
        let m = &self.0;
        Matrix4([
            m[0], m[1], m[2], 0.0,
            m[3], m[4], m[5], 0.0,
            m[6], m[7], m[8], 0.0,
            0.0,  0.0,  0.0,  1.0,
        ])
    }

    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= max_abs_diff)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::math::Quaternion;

    fn apply_2d(m: &Matrix3, x: f32, y: f32) -> (f32, f32) {
        let p = &m.0;
        (
            x * p[0] + y * p[3] + p[6],
            x * p[1] + y * p[4] + p[7],
        )
    }

    #[test]
    fn identity_is_neutral() {
        let m = Matrix3::translation(2.0, 3.0).multiply(&Matrix3::rotation(0.4));
        assert_eq!(m.multiply(&Matrix3::IDENTITY), m);
        assert_eq!(Matrix3::IDENTITY.multiply(&m), m);
    }

    #[test]
    fn affine_2d_composition_applies_left_first() {
        // Scale, then rotate a quarter turn, then translate.
        let m = Matrix3::scaling(2.0, 2.0)
            .multiply(&Matrix3::rotation(FRAC_PI_2))
            .multiply(&Matrix3::translation(10.0, 0.0));
        let (x, y) = apply_2d(&m, 1.0, 0.0);
        assert!((x - 10.0).abs() < 1e-5);
        assert!((y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn cross_matrix_matches_cross_product() {
        let k = Vector3::new(0.2, -1.0, 0.5);
        let v = Vector3::new(3.0, 0.5, -2.0);
        assert!(Matrix3::cross_matrix(k).mul_vec3(v).abs_diff_eq(k.cross(v), 1e-6));
    }

    #[test]
    fn rodrigues_agrees_with_quaternion() {
        let axis = Vector3::new(0.0, 1.0, 0.8).normalize();
        let angle = 1.3;
        let rodrigues = Matrix3::from_axis_angle(axis, angle).to_matrix4();
        let quat = Quaternion::from_axis_angle(axis, angle).to_matrix();
        assert!(rodrigues.abs_diff_eq(&quat, 1e-5));
    }

    #[test]
    fn constant_multiply_and_add() {
        let m = Matrix3::IDENTITY.scale_by(3.0).add(&Matrix3::IDENTITY);
        let mut expected = Matrix3::scaling(4.0, 4.0);
        expected.0[8] = 4.0;
        assert_eq!(m, expected);
    }
}
