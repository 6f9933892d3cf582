use std::f32::consts::{FRAC_PI_2, PI};
use std::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::{DEGENERACY_EPSILON, SINGULAR_EPSILON, Vector3};
use crate::error::MathError;

/// A 4×4 homogeneous transform stored row-major for row vectors.
///
/// Points transform as `p' = p · M`, so translation lives in elements
/// 12..=14 and `a.multiply(&b)` applies `a` first, then `b`. The memory
/// layout is identical to a column-major, column-vector matrix, which means
/// the raw array can be uploaded to a shader uniform unchanged and converts
/// to [`glam::Mat4`] with `from_cols_array`.
///
/// # Example
///
/// ```
/// use orrery::{Matrix4, Vector3};
///
/// let m = Matrix4::translation(1.0, 0.0, 0.0).multiply(&Matrix4::scaling(2.0, 2.0, 2.0));
/// // Translate first, then scale.
/// assert_eq!(m.transform_point(Vector3::ZERO), Vector3::new(2.0, 0.0, 0.0));
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Matrix4(pub [f32; 16]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    #[rustfmt::skip]
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Returns `self · other`: apply `self`, then `other`.
    ///
    /// Not commutative.
    pub fn multiply(&self, other: &Self) -> Self {
        let a = &self.0;
        let b = &other.0;
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col]
                    + a[row * 4 + 3] * b[12 + col];
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

    pub fn transpose(&self) -> Self {
        let m = &self.0;
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[col * 4 + row] = m[row * 4 + col];
            }
        }
        Self(out)
    }

    #[rustfmt::skip]
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            x,   y,   z,   1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            c,   0.0, -s,  0.0,
            0.0, 1.0, 0.0, 0.0,
            s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            c,   s,   0.0, 0.0,
            -s,  c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[rustfmt::skip]
    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self([
            sx,  0.0, 0.0, 0.0,
            0.0, sy,  0.0, 0.0,
            0.0, 0.0, sz,  0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// 2×2 minors shared by [`determinant`](Self::determinant) and [`invert`](Self::invert).
    ///
    /// Widened to `f64` so that very large or very small (but well
    /// conditioned) matrices do not overflow or flush to zero.
    fn minors(&self) -> [f64; 12] {
        let [
            a00, a01, a02, a03,
            a10, a11, a12, a13,
            a20, a21, a22, a23,
            a30, a31, a32, a33,
        ] = self.0.map(f64::from);
        [
            a00 * a11 - a01 * a10,
            a00 * a12 - a02 * a10,
            a00 * a13 - a03 * a10,
            a01 * a12 - a02 * a11,
            a01 * a13 - a03 * a11,
            a02 * a13 - a03 * a12,
            a20 * a31 - a21 * a30,
            a20 * a32 - a22 * a30,
            a20 * a33 - a23 * a30,
            a21 * a32 - a22 * a31,
            a21 * a33 - a23 * a31,
            a22 * a33 - a23 * a32,
        ]
    }

    fn determinant_from(b: &[f64; 12]) -> f64 {
        b[0] * b[11] - b[1] * b[10] + b[2] * b[9] + b[3] * b[8] - b[4] * b[7] + b[5] * b[6]
    }

    pub fn determinant(&self) -> f32 {
        Self::determinant_from(&self.minors()) as f32
    }

    /// Product of the Euclidean row lengths, the Hadamard bound on `|det|`.
    fn row_norm_product(&self) -> f64 {
        self.0
            .chunks_exact(4)
            .map(|row| row.iter().map(|&v| f64::from(v).powi(2)).sum::<f64>().sqrt())
            .product()
    }

    /// Returns the inverse matrix.
    ///
    /// The singularity test is relative: the matrix is rejected with
    /// [`MathError::SingularMatrix`] when `|det|` falls below `1e-10` times
    /// the product of its row lengths, so uniform scales of any magnitude
    /// invert while flattened matrices do not. An inverse that would not fit
    /// in `f32` is rejected the same way.
    pub fn invert(&self) -> Result<Self, MathError> {
        let b = self.minors();
        let det = Self::determinant_from(&b);
        let bound = self.row_norm_product();
        let singular = MathError::SingularMatrix { determinant: det as f32 };
        if !det.is_finite() || bound == 0.0 || det.abs() < f64::from(SINGULAR_EPSILON) * bound {
            return Err(singular);
        }
        let d = 1.0 / det;
        let [
            a00, a01, a02, a03,
            a10, a11, a12, a13,
            a20, a21, a22, a23,
            a30, a31, a32, a33,
        ] = self.0.map(f64::from);
        let inverse = [
            (a11 * b[11] - a12 * b[10] + a13 * b[9]) * d,
            (a02 * b[10] - a01 * b[11] - a03 * b[9]) * d,
            (a31 * b[5] - a32 * b[4] + a33 * b[3]) * d,
            (a22 * b[4] - a21 * b[5] - a23 * b[3]) * d,
            (a12 * b[8] - a10 * b[11] - a13 * b[7]) * d,
            (a00 * b[11] - a02 * b[8] + a03 * b[7]) * d,
            (a32 * b[2] - a30 * b[5] - a33 * b[1]) * d,
            (a20 * b[5] - a22 * b[2] + a23 * b[1]) * d,
            (a10 * b[10] - a11 * b[8] + a13 * b[6]) * d,
            (a01 * b[8] - a00 * b[10] - a03 * b[6]) * d,
            (a30 * b[4] - a31 * b[2] + a33 * b[0]) * d,
            (a21 * b[2] - a20 * b[4] - a23 * b[0]) * d,
            (a11 * b[7] - a10 * b[9] - a12 * b[6]) * d,
            (a00 * b[9] - a01 * b[7] + a02 * b[6]) * d,
            (a31 * b[1] - a30 * b[3] - a32 * b[0]) * d,
            (a20 * b[3] - a21 * b[1] + a22 * b[0]) * d,
        ]
        .map(|v| v as f32);
        if inverse.iter().all(|v| v.is_finite()) {
            Ok(Self(inverse))
        } else {
            Err(singular)
        }
    }

    /// Returns the homogeneous row vector `v · self`.
    pub fn transform_vector4(&self, v: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let mut out = [0.0; 4];
        for (col, o) in out.iter_mut().enumerate() {
            *o = v[0] * m[col] + v[1] * m[4 + col] + v[2] * m[8 + col] + v[3] * m[12 + col];
        }
        out
    }

    /// Transforms a point (`w = 1`), applying the perspective divide when `w` is non-zero.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let [x, y, z, w] = self.transform_vector4([p.x, p.y, p.z, 1.0]);
        if w != 0.0 && w != 1.0 {
            Vector3::new(x / w, y / w, z / w)
        } else {
            Vector3::new(x, y, z)
        }
    }

    /// The translation row, i.e. where this transform sends the origin.
    pub fn translation_part(&self) -> Vector3 {
        Vector3::new(self.0[12], self.0[13], self.0[14])
    }

    /// Pixel-space orthographic projection with the Y axis flipped so that
    /// `(0, 0)` is the top-left corner.
    #[rustfmt::skip]
    pub fn projection_2d(width: f32, height: f32, depth: f32) -> Result<Self, MathError> {
        let valid = |v: f32| v > 0.0 && v.is_finite();
        if !(valid(width) && valid(height) && valid(depth)) {
            return Err(MathError::InvalidExtent { width, height, depth });
        }
        Ok(Self([
            2.0 / width, 0.0,           0.0,         0.0,
            0.0,         -2.0 / height, 0.0,         0.0,
            0.0,         0.0,           2.0 / depth, 0.0,
            -1.0,        1.0,           0.0,         1.0,
        ]))
    }

    /// OpenGL-style right-handed perspective projection.
    ///
    /// Maps view-space depth `-near..=-far` to NDC depth `-1..=1` after the
    /// perspective divide. Requires `fov_y` in `(0, π)`, `aspect > 0` and
    /// `0 < near < far`.
    ///
    /// # Example
    ///
    /// ```
    /// use orrery::{Matrix4, Vector3};
    ///
    /// let proj = Matrix4::perspective(60f32.to_radians(), 1.0, 1.0, 100.0).unwrap();
    /// let near = proj.transform_point(Vector3::new(0.0, 0.0, -1.0));
    /// assert!((near.z + 1.0).abs() < 1e-5);
    /// ```
    #[rustfmt::skip]
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<Self, MathError> {
        if !(fov_y > 0.0 && fov_y < PI) {
            return Err(MathError::InvalidFieldOfView(fov_y));
        }
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(MathError::InvalidAspect(aspect));
        }
        if !(near > 0.0 && near < far && far.is_finite()) {
            return Err(MathError::InvalidClipRange { near, far });
        }
        let f = (FRAC_PI_2 - 0.5 * fov_y).tan();
        let range_inv = 1.0 / (near - far);
        Ok(Self([
            f / aspect, 0.0, 0.0,                            0.0,
            0.0,        f,   0.0,                            0.0,
            0.0,        0.0, (near + far) * range_inv,       -1.0,
            0.0,        0.0, near * far * range_inv * 2.0,   0.0,
        ]))
    }

    /// Camera-to-world matrix for a camera at `eye` looking towards `target`.
    ///
    /// The camera looks down its local `-Z`. Invert the result to get a view
    /// matrix. Fails when `eye == target` or when `up` is parallel to the
    /// viewing direction.
    #[rustfmt::skip]
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Result<Self, MathError> {
        let back = eye - target;
        if back.length() < DEGENERACY_EPSILON {
            return Err(MathError::CoincidentEyeTarget);
        }
        let z = back.normalize();
        let x = up.cross(z);
        if x.length() < DEGENERACY_EPSILON {
            return Err(MathError::ParallelUp);
        }
        let x = x.normalize();
        let y = z.cross(x);
        Ok(Self([
            x.x,   x.y,   x.z,   0.0,
            y.x,   y.y,   y.z,   0.0,
            z.x,   z.y,   z.z,   0.0,
            eye.x, eye.y, eye.z, 1.0,
        ]))
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }

    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= max_abs_diff)
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl From<glam::Mat4> for Matrix4 {
    fn from(m: glam::Mat4) -> Self {
        Self(m.to_cols_array())
    }
}

impl From<Matrix4> for glam::Mat4 {
    fn from(m: Matrix4) -> Self {
        glam::Mat4::from_cols_array(&m.0)
    }
}
