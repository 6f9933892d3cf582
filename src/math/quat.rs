use std::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::{Matrix4, Vector3};

/// A rotation quaternion `(x, y, z, w)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis is used as given. Callers pass a unit axis; a non-unit axis
    /// yields a quaternion whose matrix also scales.
    pub fn from_axis_angle(axis: impl Into<Vector3>, angle: f32) -> Self {
        let axis = axis.into();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// The equivalent rotation matrix, laid out for row vectors.
    ///
    /// Built as the product of the left- and right-multiplication matrices of
    /// `q`, the right one with its vector part negated (`q · v · q*`). For a
    /// unit quaternion the result is a pure rotation.
    #[rustfmt::skip]
    pub fn to_matrix(self) -> Matrix4 {
        let Self { x, y, z, w } = self;
        let left = Matrix4([
            w,  z,  -y, x,
            -z, w,  x,  y,
            y,  -x, w,  z,
            -x, -y, -z, w,
        ]);
        let right = Matrix4([
            w,  z,  -y, -x,
            -z, w,  x,  -y,
            y,  -x, w,  -z,
            x,  y,  z,  w,
        ]);
        left.multiply(&right)
    }

    pub fn abs_diff_eq(self, other: Self, max_abs_diff: f32) -> bool {
        (self.x - other.x).abs() <= max_abs_diff
            && (self.y - other.y).abs() <= max_abs_diff
            && (self.z - other.z).abs() <= max_abs_diff
            && (self.w - other.w).abs() <= max_abs_diff
    }
}

/// Hamilton product. As with [`glam::Quat`], `a * b` rotates by `b` first,
/// so `(a * b).to_matrix() == b.to_matrix().multiply(&a.to_matrix())`.
impl Mul for Quaternion {
    type Output = Self;

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

impl From<glam::Quat> for Quaternion {
    fn from(q: glam::Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quaternion> for glam::Quat {
    fn from(q: Quaternion) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn identity_quaternion_is_identity_matrix() {
        assert_eq!(Quaternion::IDENTITY.to_matrix(), Matrix4::IDENTITY);
        let zero_angle = Quaternion::from_axis_angle([0.0, 1.0, 0.0], 0.0);
        assert!(zero_angle.to_matrix().abs_diff_eq(&Matrix4::IDENTITY, 1e-6));
    }

    #[test]
    fn axis_rotations_match_elementary_matrices() {
        let angle = 0.8;
        let cases = [
            (Vector3::X, Matrix4::rotation_x(angle)),
            (Vector3::Y, Matrix4::rotation_y(angle)),
            (Vector3::Z, Matrix4::rotation_z(angle)),
        ];
        for (axis, expected) in cases {
            let m = Quaternion::from_axis_angle(axis, angle).to_matrix();
            assert!(m.abs_diff_eq(&expected, 1e-6), "axis {axis:?}");
        }
    }

    #[test]
    fn quarter_turn_about_y_sends_x_to_negative_z() {
        let m = Quaternion::from_axis_angle(Vector3::Y, FRAC_PI_2).to_matrix();
        let p = m.transform_point(Vector3::X);
        assert!(p.abs_diff_eq(Vector3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn matches_glam_rotation() {
        let axis = Vector3::new(0.0, 1.0, 0.8).normalize();
        let angle = 2.1;
        let ours = Quaternion::from_axis_angle(axis, angle);
        let theirs = glam::Quat::from_axis_angle(axis.into(), angle);
        assert!(ours.abs_diff_eq(theirs.into(), 1e-6));
        let theirs_matrix: Matrix4 = glam::Mat4::from_quat(theirs).into();
        assert!(ours.to_matrix().abs_diff_eq(&theirs_matrix, 1e-5));
    }

    #[test]
    fn non_unit_axis_scales() {
        let m = Quaternion::from_axis_angle([0.0, 2.0, 0.0], 0.5).to_matrix();
        // |q|² = 4 sin²(θ/2) + cos²(θ/2) ≠ 1, so the y axis is stretched.
        assert!((m.0[5] - 1.0).abs() > 0.1);
    }

    #[test]
    fn product_composes_like_glam() {
        let a = Quaternion::from_axis_angle(Vector3::X, 0.4);
        let b = Quaternion::from_axis_angle(Vector3::Z, -1.2);
        let theirs = glam::Quat::from(a) * glam::Quat::from(b);
        assert!((a * b).abs_diff_eq(theirs.into(), 1e-6));
    }

    #[test]
    fn product_applies_right_operand_first() {
        let a = Quaternion::from_axis_angle(Vector3::X, 0.4);
        let b = Quaternion::from_axis_angle(Vector3::Z, -1.2);
        let b_then_a = b.to_matrix().multiply(&a.to_matrix());
        let a_then_b = a.to_matrix().multiply(&b.to_matrix());
        assert!((a * b).to_matrix().abs_diff_eq(&b_then_a, 1e-5));
        assert!(!(a * b).to_matrix().abs_diff_eq(&a_then_b, 1e-3));

        let p = Vector3::new(0.0, 1.0, 0.0);
        let stepwise = a.to_matrix().transform_point(b.to_matrix().transform_point(p));
        assert!((a * b).to_matrix().transform_point(p).abs_diff_eq(stepwise, 1e-5));
    }

    #[test]
    fn conjugate_undoes_rotation() {
        let q = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0).normalize(), 0.9);
        assert!((q * q.conjugate()).abs_diff_eq(Quaternion::IDENTITY, 1e-6));
        assert!((q.length() - 1.0).abs() < 1e-6);
    }
}
