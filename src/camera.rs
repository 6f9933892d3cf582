use crate::error::MathError;
use crate::math::{Matrix4, Vector3};

/// A simple perspective camera.
///
/// Provides position, look target, field of view and clip planes, and turns
/// them into view and projection matrices through the math kernel.
///
/// # Example
///
/// ```
/// use orrery::Camera;
///
/// let camera = Camera::new().at(0.0, 0.0, 150.0).looking_at(0.0, 0.0, 0.0).with_fov(60.0);
/// let view_projection = camera.view_projection(16.0 / 9.0).unwrap();
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3,
    pub target: Vector3,
    pub up: Vector3,
    pub fov: f32, // radians
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 5.0),
            target: Vector3::ZERO,
            up: Vector3::Y,
            fov: std::f32::consts::FRAC_PI_3, // 60 degrees
            near: 1.0,
            far: 2000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn looking_at(mut self, target_x: f32, target_y: f32, target_z: f32) -> Self {
        self.target = Vector3::new(target_x, target_y, target_z);
        self
    }

    pub fn up(mut self, up: impl Into<Vector3>) -> Self {
        self.up = up.into();
        self
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    /// Set the near and far clip distances.
    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Normalized direction from the camera towards its target.
    pub fn forward(&self) -> Vector3 {
        (self.target - self.position).normalize()
    }

    /// Camera-to-world transform.
    pub fn camera_matrix(&self) -> Result<Matrix4, MathError> {
        Matrix4::look_at(self.position, self.target, self.up)
    }

    /// World-to-camera transform (the inverse of [`camera_matrix`](Self::camera_matrix)).
    pub fn view_matrix(&self) -> Result<Matrix4, MathError> {
        self.camera_matrix()?.invert()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Result<Matrix4, MathError> {
        Matrix4::perspective(self.fov, aspect, self.near, self.far)
    }

    /// `view · projection`: maps world space to clip space.
    pub fn view_projection(&self, aspect: f32) -> Result<Matrix4, MathError> {
        Ok(self.view_matrix()?.multiply(&self.projection_matrix(aspect)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_moves_camera_to_origin() {
        let camera = Camera::new().at(0.0, 0.0, 150.0);
        let view = camera.view_matrix().unwrap();
        let eye = view.transform_point(camera.position);
        assert!(eye.abs_diff_eq(Vector3::ZERO, 1e-4));
        let target = view.transform_point(Vector3::ZERO);
        assert!(target.abs_diff_eq(Vector3::new(0.0, 0.0, -150.0), 1e-3));
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera::new().at(30.0, 40.0, 50.0).looking_at(1.0, 2.0, 3.0);
        let clip = camera
            .view_projection(1.5)
            .unwrap()
            .transform_point(camera.target);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > -1.0 && clip.z < 1.0);
    }

    #[test]
    fn degenerate_cameras_fail() {
        let camera = Camera::new().at(0.0, 0.0, 0.0);
        assert_eq!(camera.view_matrix(), Err(MathError::CoincidentEyeTarget));

        let overhead = Camera::new().at(0.0, 10.0, 0.0);
        assert_eq!(overhead.view_matrix(), Err(MathError::ParallelUp));
        assert!(overhead.up([0.0, 0.0, -1.0]).view_matrix().is_ok());

        let inverted = Camera::new().clip(10.0, 1.0);
        assert!(matches!(
            inverted.view_projection(1.0),
            Err(MathError::InvalidClipRange { .. })
        ));
    }

    #[test]
    fn with_fov_takes_degrees() {
        let camera = Camera::new().with_fov(90.0);
        assert!((camera.fov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(camera.forward().abs_diff_eq(Vector3::new(0.0, 0.0, -1.0), 1e-6));
    }
}
