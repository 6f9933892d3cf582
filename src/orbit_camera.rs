use crate::camera::Camera;
use crate::math::Vector3;

/// Controls how the orbit camera moves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OrbitMode {
    /// Camera stays where it was put.
    #[default]
    Fixed,
    /// Camera auto-rotates around the target.
    AutoRotate {
        /// Rotation speed in radians per unit of `dt` (positive = counterclockwise from above).
        speed: f32,
    },
}

/// A camera rig that orbits around a target point.
///
/// All motion comes from the `dt` passed to [`update`](Self::update); the rig
/// keeps no clock of its own.
///
/// # Example
/// ```
/// use orrery::{OrbitCamera, OrbitMode};
///
/// let mut orbit = OrbitCamera::new()
///     .distance(150.0)
///     .mode(OrbitMode::AutoRotate { speed: 0.01 });
///
/// // Once per tick:
/// orbit.update(1.0);
/// let camera = orbit.camera();
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vector3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped away from the poles.
    pub elevation: f32,
    /// Field of view in radians.
    pub fov: f32,
    /// Control mode.
    pub mode: OrbitMode,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vector3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.0,
            fov: std::f32::consts::FRAC_PI_3,
            mode: OrbitMode::Fixed,
            near: 1.0,
            far: 2000.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: impl Into<Vector3>) -> Self {
        self.target = target.into();
        self
    }

    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn mode(mut self, mode: OrbitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn azimuth(mut self, azimuth: f32) -> Self {
        self.azimuth = azimuth;
        self
    }

    /// Set the initial elevation (vertical angle) in radians.
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Advance the rig by `dt`.
    pub fn update(&mut self, dt: f32) {
        if let OrbitMode::AutoRotate { speed } = self.mode {
            self.azimuth += speed * dt;
        }
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        // Spherical to Cartesian conversion
        let offset = Vector3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );

        Camera {
            position: self.target + offset,
            target: self.target,
            up: Vector3::Y,
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_rotate_advances_azimuth_by_dt() {
        let mut orbit = OrbitCamera::new().mode(OrbitMode::AutoRotate { speed: 0.5 });
        orbit.update(2.0);
        orbit.update(1.0);
        assert!((orbit.azimuth - 1.5).abs() < 1e-6);
    }

    #[test]
    fn fixed_mode_ignores_updates() {
        let mut orbit = OrbitCamera::new().azimuth(0.3);
        orbit.update(10.0);
        assert_eq!(orbit.azimuth, 0.3);
    }

    #[test]
    fn camera_sits_on_sphere_around_target() {
        let orbit = OrbitCamera::new()
            .target([1.0, 2.0, 3.0])
            .distance(150.0)
            .azimuth(0.7)
            .elevation(0.2);
        let camera = orbit.camera();
        assert!(((camera.position - camera.target).length() - 150.0).abs() < 1e-3);
        assert!(camera.view_matrix().is_ok());
    }

    #[test]
    fn elevation_is_clamped_off_the_pole() {
        let orbit = OrbitCamera::new().elevation(10.0);
        assert!(orbit.elevation < std::f32::consts::FRAC_PI_2);
        assert!(orbit.camera().view_matrix().is_ok());
    }
}
