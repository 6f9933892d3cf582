//! A sun/earth/moon system driven one tick at a time.
//!
//! This is the reference host for the transform graph: it builds the
//! hierarchy once, then each tick applies angular increments, propagates,
//! and packs per-body uniforms for a renderer.
//!
//! Renderable data lives in a [`hecs::World`]. Every graph node carries the
//! [`hecs::Entity`] that describes it, and every entity carries a
//! [`SceneNode`] pointing back at its node. Pivot nodes have no [`Body`], so
//! they are never drawn.
//!
//! ```text
//! system ─┬─ sun
//!         └─ earth orbit ─┬─ earth
//!                         └─ moon orbit ── moon
//! ```
//!
//! # Example
//!
//! ```
//! use orrery::{Orrery, OrreryConfig};
//!
//! let mut orrery = Orrery::new(OrreryConfig::default()).unwrap();
//! for _ in 0..10 {
//!     orrery.tick(1.0);
//! }
//! let uniforms = orrery.frame(4.0 / 3.0).unwrap();
//! assert_eq!(uniforms.len(), 3);
//! let bytes: &[u8] = bytemuck::cast_slice(&uniforms);
//! assert_eq!(bytes.len(), 3 * 80);
//! ```

use bytemuck::{Pod, Zeroable};
use hecs::{Entity, EntityBuilder, World};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::graph::{NodeId, SceneGraph};
use crate::math::Vector3;
use crate::orbit_camera::{OrbitCamera, OrbitMode};

/// Link from an entity to its transform node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneNode(pub NodeId);

/// A drawable celestial body.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub name: String,
    /// Sphere radius, for the geometry collaborator.
    pub radius: f32,
}

impl Body {
    fn colored(name: &str, radius: f32, color_mult: [f32; 4]) -> (Self, ColorMult) {
        let body = Self {
            name: name.into(),
            radius,
        };
        (body, ColorMult(color_mult))
    }
}

/// Per-body color multiplier uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMult(pub [f32; 4]);

/// Constant angular velocity applied to a node every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    /// Unit rotation axis.
    pub axis: Vector3,
    /// Radians per tick.
    pub rate: f32,
}

impl Spin {
    pub fn new(axis: Vector3, rate: f32) -> Self {
        Self { axis, rate }
    }
}

/// Uniform block for one draw call, laid out for direct upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    /// Model-to-clip matrix (`world · view · projection`).
    pub u_matrix: [f32; 16],
    pub u_color_mult: [f32; 4],
}

/// Configuration for an [`Orrery`].
///
/// Rates are in radians per tick; distances are in world units.
#[derive(Clone, Debug)]
pub struct OrreryConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// The camera orbits at 1.5 × this radius.
    pub camera_radius: f32,
    pub camera_rate: f32,
    pub sun_radius: f32,
    pub sun_spin_rate: f32,
    pub earth_radius: f32,
    pub earth_orbit_radius: f32,
    pub earth_orbit_rate: f32,
    /// Normalized when the orrery is built.
    pub earth_spin_axis: Vector3,
    pub earth_spin_rate: f32,
    /// `None` leaves the moon out entirely.
    pub moon: Option<MoonConfig>,
}

#[derive(Clone, Debug)]
pub struct MoonConfig {
    pub radius: f32,
    pub orbit_radius: f32,
    pub orbit_rate: f32,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            orbit_radius: 20.0,
            orbit_rate: 0.05,
        }
    }
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 1.0,
            far: 2000.0,
            camera_radius: 100.0,
            camera_rate: 0.01,
            sun_radius: 20.0,
            sun_spin_rate: 0.001,
            earth_radius: 10.0,
            earth_orbit_radius: 70.0,
            earth_orbit_rate: 0.01,
            earth_spin_axis: Vector3::new(0.0, 1.0, 0.8),
            earth_spin_rate: 0.1,
            moon: Some(MoonConfig::default()),
        }
    }
}

impl OrreryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    pub fn clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn camera(mut self, radius: f32, rate: f32) -> Self {
        self.camera_radius = radius;
        self.camera_rate = rate;
        self
    }

    pub fn earth_orbit(mut self, radius: f32, rate: f32) -> Self {
        self.earth_orbit_radius = radius;
        self.earth_orbit_rate = rate;
        self
    }

    pub fn earth_spin(mut self, axis: impl Into<Vector3>, rate: f32) -> Self {
        self.earth_spin_axis = axis.into();
        self.earth_spin_rate = rate;
        self
    }

    pub fn sun_spin(mut self, rate: f32) -> Self {
        self.sun_spin_rate = rate;
        self
    }

    pub fn moon(mut self, moon: Option<MoonConfig>) -> Self {
        self.moon = moon;
        self
    }
}

/// The host side of the sun/earth/moon scene: graph, ECS world and camera.
pub struct Orrery {
    graph: SceneGraph<Entity>,
    world: World,
    camera: OrbitCamera,
}

impl Orrery {
    pub fn new(config: OrreryConfig) -> Result<Self> {
        let mut orrery = Self {
            graph: SceneGraph::new(),
            world: World::new(),
            camera: OrbitCamera::new()
                .distance(config.camera_radius * 1.5)
                .fov(config.fov_degrees)
                .clip(config.near, config.far)
                .mode(OrbitMode::AutoRotate {
                    speed: config.camera_rate,
                }),
        };

        let system = orrery.spawn_node(None, None, None)?;
        orrery.spawn_node(
            Some(system),
            Some(Body::colored("sun", config.sun_radius, [1.0, 1.0, 0.5, 1.0])),
            Some(Spin::new(Vector3::Y, config.sun_spin_rate)),
        )?;

        let earth_orbit = orrery.spawn_node(
            Some(system),
            None,
            Some(Spin::new(Vector3::Y, config.earth_orbit_rate)),
        )?;
        orrery
            .graph
            .translate_local(earth_orbit, config.earth_orbit_radius, 0.0, 0.0)?;
        orrery.spawn_node(
            Some(earth_orbit),
            Some(Body::colored("earth", config.earth_radius, [0.5, 1.0, 0.5, 1.0])),
            Some(Spin::new(
                config.earth_spin_axis.normalize(),
                config.earth_spin_rate,
            )),
        )?;

        if let Some(moon) = &config.moon {
            let moon_orbit = orrery.spawn_node(
                Some(earth_orbit),
                None,
                Some(Spin::new(Vector3::Y, moon.orbit_rate)),
            )?;
            orrery
                .graph
                .translate_local(moon_orbit, moon.orbit_radius, 0.0, 0.0)?;
            orrery.spawn_node(
                Some(moon_orbit),
                Some(Body::colored("moon", moon.radius, [0.6, 0.6, 0.6, 1.0])),
                None,
            )?;
        }

        orrery.graph.propagate_all();
        debug!(nodes = orrery.graph.len(), "built orrery");
        Ok(orrery)
    }

    /// Creates a node under `parent` and the entity describing it.
    fn spawn_node(
        &mut self,
        parent: Option<NodeId>,
        body: Option<(Body, ColorMult)>,
        spin: Option<Spin>,
    ) -> Result<NodeId> {
        let node = self.graph.create_node();
        self.graph.set_parent(node, parent)?;

        let mut builder = EntityBuilder::new();
        builder.add(SceneNode(node));
        if let Some((body, color)) = body {
            builder.add(body).add(color);
        }
        if let Some(spin) = spin {
            builder.add(spin);
        }
        let entity = self.world.spawn(builder.build());
        self.graph.set_payload(node, entity)?;
        Ok(node)
    }

    /// Advance the simulation by `dt` ticks and propagate world transforms.
    pub fn tick(&mut self, dt: f32) {
        for (_, (node, spin)) in self.world.query::<(&SceneNode, &Spin)>().iter() {
            if let Err(err) = self.graph.rotate_local(node.0, spin.axis, spin.rate * dt) {
                warn!(%err, "skipping spin for missing node");
            }
        }
        self.camera.update(dt);
        let updated = self.graph.propagate_all();
        trace!(dt, updated, "ticked orrery");
    }

    /// Build the uniforms for every body, in graph order.
    ///
    /// Call after [`tick`](Self::tick). Fails if the camera parameters are
    /// degenerate (e.g. a non-positive `aspect`).
    pub fn frame(&self, aspect: f32) -> Result<Vec<DrawUniforms>> {
        let view_projection = self.camera.camera().view_projection(aspect)?;
        let uniforms = self
            .graph
            .draw_list(&view_projection)
            .into_iter()
            .filter_map(|item| {
                let color = self.world.get::<&ColorMult>(*item.payload).ok()?;
                Some(DrawUniforms {
                    u_matrix: item.matrix.0,
                    u_color_mult: color.0,
                })
            })
            .collect();
        Ok(uniforms)
    }

    /// Looks up a body's node by name.
    pub fn body(&self, name: &str) -> Option<NodeId> {
        self.world
            .query::<(&Body, &SceneNode)>()
            .iter()
            .find(|(_, (body, _))| body.name == name)
            .map(|(_, (_, node))| node.0)
    }

    /// World-space position of a body as of the last tick.
    pub fn position(&self, name: &str) -> Option<Vector3> {
        let node = self.body(name)?;
        self.graph
            .world_matrix(node)
            .ok()
            .map(|world| world.translation_part())
    }

    pub fn graph(&self) -> &SceneGraph<Entity> {
        &self.graph
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_hierarchy() {
        let orrery = Orrery::new(OrreryConfig::default()).unwrap();
        let graph = orrery.graph();
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.roots().count(), 1);

        let earth = orrery.body("earth").unwrap();
        let moon = orrery.body("moon").unwrap();
        let earth_orbit = graph.parent(earth).unwrap().unwrap();
        assert!(graph.is_ancestor(earth_orbit, moon).unwrap());
        assert!(orrery.body("pluto").is_none());
    }

    #[test]
    fn earth_keeps_its_orbit_radius() {
        let mut orrery = Orrery::new(OrreryConfig::default()).unwrap();
        assert!(
            orrery
                .position("earth")
                .unwrap()
                .abs_diff_eq(Vector3::new(70.0, 0.0, 0.0), 1e-4)
        );
        for _ in 0..157 {
            orrery.tick(1.0);
        }
        let earth = orrery.position("earth").unwrap();
        assert!((earth.length() - 70.0).abs() < 1e-2);
        assert!(earth.abs_diff_eq(Vector3::new(0.0, 0.0, -70.0), 0.5));
    }

    #[test]
    fn moon_orbits_the_earth() {
        let mut orrery = Orrery::new(OrreryConfig::default()).unwrap();
        for _ in 0..40 {
            orrery.tick(1.0);
        }
        let earth = orrery.position("earth").unwrap();
        let moon = orrery.position("moon").unwrap();
        assert!(((moon - earth).length() - 20.0).abs() < 1e-2);
    }

    #[test]
    fn sun_spins_in_place() {
        let mut orrery = Orrery::new(OrreryConfig::default()).unwrap();
        orrery.tick(100.0);
        assert!(orrery.position("sun").unwrap().abs_diff_eq(Vector3::ZERO, 1e-6));
    }

    #[test]
    fn tick_skips_spins_whose_node_is_gone() {
        let mut orrery = Orrery::new(OrreryConfig::default()).unwrap();
        let moon = orrery.body("moon").unwrap();
        let moon_orbit = orrery.graph.parent(moon).unwrap().unwrap();
        orrery
            .graph
            .destroy(moon_orbit, crate::graph::DestroyPolicy::Recursive)
            .unwrap();

        let before = orrery.position("earth").unwrap();
        orrery.tick(1.0);
        let after = orrery.position("earth").unwrap();
        assert!(!after.abs_diff_eq(before, 1e-3));
        assert!(orrery.position("moon").is_none());
        assert_eq!(orrery.frame(1.0).unwrap().len(), 2);
    }

    #[test]
    fn frame_packs_uniforms_for_bodies_only() {
        let mut orrery = Orrery::new(OrreryConfig::default().moon(None)).unwrap();
        orrery.tick(1.0);
        let uniforms = orrery.frame(1.0).unwrap();
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms[0].u_color_mult, [1.0, 1.0, 0.5, 1.0]);
        assert_eq!(uniforms[1].u_color_mult, [0.5, 1.0, 0.5, 1.0]);

        // The sun sits at the origin, which the camera looks at.
        let sun_clip = crate::Matrix4(uniforms[0].u_matrix).transform_point(Vector3::ZERO);
        assert!(sun_clip.x.abs() < 1e-4 && sun_clip.y.abs() < 1e-4);
    }

    #[test]
    fn frame_rejects_bad_aspect() {
        let orrery = Orrery::new(OrreryConfig::default()).unwrap();
        assert!(orrery.frame(0.0).is_err());
    }
}
