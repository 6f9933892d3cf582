//! # Orrery
//!
//! **World transforms for hierarchies of rigid bodies, and the matrix math to render them.**
//!
//! Build a tree of transform nodes once, nudge their local transforms every
//! tick, propagate, and hand `world · view · projection` to your renderer.
//!
//! ## Quick Start
//!
//! ```
//! use ::orrery::*;
//!
//! let mut graph: SceneGraph<&str> = SceneGraph::new();
//! let sun = graph.create_node_with("sun");
//! let earth = graph.create_node_with("earth");
//! graph.set_parent(earth, Some(sun)).unwrap();
//! graph.translate_local(earth, 70.0, 0.0, 0.0).unwrap();
//!
//! let camera = Camera::new().at(0.0, 0.0, 150.0).with_fov(60.0);
//!
//! // One tick:
//! graph.rotate_local(sun, Vector3::Y, 0.01).unwrap();
//! graph.propagate_all();
//! let view_projection = camera.view_projection(16.0 / 9.0).unwrap();
//! for item in graph.draw_list(&view_projection) {
//!     // upload `item.matrix` for `item.payload` and draw
//!     let _bytes: &[u8] = bytemuck::bytes_of(&item.matrix);
//! }
//! ```
//!
//! ## Conventions
//!
//! - Matrices are row-major and act on row vectors; `a.multiply(&b)` applies `a` first.
//! - The memory layout is what WebGL/wgpu shaders and [`glam`] expect.
//! - Angles are radians unless a builder method says degrees.
//! - Degenerate math (singular inverse, bad projection, collapsed look-at basis)
//!   and cyclic reparenting return errors instead of NaNs or corrupted trees.

mod camera;
mod error;
pub mod graph;
pub mod math;
mod orbit_camera;
pub mod orrery;

pub use camera::Camera;
pub use error::{Error, GraphError, MathError, Result};
pub use graph::{DestroyPolicy, DrawItem, NodeId, SceneGraph, TransformNode};
pub use math::{Matrix3, Matrix4, Quaternion, Vector3};
pub use orbit_camera::{OrbitCamera, OrbitMode};
pub use orrery::{DrawUniforms, Orrery, OrreryConfig};
