//! Transform hierarchy with deterministic top-down propagation.
//!
//! A [`SceneGraph`] stores nodes in an arena and links them by [`NodeId`].
//! Each node has a *local* matrix (relative to its parent) and a *world*
//! matrix (relative to the root), using the row-vector convention of
//! [`crate::math`]:
//!
//! ```text
//! translate/rotate/scale:   local = local · delta
//! propagate (root):         world = local
//! propagate (child):        world = local · parent.world
//! hand-off to renderer:     clip  = world · view · projection
//! ```
//!
//! # Per-tick ordering
//!
//! 1. Mutate local transforms.
//! 2. Call [`SceneGraph::propagate_all`] (or [`SceneGraph::propagate`] per root).
//! 3. Read world matrices / build the [`SceneGraph::draw_list`].
//!
//! Reading a world matrix between steps 1 and 2 returns last tick's value.

mod draw_list;
mod node;
mod scene_graph;

pub use draw_list::DrawItem;
pub use node::{DestroyPolicy, NodeId, TransformNode};
pub use scene_graph::{SceneGraph, Traverse};
