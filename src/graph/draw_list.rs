use super::NodeId;
use crate::math::Matrix4;

/// One renderable node, ready to hand to the renderer.
///
/// Produced by [`SceneGraph::draw_list`](super::SceneGraph::draw_list) after
/// propagation. `matrix` is `world · view_projection`, i.e. the full
/// model-to-clip transform for the node's geometry.
#[derive(Debug)]
pub struct DrawItem<'a, P> {
    /// The node this item was built from.
    pub node: NodeId,
    /// The node's payload (geometry, uniforms, entity handle, ...).
    pub payload: &'a P,
    /// Model-to-clip transform.
    pub matrix: Matrix4,
}
