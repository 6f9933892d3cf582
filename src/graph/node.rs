//! Node handles and per-node transform state.

use crate::math::Matrix4;

/// Stable handle to a node in a [`SceneGraph`](super::SceneGraph).
///
/// Handles are generational: once a node is destroyed its slot may be reused,
/// but the old handle keeps referring to the destroyed node and is rejected
/// by every graph operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Slot index inside the graph's arena.
    pub fn index(self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A single node of the transform graph.
///
/// `local` is relative to the parent; `world` is relative to the root and is
/// only ever written by [`SceneGraph::propagate`](super::SceneGraph::propagate).
/// Between a local edit and the next propagation `world` still holds the
/// previous frame's value.
#[derive(Clone, Debug)]
pub struct TransformNode<P> {
    pub(crate) local: Matrix4,
    pub(crate) world: Matrix4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) payload: Option<P>,
}

impl<P> TransformNode<P> {
    pub(crate) fn new(payload: Option<P>) -> Self {
        Self {
            local: Matrix4::IDENTITY,
            world: Matrix4::IDENTITY,
            parent: None,
            children: Vec::new(),
            payload,
        }
    }

    pub fn local_matrix(&self) -> &Matrix4 {
        &self.local
    }

    pub fn world_matrix(&self) -> &Matrix4 {
        &self.world
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order, which is also traversal order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// What happens to the children of a destroyed node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DestroyPolicy {
    /// Destroy the whole subtree.
    Recursive,
    /// Hand the children to the destroyed node's parent, in the destroyed
    /// node's place, folding its local transform into theirs so their world
    /// pose is unchanged. Children of a destroyed root become roots.
    #[default]
    ReparentToGrandparent,
}
