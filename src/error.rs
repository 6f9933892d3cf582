//! Error types for the math kernel and the transform graph.
//!
//! Every failure here is a caller-contract violation: the operation is rejected
//! and no state is modified, so the host can decide how to proceed.

use thiserror::Error;

use crate::graph::NodeId;

/// Degenerate input to a math kernel function.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum MathError {
    /// The matrix has a (near-)zero determinant and cannot be inverted.
    #[error("matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f32 },

    /// Vertical field of view outside `(0, π)`.
    #[error("field of view must be in (0, π) radians, got {0}")]
    InvalidFieldOfView(f32),

    /// Aspect ratio that is zero, negative or not finite.
    #[error("aspect ratio must be positive, got {0}")]
    InvalidAspect(f32),

    /// Clip planes violating `0 < near < far`.
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidClipRange { near: f32, far: f32 },

    /// Viewport extent with a zero, negative or non-finite dimension.
    #[error("projection extent must be positive, got {width}x{height}x{depth}")]
    InvalidExtent { width: f32, height: f32, depth: f32 },

    /// Camera eye and target are the same point.
    #[error("look-at eye and target coincide")]
    CoincidentEyeTarget,

    /// Up vector is parallel to the viewing direction (or zero).
    #[error("look-at up vector is parallel to the view direction")]
    ParallelUp,
}

/// Rejected structural operation on a [`SceneGraph`](crate::SceneGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The handle refers to a node that was never created or has been destroyed.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    /// Attaching `node` under `parent` would make `node` its own ancestor.
    #[error("attaching {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
}

/// Any error produced by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
