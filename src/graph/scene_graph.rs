//! Arena-backed transform hierarchy.

use tracing::{debug, trace, warn};

use super::draw_list::DrawItem;
use super::node::{DestroyPolicy, NodeId, TransformNode};
use crate::error::GraphError;
use crate::math::{Matrix4, Quaternion, Vector3};

struct Slot<P> {
    generation: u32,
    node: Option<TransformNode<P>>,
}

/// A forest of transform nodes addressed by [`NodeId`] handles.
///
/// Each node owns a local transform and an optional payload of type `P`
/// (geometry, uniforms, an ECS entity, ...), which the graph never inspects.
/// Parent/child links are stored as handles, so "no cycles" is checked with
/// an ancestor walk whenever a node is reparented.
///
/// # Per-tick usage
///
/// ```
/// use orrery::{Matrix4, SceneGraph, Vector3};
///
/// let mut graph: SceneGraph<&str> = SceneGraph::new();
/// let sun = graph.create_node_with("sun");
/// let earth = graph.create_node_with("earth");
/// graph.set_parent(earth, Some(sun)).unwrap();
/// graph.translate_local(earth, 70.0, 0.0, 0.0).unwrap();
///
/// // Each tick: mutate locals, propagate once, then read world matrices.
/// graph.rotate_local(sun, Vector3::Y, 0.01).unwrap();
/// graph.propagate_all();
/// let world = graph.world_matrix(earth).unwrap();
/// assert!((world.translation_part().length() - 70.0).abs() < 1e-3);
/// ```
///
/// # Thread safety
///
/// The graph does no internal locking. Structural edits, local mutations and
/// propagation on overlapping subtrees must be serialized by the caller.
pub struct SceneGraph<P> {
    slots: Vec<Slot<P>>,
    free: Vec<u32>,
    len: usize,
}

impl<P> Default for SceneGraph<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SceneGraph<P> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Creates a detached root node with identity transforms and no payload.
    pub fn create_node(&mut self) -> NodeId {
        self.insert(TransformNode::new(None))
    }

    /// Creates a detached root node carrying `payload`.
    pub fn create_node_with(&mut self, payload: P) -> NodeId {
        self.insert(TransformNode::new(Some(payload)))
    }

    fn insert(&mut self, node: TransformNode<P>) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&TransformNode<P>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get(&self, id: NodeId) -> Result<&TransformNode<P>, GraphError> {
        self.node(id).ok_or(GraphError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut TransformNode<P>, GraphError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(GraphError::UnknownNode(id))
    }

    /// All live nodes in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TransformNode<P>)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|node| {
                let id = NodeId {
                    index: index as u32,
                    generation: slot.generation,
                };
                (id, node)
            })
        })
    }

    /// Nodes without a parent, in ascending slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, GraphError> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], GraphError> {
        Ok(&self.get(id)?.children)
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    ///
    /// Walks the parent chain, so this is O(depth).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool, GraphError> {
        self.get(ancestor)?;
        let mut current = self.get(node)?.parent;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent;
        }
        Ok(false)
    }

    /// Moves `node` under `new_parent`, or makes it a root when `None`.
    ///
    /// The node is appended to the end of the new parent's children. Setting
    /// the parent a node already has is a no-op and keeps its sibling
    /// position. Attaching a node to itself or to one of its descendants is
    /// rejected with [`GraphError::Cycle`] and leaves the graph untouched.
    ///
    /// The node's world matrix is not recomputed until the next propagation.
    pub fn set_parent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<(), GraphError> {
        let old_parent = self.get(node)?.parent;
        if let Some(parent) = new_parent {
            self.get(parent)?;
            if parent == node || self.is_ancestor(node, parent)? {
                warn!(%node, %parent, "rejected reparent that would create a cycle");
                return Err(GraphError::Cycle { node, parent });
            }
        }
        if old_parent == new_parent {
            return Ok(());
        }

        if let Some(old) = old_parent {
            self.get_mut(old)?.children.retain(|&child| child != node);
        }
        if let Some(parent) = new_parent {
            self.get_mut(parent)?.children.push(node);
        }
        self.get_mut(node)?.parent = new_parent;

        debug!(%node, from = ?old_parent, to = ?new_parent, "reparented node");
        self.debug_check_links(node);
        Ok(())
    }

    /// Makes `node` a root. Equivalent to `set_parent(node, None)`.
    pub fn detach(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.set_parent(node, None)
    }

    /// Removes `node` from the graph.
    ///
    /// The children are handled according to `policy`; see [`DestroyPolicy`].
    /// Returns every removed node together with its payload, in pre-order,
    /// so callers can release whatever the payloads refer to.
    pub fn destroy(
        &mut self,
        node: NodeId,
        policy: DestroyPolicy,
    ) -> Result<Vec<(NodeId, Option<P>)>, GraphError> {
        let parent = self.get(node)?.parent;

        let doomed = match policy {
            DestroyPolicy::Recursive => self.traverse(node)?.collect(),
            DestroyPolicy::ReparentToGrandparent => {
                let target = self.get(node)?;
                let local = target.local;
                let children = target.children.clone();
                for &child in &children {
                    let entry = self.get_mut(child)?;
                    entry.local = entry.local.multiply(&local);
                    entry.parent = parent;
                }
                if let Some(grandparent) = parent {
                    let siblings = &mut self.get_mut(grandparent)?.children;
                    let position = siblings.iter().position(|&id| id == node);
                    if let Some(position) = position {
                        siblings.splice(position..=position, children.iter().copied());
                    }
                }
                self.get_mut(node)?.children.clear();
                vec![node]
            }
        };

        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|&child| child != node);
        }

        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            let slot = &mut self.slots[id.index as usize];
            let payload = slot.node.take().and_then(|n| n.payload);
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.len -= 1;
            removed.push((id, payload));
        }

        debug!(%node, ?policy, removed = removed.len(), "destroyed node");
        Ok(removed)
    }

    pub fn local_matrix(&self, node: NodeId) -> Result<Matrix4, GraphError> {
        Ok(self.get(node)?.local)
    }

    /// The world matrix as of the most recent propagation that reached `node`.
    pub fn world_matrix(&self, node: NodeId) -> Result<Matrix4, GraphError> {
        Ok(self.get(node)?.world)
    }

    /// Replaces the local transform outright.
    pub fn set_local_matrix(&mut self, node: NodeId, local: Matrix4) -> Result<(), GraphError> {
        self.get_mut(node)?.local = local;
        Ok(())
    }

    fn compose_local(&mut self, node: NodeId, delta: &Matrix4) -> Result<(), GraphError> {
        let entry = self.get_mut(node)?;
        entry.local = entry.local.multiply(delta);
        Ok(())
    }

    /// `local = local · translation(x, y, z)`.
    ///
    /// Cumulative: repeated calls compose rather than overwrite.
    pub fn translate_local(&mut self, node: NodeId, x: f32, y: f32, z: f32) -> Result<(), GraphError> {
        self.compose_local(node, &Matrix4::translation(x, y, z))
    }

    /// `local = local · R`, where `R` is the matrix of the quaternion for
    /// `axis` and `angle`.
    ///
    /// Cumulative like [`translate_local`](Self::translate_local). The axis
    /// should be unit length.
    pub fn rotate_local(
        &mut self,
        node: NodeId,
        axis: impl Into<Vector3>,
        angle: f32,
    ) -> Result<(), GraphError> {
        let rotation = Quaternion::from_axis_angle(axis, angle).to_matrix();
        self.compose_local(node, &rotation)
    }

    /// `local = local · scaling(sx, sy, sz)`.
    pub fn scale_local(&mut self, node: NodeId, sx: f32, sy: f32, sz: f32) -> Result<(), GraphError> {
        self.compose_local(node, &Matrix4::scaling(sx, sy, sz))
    }

    /// Recomputes world matrices for `node` and its whole subtree.
    ///
    /// With `parent_world == None` the node's world matrix is its local
    /// matrix. This is also allowed for a node that has a parent: the node
    /// is then treated as the root of a partial update, which is useful when
    /// only one subtree changed. Otherwise `world = local · parent_world`.
    /// Children are visited pre-order in insertion order.
    ///
    /// Returns the number of nodes updated.
    pub fn propagate(&mut self, node: NodeId, parent_world: Option<&Matrix4>) -> Result<usize, GraphError> {
        self.get(node)?;
        let mut stack = vec![(node, parent_world.copied())];
        let mut updated = 0;
        while let Some((id, parent_world)) = stack.pop() {
            let entry = self.get_mut(id)?;
            entry.world = match parent_world {
                Some(parent_world) => entry.local.multiply(&parent_world),
                None => entry.local,
            };
            let world = entry.world;
            stack.extend(entry.children.iter().rev().map(|&child| (child, Some(world))));
            updated += 1;
        }
        trace!(%node, updated, "propagated subtree");
        Ok(updated)
    }

    /// Propagates from every root, in [`roots`](Self::roots) order.
    ///
    /// Call once per tick after all local mutations and before reading any
    /// world matrix.
    pub fn propagate_all(&mut self) -> usize {
        let roots: Vec<NodeId> = self.roots().collect();
        roots
            .into_iter()
            .map(|root| {
                let updated = self.propagate(root, None);
                debug_assert!(updated.is_ok(), "root {root} vanished during propagation");
                updated.unwrap_or(0)
            })
            .sum()
    }

    /// Pre-order iterator over `node` and its descendants, children in
    /// insertion order.
    pub fn traverse(&self, node: NodeId) -> Result<Traverse<'_, P>, GraphError> {
        self.get(node)?;
        Ok(Traverse {
            graph: self,
            stack: vec![node],
        })
    }

    /// Combines every payload-carrying node's world matrix with
    /// `view_projection`, in propagation order.
    ///
    /// Call after [`propagate_all`](Self::propagate_all).
    pub fn draw_list(&self, view_projection: &Matrix4) -> Vec<DrawItem<'_, P>> {
        let mut items = Vec::new();
        for root in self.roots() {
            for id in (Traverse {
                graph: self,
                stack: vec![root],
            }) {
                let Some(node) = self.node(id) else {
                    continue;
                };
                if let Some(payload) = node.payload.as_ref() {
                    items.push(DrawItem {
                        node: id,
                        payload,
                        matrix: node.world.multiply(view_projection),
                    });
                }
            }
        }
        items
    }

    pub fn payload(&self, node: NodeId) -> Option<&P> {
        self.node(node).and_then(|n| n.payload.as_ref())
    }

    pub fn payload_mut(&mut self, node: NodeId) -> Option<&mut P> {
        self.get_mut(node).ok().and_then(|n| n.payload.as_mut())
    }

    /// Attaches `payload`, returning the previous one.
    pub fn set_payload(&mut self, node: NodeId, payload: P) -> Result<Option<P>, GraphError> {
        Ok(self.get_mut(node)?.payload.replace(payload))
    }

    pub fn take_payload(&mut self, node: NodeId) -> Result<Option<P>, GraphError> {
        Ok(self.get_mut(node)?.payload.take())
    }

    #[cfg(debug_assertions)]
    fn debug_check_links(&self, node: NodeId) {
        let Some(entry) = self.node(node) else {
            return;
        };
        if let Some(parent) = entry.parent {
            let siblings = self.node(parent).map(|p| p.children.as_slice()).unwrap_or(&[]);
            debug_assert_eq!(
                siblings.iter().filter(|&&id| id == node).count(),
                1,
                "{node} must appear exactly once among its parent's children"
            );
        }
        for &child in &entry.children {
            debug_assert_eq!(
                self.node(child).and_then(|c| c.parent),
                Some(node),
                "child {child} of {node} has a mismatched parent link"
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_links(&self, _node: NodeId) {}
}

/// Depth-first, pre-order walk over a subtree. Created by [`SceneGraph::traverse`].
pub struct Traverse<'a, P> {
    graph: &'a SceneGraph<P>,
    stack: Vec<NodeId>,
}

impl<P> Iterator for Traverse<'_, P> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.graph.node(id) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}
