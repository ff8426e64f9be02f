//! # SceneGraph — Hierarchical Transform Nodes
//!
//! Every positioned object (entity, camera, tile layer) owns a node in the
//! [`SceneGraph`]. A node carries position, scale, rotation, origin and
//! pivot, an optional parent, and a cached concatenated world [`Matrix`].
//!
//! ## Ownership
//!
//! The graph is an arena: a [`SlotMap`] owns every node by value, and
//! parent/child links are plain [`NodeKey`]s. Keys are generational, so a
//! key held after [`despawn`](SceneGraph::despawn) goes stale instead of
//! dangling — there are no reference cycles and no use-after-free, which a
//! parent-pointer design with owning references could not guarantee.
//!
//! ## Dirty Propagation
//!
//! Mutating any transform field marks the node *and all descendants* dirty
//! with one explicit tree walk at write time. The walk prunes subtrees that
//! are already dirty: the invariant "dirty ⇒ every descendant is dirty"
//! makes the prune sound, so repeated field writes cost one traversal, not
//! one per write.
//!
//! Recomputation happens lazily at read time:
//! [`world_matrix`](SceneGraph::world_matrix) rebuilds the local matrix,
//! recursively cleans the ancestor chain, caches the result, and clears the
//! flag. When nothing changed between reads, the cached matrix is returned
//! untouched.

use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::math::{DVec2, Matrix};

new_key_type! {
    /// Generational key identifying a node in a [`SceneGraph`].
    pub struct NodeKey;
}

/// Structural errors raised at the mutation boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// Parent assignment would make the node its own ancestor.
    #[error("node cannot become its own ancestor")]
    Cycle,
}

struct Node {
    position: DVec2,
    scale: DVec2,
    rotation: f64,
    origin: DVec2,
    pivot: DVec2,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    dirty: bool,
    world: Matrix,
}

impl Node {
    fn new() -> Self {
        Self {
            position: DVec2::ZERO,
            scale: DVec2::ONE,
            rotation: 0.0,
            origin: DVec2::ZERO,
            pivot: DVec2::ZERO,
            parent: None,
            children: Vec::new(),
            dirty: true,
            world: Matrix::IDENTITY,
        }
    }
}

/// Arena of transform nodes with cached concatenated matrices.
///
/// Single-threaded by design: the update pass mutates, the render pass
/// reads, and the dirty-flag cache is safe because the two never overlap.
#[derive(Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Insert a fresh root node (identity components, marked dirty).
    pub fn spawn(&mut self) -> NodeKey {
        self.nodes.insert(Node::new())
    }

    /// Insert a fresh node parented under `parent`.
    pub fn spawn_child(&mut self, parent: NodeKey) -> NodeKey {
        let key = self.spawn();
        let node = &mut self.nodes[key];
        node.parent = Some(parent);
        self.nodes[parent].children.push(key);
        key
    }

    /// Remove a node. Its children are re-rooted: their parent back-reference
    /// is cleared and they are marked dirty so the next read drops the dead
    /// ancestor's contribution. Stale keys are ignored.
    pub fn despawn(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        if let Some(parent) = node.parent
            && let Some(parent_node) = self.nodes.get_mut(parent)
        {
            parent_node.children.retain(|&c| c != key);
        }
        for child in node.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
                self.mark_dirty(child);
            }
        }
    }

    /// Remove a node and every descendant.
    pub fn despawn_recursive(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        if let Some(parent) = node.parent
            && let Some(parent_node) = self.nodes.get_mut(parent)
        {
            parent_node.children.retain(|&c| c != key);
        }
        let mut stack = node.children;
        while let Some(k) = stack.pop() {
            if let Some(n) = self.nodes.remove(k) {
                stack.extend(n.children);
            }
        }
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Component access ─────────────────────────────────────────────────

    pub fn position(&self, key: NodeKey) -> DVec2 {
        self.nodes[key].position
    }

    pub fn scale(&self, key: NodeKey) -> DVec2 {
        self.nodes[key].scale
    }

    /// Rotation in radians.
    pub fn rotation(&self, key: NodeKey) -> f64 {
        self.nodes[key].rotation
    }

    pub fn origin(&self, key: NodeKey) -> DVec2 {
        self.nodes[key].origin
    }

    pub fn pivot(&self, key: NodeKey) -> DVec2 {
        self.nodes[key].pivot
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes[key].parent
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        &self.nodes[key].children
    }

    pub fn is_dirty(&self, key: NodeKey) -> bool {
        self.nodes[key].dirty
    }

    pub fn set_position(&mut self, key: NodeKey, position: DVec2) {
        self.nodes[key].position = position;
        self.mark_dirty(key);
    }

    pub fn set_x(&mut self, key: NodeKey, x: f64) {
        self.nodes[key].position.x = x;
        self.mark_dirty(key);
    }

    pub fn set_y(&mut self, key: NodeKey, y: f64) {
        self.nodes[key].position.y = y;
        self.mark_dirty(key);
    }

    /// Move by `delta` in local space.
    pub fn translate(&mut self, key: NodeKey, delta: DVec2) {
        self.nodes[key].position += delta;
        self.mark_dirty(key);
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: DVec2) {
        self.nodes[key].scale = scale;
        self.mark_dirty(key);
    }

    pub fn set_scale_uniform(&mut self, key: NodeKey, scale: f64) {
        self.nodes[key].scale = DVec2::splat(scale);
        self.mark_dirty(key);
    }

    /// Set rotation in radians.
    pub fn set_rotation(&mut self, key: NodeKey, radians: f64) {
        self.nodes[key].rotation = radians;
        self.mark_dirty(key);
    }

    /// Degrees in, radians stored.
    pub fn set_rotation_degrees(&mut self, key: NodeKey, degrees: f64) {
        self.set_rotation(key, degrees.to_radians());
    }

    pub fn set_origin(&mut self, key: NodeKey, origin: DVec2) {
        self.nodes[key].origin = origin;
        self.mark_dirty(key);
    }

    pub fn set_pivot(&mut self, key: NodeKey, pivot: DVec2) {
        self.nodes[key].pivot = pivot;
        self.mark_dirty(key);
    }

    /// Bulk setter: position, scale and rotation in one invalidation pass.
    pub fn set_transform(&mut self, key: NodeKey, position: DVec2, scale: DVec2, rotation: f64) {
        let node = &mut self.nodes[key];
        node.position = position;
        node.scale = scale;
        node.rotation = rotation;
        self.mark_dirty(key);
    }

    // ── Hierarchy ────────────────────────────────────────────────────────

    /// Reassign `key`'s parent. Rejects self-parenting and any assignment
    /// that would make the node its own ancestor — that is a programming
    /// error in the caller, detected here rather than silently "fixed".
    pub fn set_parent(&mut self, key: NodeKey, parent: Option<NodeKey>) -> Result<(), SceneError> {
        if let Some(p) = parent {
            let mut cursor = Some(p);
            while let Some(k) = cursor {
                if k == key {
                    return Err(SceneError::Cycle);
                }
                cursor = self.nodes[k].parent;
            }
        }
        if let Some(old) = self.nodes[key].parent {
            self.nodes[old].children.retain(|&c| c != key);
        }
        self.nodes[key].parent = parent;
        if let Some(p) = parent {
            self.nodes[p].children.push(key);
        }
        self.mark_dirty(key);
        Ok(())
    }

    // ── Matrices ─────────────────────────────────────────────────────────

    /// The node's local matrix, computed fresh from its components.
    pub fn local_matrix(&self, key: NodeKey) -> Matrix {
        let node = &self.nodes[key];
        Matrix::from_components(
            node.position,
            node.scale,
            node.rotation,
            node.origin,
            node.pivot,
        )
    }

    /// The concatenated world matrix — the sole read path for placement.
    ///
    /// Recomputes only when the node is dirty; recursion cleans any stale
    /// ancestors first (a stale ancestor implies this node is dirty too, so
    /// a clean node can return its cache without looking up).
    pub fn world_matrix(&mut self, key: NodeKey) -> Matrix {
        if !self.nodes[key].dirty {
            return self.nodes[key].world;
        }
        let parent_world = self.nodes[key].parent.map(|p| self.world_matrix(p));
        let mut world = self.local_matrix(key);
        if let Some(pw) = parent_world {
            world.pre_multiply(&pw);
        }
        let node = &mut self.nodes[key];
        node.world = world;
        node.dirty = false;
        world
    }

    /// Mark `key` and all descendants dirty with a single walk.
    ///
    /// Subtrees already dirty are pruned: when a node was marked, its whole
    /// subtree was marked with it, so there is nothing left to do below it.
    fn mark_dirty(&mut self, key: NodeKey) {
        if self.nodes[key].dirty {
            return;
        }
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            let node = &mut self.nodes[k];
            if node.dirty {
                continue;
            }
            node.dirty = true;
            stack.extend(node.children.iter().copied());
        }
    }
}
