//! Hit-box point testing through inverse world transforms.
//!
//! A [`HitBox`] is an axis-aligned rectangle in its owner's local space.
//! Queries map the point through the inverse of the owner's concatenated
//! matrix and test containment locally, so rotation and scale on any
//! ancestor are respected without ever intersecting rotated rectangles in
//! world space.

use crate::math::{DVec2, Matrix};
use crate::scene::{NodeKey, SceneGraph};

pub struct HitBox {
    node: NodeKey,
    offset: DVec2,
    width: f64,
    height: f64,
    /// Owner world matrix at the last check.
    forward: Matrix,
    /// Cached inverse; `None` when the owner transform is degenerate.
    inverse: Option<Matrix>,
    primed: bool,
}

impl HitBox {
    pub fn new(node: NodeKey, offset: DVec2, width: f64, height: f64) -> Self {
        Self {
            node,
            offset,
            width,
            height,
            forward: Matrix::IDENTITY,
            inverse: Some(Matrix::IDENTITY),
            primed: false,
        }
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Test a world-space point against the box. Boundary exclusive on all
    /// four edges.
    ///
    /// Runs every frame, so degenerate owner transforms (zero-scale axis,
    /// non-finite components) fail the test silently instead of erroring.
    pub fn check(&mut self, scene: &mut SceneGraph, point: DVec2) -> bool {
        let world = scene.world_matrix(self.node);
        if !self.primed || world != self.forward {
            self.forward = world;
            self.inverse = world.inverse();
            self.primed = true;
        }
        let Some(inverse) = &self.inverse else {
            return false;
        };
        let local = inverse.transform_point(point);
        if !local.is_finite() {
            return false;
        }
        local.x > self.offset.x
            && local.x < self.offset.x + self.width
            && local.y > self.offset.y
            && local.y < self.offset.y + self.height
    }
}
